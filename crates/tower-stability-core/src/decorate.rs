use crate::{StabilityError, StabilityPattern};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Wraps an async function so every invocation runs under `pattern`.
///
/// The returned function takes the same argument as `f`. Each call packages
/// the argument into a zero-argument operation (`move || f(args.clone())`)
/// and delegates to [`StabilityPattern::run`]. Functions of several
/// parameters take a tuple.
///
/// The pattern is shared, so state such as a circuit breaker's failure count
/// is common to every invocation of the decorated function.
///
/// ```
/// use std::sync::Arc;
/// use tower_stability_core::{decorate, StabilityError};
/// # use futures::future::BoxFuture;
/// # use std::future::Future;
/// # use tower_stability_core::StabilityPattern;
/// # struct Once;
/// # impl<T: Send> StabilityPattern<T> for Once {
/// #     fn run<'a, F, Fut, Err>(&'a self, mut op: F) -> BoxFuture<'a, Result<T, StabilityError>>
/// #     where
/// #         F: FnMut() -> Fut + Clone + Send + 'a,
/// #         Fut: Future<Output = Result<T, Err>> + Send + 'a,
/// #         Err: Into<StabilityError> + Send + 'a,
/// #         T: 'a,
/// #     {
/// #         Box::pin(async move { op().await.map_err(Into::into) })
/// #     }
/// # }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let lookup = decorate(Arc::new(Once), |(user, id): (String, u64)| async move {
///     Ok::<_, StabilityError>(format!("{}#{}", user, id))
/// });
///
/// assert_eq!(lookup(("ada".to_string(), 7)).await.unwrap(), "ada#7");
/// # }
/// ```
pub fn decorate<P, T, A, F, Fut, Err>(
    pattern: Arc<P>,
    f: F,
) -> impl Fn(A) -> BoxFuture<'static, Result<T, StabilityError>> + Clone + Send + Sync
where
    P: StabilityPattern<T> + 'static,
    T: Send + 'static,
    A: Clone + Send + 'static,
    F: Fn(A) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T, Err>> + Send + 'static,
    Err: Into<StabilityError> + Send + 'static,
{
    move |args: A| -> BoxFuture<'static, Result<T, StabilityError>> {
        let pattern = Arc::clone(&pattern);
        let f = f.clone();

        Box::pin(async move {
            let operation = move || f(args.clone());
            <P as StabilityPattern<T>>::run(&pattern, operation).await
        })
    }
}
