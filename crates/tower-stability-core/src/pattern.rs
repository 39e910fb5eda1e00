//! The contract every stability pattern implements.

use crate::StabilityError;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A policy that governs whether and how an asynchronous operation runs.
///
/// `run` either returns the operation's successful value unchanged or fails
/// with a [`StabilityError`]. Failures of the operation itself are converted
/// into the taxonomy through `Into<StabilityError>`, which for foreign error
/// types means [`StabilityError::Operation`].
///
/// Operations whose error type has no conversion can return
/// [`tower::BoxError`] or map their errors with [`StabilityError::operation`].
///
/// The operation is a zero-argument closure producing a fresh future on each
/// call. It must be `Clone` so that a pattern nested inside another (a
/// timeout inside a retry, for example) can hand its own copy down.
///
/// # Example
///
/// ```
/// use futures::future::BoxFuture;
/// use std::future::Future;
/// use tower_stability_core::{StabilityError, StabilityPattern};
///
/// /// Runs the operation exactly once.
/// struct Passthrough;
///
/// impl<T: Send> StabilityPattern<T> for Passthrough {
///     fn run<'a, F, Fut, Err>(&'a self, mut operation: F) -> BoxFuture<'a, Result<T, StabilityError>>
///     where
///         F: FnMut() -> Fut + Clone + Send + 'a,
///         Fut: Future<Output = Result<T, Err>> + Send + 'a,
///         Err: Into<StabilityError> + Send + 'a,
///         T: 'a,
///     {
///         Box::pin(async move { operation().await.map_err(Into::into) })
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let value = Passthrough.run(|| async { Ok::<_, StabilityError>(7) }).await;
/// assert_eq!(value.unwrap(), 7);
/// # }
/// ```
pub trait StabilityPattern<T: Send>: Send + Sync {
    /// Executes `operation` under this policy.
    fn run<'a, F, Fut, Err>(&'a self, operation: F) -> BoxFuture<'a, Result<T, StabilityError>>
    where
        F: FnMut() -> Fut + Clone + Send + 'a,
        Fut: Future<Output = Result<T, Err>> + Send + 'a,
        Err: Into<StabilityError> + Send + 'a,
        T: 'a;
}

impl<T: Send, P: StabilityPattern<T>> StabilityPattern<T> for Arc<P> {
    fn run<'a, F, Fut, Err>(&'a self, operation: F) -> BoxFuture<'a, Result<T, StabilityError>>
    where
        F: FnMut() -> Fut + Clone + Send + 'a,
        Fut: Future<Output = Result<T, Err>> + Send + 'a,
        Err: Into<StabilityError> + Send + 'a,
        T: 'a,
    {
        <P as StabilityPattern<T>>::run(self, operation)
    }
}

impl<T: Send, P: StabilityPattern<T>> StabilityPattern<T> for &P {
    fn run<'a, F, Fut, Err>(&'a self, operation: F) -> BoxFuture<'a, Result<T, StabilityError>>
    where
        F: FnMut() -> Fut + Clone + Send + 'a,
        Fut: Future<Output = Result<T, Err>> + Send + 'a,
        Err: Into<StabilityError> + Send + 'a,
        T: 'a,
    {
        <P as StabilityPattern<T>>::run(*self, operation)
    }
}
