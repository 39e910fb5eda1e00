//! Tower integration for any [`StabilityPattern`].
//!
//! [`PatternLayer`] wraps a `Service<Req>` so that each `call(req)` becomes a
//! zero-argument operation (`inner.clone().oneshot(req.clone())`) executed
//! under the pattern. The wrapped service keeps its request and response
//! types; its error type becomes [`StabilityError`].
//!
//! ```
//! use futures::future::BoxFuture;
//! use std::future::Future;
//! use tower::{service_fn, Layer, ServiceExt};
//! use tower_stability_core::{PatternLayer, StabilityError, StabilityPattern};
//!
//! struct Once;
//!
//! impl<T: Send> StabilityPattern<T> for Once {
//!     fn run<'a, F, Fut, Err>(&'a self, mut op: F) -> BoxFuture<'a, Result<T, StabilityError>>
//!     where
//!         F: FnMut() -> Fut + Clone + Send + 'a,
//!         Fut: Future<Output = Result<T, Err>> + Send + 'a,
//!         Err: Into<StabilityError> + Send + 'a,
//!         T: 'a,
//!     {
//!         Box::pin(async move { op().await.map_err(Into::into) })
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let svc = PatternLayer::new(Once).layer(service_fn(|n: u32| async move {
//!     Ok::<_, tower::BoxError>(n * 2)
//! }));
//! assert_eq!(svc.oneshot(21).await.unwrap(), 42);
//! # }
//! ```

use crate::{StabilityError, StabilityPattern};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// A Tower layer applying a shared stability pattern.
pub struct PatternLayer<P> {
    pattern: Arc<P>,
}

impl<P> PatternLayer<P> {
    /// Creates a layer owning `pattern`.
    pub fn new(pattern: P) -> Self {
        Self {
            pattern: Arc::new(pattern),
        }
    }

    /// Creates a layer from an already shared pattern.
    ///
    /// Every service produced by this layer, and any other holder of the
    /// same `Arc`, observes the same pattern state.
    pub fn from_shared(pattern: Arc<P>) -> Self {
        Self { pattern }
    }

    /// The pattern applied by this layer.
    pub fn pattern(&self) -> &Arc<P> {
        &self.pattern
    }
}

impl<P> Clone for PatternLayer<P> {
    fn clone(&self) -> Self {
        Self {
            pattern: Arc::clone(&self.pattern),
        }
    }
}

impl<S, P> Layer<S> for PatternLayer<P> {
    type Service = PatternService<S, P>;

    fn layer(&self, inner: S) -> Self::Service {
        PatternService {
            inner,
            pattern: Arc::clone(&self.pattern),
        }
    }
}

/// A service wrapped by a [`PatternLayer`].
pub struct PatternService<S, P> {
    inner: S,
    pattern: Arc<P>,
}

impl<S, P> PatternService<S, P> {
    /// The pattern applied to this service.
    pub fn pattern(&self) -> &Arc<P> {
        &self.pattern
    }

    /// The wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S: Clone, P> Clone for PatternService<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            pattern: Arc::clone(&self.pattern),
        }
    }
}

impl<S, P, Req> Service<Req> for PatternService<S, P>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: Into<StabilityError> + Send + 'static,
    Req: Clone + Send + 'static,
    P: StabilityPattern<S::Response> + 'static,
{
    type Response = S::Response;
    type Error = StabilityError;
    type Future = BoxFuture<'static, Result<S::Response, StabilityError>>;

    // Readiness is driven per attempt by `oneshot`.
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let inner = self.inner.clone();
        let pattern = Arc::clone(&self.pattern);

        Box::pin(async move {
            let operation = move || inner.clone().oneshot(req.clone());
            <P as StabilityPattern<S::Response>>::run(&pattern, operation).await
        })
    }
}
