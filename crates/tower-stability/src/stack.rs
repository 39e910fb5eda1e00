//! The conventional composition of all five patterns.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tower_stability_circuitbreaker::CircuitBreaker;
use tower_stability_core::{PatternLayer, StabilityError, StabilityPattern};
use tower_stability_fallback::Fallback;
use tower_stability_retry::Retry;
use tower_stability_throttle::Throttle;
use tower_stability_timeout::Timeout;

/// A Tower layer applying a [`StabilityStack`].
pub type StabilityStackLayer<T> = PatternLayer<StabilityStack<T>>;

/// Any subset of the five patterns, nested innermost first as fallback,
/// timeout, circuit breaker, retry, throttle.
///
/// Missing patterns are skipped. Patterns are held by `Arc`, so a circuit
/// breaker or throttle handed to several stacks keeps one shared state.
///
/// With that order a throttle rejection is never retried, every retry
/// attempt passes through the breaker, and each attempt gets its own timeout.
pub struct StabilityStack<T> {
    fallback: Option<Arc<Fallback<T>>>,
    timeout: Option<Arc<Timeout>>,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
    retry: Option<Arc<Retry>>,
    throttle: Option<Arc<Throttle>>,
}

impl<T> StabilityStack<T> {
    /// Returns an empty builder.
    pub fn builder() -> StabilityStackBuilder<T> {
        StabilityStackBuilder::new()
    }

    pub fn fallback(&self) -> Option<&Arc<Fallback<T>>> {
        self.fallback.as_ref()
    }

    pub fn timeout(&self) -> Option<&Arc<Timeout>> {
        self.timeout.as_ref()
    }

    pub fn circuit_breaker(&self) -> Option<&Arc<CircuitBreaker>> {
        self.circuit_breaker.as_ref()
    }

    pub fn retry(&self) -> Option<&Arc<Retry>> {
        self.retry.as_ref()
    }

    pub fn throttle(&self) -> Option<&Arc<Throttle>> {
        self.throttle.as_ref()
    }

    /// Converts this stack into a Tower layer.
    pub fn into_layer(self) -> StabilityStackLayer<T> {
        PatternLayer::new(self)
    }
}

impl<T> Clone for StabilityStack<T> {
    fn clone(&self) -> Self {
        Self {
            fallback: self.fallback.clone(),
            timeout: self.timeout.clone(),
            circuit_breaker: self.circuit_breaker.clone(),
            retry: self.retry.clone(),
            throttle: self.throttle.clone(),
        }
    }
}

impl<T> Default for StabilityStack<T> {
    fn default() -> Self {
        StabilityStackBuilder::new().build()
    }
}

impl<T> std::fmt::Debug for StabilityStack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StabilityStack")
            .field("fallback", &self.fallback)
            .field("timeout", &self.timeout)
            .field("circuit_breaker", &self.circuit_breaker)
            .field("retry", &self.retry)
            .field("throttle", &self.throttle)
            .finish()
    }
}

/// Builder for a [`StabilityStack`].
///
/// Each setter accepts either an owned pattern or an `Arc` shared elsewhere.
/// The order of the calls does not affect the nesting order.
pub struct StabilityStackBuilder<T> {
    stack: StabilityStack<T>,
}

impl<T> StabilityStackBuilder<T> {
    pub fn new() -> Self {
        Self {
            stack: StabilityStack {
                fallback: None,
                timeout: None,
                circuit_breaker: None,
                retry: None,
                throttle: None,
            },
        }
    }

    pub fn fallback(mut self, fallback: impl Into<Arc<Fallback<T>>>) -> Self {
        self.stack.fallback = Some(fallback.into());
        self
    }

    pub fn timeout(mut self, timeout: impl Into<Arc<Timeout>>) -> Self {
        self.stack.timeout = Some(timeout.into());
        self
    }

    pub fn circuit_breaker(mut self, breaker: impl Into<Arc<CircuitBreaker>>) -> Self {
        self.stack.circuit_breaker = Some(breaker.into());
        self
    }

    pub fn retry(mut self, retry: impl Into<Arc<Retry>>) -> Self {
        self.stack.retry = Some(retry.into());
        self
    }

    pub fn throttle(mut self, throttle: impl Into<Arc<Throttle>>) -> Self {
        self.stack.throttle = Some(throttle.into());
        self
    }

    pub fn build(self) -> StabilityStack<T> {
        self.stack
    }
}

impl<T> Default for StabilityStackBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps `operation` in `policy` when present; otherwise only converts the
/// operation's error.
fn guarded<'a, T, P, F, Fut, Err>(
    policy: Option<&'a P>,
    mut operation: F,
) -> impl FnMut() -> BoxFuture<'a, Result<T, StabilityError>> + Clone + Send + 'a
where
    T: Send + 'a,
    P: StabilityPattern<T>,
    F: FnMut() -> Fut + Clone + Send + 'a,
    Fut: Future<Output = Result<T, Err>> + Send + 'a,
    Err: Into<StabilityError> + Send + 'a,
{
    move || match policy {
        Some(policy) => <P as StabilityPattern<T>>::run(policy, operation.clone()),
        None => {
            let attempt = operation();
            Box::pin(async move { attempt.await.map_err(Into::into) })
        }
    }
}

impl<T: Send + 'static> StabilityPattern<T> for StabilityStack<T> {
    fn run<'a, F, Fut, Err>(&'a self, operation: F) -> BoxFuture<'a, Result<T, StabilityError>>
    where
        F: FnMut() -> Fut + Clone + Send + 'a,
        Fut: Future<Output = Result<T, Err>> + Send + 'a,
        Err: Into<StabilityError> + Send + 'a,
        T: 'a,
    {
        let operation = guarded(self.fallback.as_deref(), operation);
        let operation = guarded(self.timeout.as_deref(), operation);
        let operation = guarded(self.circuit_breaker.as_deref(), operation);
        let operation = guarded(self.retry.as_deref(), operation);
        let mut operation = guarded(self.throttle.as_deref(), operation);
        operation()
    }
}
