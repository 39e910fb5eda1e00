use crate::CircuitBreaker;
use tower_stability_core::{PatternLayer, PatternService};

/// A Tower layer guarding the wrapped service with a circuit breaker.
///
/// Every service produced by one layer shares the same circuit.
///
/// ```rust
/// use tower::{ServiceBuilder, service_fn};
/// use tower_stability_circuitbreaker::CircuitBreaker;
///
/// let layer = CircuitBreaker::builder()
///     .name("users")
///     .fail_threshold(5)
///     .build()
///     .into_layer();
///
/// let service = ServiceBuilder::new()
///     .layer(layer)
///     .service(service_fn(|req: String| async move { Ok::<_, tower::BoxError>(req) }));
/// ```
pub type CircuitBreakerLayer = PatternLayer<CircuitBreaker>;

/// A service wrapped by a [`CircuitBreakerLayer`].
pub type CircuitBreakerService<S> = PatternService<S, CircuitBreaker>;

impl CircuitBreaker {
    /// Converts this breaker into a Tower layer.
    ///
    /// The layer shares state with any clone of `self` kept by the caller.
    pub fn into_layer(self) -> CircuitBreakerLayer {
        PatternLayer::new(self)
    }
}
