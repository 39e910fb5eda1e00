use crate::Throttle;
use tower_stability_core::{PatternLayer, PatternService};

/// A Tower layer that throttles calls to the wrapped service.
///
/// Unlike a token-bucket limiter this never waits: calls arriving before the
/// minimum interval fail immediately.
pub type ThrottleLayer = PatternLayer<Throttle>;

/// A service wrapped by a [`ThrottleLayer`].
pub type ThrottleService<S> = PatternService<S, Throttle>;

impl Throttle {
    /// Converts this throttle into a Tower layer.
    pub fn into_layer(self) -> ThrottleLayer {
        PatternLayer::new(self)
    }
}
