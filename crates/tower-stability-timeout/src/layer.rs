//! Tower layer for the timeout pattern.

use crate::Timeout;
use std::sync::Arc;
use tower_stability_core::{PatternLayer, PatternService};

/// A Tower layer that bounds every call of the wrapped service.
pub type TimeoutLayer = PatternLayer<Timeout>;

/// A service wrapped by a [`TimeoutLayer`].
pub type TimeoutService<S> = PatternService<S, Timeout>;

impl Timeout {
    /// Converts this timeout into a Tower layer.
    pub fn into_layer(self) -> TimeoutLayer {
        PatternLayer::new(self)
    }

    /// Creates a Tower layer sharing this timeout with other holders.
    pub fn shared_layer(self: &Arc<Self>) -> TimeoutLayer {
        PatternLayer::from_shared(Arc::clone(self))
    }
}
