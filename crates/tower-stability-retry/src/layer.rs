use crate::Retry;
use tower_stability_core::{PatternLayer, PatternService};

/// A Tower layer that retries failed calls of the wrapped service.
///
/// Requests must be `Clone`; each attempt sends a fresh copy.
pub type RetryLayer = PatternLayer<Retry>;

/// A service wrapped by a [`RetryLayer`].
pub type RetryService<S> = PatternService<S, Retry>;

impl Retry {
    /// Converts this retry into a Tower layer.
    pub fn into_layer(self) -> RetryLayer {
        PatternLayer::new(self)
    }
}
