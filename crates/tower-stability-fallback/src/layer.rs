use crate::Fallback;
use tower_stability_core::{PatternLayer, PatternService};

/// A Tower layer substituting an alternative response when the service fails.
pub type FallbackLayer<T> = PatternLayer<Fallback<T>>;

/// A service wrapped by a [`FallbackLayer`].
pub type FallbackService<S, T> = PatternService<S, Fallback<T>>;

impl<T> Fallback<T> {
    /// Converts this fallback into a Tower layer.
    pub fn into_layer(self) -> FallbackLayer<T> {
        PatternLayer::new(self)
    }
}
