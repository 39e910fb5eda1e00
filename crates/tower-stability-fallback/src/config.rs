//! Configuration for the fallback pattern.

use crate::events::FallbackEvent;
use crate::Fallback;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use tower_stability_core::{EventListeners, FnListener, StabilityError};

/// The alternative operation invoked when the primary fails.
pub type AlternativeFn<T> =
    Arc<dyn Fn() -> BoxFuture<'static, Result<T, StabilityError>> + Send + Sync>;

/// Predicate to determine if a failure should trigger the alternative.
pub type HandlePredicate = Arc<dyn Fn(&StabilityError) -> bool + Send + Sync>;

/// Configuration for the fallback pattern.
pub struct FallbackConfig<T> {
    pub(crate) alternative: AlternativeFn<T>,
    pub(crate) handle_predicate: Option<HandlePredicate>,
    pub(crate) event_listeners: EventListeners<FallbackEvent>,
    pub(crate) name: String,
}

impl<T> FallbackConfig<T> {
    pub(crate) fn should_handle(&self, error: &StabilityError) -> bool {
        self.handle_predicate
            .as_ref()
            .map(|p| p(error))
            .unwrap_or(true)
    }
}

/// Builder for a [`Fallback`].
pub struct FallbackConfigBuilder<T> {
    alternative: AlternativeFn<T>,
    handle_predicate: Option<HandlePredicate>,
    event_listeners: EventListeners<FallbackEvent>,
    name: String,
}

impl<T: Send + 'static> FallbackConfigBuilder<T> {
    /// Creates a builder around `alternative`.
    pub fn new<F, Fut, Err>(alternative: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Err>> + Send + 'static,
        Err: Into<StabilityError> + 'static,
    {
        Self {
            alternative: Arc::new(move || {
                alternative()
                    .map(|result| result.map_err(<Err as Into<StabilityError>>::into))
                    .boxed()
            }),
            handle_predicate: None,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Only failures matching `predicate` engage the alternative; others are
    /// returned unchanged.
    ///
    /// Default: every failure engages the alternative
    pub fn handle<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&StabilityError) -> bool + Send + Sync + 'static,
    {
        self.handle_predicate = Some(Arc::new(predicate));
        self
    }

    /// Sets the name of this fallback instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Called when the alternative produced the result.
    pub fn on_applied<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, FallbackEvent::Applied { .. }) {
                f();
            }
        }));
        self
    }

    /// Called when the alternative failed as well.
    pub fn on_alternative_failed<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, FallbackEvent::AlternativeFailed { .. }) {
                f();
            }
        }));
        self
    }

    /// Builds the fallback.
    pub fn build(self) -> Fallback<T> {
        Fallback::from_config(FallbackConfig {
            alternative: self.alternative,
            handle_predicate: self.handle_predicate,
            event_listeners: self.event_listeners,
            name: self.name,
        })
    }
}
