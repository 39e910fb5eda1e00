//! Configuration for the timeout pattern.

use crate::events::TimeoutEvent;
use crate::Timeout;
use std::time::Duration;
use tower_stability_core::{EventListeners, FnListener};

/// Immutable settings of a [`Timeout`].
pub struct TimeoutConfig {
    pub(crate) bound: Duration,
    pub(crate) event_listeners: EventListeners<TimeoutEvent>,
    pub(crate) name: String,
}

impl TimeoutConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> TimeoutConfigBuilder {
        TimeoutConfigBuilder::new()
    }
}

/// Builder for a [`Timeout`].
pub struct TimeoutConfigBuilder {
    bound: Duration,
    event_listeners: EventListeners<TimeoutEvent>,
    name: String,
}

impl TimeoutConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            bound: Duration::from_secs(10),
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets the time bound.
    ///
    /// A zero bound still polls the operation once, so an operation that is
    /// ready immediately succeeds and anything else times out.
    ///
    /// Default: 10 seconds
    pub fn bound(mut self, bound: Duration) -> Self {
        self.bound = bound;
        self
    }

    /// Sets the name of this instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Called with the elapsed time when an operation succeeds in time.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let TimeoutEvent::Success { duration, .. } = event {
                f(*duration);
            }
        }));
        self
    }

    /// Called with the elapsed time when an operation fails in time.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let TimeoutEvent::Error { duration, .. } = event {
                f(*duration);
            }
        }));
        self
    }

    /// Called when the bound elapses.
    pub fn on_timeout<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, TimeoutEvent::Timeout { .. }) {
                f();
            }
        }));
        self
    }

    /// Builds the configuration without wrapping it.
    pub fn build_config(self) -> TimeoutConfig {
        TimeoutConfig {
            bound: self.bound,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds the timeout.
    pub fn build(self) -> Timeout {
        Timeout::from_config(self.build_config())
    }
}

impl Default for TimeoutConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
