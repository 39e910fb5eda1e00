use crate::events::RetryEvent;
use crate::Retry;
use std::sync::Arc;
use std::time::Duration;
use tower_stability_core::{ConfigError, EventListeners, FnListener, StabilityError};

/// Decides whether a failure is worth another attempt.
pub type RetryPredicate = Arc<dyn Fn(&StabilityError) -> bool + Send + Sync>;

/// Configuration for the retry pattern.
pub struct RetryConfig {
    pub(crate) max_attempts: usize,
    pub(crate) delay: Duration,
    pub(crate) retry_on: Option<RetryPredicate>,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
    pub(crate) name: String,
}

impl RetryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    pub(crate) fn should_retry(&self, error: &StabilityError) -> bool {
        self.retry_on.as_ref().map_or(true, |predicate| predicate(error))
    }
}

/// Builder for a [`Retry`].
pub struct RetryConfigBuilder {
    max_attempts: usize,
    delay: Duration,
    retry_on: Option<RetryPredicate>,
    event_listeners: EventListeners<RetryEvent>,
    name: String,
}

impl RetryConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            retry_on: None,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets the total number of attempts, including the first one.
    ///
    /// Default: 3
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the fixed pause between consecutive attempts.
    ///
    /// Default: 1 second
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Restricts retries to failures matching `predicate`.
    ///
    /// A failure the predicate rejects is returned unchanged, without
    /// further attempts and without being wrapped in `RetriesExhausted`.
    ///
    /// Default: every failure is retried
    pub fn retry_on<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&StabilityError) -> bool + Send + Sync + 'static,
    {
        self.retry_on = Some(Arc::new(predicate));
        self
    }

    /// Sets the name of this retry instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Called before each retry with the failed attempt number and the delay.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    /// Called on success with the number of attempts it took.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Called when every attempt has failed.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Called when a failure is rejected by the retry predicate.
    pub fn on_ignored_error<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, RetryEvent::IgnoredError { .. }) {
                f();
            }
        }));
        self
    }

    fn into_config(self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            delay: self.delay,
            retry_on: self.retry_on,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds the retry, rejecting `max_attempts == 0`.
    pub fn try_build(self) -> Result<Retry, ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(Retry::from_config(self.into_config()))
    }

    /// Builds the retry.
    ///
    /// # Panics
    ///
    /// Panics if `max_attempts` is 0.
    pub fn build(self) -> Retry {
        match self.try_build() {
            Ok(retry) => retry,
            Err(err) => panic!("invalid retry configuration: {}", err),
        }
    }
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
