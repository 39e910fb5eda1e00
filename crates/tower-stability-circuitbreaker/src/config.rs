use crate::events::CircuitBreakerEvent;
use crate::{CircuitBreaker, CircuitState};
use std::time::Duration;
use tower_stability_core::{ConfigError, EventListeners, FnListener};

/// Configuration for the circuit breaker pattern.
pub struct CircuitBreakerConfig {
    pub(crate) fail_threshold: usize,
    pub(crate) reset_timeout: Duration,
    pub(crate) event_listeners: EventListeners<CircuitBreakerEvent>,
    pub(crate) name: String,
}

impl CircuitBreakerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    pub fn fail_threshold(&self) -> usize {
        self.fail_threshold
    }

    pub fn reset_timeout(&self) -> Duration {
        self.reset_timeout
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for configuring and constructing a circuit breaker.
pub struct CircuitBreakerConfigBuilder {
    fail_threshold: usize,
    reset_timeout: Duration,
    event_listeners: EventListeners<CircuitBreakerEvent>,
    name: String,
}

impl CircuitBreakerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            fail_threshold: 3,
            reset_timeout: Duration::from_secs(10),
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets how many consecutive failures open the circuit.
    ///
    /// Must be at least 1.
    ///
    /// Default: 3
    pub fn fail_threshold(mut self, threshold: usize) -> Self {
        self.fail_threshold = threshold;
        self
    }

    /// Sets how long the circuit stays open after its last failure before a
    /// trial call is allowed.
    ///
    /// Default: 10 seconds
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }

    /// Sets the name of this circuit breaker instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback for state transitions, called with `(from, to)`.
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState, CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CircuitBreakerEvent::StateTransition {
                from_state,
                to_state,
                ..
            } = event
            {
                f(*from_state, *to_state);
            }
        }));
        self
    }

    /// Registers a callback for calls rejected while the circuit is open.
    pub fn on_call_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, CircuitBreakerEvent::CallRejected { .. }) {
                f();
            }
        }));
        self
    }

    /// Registers a callback for recorded successes.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CircuitBreakerEvent::SuccessRecorded { state, .. } = event {
                f(*state);
            }
        }));
        self
    }

    /// Registers a callback for recorded failures, called with the state and
    /// the consecutive failure count after the failure.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(CircuitState, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CircuitBreakerEvent::FailureRecorded {
                state,
                consecutive_failures,
                ..
            } = event
            {
                f(*state, *consecutive_failures);
            }
        }));
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fail_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        Ok(())
    }

    /// Builds the configuration, panicking on invalid settings.
    ///
    /// # Panics
    ///
    /// Panics if `fail_threshold` is 0.
    pub fn build_config(self) -> CircuitBreakerConfig {
        if let Err(err) = self.validate() {
            panic!("invalid circuit breaker configuration: {}", err);
        }
        self.into_config()
    }

    fn into_config(self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            fail_threshold: self.fail_threshold,
            reset_timeout: self.reset_timeout,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds the circuit breaker, rejecting invalid settings.
    pub fn try_build(self) -> Result<CircuitBreaker, ConfigError> {
        self.validate()?;
        Ok(CircuitBreaker::from_config(self.into_config()))
    }

    /// Builds the circuit breaker.
    ///
    /// # Panics
    ///
    /// Panics if `fail_threshold` is 0. Use [`try_build`](Self::try_build)
    /// to handle the error instead.
    pub fn build(self) -> CircuitBreaker {
        CircuitBreaker::from_config(self.build_config())
    }
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
