use crate::events::ThrottleEvent;
use crate::Throttle;
use std::time::Duration;
use tower_stability_core::{ConfigError, EventListeners, FnListener};

/// Configuration for the throttle pattern.
pub struct ThrottleConfig {
    pub(crate) min_interval: Duration,
    pub(crate) event_listeners: EventListeners<ThrottleEvent>,
    pub(crate) name: String,
}

impl ThrottleConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ThrottleConfigBuilder {
        ThrottleConfigBuilder::new()
    }
}

#[derive(Debug, Clone, Copy)]
enum Rate {
    PerSecond(f64),
    Interval(Duration),
}

/// Builder for a [`Throttle`].
pub struct ThrottleConfigBuilder {
    rate: Rate,
    event_listeners: EventListeners<ThrottleEvent>,
    name: String,
}

impl ThrottleConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            rate: Rate::PerSecond(1000.0),
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets the admitted call rate. The minimum interval between calls is
    /// `1 / calls_per_second` seconds.
    ///
    /// Must be positive and finite.
    ///
    /// Default: 1000
    pub fn calls_per_second(mut self, calls_per_second: f64) -> Self {
        self.rate = Rate::PerSecond(calls_per_second);
        self
    }

    /// Sets the minimum interval between admitted calls directly.
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.rate = Rate::Interval(interval);
        self
    }

    /// Sets the name of this throttle instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Called when a call is admitted.
    pub fn on_admitted<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, ThrottleEvent::Admitted { .. }) {
                f();
            }
        }));
        self
    }

    /// Called with the remaining wait when a call is rejected.
    pub fn on_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let ThrottleEvent::Rejected { wait, .. } = event {
                f(*wait);
            }
        }));
        self
    }

    fn min_interval_checked(&self) -> Result<Duration, ConfigError> {
        match self.rate {
            Rate::Interval(interval) => Ok(interval),
            Rate::PerSecond(cps) if cps.is_finite() && cps > 0.0 => {
                Duration::try_from_secs_f64(1.0 / cps).map_err(|_| ConfigError::InvalidRate(cps))
            }
            Rate::PerSecond(cps) => Err(ConfigError::InvalidRate(cps)),
        }
    }

    /// Builds the throttle, rejecting invalid rates.
    pub fn try_build(self) -> Result<Throttle, ConfigError> {
        let min_interval = self.min_interval_checked()?;
        Ok(Throttle::from_config(ThrottleConfig {
            min_interval,
            event_listeners: self.event_listeners,
            name: self.name,
        }))
    }

    /// Builds the throttle.
    ///
    /// # Panics
    ///
    /// Panics if `calls_per_second` is not positive and finite.
    pub fn build(self) -> Throttle {
        match self.try_build() {
            Ok(throttle) => throttle,
            Err(err) => panic!("invalid throttle configuration: {}", err),
        }
    }
}

impl Default for ThrottleConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
