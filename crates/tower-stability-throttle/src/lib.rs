//! Minimum-interval call throttling.
//!
//! A [`Throttle`] admits a call only if at least `1 / calls_per_second` has
//! passed since the previously admitted call. Calls arriving sooner fail
//! immediately with [`StabilityError::Throttled`] (status hint 429); they are
//! not queued or delayed and they do not push the window forward.
//!
//! The interval is measured between call starts, so a slow operation does not
//! hold back the next caller.
//!
//! # Example
//!
//! ```
//! use tower_stability_core::{StabilityError, StabilityPattern};
//! use tower_stability_throttle::Throttle;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let throttle = Throttle::builder().calls_per_second(2.0).name("search").build();
//!
//! let first = throttle.run(|| async { Ok::<_, StabilityError>(1) }).await;
//! let second = throttle.run(|| async { Ok::<_, StabilityError>(2) }).await;
//!
//! assert_eq!(first.unwrap(), 1);
//! assert!(second.unwrap_err().is_throttled());
//! # }
//! ```

use futures::future::BoxFuture;
#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
#[cfg(feature = "metrics")]
use std::sync::Once;
use std::time::{Duration, Instant};
use tower_stability_core::{StabilityError, StabilityPattern};

pub use config::{ThrottleConfig, ThrottleConfigBuilder};
pub use events::ThrottleEvent;
pub use layer::{ThrottleLayer, ThrottleService};

mod config;
mod events;
mod layer;
mod limiter;

use limiter::ThrottleState;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Rejects calls that arrive faster than the configured rate.
///
/// Clones share admission state.
#[derive(Clone)]
pub struct Throttle {
    state: Arc<Mutex<ThrottleState>>,
    config: Arc<ThrottleConfig>,
}

impl Throttle {
    /// Returns a builder with a default rate of 1000 calls per second.
    pub fn builder() -> ThrottleConfigBuilder {
        ThrottleConfigBuilder::new()
    }

    /// Creates a throttle admitting `calls_per_second`.
    ///
    /// # Panics
    ///
    /// Panics if the rate is not positive and finite.
    pub fn per_second(calls_per_second: f64) -> Self {
        Self::builder().calls_per_second(calls_per_second).build()
    }

    pub(crate) fn from_config(config: ThrottleConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "throttle_calls_total",
                "Total number of calls through a throttle (admitted or rejected)"
            );
        });

        Self {
            state: Arc::new(Mutex::new(ThrottleState::new(config.min_interval))),
            config: Arc::new(config),
        }
    }

    /// The minimum spacing between admitted calls.
    pub fn min_interval(&self) -> Duration {
        self.config.min_interval
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    fn try_admit(&self) -> Result<(), Duration> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_admit()
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("name", &self.config.name)
            .field("min_interval", &self.config.min_interval)
            .finish()
    }
}

impl<T: Send> StabilityPattern<T> for Throttle {
    fn run<'a, F, Fut, Err>(&'a self, mut operation: F) -> BoxFuture<'a, Result<T, StabilityError>>
    where
        F: FnMut() -> Fut + Clone + Send + 'a,
        Fut: Future<Output = Result<T, Err>> + Send + 'a,
        Err: Into<StabilityError> + Send + 'a,
        T: 'a,
    {
        Box::pin(async move {
            let config = &self.config;

            if let Err(wait) = self.try_admit() {
                config.event_listeners.emit(&ThrottleEvent::Rejected {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    wait,
                });

                #[cfg(feature = "metrics")]
                counter!("throttle_calls_total", "throttle" => config.name.clone(), "result" => "rejected").increment(1);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    throttle = %config.name,
                    wait_us = wait.as_micros(),
                    "Call rejected by throttle"
                );

                return Err(StabilityError::Throttled {
                    name: config.name.clone(),
                    min_interval: config.min_interval,
                });
            }

            config.event_listeners.emit(&ThrottleEvent::Admitted {
                pattern_name: config.name.clone(),
                timestamp: Instant::now(),
            });

            #[cfg(feature = "metrics")]
            counter!("throttle_calls_total", "throttle" => config.name.clone(), "result" => "admitted").increment(1);

            #[cfg(feature = "tracing")]
            tracing::trace!(throttle = %config.name, "Call admitted by throttle");

            operation().await.map_err(Into::into)
        })
    }
}
