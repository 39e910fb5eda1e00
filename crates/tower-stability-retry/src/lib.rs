//! Bounded retry with a fixed delay.
//!
//! [`Retry`] runs an operation up to `max_attempts` times, sleeping `delay`
//! between consecutive attempts. The first success is returned immediately.
//! If every attempt fails the result is
//! [`StabilityError::RetriesExhausted`] (status hint 429), which carries the
//! attempt count and the last failure as its `source()`.
//!
//! There is no backoff growth and no jitter; the delay is the same before
//! every retry and is never applied after the final attempt.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tower_stability_core::{StabilityError, StabilityPattern};
//! use tower_stability_retry::Retry;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let retry = Retry::builder()
//!     .max_attempts(3)
//!     .delay(Duration::from_millis(200))
//!     .name("ledger")
//!     .build();
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let c = Arc::clone(&calls);
//! let value = retry
//!     .run(move || {
//!         let c = Arc::clone(&c);
//!         async move {
//!             if c.fetch_add(1, Ordering::SeqCst) < 2 {
//!                 Err(StabilityError::operation("flaky"))
//!             } else {
//!                 Ok("posted")
//!             }
//!         }
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(value, "posted");
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! # }
//! ```

mod config;
mod events;
mod layer;

pub use config::{RetryConfig, RetryConfigBuilder, RetryPredicate};
pub use events::RetryEvent;
pub use layer::{RetryLayer, RetryService};

use futures::future::BoxFuture;
#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};
use std::future::Future;
use std::sync::Arc;
#[cfg(feature = "metrics")]
use std::sync::Once;
use std::time::{Duration, Instant};
use tower_stability_core::{StabilityError, StabilityPattern};

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Re-runs failed operations a bounded number of times.
#[derive(Clone)]
pub struct Retry {
    config: Arc<RetryConfig>,
}

impl Retry {
    /// Returns a builder with `max_attempts = 3` and `delay = 1s`.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Creates a retry with the given attempt budget and delay.
    ///
    /// # Panics
    ///
    /// Panics if `max_attempts` is 0.
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self::builder()
            .max_attempts(max_attempts)
            .delay(delay)
            .build()
    }

    pub(crate) fn from_config(config: RetryConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "retry_calls_total",
                "Total number of retried calls by final outcome"
            );
            describe_counter!(
                "retry_attempts_total",
                "Total number of retry attempts after the first"
            );
        });

        Self {
            config: Arc::new(config),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.config.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.config.delay
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}

impl Default for Retry {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for Retry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retry")
            .field("name", &self.config.name)
            .field("max_attempts", &self.config.max_attempts)
            .field("delay", &self.config.delay)
            .finish()
    }
}

impl<T: Send> StabilityPattern<T> for Retry {
    fn run<'a, F, Fut, Err>(&'a self, mut operation: F) -> BoxFuture<'a, Result<T, StabilityError>>
    where
        F: FnMut() -> Fut + Clone + Send + 'a,
        Fut: Future<Output = Result<T, Err>> + Send + 'a,
        Err: Into<StabilityError> + Send + 'a,
        T: 'a,
    {
        let config = &self.config;

        Box::pin(async move {
            let mut attempt = 0;

            loop {
                attempt += 1;
                let result = operation().await.map_err(Into::into);

                let error = match result {
                    Ok(value) => {
                        config.event_listeners.emit(&RetryEvent::Success {
                            pattern_name: config.name.clone(),
                            timestamp: Instant::now(),
                            attempts: attempt,
                        });

                        #[cfg(feature = "metrics")]
                        counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "success").increment(1);

                        return Ok(value);
                    }
                    Err(error) => error,
                };

                if !config.should_retry(&error) {
                    config.event_listeners.emit(&RetryEvent::IgnoredError {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts: attempt,
                    });

                    #[cfg(feature = "metrics")]
                    counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "ignored").increment(1);

                    #[cfg(feature = "tracing")]
                    tracing::debug!(retry = %config.name, attempt, error = %error, "Error not retryable");

                    return Err(error);
                }

                if attempt >= config.max_attempts {
                    config.event_listeners.emit(&RetryEvent::Exhausted {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts: attempt,
                    });

                    #[cfg(feature = "metrics")]
                    counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "exhausted").increment(1);

                    #[cfg(feature = "tracing")]
                    tracing::warn!(retry = %config.name, attempts = attempt, error = %error, "Retries exhausted");

                    return Err(StabilityError::RetriesExhausted {
                        name: config.name.clone(),
                        attempts: attempt,
                        last: Box::new(error),
                    });
                }

                let delay = config.delay;
                config.event_listeners.emit(&RetryEvent::Retry {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    attempt,
                    delay,
                });

                #[cfg(feature = "metrics")]
                counter!("retry_attempts_total", "retry" => config.name.clone()).increment(1);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    retry = %config.name,
                    attempt,
                    delay_ms = delay.as_millis(),
                    error = %error,
                    "Attempt failed, retrying"
                );

                tokio::time::sleep(delay).await;
            }
        })
    }
}
