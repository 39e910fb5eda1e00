//! Timeout enforcement for async operations.
//!
//! [`Timeout`] races an operation against a fixed bound. If the operation
//! finishes first its result is returned unchanged; if the bound elapses
//! first the operation future is dropped and
//! [`StabilityError::Timeout`](tower_stability_core::StabilityError::Timeout)
//! (status hint 504) is returned.
//!
//! Cancellation is drop-based: work the operation has already handed off
//! elsewhere (a spawned task, a request already on the wire) is not undone.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tower_stability_core::{StabilityError, StabilityPattern};
//! use tower_stability_timeout::Timeout;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let timeout = Timeout::builder()
//!     .bound(Duration::from_millis(50))
//!     .name("inventory")
//!     .build();
//!
//! let result = timeout
//!     .run(|| async {
//!         tokio::time::sleep(Duration::from_secs(1)).await;
//!         Ok::<_, StabilityError>("late")
//!     })
//!     .await;
//!
//! assert_eq!(result.unwrap_err().http_status(), Some(504));
//! # }
//! ```
//!
//! # Tower
//!
//! ```
//! use std::time::Duration;
//! use tower::{service_fn, Layer, ServiceExt};
//! use tower_stability_timeout::Timeout;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let layer = Timeout::new(Duration::from_secs(5)).into_layer();
//! let svc = layer.layer(service_fn(|n: u8| async move { Ok::<_, tower::BoxError>(n) }));
//! assert_eq!(svc.oneshot(3).await.unwrap(), 3);
//! # }
//! ```

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_stability_core::{StabilityError, StabilityPattern};

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_histogram, histogram};

#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

pub use config::{TimeoutConfig, TimeoutConfigBuilder};
pub use events::TimeoutEvent;
pub use layer::{TimeoutLayer, TimeoutService};

mod config;
mod events;
mod layer;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Bounds the execution time of operations.
///
/// Stateless between calls; clones share their configuration.
#[derive(Clone)]
pub struct Timeout {
    config: Arc<TimeoutConfig>,
}

impl Timeout {
    /// Creates a builder with a 10 second default bound.
    pub fn builder() -> TimeoutConfigBuilder {
        TimeoutConfigBuilder::new()
    }

    /// Creates a timeout with the given bound and default settings otherwise.
    pub fn new(bound: Duration) -> Self {
        Self::builder().bound(bound).build()
    }

    pub(crate) fn from_config(config: TimeoutConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "timeout_calls_total",
                "Total number of calls through a timeout (success, error, or timeout)"
            );
            describe_histogram!(
                "timeout_call_duration_seconds",
                "Duration of calls that completed within the bound"
            );
        });

        Self {
            config: Arc::new(config),
        }
    }

    /// The configured bound.
    pub fn bound(&self) -> Duration {
        self.config.bound
    }

    /// The instance name.
    pub fn name(&self) -> &str {
        &self.config.name
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for Timeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeout")
            .field("name", &self.config.name)
            .field("bound", &self.config.bound)
            .finish()
    }
}

impl<T: Send> StabilityPattern<T> for Timeout {
    fn run<'a, F, Fut, Err>(&'a self, mut operation: F) -> BoxFuture<'a, Result<T, StabilityError>>
    where
        F: FnMut() -> Fut + Clone + Send + 'a,
        Fut: Future<Output = Result<T, Err>> + Send + 'a,
        Err: Into<StabilityError> + Send + 'a,
        T: 'a,
    {
        let config = &self.config;

        Box::pin(async move {
            let bound = config.bound;
            let start = tokio::time::Instant::now();

            // A zero bound polls the operation exactly once.
            let outcome = if bound.is_zero() {
                operation().now_or_never().ok_or(())
            } else {
                tokio::time::timeout(bound, operation()).await.map_err(|_| ())
            };

            match outcome {
                Ok(Ok(value)) => {
                    let duration = start.elapsed();
                    config.event_listeners.emit(&TimeoutEvent::Success {
                        pattern_name: config.name.clone(),
                        timestamp: std::time::Instant::now(),
                        duration,
                    });

                    #[cfg(feature = "metrics")]
                    {
                        counter!("timeout_calls_total", "timeout" => config.name.clone(), "result" => "success").increment(1);
                        histogram!("timeout_call_duration_seconds", "timeout" => config.name.clone())
                            .record(duration.as_secs_f64());
                    }

                    #[cfg(feature = "tracing")]
                    debug!(
                        timeout = %config.name,
                        duration_ms = duration.as_millis(),
                        "Call succeeded within bound"
                    );

                    Ok(value)
                }
                Ok(Err(err)) => {
                    let duration = start.elapsed();
                    config.event_listeners.emit(&TimeoutEvent::Error {
                        pattern_name: config.name.clone(),
                        timestamp: std::time::Instant::now(),
                        duration,
                    });

                    #[cfg(feature = "metrics")]
                    {
                        counter!("timeout_calls_total", "timeout" => config.name.clone(), "result" => "error").increment(1);
                        histogram!("timeout_call_duration_seconds", "timeout" => config.name.clone())
                            .record(duration.as_secs_f64());
                    }

                    #[cfg(feature = "tracing")]
                    debug!(
                        timeout = %config.name,
                        duration_ms = duration.as_millis(),
                        "Call failed within bound"
                    );

                    Err(err.into())
                }
                Err(()) => {
                    config.event_listeners.emit(&TimeoutEvent::Timeout {
                        pattern_name: config.name.clone(),
                        timestamp: std::time::Instant::now(),
                        timeout: bound,
                    });

                    #[cfg(feature = "metrics")]
                    counter!("timeout_calls_total", "timeout" => config.name.clone(), "result" => "timeout").increment(1);

                    #[cfg(feature = "tracing")]
                    warn!(
                        timeout = %config.name,
                        timeout_ms = bound.as_millis(),
                        "Call timed out"
                    );

                    Err(StabilityError::Timeout {
                        name: config.name.clone(),
                        timeout: bound,
                    })
                }
            }
        })
    }
}
