//! Fallback to an alternative operation.
//!
//! A [`Fallback`] runs the primary operation once. If it fails, the
//! configured alternative runs instead and its outcome, success or failure,
//! becomes the result. The primary error is discarded once the alternative
//! has been engaged.
//!
//! A handle predicate narrows which failures engage the alternative; other
//! failures are returned unchanged.
//!
//! # Example
//!
//! ```
//! use tower_stability_core::{StabilityError, StabilityPattern};
//! use tower_stability_fallback::Fallback;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let fallback = Fallback::value("cached");
//!
//! let result = fallback
//!     .run(|| async { Err::<&str, _>(StabilityError::operation("backend down")) })
//!     .await;
//!
//! assert_eq!(result.unwrap(), "cached");
//! # }
//! ```

use futures::future::BoxFuture;
#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};
use std::future::Future;
use std::sync::Arc;
#[cfg(feature = "metrics")]
use std::sync::Once;
use std::time::Instant;
use tower_stability_core::{StabilityError, StabilityPattern};

pub use config::{AlternativeFn, FallbackConfig, FallbackConfigBuilder, HandlePredicate};
pub use events::FallbackEvent;
pub use layer::{FallbackLayer, FallbackService};

mod config;
mod events;
mod layer;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Substitutes the result of an alternative operation when the primary fails.
pub struct Fallback<T> {
    config: Arc<FallbackConfig<T>>,
}

impl<T: Send + 'static> Fallback<T> {
    /// Returns a builder around `alternative`.
    pub fn builder<F, Fut, Err>(alternative: F) -> FallbackConfigBuilder<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Err>> + Send + 'static,
        Err: Into<StabilityError> + 'static,
    {
        FallbackConfigBuilder::new(alternative)
    }

    /// Creates a fallback invoking `alternative` on every failure.
    pub fn new<F, Fut, Err>(alternative: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Err>> + Send + 'static,
        Err: Into<StabilityError> + 'static,
    {
        Self::builder(alternative).build()
    }

    /// Creates a fallback returning a clone of `value` on every failure.
    pub fn value(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::new(move || {
            let value = value.clone();
            async move { Ok::<_, StabilityError>(value) }
        })
    }
}

impl<T> Fallback<T> {
    pub(crate) fn from_config(config: FallbackConfig<T>) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "fallback_calls_total",
                "Total number of calls through a fallback, by outcome"
            );
        });

        Self {
            config: Arc::new(config),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}

impl<T> Clone for Fallback<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<T> std::fmt::Debug for Fallback<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fallback")
            .field("name", &self.config.name)
            .field("filtered", &self.config.handle_predicate.is_some())
            .finish()
    }
}

impl<T: Send + 'static> StabilityPattern<T> for Fallback<T> {
    fn run<'a, F, Fut, Err>(&'a self, mut operation: F) -> BoxFuture<'a, Result<T, StabilityError>>
    where
        F: FnMut() -> Fut + Clone + Send + 'a,
        Fut: Future<Output = Result<T, Err>> + Send + 'a,
        Err: Into<StabilityError> + Send + 'a,
        T: 'a,
    {
        Box::pin(async move {
            let config = &self.config;

            let error = match operation().await.map_err(Into::into) {
                Ok(value) => {
                    config.event_listeners.emit(&FallbackEvent::Success {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                    });

                    #[cfg(feature = "metrics")]
                    counter!("fallback_calls_total", "fallback" => config.name.clone(), "result" => "success").increment(1);

                    return Ok(value);
                }
                Err(error) => error,
            };

            if !config.should_handle(&error) {
                config.event_listeners.emit(&FallbackEvent::Skipped {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                });

                #[cfg(feature = "metrics")]
                counter!("fallback_calls_total", "fallback" => config.name.clone(), "result" => "skipped").increment(1);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    fallback = %config.name,
                    error = %error,
                    "Failure not handled by fallback, propagating"
                );

                return Err(error);
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(
                fallback = %config.name,
                error = %error,
                "Primary operation failed, invoking alternative"
            );

            match (config.alternative)().await {
                Ok(value) => {
                    config.event_listeners.emit(&FallbackEvent::Applied {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                    });

                    #[cfg(feature = "metrics")]
                    counter!("fallback_calls_total", "fallback" => config.name.clone(), "result" => "applied").increment(1);

                    Ok(value)
                }
                Err(alternative_error) => {
                    config.event_listeners.emit(&FallbackEvent::AlternativeFailed {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                    });

                    #[cfg(feature = "metrics")]
                    counter!("fallback_calls_total", "fallback" => config.name.clone(), "result" => "failed").increment(1);

                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        fallback = %config.name,
                        error = %alternative_error,
                        "Alternative operation failed"
                    );

                    Err(alternative_error)
                }
            }
        })
    }
}
