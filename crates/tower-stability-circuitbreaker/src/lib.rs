//! A consecutive-failure circuit breaker.
//!
//! The breaker counts consecutive failures of the operations it runs. Once
//! `fail_threshold` failures have been seen it opens and rejects calls with
//! [`StabilityError::CircuitOpen`] (status hint 503) without invoking them.
//! After `reset_timeout` has strictly passed since the last failure, the next
//! call becomes a half-open trial: success closes the circuit, failure opens
//! it again with a fresh timestamp.
//!
//! ## States
//!
//! - **Closed**: calls run; success resets the failure count, failure
//!   increments it. Only *consecutive* failures open the circuit, so an
//!   isolated success between failures starts the count over.
//! - **Open**: calls are rejected until the reset timeout elapses.
//! - **HalfOpen**: exactly one trial call runs; concurrent callers are
//!   rejected until it finishes.
//!
//! Transitions are evaluated lazily when a call arrives; there is no
//! background timer. Every failure of the wrapped operation counts, including
//! errors raised by patterns nested inside the breaker such as `Timeout`.
//!
//! ## Sharing
//!
//! A [`CircuitBreaker`] is one breaker. Clones share the same state, so the
//! same instance can guard several call sites or services.
//!
//! Event listeners run after the breaker's internal lock is released, so a
//! listener may read [`CircuitBreaker::state`] or [`CircuitBreaker::health_status`]
//! of the breaker that invoked it.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use tower_stability_circuitbreaker::{CircuitBreaker, CircuitState};
//! use tower_stability_core::{StabilityError, StabilityPattern};
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let breaker = CircuitBreaker::builder()
//!     .name("payments")
//!     .fail_threshold(2)
//!     .reset_timeout(Duration::from_secs(30))
//!     .build();
//!
//! for _ in 0..2 {
//!     let _ = breaker
//!         .run(|| async { Err::<(), _>(StabilityError::operation("declined")) })
//!         .await;
//! }
//! assert_eq!(breaker.state(), CircuitState::Open);
//!
//! let err = breaker.run(|| async { Ok::<_, StabilityError>(()) }).await.unwrap_err();
//! assert!(err.is_circuit_open());
//! assert_eq!(breaker.http_status(), 503);
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `metrics`: emits `circuitbreaker_*` counters, gauges and histograms
//! - `tracing`: logs decisions and state transitions
//! - `serde`: derives `Serialize` for [`CircuitState`] and [`CircuitMetrics`]

use crate::circuit::{Admission, Circuit};
use futures::future::BoxFuture;
#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
#[cfg(feature = "metrics")]
use std::sync::Once;
use tower_stability_core::{StabilityError, StabilityPattern};
#[cfg(feature = "tracing")]
use tracing::debug;

pub use circuit::{CircuitMetrics, CircuitState};
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use events::CircuitBreakerEvent;
pub use layer::{CircuitBreakerLayer, CircuitBreakerService};

mod circuit;
mod config;
mod events;
mod layer;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// A circuit breaker shared by every clone.
#[derive(Clone)]
pub struct CircuitBreaker {
    circuit: Arc<Mutex<Circuit>>,
    state_atomic: Arc<AtomicU8>,
    config: Arc<CircuitBreakerConfig>,
}

impl CircuitBreaker {
    /// Returns a builder with `fail_threshold = 3` and `reset_timeout = 10s`.
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    pub(crate) fn from_config(config: CircuitBreakerConfig) -> Self {
        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_counter!(
                    "circuitbreaker_calls_total",
                    "Total number of calls through the circuit breaker"
                );
                describe_counter!(
                    "circuitbreaker_transitions_total",
                    "Total number of circuit breaker state transitions"
                );
                describe_gauge!(
                    "circuitbreaker_state",
                    "Current state of the circuit breaker"
                );
                describe_histogram!(
                    "circuitbreaker_call_duration_seconds",
                    "Duration of calls through the circuit breaker"
                );
            });
        }

        let state_atomic = Arc::new(AtomicU8::new(CircuitState::Closed as u8));
        Self {
            circuit: Arc::new(Mutex::new(Circuit::new_with_atomic(Arc::clone(
                &state_atomic,
            )))),
            state_atomic,
            config: Arc::new(config),
        }
    }

    /// Runs `f` under the circuit lock, then emits the events it recorded.
    fn with_circuit<R>(&self, f: impl FnOnce(&mut Circuit, &CircuitBreakerConfig) -> R) -> R {
        let (result, events) = {
            let mut circuit = self.circuit.lock().unwrap_or_else(PoisonError::into_inner);
            let result = f(&mut *circuit, &self.config);
            (result, circuit.take_events())
        };
        self.emit(&events);
        result
    }

    fn emit(&self, events: &[CircuitBreakerEvent]) {
        for event in events {
            self.config.event_listeners.emit(event);
        }
    }

    /// The breaker's configuration.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Returns the current state of the circuit.
    ///
    /// An open circuit whose reset timeout has passed still reports `Open`
    /// until the next call arrives.
    pub fn state(&self) -> CircuitState {
        CircuitState::from_u8(self.state_atomic.load(Ordering::Acquire))
    }

    /// Returns whether the circuit is currently open.
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    /// Returns a snapshot of the breaker's counters.
    pub fn metrics(&self) -> CircuitMetrics {
        self.with_circuit(|circuit, _| circuit.metrics())
    }

    /// Forces the circuit open as if it had just failed.
    pub fn force_open(&self) {
        self.with_circuit(Circuit::force_open);
    }

    /// Forces the circuit closed without clearing the failure count.
    pub fn force_closed(&self) {
        self.with_circuit(Circuit::force_closed);
    }

    /// Closes the circuit and clears all failure history.
    pub fn reset(&self) {
        self.with_circuit(Circuit::reset);
    }

    /// Returns an HTTP status code based on circuit state.
    ///
    /// - Closed: 200 (OK)
    /// - HalfOpen: 200 (OK), a trial is being admitted
    /// - Open: 503 (Service Unavailable)
    pub fn http_status(&self) -> u16 {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => 200,
            CircuitState::Open => 503,
        }
    }

    /// Returns "healthy", "degraded" or "unhealthy" for Closed, HalfOpen
    /// and Open.
    pub fn health_status(&self) -> &'static str {
        match self.state() {
            CircuitState::Closed => "healthy",
            CircuitState::HalfOpen => "degraded",
            CircuitState::Open => "unhealthy",
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.config.name)
            .field("state", &self.state())
            .finish()
    }
}

/// Releases a half-open trial slot if the trial call is dropped before it
/// completes.
struct TrialPermit<'a> {
    circuit: &'a Mutex<Circuit>,
    armed: bool,
}

impl TrialPermit<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TrialPermit<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.circuit
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .release_trial();
        }
    }
}

impl<T: Send> StabilityPattern<T> for CircuitBreaker {
    fn run<'a, F, Fut, Err>(&'a self, mut operation: F) -> BoxFuture<'a, Result<T, StabilityError>>
    where
        F: FnMut() -> Fut + Clone + Send + 'a,
        Fut: Future<Output = Result<T, Err>> + Send + 'a,
        Err: Into<StabilityError> + Send + 'a,
        T: 'a,
    {
        Box::pin(async move {
            let config = &self.config;

            #[cfg(feature = "tracing")]
            debug!(
                circuitbreaker = %config.name,
                "Checking if call is permitted by circuit breaker"
            );

            let admission = self.with_circuit(Circuit::try_acquire);

            let trial = match admission {
                Admission::Permitted { trial } => trial,
                Admission::Rejected => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(
                        circuitbreaker = %config.name,
                        "circuit breaker rejected call (circuit open)"
                    );

                    #[cfg(feature = "metrics")]
                    counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "rejected").increment(1);

                    return Err(StabilityError::CircuitOpen {
                        name: config.name.clone(),
                    });
                }
            };

            #[cfg(feature = "tracing")]
            tracing::trace!(
                circuitbreaker = %config.name,
                trial,
                "circuit breaker permitted call"
            );

            let permit = TrialPermit {
                circuit: &self.circuit,
                armed: trial,
            };

            #[cfg(feature = "metrics")]
            let start = tokio::time::Instant::now();

            let result = operation().await.map_err(Into::into);
            permit.disarm();

            #[cfg(feature = "metrics")]
            {
                let outcome = if result.is_ok() { "success" } else { "failure" };
                counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => outcome).increment(1);
                histogram!("circuitbreaker_call_duration_seconds", "circuitbreaker" => config.name.clone())
                    .record(start.elapsed().as_secs_f64());
            }

            self.with_circuit(|circuit, config| match &result {
                Ok(_) => circuit.record_success(config, trial),
                Err(_) => circuit.record_failure(config, trial),
            });

            result
        })
    }
}
