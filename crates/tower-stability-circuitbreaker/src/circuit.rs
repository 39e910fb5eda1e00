use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
#[cfg(feature = "metrics")]
use metrics::{counter, gauge};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Represents the state of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CircuitState {
    /// Calls are allowed and consecutive failures are counted.
    Closed,
    /// Calls are rejected until the reset timeout has passed.
    Open,
    /// One trial call is allowed to probe the dependency.
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "Closed",
            CircuitState::Open => "Open",
            CircuitState::HalfOpen => "HalfOpen",
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a circuit breaker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CircuitMetrics {
    /// Current state.
    pub state: CircuitState,
    /// Failures recorded since the last success.
    pub consecutive_failures: usize,
    /// Whether a half-open trial call is running.
    pub trial_in_flight: bool,
    /// Time since the last state transition.
    pub time_since_state_change: Duration,
    /// Time since the circuit last opened, if it ever has.
    pub time_since_last_failure: Option<Duration>,
}

/// Outcome of asking the circuit for permission to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Invoke the operation. `trial` marks the single half-open probe.
    ///
    /// A non-trial call admitted while Closed may still be running when the
    /// circuit opens and moves to HalfOpen. If it then succeeds it closes the
    /// circuit on its own, and the slot held by the running trial is only
    /// released when that trial finishes.
    Permitted { trial: bool },
    Rejected,
}

pub(crate) struct Circuit {
    state: CircuitState,
    consecutive_failures: usize,
    last_failure_time: Option<Instant>,
    last_state_change: Instant,
    trial_in_flight: bool,
    state_atomic: Arc<AtomicU8>,
    // Emitted by the breaker once the lock is released.
    pending: Vec<CircuitBreakerEvent>,
}

impl Circuit {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::new_with_atomic(Arc::new(AtomicU8::new(CircuitState::Closed as u8)))
    }

    /// Creates a closed circuit that mirrors its state into `state_atomic`.
    pub(crate) fn new_with_atomic(state_atomic: Arc<AtomicU8>) -> Self {
        state_atomic.store(CircuitState::Closed as u8, Ordering::Release);
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_failure_time: None,
            last_state_change: Instant::now(),
            trial_in_flight: false,
            state_atomic,
            pending: Vec::new(),
        }
    }

    /// Drains the events recorded since the last call.
    pub(crate) fn take_events(&mut self) -> Vec<CircuitBreakerEvent> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }

    pub(crate) fn metrics(&self) -> CircuitMetrics {
        CircuitMetrics {
            state: self.state,
            consecutive_failures: self.consecutive_failures,
            trial_in_flight: self.trial_in_flight,
            time_since_state_change: self.last_state_change.elapsed(),
            time_since_last_failure: self.last_failure_time.map(|t| t.elapsed()),
        }
    }

    /// Decides whether a call may proceed, moving Open to HalfOpen once the
    /// reset timeout has strictly passed.
    pub(crate) fn try_acquire(&mut self, config: &CircuitBreakerConfig) -> Admission {
        let admission = match self.state {
            CircuitState::Closed => Admission::Permitted { trial: false },
            CircuitState::Open => {
                let cooled_down = self
                    .last_failure_time
                    .map(|t| t.elapsed() > config.reset_timeout)
                    .unwrap_or(true);

                if cooled_down {
                    self.transition_to(CircuitState::HalfOpen, config);
                    self.trial_in_flight = true;
                    Admission::Permitted { trial: true }
                } else {
                    Admission::Rejected
                }
            }
            CircuitState::HalfOpen => {
                if self.trial_in_flight {
                    Admission::Rejected
                } else {
                    self.trial_in_flight = true;
                    Admission::Permitted { trial: true }
                }
            }
        };

        match admission {
            Admission::Permitted { .. } => {
                self.pending.push(CircuitBreakerEvent::CallPermitted {
                    pattern_name: config.name.clone(),
                    timestamp: std::time::Instant::now(),
                    state: self.state,
                });
            }
            Admission::Rejected => {
                self.pending.push(CircuitBreakerEvent::CallRejected {
                    pattern_name: config.name.clone(),
                    timestamp: std::time::Instant::now(),
                });
            }
        }

        admission
    }

    pub(crate) fn record_success(&mut self, config: &CircuitBreakerConfig, trial: bool) {
        if trial {
            self.trial_in_flight = false;
        }
        self.consecutive_failures = 0;

        self.pending.push(CircuitBreakerEvent::SuccessRecorded {
            pattern_name: config.name.clone(),
            timestamp: std::time::Instant::now(),
            state: self.state,
        });

        if self.state == CircuitState::HalfOpen {
            self.transition_to(CircuitState::Closed, config);
        }
    }

    pub(crate) fn record_failure(&mut self, config: &CircuitBreakerConfig, trial: bool) {
        if trial {
            self.trial_in_flight = false;
        }
        self.consecutive_failures += 1;

        self.pending.push(CircuitBreakerEvent::FailureRecorded {
            pattern_name: config.name.clone(),
            timestamp: std::time::Instant::now(),
            state: self.state,
            consecutive_failures: self.consecutive_failures,
        });

        if self.consecutive_failures >= config.fail_threshold {
            self.last_failure_time = Some(Instant::now());
            self.transition_to(CircuitState::Open, config);
        }
    }

    /// Gives back a trial slot whose call never completed.
    pub(crate) fn release_trial(&mut self) {
        self.trial_in_flight = false;
    }

    pub(crate) fn force_open(&mut self, config: &CircuitBreakerConfig) {
        self.last_failure_time = Some(Instant::now());
        self.trial_in_flight = false;
        self.transition_to(CircuitState::Open, config);
    }

    pub(crate) fn force_closed(&mut self, config: &CircuitBreakerConfig) {
        self.trial_in_flight = false;
        self.transition_to(CircuitState::Closed, config);
    }

    pub(crate) fn reset(&mut self, config: &CircuitBreakerConfig) {
        self.consecutive_failures = 0;
        self.last_failure_time = None;
        self.trial_in_flight = false;
        self.transition_to(CircuitState::Closed, config);
    }

    fn transition_to(&mut self, state: CircuitState, config: &CircuitBreakerConfig) {
        if self.state == state {
            return;
        }

        let from_state = self.state;

        self.pending.push(CircuitBreakerEvent::StateTransition {
            pattern_name: config.name.clone(),
            timestamp: std::time::Instant::now(),
            from_state,
            to_state: state,
        });

        #[cfg(feature = "tracing")]
        tracing::info!(
            circuitbreaker = %config.name,
            from = %from_state,
            to = %state,
            consecutive_failures = self.consecutive_failures,
            "Circuit state transition"
        );

        #[cfg(feature = "metrics")]
        {
            counter!(
                "circuitbreaker_transitions_total",
                "circuitbreaker" => config.name.clone(),
                "from" => from_state.as_str(),
                "to" => state.as_str()
            )
            .increment(1);

            gauge!("circuitbreaker_state", "circuitbreaker" => config.name.clone(), "state" => from_state.as_str())
                .set(0.0);
            gauge!("circuitbreaker_state", "circuitbreaker" => config.name.clone(), "state" => state.as_str())
                .set(1.0);
        }

        self.state = state;
        self.state_atomic.store(state as u8, Ordering::Release);
        self.last_state_change = Instant::now();
    }
}
