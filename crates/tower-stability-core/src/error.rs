//! Error taxonomy shared by every stability pattern.
//!
//! Every pattern either returns the wrapped operation's result unchanged or
//! fails with a [`StabilityError`]. The operation's own failures are never
//! leaked with their raw type; they travel inside
//! [`StabilityError::Operation`], the generic kind of the taxonomy.
//!
//! | kind | status hint | raised by |
//! |---|---|---|
//! | [`ErrorKind::Timeout`] | 504 | timeout |
//! | [`ErrorKind::CircuitOpen`] | 503 | circuit breaker |
//! | [`ErrorKind::RetriesExhausted`] | 429 | retry |
//! | [`ErrorKind::Throttled`] | 429 | throttle |
//! | [`ErrorKind::Generic`] | caller-defined | the wrapped operation |
//!
//! # Example
//!
//! ```
//! use tower_stability_core::{ErrorKind, StabilityError};
//! use std::time::Duration;
//!
//! let err = StabilityError::Timeout {
//!     name: "billing".to_string(),
//!     timeout: Duration::from_secs(2),
//! };
//! assert_eq!(err.kind(), ErrorKind::Timeout);
//! assert_eq!(err.http_status(), Some(504));
//!
//! let err = StabilityError::operation("connection reset");
//! assert_eq!(err.kind(), ErrorKind::Generic);
//! assert_eq!(err.http_status(), None);
//! ```

use std::error::Error;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tower::BoxError;

/// The closed set of failure kinds a pattern can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation did not complete within its time bound.
    Timeout,
    /// A circuit breaker rejected the call.
    CircuitOpen,
    /// Every retry attempt failed.
    RetriesExhausted,
    /// The call arrived before the throttle's minimum interval elapsed.
    Throttled,
    /// Any other failure of the wrapped operation.
    Generic,
}

impl ErrorKind {
    /// Transport status conventionally associated with this kind.
    ///
    /// `Generic` has no fixed status.
    pub fn http_status(self) -> Option<u16> {
        match self {
            ErrorKind::Timeout => Some(504),
            ErrorKind::CircuitOpen => Some(503),
            ErrorKind::RetriesExhausted | ErrorKind::Throttled => Some(429),
            ErrorKind::Generic => None,
        }
    }

    /// Stable name of the kind, suitable for log fields and response details.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "Timeout",
            ErrorKind::CircuitOpen => "CircuitOpen",
            ErrorKind::RetriesExhausted => "RetriesExhausted",
            ErrorKind::Throttled => "Throttled",
            ErrorKind::Generic => "Generic",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by a stability pattern.
///
/// Created at the point a pattern detects its failure condition and never
/// mutated afterwards.
#[derive(Debug)]
pub enum StabilityError {
    /// The operation did not finish within `timeout`.
    Timeout {
        /// Name of the timeout instance.
        name: String,
        /// The bound that elapsed.
        timeout: Duration,
    },

    /// The circuit breaker is open and did not invoke the operation.
    CircuitOpen {
        /// Name of the circuit breaker instance.
        name: String,
    },

    /// All attempts failed.
    RetriesExhausted {
        /// Name of the retry instance.
        name: String,
        /// How many attempts were made.
        attempts: usize,
        /// The failure of the final attempt.
        last: Box<StabilityError>,
    },

    /// The call was rejected by a throttle.
    Throttled {
        /// Name of the throttle instance.
        name: String,
        /// Minimum spacing between admitted calls.
        min_interval: Duration,
    },

    /// The wrapped operation itself failed.
    Operation {
        /// The operation's error.
        source: BoxError,
        /// Optional caller-defined transport status.
        status: Option<u16>,
    },
}

impl StabilityError {
    /// Wraps an operation failure in the generic kind.
    pub fn operation(error: impl Into<BoxError>) -> Self {
        StabilityError::Operation {
            source: error.into(),
            status: None,
        }
    }

    /// Wraps an operation failure and attaches a transport status to it.
    pub fn operation_with_status(error: impl Into<BoxError>, status: u16) -> Self {
        StabilityError::Operation {
            source: error.into(),
            status: Some(status),
        }
    }

    /// Returns the kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StabilityError::Timeout { .. } => ErrorKind::Timeout,
            StabilityError::CircuitOpen { .. } => ErrorKind::CircuitOpen,
            StabilityError::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
            StabilityError::Throttled { .. } => ErrorKind::Throttled,
            StabilityError::Operation { .. } => ErrorKind::Generic,
        }
    }

    /// Transport status hint for this failure.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            StabilityError::Operation { status, .. } => *status,
            other => other.kind().http_status(),
        }
    }

    /// Human readable message, identical to the `Display` output.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns `true` for [`ErrorKind::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, StabilityError::Timeout { .. })
    }

    /// Returns `true` for [`ErrorKind::CircuitOpen`].
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, StabilityError::CircuitOpen { .. })
    }

    /// Returns `true` for [`ErrorKind::RetriesExhausted`].
    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, StabilityError::RetriesExhausted { .. })
    }

    /// Returns `true` for [`ErrorKind::Throttled`].
    pub fn is_throttled(&self) -> bool {
        matches!(self, StabilityError::Throttled { .. })
    }

    /// Returns `true` if the wrapped operation produced this failure.
    pub fn is_operation(&self) -> bool {
        matches!(self, StabilityError::Operation { .. })
    }

    /// The failure of the final attempt, for `RetriesExhausted`.
    pub fn last_failure(&self) -> Option<&StabilityError> {
        match self {
            StabilityError::RetriesExhausted { last, .. } => Some(last),
            _ => None,
        }
    }

    /// Follows `RetriesExhausted` chains down to the failure that started them.
    pub fn root_cause(&self) -> &StabilityError {
        let mut current = self;
        while let StabilityError::RetriesExhausted { last, .. } = current {
            current = last;
        }
        current
    }

    /// Downcasts the operation error at the root of this failure.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        match self.root_cause() {
            StabilityError::Operation { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl fmt::Display for StabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StabilityError::Timeout { name, timeout } => {
                write!(f, "call through '{}' timed out after {:?}", name, timeout)
            }
            StabilityError::CircuitOpen { name } => {
                write!(f, "circuit breaker '{}' is open", name)
            }
            StabilityError::RetriesExhausted { name, attempts, .. } => write!(
                f,
                "maximum number of attempts exceeded in '{}': {}",
                name, attempts
            ),
            StabilityError::Throttled { name, min_interval } => write!(
                f,
                "call rate limit exceeded in '{}': minimum interval is {:?}",
                name, min_interval
            ),
            StabilityError::Operation { source, .. } => fmt::Display::fmt(source, f),
        }
    }
}

impl Error for StabilityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StabilityError::RetriesExhausted { last, .. } => Some(last.as_ref()),
            StabilityError::Operation { source, .. } => source.source(),
            _ => None,
        }
    }
}

impl From<BoxError> for StabilityError {
    fn from(error: BoxError) -> Self {
        StabilityError::operation(error)
    }
}

/// Rejected builder configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A retry needs at least one attempt.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    /// A circuit breaker needs at least one failure to open.
    #[error("fail_threshold must be at least 1")]
    ZeroThreshold,

    /// Throttle rates must be positive and finite.
    #[error("calls_per_second must be positive and finite, got {0}")]
    InvalidRate(f64),
}
