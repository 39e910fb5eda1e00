//! Events emitted by the timeout pattern.

use std::time::{Duration, Instant};
use tower_stability_core::PatternEvent;

/// Events emitted by [`Timeout`](crate::Timeout).
#[derive(Debug, Clone)]
pub enum TimeoutEvent {
    /// The operation succeeded within the bound.
    Success {
        pattern_name: String,
        timestamp: Instant,
        duration: Duration,
    },
    /// The operation failed within the bound.
    Error {
        pattern_name: String,
        timestamp: Instant,
        duration: Duration,
    },
    /// The bound elapsed first and the operation was dropped.
    Timeout {
        pattern_name: String,
        timestamp: Instant,
        timeout: Duration,
    },
}

impl PatternEvent for TimeoutEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TimeoutEvent::Success { .. } => "success",
            TimeoutEvent::Error { .. } => "error",
            TimeoutEvent::Timeout { .. } => "timeout",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            TimeoutEvent::Success { timestamp, .. }
            | TimeoutEvent::Error { timestamp, .. }
            | TimeoutEvent::Timeout { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            TimeoutEvent::Success { pattern_name, .. }
            | TimeoutEvent::Error { pattern_name, .. }
            | TimeoutEvent::Timeout { pattern_name, .. } => pattern_name,
        }
    }
}
