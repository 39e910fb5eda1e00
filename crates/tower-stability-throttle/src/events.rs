use std::time::{Duration, Instant};
use tower_stability_core::PatternEvent;

/// Events emitted by [`Throttle`](crate::Throttle).
#[derive(Debug, Clone)]
pub enum ThrottleEvent {
    /// A call was admitted and the operation invoked.
    Admitted {
        pattern_name: String,
        timestamp: Instant,
    },
    /// A call arrived too early and was rejected.
    Rejected {
        pattern_name: String,
        timestamp: Instant,
        /// Time left until the next call would be admitted.
        wait: Duration,
    },
}

impl PatternEvent for ThrottleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ThrottleEvent::Admitted { .. } => "admitted",
            ThrottleEvent::Rejected { .. } => "rejected",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            ThrottleEvent::Admitted { timestamp, .. } | ThrottleEvent::Rejected { timestamp, .. } => {
                *timestamp
            }
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            ThrottleEvent::Admitted { pattern_name, .. }
            | ThrottleEvent::Rejected { pattern_name, .. } => pattern_name,
        }
    }
}
