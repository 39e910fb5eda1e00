use std::time::Duration;
use tokio::time::Instant;

/// Admission state of a throttle.
#[derive(Debug)]
pub(crate) struct ThrottleState {
    min_interval: Duration,
    /// When the last admitted call started. `None` until the first call.
    last_called: Option<Instant>,
}

impl ThrottleState {
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_called: None,
        }
    }

    /// Admits a call if at least `min_interval` has passed since the last
    /// admitted one, recording the admission.
    ///
    /// Returns the remaining wait on rejection. Rejections leave the state
    /// untouched.
    pub(crate) fn try_admit(&mut self) -> Result<(), Duration> {
        let now = Instant::now();

        if let Some(last) = self.last_called {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_interval {
                return Err(self.min_interval - elapsed);
            }
        }

        self.last_called = Some(now);
        Ok(())
    }
}
