//! Property-based tests for tower-stability patterns.


use tokio::runtime::{Builder, Runtime};

/// A current-thread runtime with a paused clock.
pub(crate) fn paused_runtime() -> Runtime {
    Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}
