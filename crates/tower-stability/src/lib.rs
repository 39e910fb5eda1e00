//! Composable stability patterns for async operations and Tower services.
//!
//! `tower-stability` wraps a single outbound operation with independent
//! failure-handling policies. Each pattern is available as an individual
//! crate and as a feature of this crate.
//!
//! # Patterns
//!
//! - **Fallback** (`fallback` feature): substitutes an alternative operation
//!   when the primary fails
//! - **Timeout** (`timeout` feature): bounds how long an operation may run
//! - **Circuit Breaker** (`circuitbreaker` feature): stops calling a
//!   dependency after consecutive failures and probes it again later
//! - **Retry** (`retry` feature): re-attempts failures with a fixed delay
//! - **Throttle** (`throttle` feature): rejects calls arriving faster than a
//!   configured rate
//!
//! Every pattern implements [`StabilityPattern`], so it can run a closure
//! directly, wrap an async function through [`decorate`], or become a Tower
//! layer through [`PatternLayer`].
//!
//! # Composition
//!
//! Patterns nest innermost first in the order fallback, timeout, circuit
//! breaker, retry, throttle. [`StabilityStack`] always applies that order:
//!
//! ```
//! # #[cfg(feature = "full")]
//! # {
//! use std::time::Duration;
//! use tower_stability::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let stack = StabilityStack::builder()
//!     .timeout(Timeout::new(Duration::from_secs(2)))
//!     .circuit_breaker(CircuitBreaker::builder().name("inventory").build())
//!     .retry(Retry::new(3, Duration::from_millis(10)))
//!     .build();
//!
//! let stock = stack.run(|| async { Ok::<_, StabilityError>(12_u32) }).await;
//! assert_eq!(stock.unwrap(), 12);
//! # }
//! # }
//! ```
//!
//! # Individual Crates
//!
//! - `tower-stability-core` (shared infrastructure)
//! - `tower-stability-fallback`
//! - `tower-stability-timeout`
//! - `tower-stability-circuitbreaker`
//! - `tower-stability-retry`
//! - `tower-stability-throttle`

pub use tower_stability_core as core;
pub use tower_stability_core::{
    decorate, ConfigError, ErrorKind, Nested, PatternExt, PatternLayer, PatternService,
    StabilityError, StabilityPattern,
};

#[cfg(feature = "fallback")]
pub use tower_stability_fallback as fallback;

#[cfg(feature = "timeout")]
pub use tower_stability_timeout as timeout;

#[cfg(feature = "circuitbreaker")]
pub use tower_stability_circuitbreaker as circuitbreaker;

#[cfg(feature = "retry")]
pub use tower_stability_retry as retry;

#[cfg(feature = "throttle")]
pub use tower_stability_throttle as throttle;

mod integration;
pub use integration::{IntegrationFailure, IntegrationResultExt};

#[cfg(feature = "full")]
mod stack;
#[cfg(feature = "full")]
pub use stack::{StabilityStack, StabilityStackBuilder, StabilityStackLayer};

/// Commonly used types, one import away.
pub mod prelude {
    pub use crate::integration::{IntegrationFailure, IntegrationResultExt};
    pub use tower_stability_core::{
        decorate, ErrorKind, PatternExt, PatternLayer, StabilityError, StabilityPattern,
    };

    #[cfg(feature = "circuitbreaker")]
    pub use tower_stability_circuitbreaker::{CircuitBreaker, CircuitState};
    #[cfg(feature = "fallback")]
    pub use tower_stability_fallback::Fallback;
    #[cfg(feature = "retry")]
    pub use tower_stability_retry::Retry;
    #[cfg(feature = "full")]
    pub use crate::stack::StabilityStack;
    #[cfg(feature = "throttle")]
    pub use tower_stability_throttle::Throttle;
    #[cfg(feature = "timeout")]
    pub use tower_stability_timeout::Timeout;
}
