//! Core infrastructure for tower-stability.
//!
//! This crate provides the pieces every stability pattern shares:
//! - [`StabilityError`] and [`ErrorKind`], the error taxonomy
//! - [`StabilityPattern`], the `run(operation)` contract
//! - the event system used for observability
//! - [`PatternLayer`], which turns any pattern into a Tower layer
//! - [`decorate`] and [`Nested`] for composing patterns around functions and each other

pub mod composition;
mod decorate;
pub mod error;
pub mod events;
pub mod layer;
pub mod pattern;

pub use composition::{Nested, PatternExt};
pub use decorate::decorate;
pub use error::{ConfigError, ErrorKind, StabilityError};
pub use events::{EventListener, EventListeners, FnListener, PatternEvent};
pub use layer::{PatternLayer, PatternService};
pub use pattern::StabilityPattern;
