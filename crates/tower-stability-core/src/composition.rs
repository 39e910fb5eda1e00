//! Nesting of stability patterns.
//!
//! `Nested<Outer, Inner>` runs an operation through `Inner` and runs that
//! whole execution through `Outer`. Each pattern keeps its own contract, so
//! an outer retry sees an inner timeout's `Timeout` error as one failed
//! attempt.
//!
//! The conventional order, innermost first, is fallback, timeout, circuit
//! breaker, retry, throttle:
//!
//! ```text
//! throttle.around(retry.around(breaker.around(timeout.around(fallback))))
//! ```

use crate::{StabilityError, StabilityPattern};
use futures::future::BoxFuture;
use std::future::Future;

/// Two patterns applied one inside the other.
#[derive(Debug, Clone)]
pub struct Nested<Outer, Inner> {
    outer: Outer,
    inner: Inner,
}

impl<Outer, Inner> Nested<Outer, Inner> {
    /// Runs operations through `inner`, wrapped by `outer`.
    pub fn new(outer: Outer, inner: Inner) -> Self {
        Self { outer, inner }
    }

    pub fn outer(&self) -> &Outer {
        &self.outer
    }

    pub fn inner(&self) -> &Inner {
        &self.inner
    }
}

impl<T, Outer, Inner> StabilityPattern<T> for Nested<Outer, Inner>
where
    T: Send,
    Outer: StabilityPattern<T>,
    Inner: StabilityPattern<T>,
{
    fn run<'a, F, Fut, Err>(&'a self, operation: F) -> BoxFuture<'a, Result<T, StabilityError>>
    where
        F: FnMut() -> Fut + Clone + Send + 'a,
        Fut: Future<Output = Result<T, Err>> + Send + 'a,
        Err: Into<StabilityError> + Send + 'a,
        T: 'a,
    {
        let inner = &self.inner;
        let wrapped = move || <Inner as StabilityPattern<T>>::run(inner, operation.clone());
        <Outer as StabilityPattern<T>>::run(&self.outer, wrapped)
    }
}

/// Fluent nesting for any pattern.
pub trait PatternExt: Sized {
    /// Wraps `inner` so that it runs inside `self`.
    fn around<Inner>(self, inner: Inner) -> Nested<Self, Inner> {
        Nested::new(self, inner)
    }
}

impl<P> PatternExt for P {}
