//! Which layer of the conventional order observes which failure.

use super::test_utils::{Scripted, Step};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tower_stability::prelude::*;
use tower_stability::StabilityStack;

#[tokio::test(start_paused = true)]
async fn each_retry_attempt_gets_its_own_timeout() {
    let dependency = Scripted::new([
        Step::Hang(Duration::from_secs(1)),
        Step::Hang(Duration::from_secs(1)),
        Step::Ok(5),
    ]);
    let stack = StabilityStack::builder()
        .timeout(Timeout::new(Duration::from_millis(100)))
        .retry(Retry::new(3, Duration::from_millis(10)))
        .build();

    let start = Instant::now();
    let value = stack.run(dependency.operation()).await.unwrap();

    assert_eq!(value, 5);
    assert_eq!(dependency.calls(), 3);
    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(220) && elapsed < Duration::from_millis(230),
        "elapsed {:?}",
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn breaker_counts_inner_timeouts() {
    let dependency = Scripted::new([Step::Hang(Duration::from_secs(1))]);
    let breaker = Arc::new(CircuitBreaker::builder().fail_threshold(2).build());
    let stack = StabilityStack::builder()
        .timeout(Timeout::new(Duration::from_millis(50)))
        .circuit_breaker(Arc::clone(&breaker))
        .build();

    for _ in 0..2 {
        let err = stack.run(dependency.operation()).await.unwrap_err();
        assert!(err.is_timeout());
    }

    assert_eq!(breaker.state(), CircuitState::Open);
    assert!(stack.run(dependency.operation()).await.unwrap_err().is_circuit_open());
    assert_eq!(dependency.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_chain_the_breaker_rejection() {
    let dependency = Scripted::new([Step::Fail]);
    let stack = StabilityStack::builder()
        .circuit_breaker(CircuitBreaker::builder().fail_threshold(1).build())
        .retry(Retry::new(3, Duration::from_millis(10)))
        .build();

    let err = stack.run(dependency.operation()).await.unwrap_err();

    assert!(err.is_retries_exhausted());
    assert_eq!(err.http_status(), Some(429));
    assert!(err.last_failure().unwrap().is_circuit_open());
    assert_eq!(dependency.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn innermost_fallback_hides_failures_from_outer_patterns() {
    let dependency = Scripted::new([Step::Fail]);
    let breaker = Arc::new(CircuitBreaker::builder().fail_threshold(1).build());
    let stack = StabilityStack::builder()
        .fallback(Fallback::value(99))
        .circuit_breaker(Arc::clone(&breaker))
        .retry(Retry::new(3, Duration::from_millis(10)))
        .build();

    for _ in 0..3 {
        assert_eq!(stack.run(dependency.operation()).await.unwrap(), 99);
    }

    assert_eq!(dependency.calls(), 3);
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn outermost_throttle_rejects_before_anything_runs() {
    let dependency = Scripted::new([Step::Ok(1)]);
    let stack = StabilityStack::builder()
        .retry(Retry::new(3, Duration::from_millis(10)))
        .throttle(Throttle::per_second(1.0))
        .build();

    assert_eq!(stack.run(dependency.operation()).await.unwrap(), 1);

    let err = stack.run(dependency.operation()).await.unwrap_err();
    assert!(err.is_throttled());
    assert_eq!(dependency.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn manual_nesting_matches_the_stack() {
    let nested_dependency = Scripted::new([Step::Fail, Step::Ok(3)]);
    let stacked_dependency = Scripted::new([Step::Fail, Step::Ok(3)]);

    let nested = Throttle::per_second(10.0).around(
        Retry::new(2, Duration::from_millis(5))
            .around(CircuitBreaker::default().around(Timeout::new(Duration::from_secs(1)))),
    );
    let stack = StabilityStack::<u32>::builder()
        .timeout(Timeout::new(Duration::from_secs(1)))
        .circuit_breaker(CircuitBreaker::default())
        .retry(Retry::new(2, Duration::from_millis(5)))
        .throttle(Throttle::per_second(10.0))
        .build();

    let from_nested = nested.run(nested_dependency.operation()).await;
    let from_stack = stack.run(stacked_dependency.operation()).await;

    assert_eq!(from_nested.unwrap(), 3);
    assert_eq!(from_stack.unwrap(), 3);
    assert_eq!(nested_dependency.calls(), stacked_dependency.calls());
}
