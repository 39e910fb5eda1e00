//! Turning stack failures into caller-facing status and detail.

use super::test_utils::{Scripted, Step};
use std::time::Duration;
use tower_stability::prelude::*;

#[tokio::test(start_paused = true)]
async fn open_breaker_reports_service_unavailable() {
    let dependency = Scripted::new([Step::Fail]);
    let stack = StabilityStack::builder()
        .circuit_breaker(
            CircuitBreaker::builder()
                .name("shipping")
                .fail_threshold(1)
                .build(),
        )
        .build();

    let first = stack
        .run(dependency.operation())
        .await
        .at_endpoint("shipping", "quote")
        .unwrap_err();
    assert_eq!(first.status(), 500);
    assert_eq!(first.detail(), "Generic: shipping.quote: dependency failed");

    let second = stack
        .run(dependency.operation())
        .await
        .at_endpoint("shipping", "quote")
        .unwrap_err();
    assert_eq!(second.status(), 503);
    assert_eq!(
        second.detail(),
        "CircuitOpen: shipping.quote: circuit breaker 'shipping' is open"
    );
}

#[tokio::test(start_paused = true)]
async fn timeouts_report_gateway_timeout() {
    let dependency = Scripted::new([Step::Hang(Duration::from_secs(30))]);
    let stack = StabilityStack::builder()
        .timeout(
            Timeout::builder()
                .name("shipping")
                .bound(Duration::from_secs(2))
                .build(),
        )
        .build();

    let failure = stack
        .run(dependency.operation())
        .await
        .at_endpoint("shipping", "track")
        .unwrap_err();

    assert_eq!(failure.status(), 504);
    assert_eq!(failure.kind(), ErrorKind::Timeout);
    assert_eq!(
        failure.detail(),
        "Timeout: shipping.track: call through 'shipping' timed out after 2s"
    );
}

#[tokio::test(start_paused = true)]
async fn successful_calls_pass_through() {
    let dependency = Scripted::new([Step::Ok(12)]);
    let stack: StabilityStack<u32> = StabilityStack::builder()
        .retry(Retry::new(2, Duration::from_millis(1)))
        .build();

    let value = stack
        .run(dependency.operation())
        .await
        .at_endpoint("shipping", "rates")
        .unwrap();
    assert_eq!(value, 12);
}
