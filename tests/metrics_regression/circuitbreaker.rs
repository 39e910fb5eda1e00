//! Circuit breaker metrics regression tests

use super::helpers::*;
use serial_test::serial;
use std::time::Duration;
use tower_stability_circuitbreaker::CircuitBreaker;
use tower_stability_core::{StabilityError, StabilityPattern};

#[tokio::test]
#[serial]
async fn circuitbreaker_metrics_exist() {
    init_recorder();

    let breaker = CircuitBreaker::builder()
        .name("metrics_cb")
        .fail_threshold(2)
        .reset_timeout(Duration::from_secs(60))
        .build();

    let _ = breaker.run(|| async { Ok::<_, StabilityError>(()) }).await;
    for _ in 0..3 {
        let _ = breaker
            .run(|| async { Err::<(), _>(StabilityError::operation("down")) })
            .await;
    }

    assert_eq!(
        counter_value(
            "circuitbreaker_calls_total",
            &[("circuitbreaker", "metrics_cb"), ("outcome", "rejected")]
        ),
        Some(1)
    );

    assert_counter_exists("circuitbreaker_calls_total");
    assert_metric_has_label("circuitbreaker_calls_total", "circuitbreaker", "metrics_cb");
    assert_metric_has_label("circuitbreaker_calls_total", "outcome", "success");
    assert_metric_has_label("circuitbreaker_calls_total", "outcome", "failure");

    assert_counter_exists("circuitbreaker_transitions_total");
    assert_metric_has_label("circuitbreaker_transitions_total", "from", "Closed");
    assert_metric_has_label("circuitbreaker_transitions_total", "to", "Open");

    assert_gauge_exists("circuitbreaker_state");
    assert_metric_has_label("circuitbreaker_state", "state", "Open");

    assert_histogram_exists("circuitbreaker_call_duration_seconds");
}
