//! Throttle metrics regression tests

use super::helpers::*;
use serial_test::serial;
use tower_stability_core::{StabilityError, StabilityPattern};
use tower_stability_throttle::Throttle;

#[tokio::test(start_paused = true)]
#[serial]
async fn throttle_metrics_exist() {
    init_recorder();

    let throttle = Throttle::builder()
        .name("metrics_throttle")
        .calls_per_second(1.0)
        .build();

    for _ in 0..3 {
        let _ = throttle.run(|| async { Ok::<_, StabilityError>(()) }).await;
    }

    assert_eq!(
        counter_value(
            "throttle_calls_total",
            &[("throttle", "metrics_throttle"), ("result", "rejected")]
        ),
        Some(2)
    );

    assert_counter_exists("throttle_calls_total");
    assert_metric_has_label("throttle_calls_total", "result", "admitted");
}
