use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::{Layer, ServiceExt};
use tower_stability_core::{ConfigError, ErrorKind, StabilityError, StabilityPattern};
use tower_stability_throttle::Throttle;

async fn call(throttle: &Throttle, calls: &Arc<AtomicUsize>) -> Result<usize, StabilityError> {
    let calls = Arc::clone(calls);
    throttle
        .run(move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, StabilityError>(n) }
        })
        .await
}

#[tokio::test(start_paused = true)]
async fn first_call_is_always_admitted() {
    let throttle = Throttle::per_second(0.001);
    let calls = Arc::new(AtomicUsize::new(0));

    assert_eq!(call(&throttle, &calls).await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn rejections_do_not_move_the_window() {
    let throttle = Throttle::builder()
        .name("search")
        .calls_per_second(2.0)
        .build();
    let calls = Arc::new(AtomicUsize::new(0));

    call(&throttle, &calls).await.unwrap();

    // Repeated early calls are all rejected and none of them restart the interval.
    for _ in 0..4 {
        tokio::time::advance(Duration::from_millis(100)).await;
        let err = call(&throttle, &calls).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Throttled);
        assert_eq!(err.http_status(), Some(429));
    }

    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(call(&throttle, &calls).await.unwrap(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn interval_is_measured_between_call_starts() {
    let throttle = Throttle::per_second(10.0);
    let calls = Arc::new(AtomicUsize::new(0));

    // A slow admitted call does not delay the next admission.
    let c = Arc::clone(&calls);
    throttle
        .run(move || {
            c.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok::<_, StabilityError>(0)
            }
        })
        .await
        .unwrap();

    assert!(call(&throttle, &calls).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn failures_of_admitted_calls_pass_through() {
    let throttle = Throttle::per_second(100.0);

    let err = throttle
        .run(|| async { Err::<(), _>(StabilityError::operation_with_status("teapot", 418)) })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.http_status(), Some(418));
}

#[test]
fn invalid_rates_fail_validation() {
    let err = Throttle::builder().calls_per_second(-1.0).try_build().unwrap_err();
    assert_eq!(err, ConfigError::InvalidRate(-1.0));
    assert_eq!(
        err.to_string(),
        "calls_per_second must be positive and finite, got -1"
    );
}

#[tokio::test(start_paused = true)]
async fn throttle_layer_rejects_bursts() {
    let service = tower::service_fn(|n: u32| async move { Ok::<_, tower::BoxError>(n + 1) });
    let service = Throttle::per_second(4.0).into_layer().layer(service);

    assert_eq!(service.clone().oneshot(1).await.unwrap(), 2);
    assert!(service.clone().oneshot(2).await.unwrap_err().is_throttled());

    tokio::time::advance(Duration::from_millis(250)).await;
    assert_eq!(service.oneshot(3).await.unwrap(), 4);
}
