use super::assert_elapsed;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tower::{Layer, ServiceExt};
use tower_stability_core::{ErrorKind, StabilityError, StabilityPattern};
use tower_stability_timeout::Timeout;

#[tokio::test(start_paused = true)]
async fn slow_operation_times_out_at_the_bound() {
    let timeout = Timeout::builder()
        .name("geo")
        .bound(Duration::from_millis(250))
        .build();

    let start = Instant::now();
    let err = timeout
        .run(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, StabilityError>("late")
        })
        .await
        .unwrap_err();

    assert_elapsed(start.elapsed(), Duration::from_millis(250));
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.http_status(), Some(504));
    match err {
        StabilityError::Timeout { name, timeout } => {
            assert_eq!(name, "geo");
            assert_eq!(timeout, Duration::from_millis(250));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn fast_operation_returns_its_value() {
    let timeout = Timeout::new(Duration::from_secs(1));

    let value = timeout
        .run(|| async {
            tokio::time::sleep(Duration::from_millis(999)).await;
            Ok::<_, StabilityError>(7)
        })
        .await
        .unwrap();

    assert_eq!(value, 7);
}

#[tokio::test(start_paused = true)]
async fn operation_errors_are_not_reclassified() {
    let timeout = Timeout::new(Duration::from_secs(1));

    let err = timeout
        .run(|| async { Err::<(), _>(StabilityError::operation_with_status("conflict", 409)) })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.http_status(), Some(409));
}

#[tokio::test(start_paused = true)]
async fn timed_out_operation_is_dropped() {
    struct Finished(Arc<AtomicBool>);
    impl Drop for Finished {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    let dropped = Arc::new(AtomicBool::new(false));
    let completed = Arc::new(AtomicBool::new(false));
    let timeout = Timeout::new(Duration::from_millis(10));

    let d = Arc::clone(&dropped);
    let c = Arc::clone(&completed);
    let err = timeout
        .run(move || {
            let guard = Finished(Arc::clone(&d));
            let completed = Arc::clone(&c);
            async move {
                let _guard = guard;
                tokio::time::sleep(Duration::from_secs(1)).await;
                completed.store(true, Ordering::SeqCst);
                Ok::<_, StabilityError>(())
            }
        })
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(dropped.load(Ordering::SeqCst));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(!completed.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn zero_bound_only_admits_immediate_results() {
    let timeout = Timeout::new(Duration::ZERO);

    let ready = timeout.run(|| async { Ok::<_, StabilityError>(1) }).await;
    assert_eq!(ready.unwrap(), 1);

    let pending = timeout
        .run(|| async {
            tokio::task::yield_now().await;
            Ok::<_, StabilityError>(2)
        })
        .await;
    assert!(pending.unwrap_err().is_timeout());
}

#[tokio::test(start_paused = true)]
async fn events_report_each_outcome() {
    let successes = Arc::new(AtomicUsize::new(0));
    let errors = Arc::new(AtomicUsize::new(0));
    let timeouts = Arc::new(AtomicUsize::new(0));
    let (s, e, t) = (
        Arc::clone(&successes),
        Arc::clone(&errors),
        Arc::clone(&timeouts),
    );

    let timeout = Timeout::builder()
        .bound(Duration::from_millis(100))
        .on_success(move |elapsed| {
            assert!(elapsed <= Duration::from_millis(100));
            s.fetch_add(1, Ordering::SeqCst);
        })
        .on_error(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        })
        .on_timeout(move || {
            t.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let _ = timeout.run(|| async { Ok::<_, StabilityError>(()) }).await;
    let _ = timeout
        .run(|| async { Err::<(), _>(StabilityError::operation("nope")) })
        .await;
    let _ = timeout
        .run(|| async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, StabilityError>(())
        })
        .await;

    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(timeouts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_layer_bounds_each_request() {
    let service = tower::service_fn(|delay_ms: u64| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok::<_, tower::BoxError>(delay_ms)
    });
    let service = Timeout::new(Duration::from_millis(50))
        .into_layer()
        .layer(service);

    assert_eq!(service.clone().oneshot(20).await.unwrap(), 20);
    assert!(service.oneshot(80).await.unwrap_err().is_timeout());
}
