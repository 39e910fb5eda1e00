use super::assert_elapsed;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tower::{Layer, ServiceExt};
use tower_stability_core::{ErrorKind, StabilityError, StabilityPattern};
use tower_stability_retry::Retry;

/// Fails the first `failures` invocations, then returns the attempt number.
fn flaky(failures: usize, calls: &Arc<AtomicUsize>) -> impl FnMut() -> futures::future::BoxFuture<'static, Result<usize, StabilityError>> + Clone + Send + use<> {
    let calls = Arc::clone(calls);
    move || {
        let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
        Box::pin(async move {
            if attempt <= failures {
                Err(StabilityError::operation(format!("attempt {} failed", attempt)))
            } else {
                Ok(attempt)
            }
        })
    }
}

#[tokio::test(start_paused = true)]
async fn exhausts_after_max_attempts_with_fixed_delay() {
    let retry = Retry::builder()
        .name("ledger")
        .max_attempts(3)
        .delay(Duration::from_millis(100))
        .build();
    let calls = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let err = retry.run(flaky(usize::MAX, &calls)).await.unwrap_err();

    assert_elapsed(start.elapsed(), Duration::from_millis(200));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(err.kind(), ErrorKind::RetriesExhausted);
    assert_eq!(err.http_status(), Some(429));
    assert_eq!(
        err.to_string(),
        "maximum number of attempts exceeded in 'ledger': 3"
    );
    assert_eq!(err.last_failure().unwrap().to_string(), "attempt 3 failed");
}

#[tokio::test(start_paused = true)]
async fn succeeds_on_a_later_attempt() {
    let retry = Retry::new(4, Duration::from_millis(50));
    let calls = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let attempt = retry.run(flaky(2, &calls)).await.unwrap();

    assert_eq!(attempt, 3);
    assert_elapsed(start.elapsed(), Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn single_attempt_never_sleeps() {
    let retry = Retry::new(1, Duration::from_secs(60));
    let calls = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let err = retry.run(flaky(usize::MAX, &calls)).await.unwrap_err();

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    match err {
        StabilityError::RetriesExhausted { attempts, last, .. } => {
            assert_eq!(attempts, 1);
            assert!(last.is_operation());
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn delay_does_not_grow() {
    let delays = Arc::new(Mutex::new(Vec::new()));
    let d = Arc::clone(&delays);
    let retry = Retry::builder()
        .max_attempts(5)
        .delay(Duration::from_millis(30))
        .on_retry(move |attempt, delay| {
            d.lock().unwrap().push((attempt, delay));
        })
        .build();
    let calls = Arc::new(AtomicUsize::new(0));

    let _ = retry.run(flaky(usize::MAX, &calls)).await;

    let expected: Vec<_> = (1..=4).map(|a| (a, Duration::from_millis(30))).collect();
    assert_eq!(*delays.lock().unwrap(), expected);
}

#[tokio::test(start_paused = true)]
async fn predicate_stops_on_non_retryable_failures() {
    let ignored = Arc::new(AtomicUsize::new(0));
    let i = Arc::clone(&ignored);
    let retry = Retry::builder()
        .max_attempts(5)
        .delay(Duration::from_millis(1))
        .retry_on(|error| error.http_status() != Some(400))
        .on_ignored_error(move || {
            i.fetch_add(1, Ordering::SeqCst);
        })
        .build();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);

    let err = retry
        .run(move || {
            c.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(StabilityError::operation_with_status("bad input", 400)) }
        })
        .await
        .unwrap_err();

    assert!(err.is_operation());
    assert_eq!(err.http_status(), Some(400));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(ignored.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_call_cancels_pending_retries() {
    let retry = Retry::new(10, Duration::from_secs(1));
    let calls = Arc::new(AtomicUsize::new(0));

    let outcome =
        tokio::time::timeout(Duration::from_millis(1_500), retry.run(flaky(usize::MAX, &calls))).await;

    assert!(outcome.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn retry_layer_replays_request() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let service = tower::service_fn(move |req: String| {
        let mut seen = s.lock().unwrap();
        seen.push(req.clone());
        let attempt = seen.len();
        async move {
            if attempt < 2 {
                Err::<String, tower::BoxError>("transient".into())
            } else {
                Ok(req.to_uppercase())
            }
        }
    });

    let service = Retry::new(3, Duration::from_millis(10))
        .into_layer()
        .layer(service);
    let response = service.oneshot("sku-42".to_string()).await.unwrap();

    assert_eq!(response, "SKU-42");
    assert_eq!(*seen.lock().unwrap(), vec!["sku-42", "sku-42"]);
}
