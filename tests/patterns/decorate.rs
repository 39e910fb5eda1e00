use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower_stability_circuitbreaker::CircuitBreaker;
use tower_stability_core::{decorate, StabilityError};
use tower_stability_retry::Retry;

async fn fetch_profile(user_id: u64) -> Result<String, StabilityError> {
    if user_id == 0 {
        Err(StabilityError::operation_with_status("no such user", 404))
    } else {
        Ok(format!("profile-{}", user_id))
    }
}

#[tokio::test(start_paused = true)]
async fn decorated_function_keeps_its_signature() {
    let fetch = decorate(Arc::new(Retry::new(2, Duration::from_millis(5))), fetch_profile);

    assert_eq!(fetch(9).await.unwrap(), "profile-9");

    let err = fetch(0).await.unwrap_err();
    assert!(err.is_retries_exhausted());
    assert_eq!(err.root_cause().http_status(), Some(404));
}

#[tokio::test(start_paused = true)]
async fn decorated_functions_share_pattern_state() {
    let breaker = Arc::new(CircuitBreaker::builder().fail_threshold(2).build());
    let invoked = Arc::new(AtomicUsize::new(0));

    let i = Arc::clone(&invoked);
    let charge = decorate(Arc::clone(&breaker), move |(account, cents): (String, u64)| {
        i.fetch_add(1, Ordering::SeqCst);
        async move {
            Err::<(), _>(StabilityError::operation(format!(
                "card declined for {} ({} cents)",
                account, cents
            )))
        }
    });
    let refund = decorate(Arc::clone(&breaker), |_: u64| async { Ok::<_, StabilityError>(()) });

    assert!(charge(("acct-1".into(), 500)).await.unwrap_err().is_operation());
    assert!(charge(("acct-2".into(), 700)).await.unwrap_err().is_operation());

    assert!(charge(("acct-3".into(), 900)).await.unwrap_err().is_circuit_open());
    assert!(refund(42).await.unwrap_err().is_circuit_open());
    assert_eq!(invoked.load(Ordering::SeqCst), 2);
}
