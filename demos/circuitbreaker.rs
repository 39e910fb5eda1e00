//! Circuit breaker walkthrough
//! Run with: cargo run --example circuitbreaker
//! With tracing: RUST_LOG=debug cargo run --example circuitbreaker

use std::time::Duration;
use tokio::time::sleep;
use tower::{service_fn, Layer, Service, ServiceExt};
use tower_stability_circuitbreaker::CircuitBreaker;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Succeeds with true, fails with false
    let boolean_service = service_fn(|req: bool| async move {
        println!("Boolean service called with {}", req);
        if req {
            Ok(req.to_string())
        } else {
            Err::<String, tower::BoxError>("request refused".into())
        }
    });

    // Opens after two consecutive failures and stays open for one second.
    let breaker = CircuitBreaker::builder()
        .name("simple-circuit")
        .fail_threshold(2)
        .reset_timeout(Duration::from_secs(1))
        .on_state_transition(|from, to| println!("Circuit moved {} -> {}", from, to))
        .build();

    let mut svc = breaker.into_layer().layer(boolean_service);
    println!("Circuit state (should be Closed): {}", svc.pattern().state());

    for i in 1..=2 {
        let result = svc.ready().await.unwrap().call(false).await;
        println!("Call {} result: {:?}", i, result.map_err(|e| e.to_string()));
    }

    let rejected = svc.ready().await.unwrap().call(true).await;
    println!(
        "Call while open: {:?} (status {:?})",
        rejected.as_ref().map_err(|e| e.to_string()),
        rejected.as_ref().err().and_then(|e| e.http_status())
    );

    // Wait out the open period; the next call is the trial.
    sleep(Duration::from_millis(1_100)).await;

    let result = svc.ready().await.unwrap().call(true).await;
    println!("Trial call result: {:?}", result.map_err(|e| e.to_string()));
    println!("Circuit state: {}", svc.pattern().state());
    println!("Metrics: {:?}", svc.pattern().metrics());
}
