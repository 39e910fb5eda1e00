//! All five patterns guarding one flaky dependency
//! Run with: cargo run --example full_stack
//! With tracing: RUST_LOG=debug cargo run --example full_stack

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower_stability::prelude::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let breaker = Arc::new(
        CircuitBreaker::builder()
            .name("exchange-rates")
            .fail_threshold(3)
            .reset_timeout(Duration::from_secs(2))
            .build(),
    );

    let stack = StabilityStack::builder()
        .fallback(Fallback::value(1.0_f64))
        .timeout(Timeout::builder().name("exchange-rates").bound(Duration::from_millis(200)).build())
        .circuit_breaker(Arc::clone(&breaker))
        .retry(Retry::builder().name("exchange-rates").max_attempts(2).delay(Duration::from_millis(50)).build())
        .throttle(Throttle::builder().name("exchange-rates").calls_per_second(20.0).build())
        .build();

    // Every third call fails outright and the fallback rate covers it.
    // The fourth call hangs, times out, and the retry succeeds on the next attempt.
    let calls = Arc::new(AtomicUsize::new(0));
    for round in 1..=6 {
        let calls = Arc::clone(&calls);
        let result = stack
            .run(move || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n == 4 {
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                    if n % 3 == 0 {
                        return Err(StabilityError::operation("rate feed unavailable"));
                    }
                    Ok(1.08)
                }
            })
            .await
            .at_endpoint("exchange-rates", "eur_usd");

        match result {
            Ok(rate) => println!("Round {}: rate {}", round, rate),
            Err(failure) => println!("Round {}: {} ({})", round, failure.detail(), failure.status()),
        }

        tokio::time::sleep(Duration::from_millis(60)).await;
    }

    println!("Breaker: {:?}", breaker.metrics());
}
