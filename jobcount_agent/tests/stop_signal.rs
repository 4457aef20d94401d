//! Stop signal: idempotent request and a wait that never misses a wake-up.
use std::sync::Arc;
use std::time::Duration;

use jobcount_agent::StopSignal;
use tokio::time::timeout;

#[test]
fn request_is_idempotent() {
    let stop = StopSignal::new();
    assert!(!stop.is_requested());
    assert!(stop.request());
    assert!(!stop.request());
    assert!(stop.is_requested());
}

#[tokio::test]
async fn wait_returns_immediately_once_requested() {
    let stop = StopSignal::new();
    stop.request();
    timeout(Duration::from_millis(100), stop.wait())
        .await
        .expect("wait blocked after request");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn waiters_are_woken_from_another_task() {
    let stop = Arc::new(StopSignal::new());
    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let stop = Arc::clone(&stop);
            tokio::spawn(async move { stop.wait().await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(20)).await;
    let trigger = Arc::clone(&stop);
    std::thread::spawn(move || trigger.request()).join().unwrap();

    for w in waiters {
        timeout(Duration::from_secs(2), w)
            .await
            .expect("waiter not woken")
            .unwrap();
    }
}
