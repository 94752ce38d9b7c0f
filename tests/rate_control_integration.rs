//! Integration tests for the `debounce` and `throttle` modules.
//!
//! These run against the wall clock with tolerance windows, since the
//! debouncer's deliveries happen on spawned tasks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pacer::{Debouncer, Throttler};

/// A rapid burst of calls collapses into a single delivery carrying the
/// last value.
#[tokio::test(flavor = "multi_thread")]
async fn test_debounce_collapses_rapid_bursts() {
    let seen: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    let debouncer = Debouncer::new(Duration::from_millis(50), move |value: u32| {
        seen_clone.lock().unwrap().push(value);
    });

    for value in 1..=5 {
        debouncer.call(value);
    }

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(*seen.lock().unwrap(), vec![5], "only the last value of the burst is delivered");
}

/// After a delivery the debouncer re-arms: a later call schedules a fresh
/// delivery.
#[tokio::test(flavor = "multi_thread")]
async fn test_debounce_rearms_after_delivery() {
    let seen: Arc<Mutex<Vec<&str>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    let debouncer = Debouncer::new(Duration::from_millis(30), move |value| {
        seen_clone.lock().unwrap().push(value);
    });

    debouncer.call("first");
    tokio::time::sleep(Duration::from_millis(80)).await;
    debouncer.call("second");
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
}

/// Cancelling between the call and the quiet-period expiry suppresses the
/// delivery entirely.
#[tokio::test(flavor = "multi_thread")]
async fn test_debounce_cancel_suppresses_pending_delivery() {
    let seen: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    let debouncer = Debouncer::new(Duration::from_millis(40), move |value: u32| {
        seen_clone.lock().unwrap().push(value);
    });

    debouncer.call(1);
    debouncer.cancel();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(seen.lock().unwrap().is_empty(), "cancelled delivery must never fire");
}

/// Dropping the debouncer behaves like cancel: nothing fires afterwards.
#[tokio::test(flavor = "multi_thread")]
async fn test_debounce_drop_suppresses_pending_delivery() {
    let seen: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    let debouncer = Debouncer::new(Duration::from_millis(40), move |value: u32| {
        seen_clone.lock().unwrap().push(value);
    });

    debouncer.call(1);
    drop(debouncer);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(seen.lock().unwrap().is_empty());
}

/// Leading-edge throttling: the first call of each window fires, calls
/// inside an open window are dropped and not replayed.
#[tokio::test(flavor = "multi_thread")]
async fn test_throttle_across_windows() {
    let seen: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    let throttler = Throttler::new(Duration::from_millis(60), move |value: u32| {
        seen_clone.lock().unwrap().push(value);
    });

    assert!(throttler.call(1));
    assert!(!throttler.call(2));
    assert!(!throttler.call(3));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(throttler.call(4));

    assert_eq!(*seen.lock().unwrap(), vec![1, 4]);
}

/// `reset()` closes the window immediately without waiting for expiry.
#[tokio::test(flavor = "multi_thread")]
async fn test_throttle_reset_reopens_immediately() {
    let seen: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    let throttler = Throttler::new(Duration::from_secs(60), move |value: u32| {
        seen_clone.lock().unwrap().push(value);
    });

    assert!(throttler.call(1));
    assert!(!throttler.call(2));
    throttler.reset();
    assert!(throttler.call(3));

    assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
}
