#![allow(dead_code)]

use std::sync::Once;
use std::time::{Duration, Instant};

use waitgate::Controller;

static INIT: Once = Once::new();

/// Sets up the tracing subscriber for tests, ensuring it's only initialized once.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt().with_test_writer().init();
    });
}

/// Spins until `controller` has exactly `n` blocked waiters.
pub fn wait_for_waiters(controller: &Controller, n: usize) {
    let start = Instant::now();
    while controller.waiters() != n {
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "timed out waiting for {} waiters",
            n
        );
        std::thread::yield_now();
    }
}

/// Spins until `check` holds, for at most a second.
pub fn eventually(check: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(1) {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    check()
}
