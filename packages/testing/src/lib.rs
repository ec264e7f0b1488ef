//! Private helpers for testing and examples in this workspace's packages.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Runs a test with a timeout to prevent infinite hangs.
///
/// The primitives under test park threads and flush continuations across
/// threads; a regression in either direction shows up as a hang, not a
/// failure. This wrapper turns such hangs into prompt panics so CI does not
/// sit on a dead test for the rest of its time budget.
///
/// The timeout is 10 seconds under normal conditions and 60 seconds under
/// Miri, where thread synchronization primitives are significantly slower.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the
/// watchdog is disabled and the test function is executed directly, so
/// mutation testing can properly detect hanging mutations.
///
/// # Panics
///
/// Panics if the test exceeds the timeout (when not in mutation testing
/// mode).
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// with_watchdog(|| {
///     // Your test code here
///     assert_eq!(2 + 2, 4);
/// });
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    // Under mutation testing, disable the watchdog to allow hanging mutations.
    if std::env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let timeout = if cfg!(miri) {
        Duration::from_secs(60)
    } else {
        Duration::from_secs(10)
    };

    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If this send fails, the receiver has already timed out.
        drop(tx.send(result));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            test_handle.join().expect("test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test exceeded the watchdog timeout - likely hanging on a wait");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            // The test thread went away without sending; join it to surface
            // its panic as our own.
            match test_handle.join() {
                Ok(()) => panic!("test thread disconnected unexpectedly"),
                Err(e) => std::panic::resume_unwind(e),
            }
        }
    }
}

/// Spins until `condition` becomes true, panicking after a bounded wait.
///
/// For asserting that something eventually happens on another thread (a
/// continuation fires, a task settles) without baking sleeps into tests.
///
/// # Panics
///
/// Panics with `description` if the condition does not become true within
/// the bound.
pub fn spin_until<C>(description: &str, condition: C)
where
    C: Fn() -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(5);

    while !condition() {
        assert!(
            Instant::now() < deadline,
            "condition was not reached in time: {description}"
        );
        thread::yield_now();
    }
}
