//! Capture of in-process solver output
//!
//! Native solver libraries print their progress straight to the process
//! stdout, which would interleave with the report. [`capture_stdout`] routes it
//! into a buffer with `gag` for the duration of a closure so the text can be
//! attached to the solve result and logged at debug level instead.
//!
//! **Important**: `gag` allows only one redirect per stream per process at a
//! time, so a capture claims a process-wide lock. The lock is never waited
//! for: while another capture holds it (for instance a solve abandoned after
//! its time limit) the closure runs uncaptured and its output goes to the
//! terminal. The same happens if the redirect cannot be installed.

use std::io::Read;
use std::sync::{Mutex, TryLockError};

use gag::BufferRedirect;
use tracing::{debug, warn};

static STDOUT_CAPTURE: Mutex<()> = Mutex::new(());

/// Run `f` with stdout redirected into a buffer, returning its result and the
/// captured text. The text is empty when the output could not be captured.
pub fn capture_stdout<T>(f: impl FnOnce() -> T) -> (T, String) {
    let _guard = match STDOUT_CAPTURE.try_lock() {
        Ok(guard) => guard,
        // A panic while capturing leaves no redirect behind, so a poisoned lock is still usable.
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        Err(TryLockError::WouldBlock) => {
            debug!("stdout already captured elsewhere, solver output goes to the terminal");
            return (f(), String::new());
        }
    };

    let redirect = match BufferRedirect::stdout() {
        Ok(redirect) => redirect,
        Err(err) => {
            warn!("cannot capture solver output: {err}");
            return (f(), String::new());
        }
    };

    let value = f();

    let mut captured = String::new();
    if let Err(err) = redirect.into_inner().read_to_string(&mut captured) {
        warn!("cannot read captured solver output: {err}");
    }
    (value, captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_capture_returns_closure_value() {
        let (value, _) = capture_stdout(|| 6 * 7);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_held_capture_does_not_block() {
        let _held = STDOUT_CAPTURE.lock().unwrap_or_else(|p| p.into_inner());
        let (value, captured) = capture_stdout(|| "ran");
        assert_eq!(value, "ran");
        assert!(captured.is_empty());
    }

    #[test]
    fn test_concurrent_captures_do_not_fail() {
        const NUM_THREADS: usize = 3;
        let barrier = Arc::new(Barrier::new(NUM_THREADS));

        let handles: Vec<_> = (0..NUM_THREADS)
            .map(|i| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    capture_stdout(|| i).0
                })
            })
            .collect();

        let mut results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("Thread should not panic"))
            .collect();
        results.sort();
        assert_eq!(results, vec![0, 1, 2]);
    }
}
