//! Cooperative cancellation
//!
//! Replaces the global stop flags the exploratory tooling used: each worker
//! gets an explicit token, checked once per loop iteration, and longer waits
//! are sliced so cancellation latency stays bounded even mid-sleep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Slice length for interruptible sleeps
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Shared cancellation token, cheap to clone
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; safe from any thread, idempotent
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Sleep up to `duration`, returning early (false) if cancelled
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            if self.is_cancelled() {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            thread::sleep(remaining.min(SLEEP_SLICE));
        }
        !self.is_cancelled()
    }
}
