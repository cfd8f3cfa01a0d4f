use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use atomic_float::AtomicF32;

/// Statistics shared between the poller thread (writer) and the render
/// thread (reader). Relaxed atomics: a read may be one poll stale, which is
/// fine for the status overlay.
pub struct PollStats {
    /// Wall-clock seconds the last `poll()` call took, including any
    /// rate-measurement sleep inside the source.
    pub last_poll_secs: AtomicF32,
    /// Completed poll attempts, successful or not.
    pub polls: AtomicU64,
    /// Poll attempts that returned an error.
    pub failures: AtomicU32,
}

impl PollStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            last_poll_secs: AtomicF32::new(0.0),
            polls: AtomicU64::new(0),
            failures: AtomicU32::new(0),
        })
    }

    pub fn record(&self, secs: f32, ok: bool) {
        self.last_poll_secs.store(secs, Ordering::Relaxed);
        self.polls.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}
