use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Single-slot mailbox holding the most recent raw sample and the session peak.
///
/// One writer (the poller) and one reader (the render loop). Neither side
/// ever blocks. The publish counter is stored last with `Release` and read
/// first with `Acquire`, so a reader that sees a non-zero count also sees the
/// value written before it. A reader may still observe a value one publish
/// newer than the count it loaded; that is fine for a chart.
pub struct LatestValue {
    raw: AtomicI64,
    peak: AtomicI64,
    published: AtomicU64,
}

impl LatestValue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            raw: AtomicI64::new(0),
            peak: AtomicI64::new(i64::MIN),
            published: AtomicU64::new(0),
        })
    }

    /// Store a fresh sample and fold it into the peak. Writer side only.
    pub fn publish(&self, raw: i64) {
        self.raw.store(raw, Ordering::Relaxed);
        self.peak.fetch_max(raw, Ordering::Relaxed);
        self.published.fetch_add(1, Ordering::Release);
    }

    /// Most recent sample, or `None` before the first successful poll.
    pub fn latest(&self) -> Option<i64> {
        if self.published.load(Ordering::Acquire) == 0 {
            return None;
        }
        Some(self.raw.load(Ordering::Relaxed))
    }

    /// Largest sample seen this session.
    pub fn peak(&self) -> Option<i64> {
        if self.published.load(Ordering::Acquire) == 0 {
            return None;
        }
        Some(self.peak.load(Ordering::Relaxed))
    }

    /// Number of successful publishes so far.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }
}
