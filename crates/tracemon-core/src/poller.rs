use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::PollError;
use crate::mailbox::LatestValue;
use crate::source::MetricSource;
use crate::stats::PollStats;

/// Poll interval bounds, in milliseconds.
pub const MIN_INTERVAL_MS: u64 = 100;
pub const MAX_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_INTERVAL_MS: u64 = 1_000;

/// Longest single sleep between cancellation checks.
const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// Process-wide stop signal. Cloned into every thread that has to observe it;
/// tripped by window close, Escape or an OS interrupt.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Everything the poller thread shares with the rest of the process.
#[derive(Clone)]
pub struct PollerShared {
    pub latest: Arc<LatestValue>,
    pub stats: Arc<PollStats>,
    pub cancel: CancelToken,
}

impl PollerShared {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            latest: LatestValue::new(),
            stats: PollStats::new(),
            cancel,
        }
    }
}

/// Sleep until `deadline` in short slices. Returns early once cancelled.
fn sleep_until(deadline: Instant, cancel: &CancelToken) {
    loop {
        if cancel.is_cancelled() {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        spin_sleep::sleep((deadline - now).min(SLEEP_SLICE));
    }
}

/// Run the polling loop on the current thread until the token is cancelled.
///
/// Failed polls leave the mailbox untouched and are only logged; the loop
/// never exits on a source error.
pub fn run_poller<S: MetricSource>(mut source: S, interval: Duration, shared: PollerShared) {
    let _span = tracing::info_span!("poll", counter = source.identifier()).entered();
    tracing::info!(interval_ms = interval.as_millis() as u64, "thread started");

    let mut next_tick = Instant::now();

    while !shared.cancel.is_cancelled() {
        let started = Instant::now();
        let result = source.poll();
        let elapsed = started.elapsed().as_secs_f32();

        match result {
            Ok(value) => {
                shared.latest.publish(value);
                shared.stats.record(elapsed, true);
                tracing::debug!(value, elapsed, "sample");
            }
            Err(PollError::Exhausted) => {
                shared.stats.record(elapsed, false);
                tracing::debug!("source exhausted");
            }
            Err(e) => {
                shared.stats.record(elapsed, false);
                tracing::warn!(error = %e, "poll failed, keeping previous sample");
            }
        }

        // Pace to the interval. A rate source that already slept for most of
        // it leaves only the remainder here.
        next_tick += interval;
        let now = Instant::now();
        if next_tick > now {
            sleep_until(next_tick, &shared.cancel);
        } else {
            // Fell behind: reset rather than burst to catch up
            next_tick = now;
        }
    }

    tracing::info!("thread stopped");
}

/// Spawn the poller thread. The handle may be dropped: shutdown goes through
/// the cancel token and nothing needs to wait for the thread to finish.
pub fn spawn_poller<S: MetricSource + 'static>(
    source: S,
    interval: Duration,
    shared: PollerShared,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("tracemon-poll".into())
        .spawn(move || run_poller(source, interval, shared))
}
