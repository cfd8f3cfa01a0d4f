use std::sync::atomic::Ordering;
use std::time::Duration;

use tracemon_core::{ChartModel, FrameReport, PollerShared, Segment};

use crate::ui::StatusSnapshot;

/// What one redraw produces for the GPU.
pub struct FrameOutput {
    pub report: FrameReport,
    pub segments: Vec<Segment>,
}

/// Advance the chart from the latest published sample. Called once per
/// redraw; `dt` is the already-capped frame delta in seconds.
pub fn step(chart: &mut ChartModel, shared: &PollerShared, dt: f64) -> FrameOutput {
    let report = chart.advance(shared.latest.latest(), dt);
    FrameOutput {
        report,
        segments: chart.segments(),
    }
}

/// Gather the overlay's view of the session after [`step`].
pub fn status(
    counter: &str,
    interval: Duration,
    shared: &PollerShared,
    chart: &ChartModel,
) -> StatusSnapshot {
    StatusSnapshot {
        counter: counter.to_string(),
        interval,
        current: shared.latest.latest(),
        peak: shared.latest.peak(),
        displayed: chart.displayed(),
        polls: shared.stats.polls.load(Ordering::Relaxed),
        failures: shared.stats.failures.load(Ordering::Relaxed),
        last_poll_secs: shared.stats.last_poll_secs.load(Ordering::Relaxed),
        scale: chart.scale_factor(),
        window_max: chart.window_max(),
        resolution: chart.resolution(),
    }
}
