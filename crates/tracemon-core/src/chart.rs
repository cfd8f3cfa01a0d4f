use serde::Deserialize;

use crate::error::EngineError;
use crate::ring::{ResizeAnchor, SampleRing};
use crate::scale::{AutoScale, ScaleStep};
use crate::shade::{self, FrameGeometry, Segment, TraceStyle};
use crate::smoothing::{DEFAULT_PURSUIT_RATE, Smoother};
use crate::types::Resolution;

/// Tunables for the consumer-side model, loaded from the `[chart]` table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    /// Pursuit rate of the displayed value, in 1/second.
    pub pursuit_rate: f64,
    pub anchor: ResizeAnchor,
    pub style: TraceStyle,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            pursuit_rate: DEFAULT_PURSUIT_RATE,
            anchor: ResizeAnchor::default(),
            style: TraceStyle::default(),
        }
    }
}

/// Outcome of one [`ChartModel::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub displayed: f64,
    pub pushed: i64,
    pub scale: ScaleStep,
}

/// Render-thread state: the ring, the smoothed value and the scale.
///
/// Owned and mutated by the render loop only. Resizes are applied between
/// frames, so every frame sees either the old ring or the new one whole.
#[derive(Debug, Clone)]
pub struct ChartModel {
    ring: SampleRing,
    smoother: Smoother,
    scale: AutoScale,
    resolution: Resolution,
    style: TraceStyle,
}

impl ChartModel {
    pub fn new(resolution: Resolution, config: &ChartConfig) -> Result<Self, EngineError> {
        Ok(Self {
            ring: SampleRing::new(resolution.width as usize, config.anchor)?,
            smoother: Smoother::new(config.pursuit_rate),
            scale: AutoScale::new(),
            resolution,
            style: config.style,
        })
    }

    /// Swap in a ring sized for the new surface. On allocation failure the old
    /// ring stays in place and the error is returned to the caller, which is
    /// expected to stop rendering.
    pub fn resize(&mut self, resolution: Resolution) -> Result<(), EngineError> {
        if resolution.width != self.resolution.width {
            self.ring.resize(resolution.width as usize)?;
        }
        self.resolution = resolution;
        Ok(())
    }

    /// One frame of physics: pursue the target, push the rounded value,
    /// rescale. Call exactly once per rendered frame.
    pub fn advance(&mut self, target: Option<i64>, elapsed: f64) -> FrameReport {
        let displayed = self.smoother.step(target, elapsed);
        let pushed = self.smoother.rounded();
        self.ring.push(pushed);
        let scale = self.scale.step(&self.ring, self.resolution.height);
        FrameReport {
            displayed,
            pushed,
            scale,
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry {
            height: self.resolution.height,
            factor: self.scale.factor(),
            window_max: self.scale.window_max(),
            style: self.style,
        }
    }

    /// Draw list for the current state.
    pub fn segments(&self) -> Vec<Segment> {
        shade::map_columns(&self.ring, &self.geometry())
    }

    pub fn ring(&self) -> &SampleRing {
        &self.ring
    }

    pub fn displayed(&self) -> f64 {
        self.smoother.displayed()
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale.factor()
    }

    pub fn window_max(&self) -> i64 {
        self.scale.window_max()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    fn model(width: u32, height: u32) -> ChartModel {
        ChartModel::new(Resolution::new(width, height), &ChartConfig::default()).unwrap()
    }

    #[test]
    fn every_frame_pushes_one_value() {
        let mut chart = model(4, 100);
        chart.advance(None, FRAME);
        chart.advance(Some(60), 1.0);
        let values: Vec<i64> = chart.ring().iter().collect();
        assert_eq!(values, vec![0, 0, 0, 60]);
    }

    #[test]
    fn resize_keeps_width_and_history() {
        let mut chart = model(3, 100);
        chart.advance(Some(9), 1.0);
        chart.resize(Resolution::new(5, 80)).unwrap();
        assert_eq!(chart.ring().width(), 5);
        assert_eq!(chart.ring().get(2), Some(9));
        assert_eq!(chart.resolution(), Resolution::new(5, 80));
    }

    #[test]
    fn height_only_resize_keeps_ring() {
        let mut chart = model(3, 100);
        chart.advance(Some(9), 1.0);
        chart.resize(Resolution::new(3, 40)).unwrap();
        assert_eq!(chart.ring().newest(), Some(9));
    }

    #[test]
    fn minimised_start_recovers_after_resize() {
        let mut chart = model(4, 0);
        for _ in 0..4000 {
            chart.advance(Some(50), FRAME);
        }
        assert_eq!(chart.scale_factor(), 1.0);

        chart.resize(Resolution::new(4, 100)).unwrap();
        for _ in 0..600 {
            chart.advance(Some(50), FRAME);
        }
        let top = 50.0 * chart.scale_factor();
        assert!(top > 50.0 && top <= 100.0, "top {top}");
    }

    #[test]
    fn scale_reacts_to_tall_values() {
        let mut chart = model(10, 100);
        let report = chart.advance(Some(500), 1.0);
        assert_eq!(report.scale, ScaleStep::Shrunk);
        assert_eq!(chart.scale_factor(), 0.75);
        assert_eq!(chart.window_max(), 500);
    }

    #[test]
    fn segments_cover_all_but_last_column() {
        let mut chart = model(6, 100);
        chart.advance(Some(10), 1.0);
        assert_eq!(chart.segments().len(), 5 * 2);
    }
}
