use crate::ring::SampleRing;

/// Applied when any buffered value would draw past the top of the surface.
pub const SHRINK_STEP: f64 = 0.75;
/// Applied when everything sits comfortably below the headroom line.
pub const GROW_STEP: f64 = 1.25;
/// Fraction of the surface height that counts as "filled".
pub const HEADROOM: f64 = 0.9;
/// Growth only fires while the factor is at or below this.
pub const GROW_CEILING: f64 = 1.0;

/// What the controller did on its last step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleStep {
    Shrunk,
    Grown,
    Held,
}

/// Keeps the waveform on screen without letting it shrink to a sliver.
///
/// Reads only the current ring contents and its own scalar factor. One
/// multiplicative step at most per frame, so a large overflow takes several
/// frames to resolve.
#[derive(Debug, Clone)]
pub struct AutoScale {
    factor: f64,
    window_max: i64,
}

impl AutoScale {
    pub fn new() -> Self {
        Self {
            factor: 1.0,
            window_max: 0,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Maximum buffered value as of the last step. Shading only.
    pub fn window_max(&self) -> i64 {
        self.window_max
    }

    /// A zero-height surface has nothing to fit, so the factor is held.
    pub fn step(&mut self, ring: &SampleRing, height: u32) -> ScaleStep {
        if height == 0 {
            self.window_max = ring.max();
            return ScaleStep::Held;
        }
        let height = f64::from(height);
        let exceeds = |limit: f64| ring.iter().any(|v| v as f64 * self.factor > limit);

        let step = if exceeds(height) {
            self.factor *= SHRINK_STEP;
            ScaleStep::Shrunk
        } else if !exceeds(height * HEADROOM) && self.factor <= GROW_CEILING {
            self.factor *= GROW_STEP;
            ScaleStep::Grown
        } else {
            ScaleStep::Held
        };

        self.window_max = ring.max();
        step
    }
}

impl Default for AutoScale {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::ResizeAnchor;

    fn ring_of(values: &[i64]) -> SampleRing {
        let mut ring = SampleRing::new(values.len(), ResizeAnchor::Oldest).unwrap();
        values.iter().for_each(|&v| ring.push(v));
        ring
    }

    #[test]
    fn overflow_shrinks_once_and_skips_growth() {
        let mut scale = AutoScale::new();
        let ring = ring_of(&[10, 5000, 20]);
        let before = scale.factor();
        assert_eq!(scale.step(&ring, 100), ScaleStep::Shrunk);
        assert_eq!(scale.factor(), before * SHRINK_STEP);
    }

    #[test]
    fn large_overflow_resolves_over_several_frames() {
        let mut scale = AutoScale::new();
        let ring = ring_of(&[1000]);
        let mut frames = 0;
        while scale.step(&ring, 100) == ScaleStep::Shrunk {
            frames += 1;
        }
        assert!(frames > 1);
        assert!(1000.0 * scale.factor() <= 100.0);
    }

    #[test]
    fn empty_chart_grows_to_ceiling_then_stops() {
        let mut scale = AutoScale::new();
        let ring = ring_of(&[0, 0, 0]);
        assert_eq!(scale.step(&ring, 100), ScaleStep::Grown);
        assert_eq!(scale.factor(), GROW_STEP);
        assert_eq!(scale.step(&ring, 100), ScaleStep::Held);
        assert_eq!(scale.factor(), GROW_STEP);
    }

    #[test]
    fn no_growth_once_headroom_is_reached() {
        let mut scale = AutoScale::new();
        let ring = ring_of(&[190]);
        assert_eq!(scale.step(&ring, 200), ScaleStep::Held);
        assert_eq!(scale.factor(), 1.0);
    }

    #[test]
    fn growth_never_exceeds_one_step() {
        let mut scale = AutoScale::new();
        scale.factor = 0.01;
        let ring = ring_of(&[3, 9, 4]);
        for _ in 0..200 {
            let before = scale.factor();
            scale.step(&ring, 500);
            assert!(scale.factor() <= before * GROW_STEP);
            assert!(scale.factor() > 0.0);
        }
    }

    #[test]
    fn zero_height_holds_factor_until_a_real_size() {
        let mut scale = AutoScale::new();
        let ring = ring_of(&[50, 50, 50, 50]);
        for _ in 0..4000 {
            assert_eq!(scale.step(&ring, 0), ScaleStep::Held);
        }
        assert_eq!(scale.factor(), 1.0);
        assert_eq!(scale.window_max(), 50);

        assert_eq!(scale.step(&ring, 100), ScaleStep::Grown);
        assert_eq!(scale.factor(), GROW_STEP);
    }

    #[test]
    fn window_max_tracks_ring() {
        let mut scale = AutoScale::new();
        scale.step(&ring_of(&[3, 17, 4]), 100);
        assert_eq!(scale.window_max(), 17);
    }
}
