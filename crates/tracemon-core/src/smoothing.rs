/// Default pursuit rate, in 1/second.
pub const DEFAULT_PURSUIT_RATE: f64 = 5.0;

/// Exponential pursuit of the latest raw sample.
///
/// Each step closes `rate * elapsed` of the remaining gap to the target. The
/// fraction is capped at 1 so a long stall lands on the target instead of
/// overshooting past it.
#[derive(Debug, Clone)]
pub struct Smoother {
    displayed: f64,
    rate: f64,
}

impl Smoother {
    pub fn new(rate: f64) -> Self {
        Self {
            displayed: 0.0,
            rate,
        }
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Advance by `elapsed` seconds toward `target`. `None` means no sample is
    /// available this frame and the displayed value holds.
    pub fn step(&mut self, target: Option<i64>, elapsed: f64) -> f64 {
        let Some(target) = target else {
            return self.displayed;
        };
        let target = target as f64;
        let fraction = (self.rate * elapsed.max(0.0)).min(1.0);

        if self.displayed > target {
            self.displayed -= (self.displayed - target) * fraction;
        } else if self.displayed < target {
            self.displayed += (target - self.displayed) * fraction;
        }
        self.displayed
    }

    /// The value pushed into the ring for this frame.
    pub fn rounded(&self) -> i64 {
        self.displayed.round() as i64
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(DEFAULT_PURSUIT_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    #[test]
    fn converges_monotonically_without_overshoot() {
        let mut s = Smoother::default();
        let mut prev = s.displayed();
        for _ in 0..120 {
            let next = s.step(Some(100), FRAME);
            assert!(next >= prev, "not monotonic: {prev} -> {next}");
            assert!(next <= 100.0, "overshoot: {next}");
            prev = next;
        }
        assert!((s.displayed() - 100.0).abs() <= 1.0, "{}", s.displayed());
    }

    #[test]
    fn decays_toward_lower_target() {
        let mut s = Smoother::default();
        for _ in 0..600 {
            s.step(Some(80), FRAME);
        }
        let mut prev = s.displayed();
        for _ in 0..120 {
            let next = s.step(Some(20), FRAME);
            assert!(next <= prev && next >= 20.0);
            prev = next;
        }
        assert_eq!(s.rounded(), 20);
    }

    #[test]
    fn missing_sample_holds_value() {
        let mut s = Smoother::default();
        s.step(Some(60), 0.1);
        let held = s.displayed();
        assert_eq!(s.step(None, 0.1), held);
        assert_eq!(s.step(None, 5.0), held);
    }

    #[test]
    fn long_stall_lands_on_target() {
        let mut s = Smoother::default();
        assert_eq!(s.step(Some(42), 3.0), 42.0);
    }

    #[test]
    fn equal_target_is_noop() {
        let mut s = Smoother::default();
        s.step(Some(10), 1.0);
        assert_eq!(s.step(Some(10), FRAME), 10.0);
    }
}
