use std::time::{Duration, Instant};

/// Measures the wall-clock delta between frames.
///
/// The delta is capped at two frame intervals so a stalled frame (window
/// drag, debugger pause) does not turn into one giant physics step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new(frame_interval: Duration) -> Self {
        Self::starting_at(Instant::now(), frame_interval)
    }

    pub fn starting_at(now: Instant, frame_interval: Duration) -> Self {
        Self {
            last: now,
            max_delta: frame_interval * 2,
        }
    }

    /// Seconds since the previous tick.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let delta = now.saturating_duration_since(self.last).min(self.max_delta);
        self.last = now;
        delta.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_micros(16_667);

    #[test]
    fn reports_delta_between_ticks() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start, FRAME);
        let dt = clock.tick_at(start + Duration::from_millis(10));
        assert!((dt - 0.010).abs() < 1e-9);
    }

    #[test]
    fn caps_stalls_at_two_frames() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start, FRAME);
        let dt = clock.tick_at(start + Duration::from_secs(3));
        assert!((dt - (FRAME * 2).as_secs_f64()).abs() < 1e-9);
    }

    #[test]
    fn backwards_time_is_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(start, FRAME);
        assert_eq!(clock.tick_at(start - Duration::from_millis(5)), 0.0);
    }
}
