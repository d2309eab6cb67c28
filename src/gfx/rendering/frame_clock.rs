use std::time::{Duration, Instant};

use log::warn;

/// Measures the time between consecutive frames
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    /// Starts measuring from `start`.
    pub fn new(start: Instant) -> Self {
        Self { last: start }
    }

    /// Elapsed time since the previous tick, never negative.
    pub fn tick(&mut self, now: Instant) -> Duration {
        if now < self.last {
            warn!("Frame timestamp went backwards, reporting a zero delta");
            return Duration::ZERO;
        }

        let delta = now.duration_since(self.last);
        self.last = now;
        delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_between_ticks() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start);

        assert_eq!(clock.tick(start + Duration::from_millis(16)), Duration::from_millis(16));
        assert_eq!(clock.tick(start + Duration::from_millis(40)), Duration::from_millis(24));
    }

    #[test]
    fn test_backwards_time_is_clamped() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::new(start);

        assert_eq!(clock.tick(start - Duration::from_millis(5)), Duration::ZERO);
        assert_eq!(clock.tick(start + Duration::from_millis(5)), Duration::from_millis(5));
    }
}
