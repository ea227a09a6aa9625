//! Fixed-step clock

use std::time::Duration;

/// Turns variable frame deltas into a whole number of fixed steps
///
/// Leftover time carries into the next call, so the simulation advances at
/// the configured rate regardless of how frames are sliced.
#[derive(Debug, Clone, Copy)]
pub struct StepClock {
    interval: Duration,
    accumulated: Duration,
}

impl StepClock {
    /// Create a clock ticking `rate` times per second
    ///
    /// Non-positive rates fall back to 30 Hz.
    #[must_use]
    pub fn from_rate(rate: f32) -> Self {
        let rate = if rate > 0.0 { rate } else { 30.0 };
        Self {
            interval: Duration::from_secs_f32(1.0 / rate),
            accumulated: Duration::ZERO,
        }
    }

    /// Length of one step
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated towards the next step
    #[must_use]
    pub fn pending(&self) -> Duration {
        self.accumulated
    }

    /// Add elapsed time and return how many steps are now due
    pub fn advance(&mut self, delta: Duration) -> u32 {
        self.accumulated += delta;

        let mut steps = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            steps += 1;
        }
        steps
    }
}

impl Default for StepClock {
    fn default() -> Self {
        Self::from_rate(30.0)
    }
}
