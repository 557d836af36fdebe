use std::time::{Duration, Instant};

/// Linear volume ramp between two levels, evaluated against a clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
}

impl Ramp {
    pub fn new(from: f32, to: f32, start: Instant, duration: Duration) -> Self {
        Self {
            from: from.clamp(0.0, 1.0),
            to: to.clamp(0.0, 1.0),
            start,
            duration,
        }
    }

    /// Fraction of the ramp completed at `now`, in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn level_at(&self, now: Instant) -> f32 {
        let t = self.progress(now);
        (self.from + (self.to - self.from) * t).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Level the ramp ends on.
    pub fn target(&self) -> f32 {
        self.to
    }
}
