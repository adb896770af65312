//! Monotonic animation clock.
//!
//! The clock's hands and pendulum are driven purely by the seconds elapsed since
//! startup. Wall-clock time of day is never consulted.

use std::time::{Duration, Instant};

/// Elapsed time since a fixed start point.
#[derive(Debug, Clone, Copy)]
pub struct TimeSource {
    start: Instant,
}

impl TimeSource {
    /// Starts counting from now.
    pub fn start() -> Self {
        Self::from_instant(Instant::now())
    }

    /// Starts counting from an explicit instant.
    pub fn from_instant(start: Instant) -> Self {
        Self { start }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Seconds since the start point, for feeding the motion model.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Seconds between the start point and `now`, or zero if `now` is earlier.
    pub fn seconds_at(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.start).as_secs_f32()
    }
}

impl Default for TimeSource {
    fn default() -> Self {
        Self::start()
    }
}
