//! Automatic day/night cycle driving the theme scalar continuously.
//!
//! Time of day is normalized to `[0, 1)`: 0 is midnight (scalar 0), 0.5 is
//! noon (scalar 100). The scalar follows a raised cosine so dawn and dusk
//! move slowest near the extremes.

use std::f64::consts::TAU;

use super::Direction;

/// Clock for the continuous mode.
#[derive(Debug, Clone)]
pub struct DayNightCycle {
    /// Current time of day, normalized `[0, 1)`.
    pub time_of_day: f64,
    /// Length of one full day, real-time seconds.
    pub period_seconds: f64,
    /// Frozen when set.
    pub paused: bool,
}

impl DayNightCycle {
    /// Create a cycle at midnight.
    pub fn new(period_seconds: f64) -> Self {
        Self {
            time_of_day: 0.0,
            period_seconds: period_seconds.max(f64::EPSILON),
            paused: false,
        }
    }

    /// Advance by `dt` real-time seconds.
    pub fn tick(&mut self, dt: f64) {
        if self.paused || !dt.is_finite() {
            return;
        }
        self.time_of_day = (self.time_of_day + dt / self.period_seconds).rem_euclid(1.0);
    }

    /// Theme scalar for the current time of day.
    pub fn value(&self) -> f32 {
        ((1.0 - (TAU * self.time_of_day).cos()) / 2.0 * 100.0) as f32
    }

    /// Morning rises toward day, afternoon falls toward night.
    pub fn direction(&self) -> Direction {
        if self.time_of_day < 0.5 {
            Direction::TowardDay
        } else {
            Direction::TowardNight
        }
    }

    /// Move the clock so that it reproduces `value` heading in `direction`.
    pub fn sync_to(&mut self, value: f32, direction: Direction) {
        let v = f64::from(value.clamp(0.0, 100.0)) / 100.0;
        let morning = (1.0 - 2.0 * v).clamp(-1.0, 1.0).acos() / TAU;
        self.time_of_day = match direction {
            Direction::TowardDay => morning,
            Direction::TowardNight => (1.0 - morning).rem_euclid(1.0),
        };
    }
}
