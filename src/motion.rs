//! Closed-form animation of the clock's moving parts.
//!
//! All angles are in radians and depend only on elapsed seconds, so any frame can
//! be reproduced from its timestamp alone. The hands run fast on purpose: a full
//! hour-hand revolution takes six minutes.

use std::f32::consts::TAU;

pub const HOUR_DEGREES_PER_SECOND: f32 = 1.0;
pub const MINUTE_DEGREES_PER_SECOND: f32 = 6.0;
/// Peak swing of the pendulum to either side of vertical.
pub const PENDULUM_AMPLITUDE_DEGREES: f32 = 30.0;
/// Full swings (there and back) per second.
pub const PENDULUM_FREQUENCY_HZ: f32 = 0.5;

/// Rotation of the hour hand about the face normal.
pub fn hour_angle(t: f32) -> f32 {
    (t * HOUR_DEGREES_PER_SECOND).to_radians()
}

/// Rotation of the minute hand about the face normal.
pub fn minute_angle(t: f32) -> f32 {
    (t * MINUTE_DEGREES_PER_SECOND).to_radians()
}

/// Undamped sinusoidal swing, hanging straight down at `t = 0`.
pub fn pendulum_angle(t: f32) -> f32 {
    PENDULUM_AMPLITUDE_DEGREES.to_radians() * (TAU * PENDULUM_FREQUENCY_HZ * t).sin()
}

/// All animated angles for one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionAngles {
    pub hour: f32,
    pub minute: f32,
    pub pendulum: f32,
}

impl MotionAngles {
    pub fn at(t: f32) -> Self {
        Self {
            hour: hour_angle(t),
            minute: minute_angle(t),
            pendulum: pendulum_angle(t),
        }
    }
}
