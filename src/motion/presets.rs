//! Preset bench-test shapes, one per axis.

use core::f64::consts::PI;

use super::function::{Evaluation, MotionFunction};

/// Ramp: 0 → 30° over 2 s, then hold.
pub fn ramp(t: f64) -> f64 {
    if t <= 2.0 {
        30.0 * (t / 2.0)
    } else {
        30.0
    }
}

/// Triangle: 0 → 30° → 0 over 4 s, then hold 0°.
pub fn triangle(t: f64) -> f64 {
    if t <= 2.0 {
        30.0 * (t / 2.0)
    } else if t <= 4.0 {
        30.0 * (1.0 - (t - 2.0) / 2.0)
    } else {
        0.0
    }
}

/// Slow sine: 10° amplitude, 6 s period.
pub fn sine(t: f64) -> f64 {
    10.0 * libm::sin(2.0 * PI * t / 6.0)
}

/// Named preset shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// See [`ramp`].
    Ramp,
    /// See [`triangle`].
    Triangle,
    /// See [`sine`].
    Sine,
}

impl Preset {
    /// All presets in X, Y, Z order.
    pub const ALL: [Preset; 3] = [Preset::Ramp, Preset::Triangle, Preset::Sine];

    /// Short lowercase name, used for file names.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Ramp => "ramp",
            Preset::Triangle => "triangle",
            Preset::Sine => "sine",
        }
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            Preset::Ramp => "ramp (0 to 30 deg over 2 s, hold)",
            Preset::Triangle => "triangle (0 to 30 deg to 0 over 4 s)",
            Preset::Sine => "sine (10 deg amplitude, 6 s period)",
        }
    }

    /// Angle in degrees at time `t`.
    pub fn angle_at(self, t: f64) -> f64 {
        match self {
            Preset::Ramp => ramp(t),
            Preset::Triangle => triangle(t),
            Preset::Sine => sine(t),
        }
    }
}

impl MotionFunction for Preset {
    fn evaluate(&self, times: &[f64]) -> Evaluation {
        Evaluation::Vector(times.iter().map(|&t| self.angle_at(t)).collect())
    }
}
