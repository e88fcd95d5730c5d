//! Controller angular resolution derived from step angle and microstepping.

use libm::round;

use super::system::ControllerConfig;
use super::units::{Degrees, DegreesPerSec, Microsteps};

/// Angular resolution of one axis of the controller.
///
/// `theta_res = step_angle / microsteps` is the smallest angle the controller
/// can command; the discretizer bounds per-sample motion to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerResolution {
    /// Full-step angle of the motor.
    pub step_angle: Degrees,

    /// Microstep divisor on the driver.
    pub microsteps: Microsteps,
}

impl ControllerResolution {
    /// Create a resolution from a step angle and microstep divisor.
    pub fn new(step_angle: Degrees, microsteps: Microsteps) -> Self {
        Self {
            step_angle,
            microsteps,
        }
    }

    /// Compute the resolution from controller configuration.
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.step_angle, config.microsteps)
    }

    /// Angle per microstep in degrees.
    #[inline]
    pub fn theta_res(&self) -> f64 {
        self.step_angle.0 / self.microsteps.value() as f64
    }

    /// Nearest microstep index for an absolute angle.
    ///
    /// Returns `None` when the index is not finite or falls outside `i32`.
    #[inline]
    pub fn angle_to_steps(&self, angle_deg: f64) -> Option<i64> {
        let steps = round(angle_deg / self.theta_res());
        if steps.is_finite() && steps >= i32::MIN as f64 && steps <= i32::MAX as f64 {
            Some(steps as i64)
        } else {
            None
        }
    }

    /// Longest sample interval that keeps motion at `velocity` within one microstep.
    ///
    /// Returns `None` for a zero velocity (any interval works).
    pub fn interval_for(&self, velocity: DegreesPerSec) -> Option<f64> {
        let v = libm::fabs(velocity.0);
        if v > 0.0 {
            Some(self.theta_res() / v)
        } else {
            None
        }
    }
}

impl Default for ControllerResolution {
    /// 1.8° motor at 1/16 microstepping.
    fn default() -> Self {
        Self::new(Degrees(1.8), Microsteps::SIXTEENTH)
    }
}
