//! Canonical three-leg test move: rotate out, dwell, rotate back.

use alloc::boxed::Box;
use alloc::vec::Vec;

use log::debug;

use crate::config::ProfileConfig;
use crate::error::Result;
use crate::trajectory::{compose, Composition, Discretizer, Segment};

use super::function::{Constant, MotionFunction, Rebased};
use super::profile::{SCurveProfile, DEFAULT_ACCEL_FRACTION, DEFAULT_JERK_FRACTION};

/// Forward S-curve to `displacement`, dwell, then S-curve back to zero.
///
/// Leg 1 runs over `[0, T]`, the dwell over `[T, T + D]` and the return leg
/// over `[T + D, 2T + D]`. Each leg is built in local time and re-based onto
/// the shared clock.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalMove {
    /// Duration of each rotation leg in seconds.
    pub move_time: f64,
    /// Dwell between the legs in seconds. Zero skips the dwell leg.
    pub dwell_time: f64,
    /// Jerk shaping both legs.
    pub max_jerk: f64,
    /// Displacement of the forward leg in degrees.
    pub displacement: f64,
    /// Jerk phase fraction of each leg.
    pub jerk_fraction: f64,
    /// Acceleration phase fraction of each leg.
    pub accel_fraction: f64,
}

impl Default for CanonicalMove {
    fn default() -> Self {
        Self {
            move_time: 10.0,
            dwell_time: 2.0,
            max_jerk: 10.0,
            displacement: 360.0,
            jerk_fraction: DEFAULT_JERK_FRACTION,
            accel_fraction: DEFAULT_ACCEL_FRACTION,
        }
    }
}

impl CanonicalMove {
    /// Build from the `[profile]` configuration section.
    pub fn from_config(config: &ProfileConfig) -> Self {
        Self {
            move_time: config.move_time,
            dwell_time: config.dwell_time,
            max_jerk: config.max_jerk,
            displacement: config.displacement.value(),
            jerk_fraction: config.jerk_fraction,
            accel_fraction: config.accel_fraction,
        }
    }

    /// End of the return leg, `2T + D`.
    pub fn total_time(&self) -> f64 {
        2.0 * self.move_time + self.dwell_time
    }

    fn leg(&self, displacement: f64) -> Result<SCurveProfile> {
        SCurveProfile::with_timing(
            self.max_jerk,
            self.move_time,
            displacement,
            self.jerk_fraction,
            self.accel_fraction,
        )
    }

    /// Timeline segments on the shared clock, ready for [`compose`].
    ///
    /// # Errors
    ///
    /// Returns a `ProfileError` if the leg parameters are unusable.
    pub fn segments(&self) -> Result<Vec<Segment<Box<dyn MotionFunction>>>> {
        let t = self.move_time;
        let d = self.dwell_time;
        let theta = self.displacement;

        let forward = self.leg(theta)?;
        let back = self.leg(-theta)?;

        let mut segments: Vec<Segment<Box<dyn MotionFunction>>> = Vec::with_capacity(3);
        segments.push(Segment::new(Box::new(forward), 0.0, t));
        if d > 0.0 {
            segments.push(Segment::new(Box::new(Constant(theta)), t, t + d));
        }
        segments.push(Segment::new(
            Box::new(Rebased::new(back, t + d, theta)),
            t + d,
            2.0 * t + d,
        ));

        Ok(segments)
    }

    /// Discretize the whole move into one trajectory.
    ///
    /// # Errors
    ///
    /// Returns profile, segment or discretization errors.
    pub fn discretize(&self, discretizer: &Discretizer) -> Result<Composition> {
        let segments = self.segments()?;
        let composition = compose(discretizer, &segments)?;
        debug!(
            "canonical move: {} samples over {} s",
            composition.trajectory.len(),
            self.total_time()
        );
        Ok(composition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerResolution;

    #[test]
    fn test_segment_boundaries() {
        let segments = CanonicalMove::default().segments().unwrap();

        let bounds: Vec<(f64, f64)> = segments.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(bounds, [(0.0, 10.0), (10.0, 12.0), (12.0, 22.0)]);
    }

    #[test]
    fn test_zero_dwell_skips_leg() {
        let mv = CanonicalMove {
            dwell_time: 0.0,
            ..CanonicalMove::default()
        };

        assert_eq!(mv.segments().unwrap().len(), 2);
        assert_eq!(mv.total_time(), 20.0);
    }

    #[test]
    fn test_move_returns_to_origin() {
        let discretizer = Discretizer::new(ControllerResolution::default());
        let composition = CanonicalMove::default().discretize(&discretizer).unwrap();
        let traj = &composition.trajectory;

        assert_eq!(traj.times[0], 0.0);
        assert_eq!(*traj.times.last().unwrap(), 22.0);
        assert_eq!(traj.angles[0], 0.0);
        assert!(traj.angles.last().unwrap().abs() < 1e-9);
        assert!(traj.is_strictly_increasing());

        let peak = traj.angles.iter().cloned().fold(f64::MIN, f64::max);
        assert!((peak - 360.0).abs() < 1e-9);
    }
}
