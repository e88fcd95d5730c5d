//! Motion module for stepper-trajectory.
//!
//! Continuous motion functions, preset shapes and jerk-limited S-curve
//! profiles.

mod canonical;
mod function;
pub mod presets;
mod profile;

pub use canonical::CanonicalMove;
pub use function::{from_fn, Constant, Evaluation, FnMotion, MotionFunction, Rebased};
pub use presets::Preset;
pub use profile::{
    ProfileSamples, ProfileState, SCurveProfile, DEFAULT_ACCEL_FRACTION, DEFAULT_JERK_FRACTION,
};
