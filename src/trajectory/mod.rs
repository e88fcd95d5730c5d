//! Trajectory module for stepper-trajectory.
//!
//! Turns motion functions into resolution-bounded sample sequences and
//! stitches piecewise timelines together.

mod compose;
mod discretize;
mod samples;

pub use compose::{compose, Composition, Segment, SegmentSummary};
pub use discretize::{Discretized, Discretizer, DEFAULT_COARSE_SAMPLES, DEFAULT_MIN_INTERVAL};
pub use samples::{Domain, Trajectory};
