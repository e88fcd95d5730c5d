//! # stepper-trajectory
//!
//! Resolution-bounded trajectory generation and upload for multi-axis stepper
//! controllers.
//!
//! ## Features
//!
//! - **Adaptive discretization**: sample any motion function so no step
//!   between samples exceeds one microstep
//! - **S-curve profiles**: jerk-limited seven-segment moves that land exactly
//!   on their target
//! - **Piecewise timelines**: validate and stitch segments, reporting every
//!   bad segment at once
//! - **Binary codecs**: fixed-rate fixed-point files, event-list float pairs
//!   and step-pulse records
//! - **Serial upload**: per-axis `BEGIN`/`OK` handshake followed by `GO`
//! - **no_std compatible**: the numeric core only needs `alloc`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_trajectory::{CanonicalMove, Discretizer, SystemConfig};
//! use stepper_trajectory::transport::{Axis, SerialSession};
//!
//! let config: SystemConfig = stepper_trajectory::load_config("controller.toml")?;
//!
//! let discretizer = Discretizer::from_config(&config.controller);
//! let composition = CanonicalMove::from_config(&config.profile).discretize(&discretizer)?;
//!
//! let mut session = SerialSession::open(&config.serial)?;
//! session.stage(Axis::X, composition.trajectory);
//! session.transfer()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): TOML file loading, file/stream codec helpers and the
//!   serial transport
//! - `alloc`: enables `serde/alloc` for no_std targets with an allocator

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

extern crate alloc;

// Core modules
pub mod codec;
pub mod config;
pub mod error;
pub mod motion;
pub mod trajectory;

#[cfg(feature = "std")]
pub mod transport;

// Re-exports for ergonomic API
pub use codec::{FixedRateTrajectory, TrajectoryFormat, TrajectoryPayload};
pub use config::{validate_config, ControllerResolution, SystemConfig};
pub use error::{Error, Result};
pub use motion::{CanonicalMove, Evaluation, MotionFunction, SCurveProfile};
pub use trajectory::{compose, Composition, Discretizer, Domain, Segment, Trajectory};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Degrees, DegreesPerSec, Microsteps};
