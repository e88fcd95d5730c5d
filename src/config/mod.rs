//! Configuration module for stepper-trajectory.
//!
//! Provides types for loading and validating controller, encoding, profile and
//! serial settings from TOML files (with `std` feature) or pre-built values.

mod controller;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use controller::ControllerResolution;
pub use system::{
    AckPolicy, ControllerConfig, EncodingConfig, ProfileConfig, SerialConfig, SystemConfig,
};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Degrees, DegreesPerSec, Microsteps};
