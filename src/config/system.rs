//! System configuration - root configuration structure.

use heapless::String;
use serde::Deserialize;

use super::units::{Degrees, Microsteps};

/// Root configuration structure from TOML.
///
/// Every section is optional; missing sections and fields fall back to the
/// defaults of a 1.8° motor at 1/16 microstepping talking at 115200 baud.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Controller resolution and discretization limits.
    pub controller: ControllerConfig,

    /// Binary trajectory encoding parameters.
    pub encoding: EncodingConfig,

    /// Canonical S-curve test move.
    pub profile: ProfileConfig,

    /// Serial link to the controller.
    pub serial: SerialConfig,
}

/// Controller resolution and discretizer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Full-step angle of the motor.
    #[serde(rename = "step_angle_deg")]
    pub step_angle: Degrees,

    /// Microstep divisor.
    pub microsteps: Microsteps,

    /// Floor on the sample interval in seconds.
    #[serde(rename = "min_sample_interval_s")]
    pub min_sample_interval: f64,

    /// Uniform samples used to estimate peak velocity.
    pub coarse_samples: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            step_angle: Degrees(1.8),
            microsteps: Microsteps::SIXTEENTH,
            min_sample_interval: 0.002,
            coarse_samples: 1000,
        }
    }
}

/// Fixed-rate file encoding settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Fixed-point multiplier applied to angles in degrees.
    pub angle_scale: u32,

    /// Sample period of fixed-rate files in microseconds.
    pub sample_period_us: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            angle_scale: 1_000_000,
            sample_period_us: 1000,
        }
    }
}

/// Canonical move parameters (forward rotation, dwell, return).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Duration of each rotation leg in seconds.
    #[serde(rename = "move_time_s")]
    pub move_time: f64,

    /// Dwell between the legs in seconds.
    #[serde(rename = "dwell_time_s")]
    pub dwell_time: f64,

    /// Peak jerk, in displacement units per s³.
    pub max_jerk: f64,

    /// Displacement of each leg.
    #[serde(rename = "displacement_deg")]
    pub displacement: Degrees,

    /// Jerk phase duration as a fraction of the move time.
    pub jerk_fraction: f64,

    /// Full acceleration phase duration as a fraction of the move time.
    pub accel_fraction: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            move_time: 10.0,
            dwell_time: 2.0,
            max_jerk: 10.0,
            displacement: Degrees(360.0),
            jerk_fraction: 0.1,
            accel_fraction: 0.2,
        }
    }
}

/// What to do when the controller doesn't acknowledge an axis payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckPolicy {
    /// Log a warning and carry on with the next axis.
    #[default]
    Lenient,
    /// Abort the session before `GO` is sent.
    Strict,
}

/// Serial link settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyACM0` or `COM3`.
    pub port: String<64>,

    /// Line speed.
    pub baud_rate: u32,

    /// How long to wait for each axis ACK, in milliseconds.
    pub ack_timeout_ms: u64,

    /// ACK failure policy.
    pub ack_policy: AckPolicy,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::try_from("/dev/ttyACM0").unwrap_or_default(),
            baud_rate: 115_200,
            ack_timeout_ms: 2000,
            ack_policy: AckPolicy::Lenient,
        }
    }
}
