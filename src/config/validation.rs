//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::system::{ControllerConfig, EncodingConfig, ProfileConfig, SerialConfig};
use super::SystemConfig;

/// Validate a system configuration.
///
/// Checks:
/// - Step angle, microsteps and minimum sample interval are positive
/// - At least two coarse samples are taken
/// - Angle scale and sample period are nonzero
/// - Profile phase fractions fit inside the move
/// - Baud rate and ACK timeout are nonzero
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    validate_controller(&config.controller)?;
    validate_encoding(&config.encoding)?;
    validate_profile(&config.profile)?;
    validate_serial(&config.serial)?;
    Ok(())
}

fn validate_controller(config: &ControllerConfig) -> Result<()> {
    let step = config.step_angle.0;
    if !step.is_finite() || step <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidStepAngle(step)));
    }

    if config.microsteps.value() == 0 {
        return Err(Error::Config(ConfigError::InvalidMicrosteps(0)));
    }

    let dt_min = config.min_sample_interval;
    if !dt_min.is_finite() || dt_min <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidSampleInterval(dt_min)));
    }

    if config.coarse_samples < 2 {
        return Err(Error::Config(ConfigError::InvalidCoarseSamples(
            config.coarse_samples,
        )));
    }

    Ok(())
}

fn validate_encoding(config: &EncodingConfig) -> Result<()> {
    if config.angle_scale == 0 {
        return Err(Error::Config(ConfigError::InvalidAngleScale(0)));
    }

    if config.sample_period_us == 0 {
        return Err(Error::Config(ConfigError::InvalidSamplePeriod(0)));
    }

    Ok(())
}

fn validate_profile(config: &ProfileConfig) -> Result<()> {
    if !config.move_time.is_finite() || config.move_time <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidProfileTiming(
            "move_time_s must be > 0",
        )));
    }

    if !config.dwell_time.is_finite() || config.dwell_time < 0.0 {
        return Err(Error::Config(ConfigError::InvalidProfileTiming(
            "dwell_time_s must be >= 0",
        )));
    }

    if !config.max_jerk.is_finite() || config.max_jerk <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidProfileTiming(
            "max_jerk must be > 0",
        )));
    }

    let j = config.jerk_fraction;
    let a = config.accel_fraction;
    if !(j > 0.0 && 2.0 * j <= a && 2.0 * a <= 1.0) {
        return Err(Error::Config(ConfigError::InvalidProfileTiming(
            "need 0 < 2 * jerk_fraction <= accel_fraction <= 0.5",
        )));
    }

    Ok(())
}

fn validate_serial(config: &SerialConfig) -> Result<()> {
    if config.baud_rate == 0 {
        return Err(Error::Config(ConfigError::InvalidBaudRate(0)));
    }

    if config.ack_timeout_ms == 0 {
        return Err(Error::Config(ConfigError::InvalidAckTimeout(0)));
    }

    Ok(())
}
