//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{bounded_message, ConfigError, Error, Result};

use super::SystemConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_trajectory::load_config;
///
/// let config = load_config("controller.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|e| Error::Config(ConfigError::IoError(bounded_message(&e.to_string()))))?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config: SystemConfig = toml::from_str(content)
        .map_err(|e| Error::Config(ConfigError::ParseError(bounded_message(e.message()))))?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AckPolicy;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.controller.microsteps.value(), 16);
        assert_eq!(config.encoding.angle_scale, 1_000_000);
        assert_eq!(config.serial.ack_policy, AckPolicy::Lenient);
    }

    #[test]
    fn test_parse_controller_section() {
        let toml = r#"
[controller]
step_angle_deg = 0.9
microsteps = 32
min_sample_interval_s = 0.005
"#;

        let config = parse_config(toml).unwrap();
        assert!((config.controller.step_angle.0 - 0.9).abs() < 1e-12);
        assert_eq!(config.controller.microsteps.value(), 32);
        assert!((config.controller.min_sample_interval - 0.005).abs() < 1e-12);
        assert_eq!(config.controller.coarse_samples, 1000);
    }

    #[test]
    fn test_parse_serial_section() {
        let toml = r#"
[serial]
port = "COM3"
baud_rate = 921600
ack_timeout_ms = 500
ack_policy = "strict"
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.serial.port.as_str(), "COM3");
        assert_eq!(config.serial.baud_rate, 921_600);
        assert_eq!(config.serial.ack_policy, AckPolicy::Strict);
    }

    #[test]
    fn test_zero_microsteps_rejected_at_parse() {
        let toml = r#"
[controller]
microsteps = 0
"#;

        assert!(matches!(
            parse_config(toml),
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }
}
