//! Error types for stepper-trajectory.
//!
//! Provides unified error handling across configuration, discretization,
//! profile generation, binary encoding and serial transfer.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-trajectory operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Discretization of a single function failed
    Discretize(DiscretizeError),
    /// One or more timeline segments failed validation (all failures collected)
    Segments(Vec<SegmentError>),
    /// S-curve profile parameters are unusable
    Profile(ProfileError),
    /// Binary trajectory encoding or decoding error
    Format(FormatError),
    /// Serial transfer error
    Transfer(TransferError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Step angle must be finite and > 0
    InvalidStepAngle(f64),
    /// Microstep count must be > 0
    InvalidMicrosteps(u16),
    /// Minimum sample interval must be finite and > 0
    InvalidSampleInterval(f64),
    /// Coarse sample count must be at least 2
    InvalidCoarseSamples(usize),
    /// Fixed-point angle scale must be > 0
    InvalidAngleScale(u32),
    /// Fixed-rate sample period must be > 0
    InvalidSamplePeriod(u32),
    /// Profile timing values are inconsistent
    InvalidProfileTiming(&'static str),
    /// Baud rate must be > 0
    InvalidBaudRate(u32),
    /// ACK timeout must be > 0
    InvalidAckTimeout(u64),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Errors raised while discretizing one function over one domain.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscretizeError {
    /// Domain end must be strictly after its start (and both finite)
    InvalidDomain {
        /// Domain start in seconds
        start: f64,
        /// Domain end in seconds
        end: f64,
    },
    /// Function returned a vector whose length can't be broadcast to the sample count
    ShapeMismatch {
        /// Number of samples requested
        expected: usize,
        /// Number of values returned
        actual: usize,
    },
    /// Function produced NaN or infinity
    NonFiniteSample {
        /// Time at which the bad value was produced
        time: f64,
    },
    /// No segments were supplied to the composer
    EmptyTimeline,
}

/// A single timeline segment failure, reported with its 1-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentError {
    /// 1-based index of the failing segment
    pub index: usize,
    /// What went wrong
    pub kind: SegmentErrorKind,
}

/// Reasons a timeline segment is rejected before discretization.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentErrorKind {
    /// Segment domain is empty, reversed or non-finite
    InvalidDomain {
        /// Domain start in seconds
        start: f64,
        /// Domain end in seconds
        end: f64,
    },
    /// Upstream collaborator failed to construct the segment's function
    InvalidExpression(String),
    /// Segment starts before the previous segment ends
    OutOfOrder {
        /// Segment start in seconds
        start: f64,
        /// End of the preceding segment in seconds
        previous_end: f64,
    },
}

/// S-curve profile errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// Move time must be finite and > 0
    InvalidMoveTime(f64),
    /// Jerk must be finite and > 0
    InvalidJerk(f64),
    /// Jerk/acceleration phase fractions don't fit inside the move
    InvalidTiming {
        /// Jerk phase duration as a fraction of the move time
        jerk_fraction: f64,
        /// Full acceleration phase duration as a fraction of the move time
        accel_fraction: f64,
    },
}

/// Binary trajectory format errors.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Fixed-rate header magic doesn't match `GMBL`
    BadMagic(u32),
    /// Fixed-rate header version isn't supported
    UnsupportedVersion(u8),
    /// Fixed-rate header axis count isn't 1 or 3
    UnsupportedAxisCount(u8),
    /// Header field has an unusable value
    InvalidHeader(&'static str),
    /// Input ended before the declared header or body was complete
    UnexpectedEof {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },
    /// Payload variant doesn't match the requested format
    FormatMismatch {
        /// Format requested by the caller
        expected: &'static str,
        /// Format of the supplied payload
        found: &'static str,
    },
    /// Time and angle sequences differ in length
    LengthMismatch {
        /// Number of time samples
        times: usize,
        /// Number of angle samples
        angles: usize,
    },
    /// Angle doesn't fit the format's integer range after scaling
    SampleOutOfRange {
        /// Sample index
        index: usize,
        /// Angle in degrees
        angle: f64,
    },
    /// Too many samples for the format's count field
    TooManySamples(usize),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    Io(heapless::String<128>),
}

/// Serial transfer errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferError {
    /// Axis time and angle arrays differ in length (raised before any I/O)
    LengthMismatch {
        /// Axis label
        axis: char,
        /// Number of time samples
        times: usize,
        /// Number of angle samples
        angles: usize,
    },
    /// No ACK line arrived within the timeout (fatal only under strict policy)
    Timeout {
        /// Axis label
        axis: char,
    },
    /// Controller answered something other than `OK` (fatal only under strict policy)
    Rejected {
        /// Axis label
        axis: char,
        /// Response line as received
        response: String,
    },
    /// Port open or write failure
    Serial(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Discretize(e) => write!(f, "Discretization error: {}", e),
            Error::Segments(errors) => {
                write!(f, "{} invalid segment(s)", errors.len())?;
                for e in errors {
                    write!(f, "; {}", e)?;
                }
                Ok(())
            }
            Error::Profile(e) => write!(f, "Profile error: {}", e),
            Error::Format(e) => write!(f, "Format error: {}", e),
            Error::Transfer(e) => write!(f, "Transfer error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidStepAngle(v) => write!(f, "Invalid step angle: {}. Must be > 0", v),
            ConfigError::InvalidMicrosteps(v) => write!(f, "Invalid microsteps: {}. Must be > 0", v),
            ConfigError::InvalidSampleInterval(v) => {
                write!(f, "Invalid minimum sample interval: {} s. Must be > 0", v)
            }
            ConfigError::InvalidCoarseSamples(v) => {
                write!(f, "Invalid coarse sample count: {}. Must be >= 2", v)
            }
            ConfigError::InvalidAngleScale(v) => write!(f, "Invalid angle scale: {}. Must be > 0", v),
            ConfigError::InvalidSamplePeriod(v) => {
                write!(f, "Invalid sample period: {} us. Must be > 0", v)
            }
            ConfigError::InvalidProfileTiming(msg) => write!(f, "Invalid profile timing: {}", msg),
            ConfigError::InvalidBaudRate(v) => write!(f, "Invalid baud rate: {}. Must be > 0", v),
            ConfigError::InvalidAckTimeout(v) => write!(f, "Invalid ACK timeout: {} ms. Must be > 0", v),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for DiscretizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscretizeError::InvalidDomain { start, end } => {
                write!(f, "Invalid domain [{}, {}): end must be after start", start, end)
            }
            DiscretizeError::ShapeMismatch { expected, actual } => {
                write!(f, "Function returned {} values for {} samples", actual, expected)
            }
            DiscretizeError::NonFiniteSample { time } => {
                write!(f, "Function is not finite at t = {}", time)
            }
            DiscretizeError::EmptyTimeline => write!(f, "Timeline has no segments"),
        }
    }
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SegmentErrorKind::InvalidDomain { start, end } => {
                write!(f, "Invalid domain on segment {}: [{}, {})", self.index, start, end)
            }
            SegmentErrorKind::InvalidExpression(msg) => {
                write!(f, "Invalid expression on segment {}: {}", self.index, msg)
            }
            SegmentErrorKind::OutOfOrder { start, previous_end } => write!(
                f,
                "Segment {} starts at {} before the previous segment ends at {}",
                self.index, start, previous_end
            ),
        }
    }
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::InvalidMoveTime(v) => write!(f, "Invalid move time: {} s. Must be > 0", v),
            ProfileError::InvalidJerk(v) => write!(f, "Invalid jerk: {}. Must be > 0", v),
            ProfileError::InvalidTiming {
                jerk_fraction,
                accel_fraction,
            } => write!(
                f,
                "Invalid phase fractions: jerk {} / accel {} (need 0 < 2*jerk <= accel <= 0.5)",
                jerk_fraction, accel_fraction
            ),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::BadMagic(m) => write!(f, "Bad magic: 0x{:08X} (expected 0x4C424D47)", m),
            FormatError::UnsupportedVersion(v) => write!(f, "Unsupported format version: {}", v),
            FormatError::UnsupportedAxisCount(n) => write!(f, "Unsupported axis count: {}", n),
            FormatError::InvalidHeader(msg) => write!(f, "Invalid header: {}", msg),
            FormatError::UnexpectedEof { expected, actual } => {
                write!(f, "Unexpected EOF: needed {} bytes, got {}", expected, actual)
            }
            FormatError::FormatMismatch { expected, found } => {
                write!(f, "Requested {} format but payload is {}", expected, found)
            }
            FormatError::LengthMismatch { times, angles } => {
                write!(f, "{} time samples but {} angle samples", times, angles)
            }
            FormatError::SampleOutOfRange { index, angle } => {
                write!(f, "Sample {} ({} deg) overflows the integer range", index, angle)
            }
            FormatError::TooManySamples(n) => write!(f, "{} samples exceed the format limit", n),
            #[cfg(feature = "std")]
            FormatError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::LengthMismatch { axis, times, angles } => write!(
                f,
                "Axis {}: {} time samples but {} angle samples",
                axis, times, angles
            ),
            TransferError::Timeout { axis } => write!(f, "Axis {}: timed out waiting for OK", axis),
            TransferError::Rejected { axis, response } => {
                write!(f, "Axis {}: controller answered {:?}", axis, response)
            }
            TransferError::Serial(msg) => write!(f, "Serial error: {}", msg),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DiscretizeError> for Error {
    fn from(e: DiscretizeError) -> Self {
        Error::Discretize(e)
    }
}

impl From<ProfileError> for Error {
    fn from(e: ProfileError) -> Self {
        Error::Profile(e)
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Format(e)
    }
}

impl From<TransferError> for Error {
    fn from(e: TransferError) -> Self {
        Error::Transfer(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for DiscretizeError {}

#[cfg(feature = "std")]
impl std::error::Error for SegmentError {}

#[cfg(feature = "std")]
impl std::error::Error for ProfileError {}

#[cfg(feature = "std")]
impl std::error::Error for FormatError {}

#[cfg(feature = "std")]
impl std::error::Error for TransferError {}

/// Truncate a message into a fixed-capacity string, dropping what doesn't fit.
#[cfg(feature = "std")]
pub(crate) fn bounded_message<const N: usize>(msg: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in msg.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn test_segment_errors_listed_in_order() {
        let err = Error::Segments(vec![
            SegmentError {
                index: 1,
                kind: SegmentErrorKind::InvalidDomain { start: 2.0, end: 1.0 },
            },
            SegmentError {
                index: 3,
                kind: SegmentErrorKind::InvalidExpression("bad token".into()),
            },
        ]);

        let msg = err.to_string();
        assert!(msg.starts_with("2 invalid segment(s)"));
        assert!(msg.find("segment 1").unwrap() < msg.find("segment 3").unwrap());
        assert!(msg.contains("bad token"));
    }

    #[test]
    fn test_from_conversions() {
        let err: Error = FormatError::BadMagic(0).into();
        assert!(matches!(err, Error::Format(FormatError::BadMagic(0))));

        let err: Error = TransferError::Timeout { axis: 'Z' }.into();
        assert_eq!(err.to_string(), "Transfer error: Axis Z: timed out waiting for OK");
    }
}
