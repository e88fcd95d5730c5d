//! Binary trajectory codecs.
//!
//! Two formats share one entry point, selected explicitly by the caller:
//!
//! - [`TrajectoryFormat::FixedRate`]: header plus fixed-point samples at a
//!   constant rate (see [`fixed_rate`]).
//! - [`TrajectoryFormat::EventList`]: count plus `(time, angle)` float pairs
//!   (see [`event_list`]).
//!
//! Neither stream is self-describing enough to guess the format from, so the
//! payload variant must match the selector.

use alloc::vec::Vec;

use crate::error::{Error, FormatError, Result};
use crate::trajectory::Trajectory;

pub mod event_list;
pub mod fixed_rate;
pub mod pulse;

pub use fixed_rate::{FixedRateTrajectory, TrajectoryFileHeader};
pub use pulse::{StepPulse, StepPulseTrain};

/// Wire format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrajectoryFormat {
    /// Format A: `GMBL` header, fixed-point samples at a constant rate.
    FixedRate,
    /// Format B: count, then f32 `(time, angle)` pairs.
    EventList,
}

impl TrajectoryFormat {
    /// Short name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            TrajectoryFormat::FixedRate => "fixed-rate",
            TrajectoryFormat::EventList => "event-list",
        }
    }
}

/// Data carried by either format.
#[derive(Debug, Clone, PartialEq)]
pub enum TrajectoryPayload {
    /// Fixed-rate samples.
    FixedRate(FixedRateTrajectory),
    /// Timed samples.
    EventList(Trajectory),
}

impl TrajectoryPayload {
    /// Format this payload belongs to.
    pub fn format(&self) -> TrajectoryFormat {
        match self {
            TrajectoryPayload::FixedRate(_) => TrajectoryFormat::FixedRate,
            TrajectoryPayload::EventList(_) => TrajectoryFormat::EventList,
        }
    }
}

impl From<FixedRateTrajectory> for TrajectoryPayload {
    fn from(value: FixedRateTrajectory) -> Self {
        TrajectoryPayload::FixedRate(value)
    }
}

impl From<Trajectory> for TrajectoryPayload {
    fn from(value: Trajectory) -> Self {
        TrajectoryPayload::EventList(value)
    }
}

/// Encode `payload` in `format`.
///
/// # Errors
///
/// `FormatMismatch` if the payload variant isn't `format`, otherwise the
/// format's own encode errors.
pub fn encode(format: TrajectoryFormat, payload: &TrajectoryPayload) -> Result<Vec<u8>> {
    match (format, payload) {
        (TrajectoryFormat::FixedRate, TrajectoryPayload::FixedRate(t)) => t.encode(),
        (TrajectoryFormat::EventList, TrajectoryPayload::EventList(t)) => event_list::encode(t),
        (expected, found) => Err(FormatError::FormatMismatch {
            expected: expected.name(),
            found: found.format().name(),
        }
        .into()),
    }
}

/// Decode `bytes` as `format`.
///
/// # Errors
///
/// The format's decode errors. Nothing partial is ever returned.
pub fn decode(format: TrajectoryFormat, bytes: &[u8]) -> Result<TrajectoryPayload> {
    match format {
        TrajectoryFormat::FixedRate => FixedRateTrajectory::decode(bytes).map(Into::into),
        TrajectoryFormat::EventList => event_list::decode(bytes).map(Into::into),
    }
}

/// Copy `N` bytes at `offset`, or report how many were missing.
pub(crate) fn le_array<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    bytes
        .get(offset..offset + N)
        .and_then(|s| <[u8; N]>::try_from(s).ok())
        .ok_or_else(|| {
            Error::from(FormatError::UnexpectedEof {
                expected: offset + N,
                actual: bytes.len(),
            })
        })
}

#[cfg(feature = "std")]
mod io {
    use std::fs;
    use std::io::{Read, Write};
    use std::path::Path;

    use crate::error::{bounded_message, Error, FormatError, Result};

    use super::{decode, encode, TrajectoryFormat, TrajectoryPayload};

    fn io_error(e: std::io::Error) -> Error {
        Error::Format(FormatError::Io(bounded_message(&e.to_string())))
    }

    /// Encode `payload` and write it to `writer`.
    ///
    /// # Errors
    ///
    /// Encode errors, or `FormatError::Io` if the write fails.
    pub fn write_to<W: Write>(
        format: TrajectoryFormat,
        payload: &TrajectoryPayload,
        mut writer: W,
    ) -> Result<()> {
        let bytes = encode(format, payload)?;
        writer.write_all(&bytes).map_err(io_error)?;
        writer.flush().map_err(io_error)
    }

    /// Read `reader` to the end and decode it.
    ///
    /// # Errors
    ///
    /// `FormatError::Io` if the read fails, otherwise decode errors.
    pub fn read_from<R: Read>(format: TrajectoryFormat, mut reader: R) -> Result<TrajectoryPayload> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(io_error)?;
        decode(format, &bytes)
    }

    /// Encode `payload` into a file, replacing it if present.
    ///
    /// # Errors
    ///
    /// Encode errors, or `FormatError::Io`.
    pub fn save<P: AsRef<Path>>(
        format: TrajectoryFormat,
        payload: &TrajectoryPayload,
        path: P,
    ) -> Result<()> {
        let bytes = encode(format, payload)?;
        fs::write(path, bytes).map_err(io_error)
    }

    /// Decode a whole file.
    ///
    /// # Errors
    ///
    /// `FormatError::Io`, otherwise decode errors.
    pub fn load<P: AsRef<Path>>(format: TrajectoryFormat, path: P) -> Result<TrajectoryPayload> {
        let bytes = fs::read(path).map_err(io_error)?;
        decode(format, &bytes)
    }
}

#[cfg(feature = "std")]
pub use io::{load, read_from, save, write_to};
