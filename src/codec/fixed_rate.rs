//! Fixed-rate trajectory files ("GMBL").
//!
//! Layout (little-endian):
//!
//! ```text
//! offset size field
//!      0    4 magic          0x4C424D47 ("GMBL")
//!      4    1 version        1
//!      5    1 axis_count     1, or 3 for interleaved legacy frames
//!      6    2 reserved       0
//!      8    4 sample_dt_us
//!     12    8 total_samples  frames, not values
//!     20    4 angle_scale    fixed-point multiplier (deg * scale)
//!     24    4 flags          bit0 positions, bit1 velocities
//!     28    4 header_crc32   written 0, not checked
//!     32  ... i32 samples, axis_count per frame
//! ```

use alloc::vec::Vec;

use crate::error::{DiscretizeError, Error, FormatError, Result};
use crate::motion::MotionFunction;
use crate::trajectory::{Discretized, Trajectory};

use super::le_array;

/// File magic, `"GMBL"` read as a little-endian u32.
pub const MAGIC: u32 = 0x4C42_4D47;

/// Supported header version.
pub const VERSION: u8 = 1;

/// Header size in bytes.
pub const HEADER_LEN: usize = 32;

/// Default fixed-point multiplier (micro-degrees).
pub const DEFAULT_ANGLE_SCALE: u32 = 1_000_000;

/// Header flag: position samples present.
pub const FLAG_POSITIONS: u32 = 1 << 0;

/// Header flag: velocity samples present (reserved, never set).
pub const FLAG_VELOCITIES: u32 = 1 << 1;

/// Parsed 32-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryFileHeader {
    /// Must equal [`MAGIC`].
    pub magic: u32,
    /// Must equal [`VERSION`].
    pub version: u8,
    /// 1 or 3.
    pub axis_count: u8,
    /// Written as zero.
    pub reserved: u16,
    /// Sample period in microseconds.
    pub sample_period_us: u32,
    /// Number of frames in the body.
    pub total_samples: u64,
    /// Fixed-point multiplier.
    pub angle_scale: u32,
    /// Content flags.
    pub flags: u32,
    /// Reserved for a header checksum; written as zero.
    pub header_crc32: u32,
}

impl TrajectoryFileHeader {
    /// Serialize to 32 little-endian bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&self.magic.to_le_bytes());
        out[4] = self.version;
        out[5] = self.axis_count;
        out[6..8].copy_from_slice(&self.reserved.to_le_bytes());
        out[8..12].copy_from_slice(&self.sample_period_us.to_le_bytes());
        out[12..20].copy_from_slice(&self.total_samples.to_le_bytes());
        out[20..24].copy_from_slice(&self.angle_scale.to_le_bytes());
        out[24..28].copy_from_slice(&self.flags.to_le_bytes());
        out[28..32].copy_from_slice(&self.header_crc32.to_le_bytes());
        out
    }

    /// Parse and check a header.
    ///
    /// # Errors
    ///
    /// `UnexpectedEof` for fewer than 32 bytes, then `BadMagic`,
    /// `UnsupportedVersion`, `UnsupportedAxisCount` or `InvalidHeader`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(FormatError::UnexpectedEof {
                expected: HEADER_LEN,
                actual: bytes.len(),
            }
            .into());
        }

        let header = Self {
            magic: u32::from_le_bytes(le_array(bytes, 0)?),
            version: bytes[4],
            axis_count: bytes[5],
            reserved: u16::from_le_bytes(le_array(bytes, 6)?),
            sample_period_us: u32::from_le_bytes(le_array(bytes, 8)?),
            total_samples: u64::from_le_bytes(le_array(bytes, 12)?),
            angle_scale: u32::from_le_bytes(le_array(bytes, 20)?),
            flags: u32::from_le_bytes(le_array(bytes, 24)?),
            header_crc32: u32::from_le_bytes(le_array(bytes, 28)?),
        };
        header.check()?;
        Ok(header)
    }

    fn check(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(FormatError::BadMagic(self.magic).into());
        }
        if self.version != VERSION {
            return Err(FormatError::UnsupportedVersion(self.version).into());
        }
        check_axis_count(self.axis_count)?;
        if self.angle_scale == 0 {
            return Err(FormatError::InvalidHeader("angle_scale is zero").into());
        }
        Ok(())
    }

    /// Body size in bytes declared by this header.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` if the size doesn't fit in memory.
    pub fn body_len(&self) -> Result<usize> {
        usize::try_from(self.total_samples)
            .ok()
            .and_then(|n| n.checked_mul(self.axis_count as usize))
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| FormatError::InvalidHeader("total_samples too large").into())
    }
}

fn check_axis_count(axis_count: u8) -> Result<()> {
    match axis_count {
        1 | 3 => Ok(()),
        n => Err(FormatError::UnsupportedAxisCount(n).into()),
    }
}

/// Fixed-rate samples for one axis, or three interleaved axes.
///
/// `samples` holds angles in degrees, frame by frame: for three axes the
/// order is `x0, y0, z0, x1, y1, z1, ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRateTrajectory {
    /// Sample period in microseconds.
    pub sample_period_us: u32,
    /// Fixed-point multiplier used on encode.
    pub angle_scale: u32,
    /// 1 or 3.
    pub axis_count: u8,
    /// Angles in degrees, interleaved by frame.
    pub samples: Vec<f64>,
}

impl FixedRateTrajectory {
    /// Single-axis body with the default angle scale.
    pub fn single_axis(sample_period_us: u32, samples: Vec<f64>) -> Self {
        Self {
            sample_period_us,
            angle_scale: DEFAULT_ANGLE_SCALE,
            axis_count: 1,
            samples,
        }
    }

    /// Evaluate `function` at `k * period` for `k in 0..total`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` for a zero period, or a discretization error
    /// if the function output is unusable.
    pub fn sample<F>(function: &F, sample_period_us: u32, total: usize) -> Result<Self>
    where
        F: MotionFunction + ?Sized,
    {
        if sample_period_us == 0 {
            return Err(FormatError::InvalidHeader("sample period is zero").into());
        }

        let period = sample_period_us as f64 / 1e6;
        let times: Vec<f64> = (0..total).map(|k| k as f64 * period).collect();
        let samples = function.evaluate(&times).resolve(total)?;
        if let Some(i) = samples.iter().position(|v| !v.is_finite()) {
            return Err(DiscretizeError::NonFiniteSample { time: times[i] }.into());
        }

        Ok(Self::single_axis(sample_period_us, samples))
    }

    /// Reuse a single-segment discretization at its chosen interval.
    ///
    /// The period is `dt` rounded to whole microseconds (at least 1).
    pub fn from_discretized(discretized: &Discretized) -> Self {
        let period = libm::round(discretized.dt * 1e6).clamp(1.0, u32::MAX as f64) as u32;
        Self::single_axis(period, discretized.trajectory.angles.clone())
    }

    /// Number of frames.
    pub fn total_samples(&self) -> usize {
        match self.axis_count {
            0 => 0,
            n => self.samples.len() / n as usize,
        }
    }

    /// Angles of one axis (0-based), de-interleaved.
    pub fn axis(&self, index: usize) -> Option<Vec<f64>> {
        let n = self.axis_count as usize;
        if index >= n {
            return None;
        }
        Some(self.samples.iter().skip(index).step_by(n).copied().collect())
    }

    /// One axis as a timed trajectory starting at zero.
    pub fn to_trajectory(&self, index: usize) -> Option<Trajectory> {
        let angles = self.axis(index)?;
        let period = self.sample_period_us as f64 / 1e6;
        let times = (0..angles.len()).map(|k| k as f64 * period).collect();
        Some(Trajectory { times, angles })
    }

    /// Header describing this body.
    pub fn header(&self) -> TrajectoryFileHeader {
        TrajectoryFileHeader {
            magic: MAGIC,
            version: VERSION,
            axis_count: self.axis_count,
            reserved: 0,
            sample_period_us: self.sample_period_us,
            total_samples: self.total_samples() as u64,
            angle_scale: self.angle_scale,
            flags: FLAG_POSITIONS,
            header_crc32: 0,
        }
    }

    /// Serialize header and body.
    ///
    /// # Errors
    ///
    /// `UnsupportedAxisCount`, `InvalidHeader` (zero scale or a partial
    /// frame) or `SampleOutOfRange` for angles that overflow `i32` after
    /// scaling.
    pub fn encode(&self) -> Result<Vec<u8>> {
        check_axis_count(self.axis_count)?;
        if self.angle_scale == 0 {
            return Err(FormatError::InvalidHeader("angle_scale is zero").into());
        }
        if self.samples.len() % self.axis_count as usize != 0 {
            return Err(FormatError::InvalidHeader("partial frame in samples").into());
        }

        let scale = self.angle_scale as f64;
        let mut out = Vec::with_capacity(HEADER_LEN + 4 * self.samples.len());
        out.extend_from_slice(&self.header().to_bytes());

        for (index, &angle) in self.samples.iter().enumerate() {
            let q = libm::round(angle * scale);
            if !(q >= i32::MIN as f64 && q <= i32::MAX as f64) {
                return Err(FormatError::SampleOutOfRange { index, angle }.into());
            }
            out.extend_from_slice(&(q as i32).to_le_bytes());
        }

        Ok(out)
    }

    /// Parse header and body. Bytes past the declared body are ignored.
    ///
    /// # Errors
    ///
    /// Header errors, or `UnexpectedEof` if the body is short.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = TrajectoryFileHeader::from_bytes(bytes)?;
        let body_len = header.body_len()?;
        let expected = HEADER_LEN
            .checked_add(body_len)
            .ok_or_else(|| Error::from(FormatError::InvalidHeader("total_samples too large")))?;
        if bytes.len() < expected {
            return Err(FormatError::UnexpectedEof {
                expected,
                actual: bytes.len(),
            }
            .into());
        }

        let scale = header.angle_scale as f64;
        let samples = bytes[HEADER_LEN..expected]
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64 / scale)
            .collect();

        Ok(Self {
            sample_period_us: header.sample_period_us,
            angle_scale: header.angle_scale,
            axis_count: header.axis_count,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::Preset;
    use alloc::vec;

    #[test]
    fn test_header_layout() {
        let traj = FixedRateTrajectory::single_axis(1000, vec![0.0, 1.5]);
        let bytes = traj.encode().unwrap();

        assert_eq!(bytes.len(), 32 + 8);
        assert_eq!(&bytes[0..4], b"GMBL");
        assert_eq!(bytes[4], 1);
        assert_eq!(bytes[5], 1);
        assert_eq!(&bytes[8..12], &1000u32.to_le_bytes());
        assert_eq!(&bytes[12..20], &2u64.to_le_bytes());
        assert_eq!(&bytes[20..24], &1_000_000u32.to_le_bytes());
        assert_eq!(&bytes[24..28], &1u32.to_le_bytes());
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0]);
        assert_eq!(&bytes[36..40], &1_500_000i32.to_le_bytes());
    }

    #[test]
    fn test_round_trip_within_scale() {
        let traj = FixedRateTrajectory::sample(&Preset::Sine, 1000, 6000).unwrap();
        let decoded = FixedRateTrajectory::decode(&traj.encode().unwrap()).unwrap();

        assert_eq!(decoded.total_samples(), 6000);
        for (a, b) in traj.samples.iter().zip(&decoded.samples) {
            assert!((a - b).abs() <= 1.0 / 1_000_000.0);
        }
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = FixedRateTrajectory::single_axis(1000, vec![0.0])
            .encode()
            .unwrap();
        bytes[0] = b'X';

        assert!(matches!(
            FixedRateTrajectory::decode(&bytes),
            Err(Error::Format(FormatError::BadMagic(_)))
        ));
    }

    #[test]
    fn test_unsupported_version_and_axes() {
        let good = FixedRateTrajectory::single_axis(1000, vec![0.0])
            .encode()
            .unwrap();

        let mut bytes = good.clone();
        bytes[4] = 2;
        assert_eq!(
            FixedRateTrajectory::decode(&bytes),
            Err(Error::Format(FormatError::UnsupportedVersion(2)))
        );

        let mut bytes = good;
        bytes[5] = 2;
        assert_eq!(
            FixedRateTrajectory::decode(&bytes),
            Err(Error::Format(FormatError::UnsupportedAxisCount(2)))
        );
    }

    #[test]
    fn test_truncated_body() {
        let bytes = FixedRateTrajectory::single_axis(1000, vec![0.0, 1.0, 2.0])
            .encode()
            .unwrap();

        assert_eq!(
            FixedRateTrajectory::decode(&bytes[..40]),
            Err(Error::Format(FormatError::UnexpectedEof {
                expected: 44,
                actual: 40
            }))
        );
        assert!(matches!(
            FixedRateTrajectory::decode(&bytes[..10]),
            Err(Error::Format(FormatError::UnexpectedEof { expected: 32, .. }))
        ));
    }

    #[test]
    fn test_three_axis_interleave() {
        let traj = FixedRateTrajectory {
            sample_period_us: 500,
            angle_scale: 1000,
            axis_count: 3,
            samples: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        };
        let decoded = FixedRateTrajectory::decode(&traj.encode().unwrap()).unwrap();

        assert_eq!(decoded.total_samples(), 2);
        assert_eq!(decoded.axis(1).unwrap(), vec![2.0, 5.0]);
        assert!(decoded.axis(3).is_none());

        let z = decoded.to_trajectory(2).unwrap();
        assert_eq!(z.angles, vec![3.0, 6.0]);
        assert!((z.times[1] - 0.0005).abs() < 1e-12);
    }

    #[test]
    fn test_sample_out_of_range() {
        let traj = FixedRateTrajectory::single_axis(1000, vec![0.0, 5000.0]);

        assert!(matches!(
            traj.encode(),
            Err(Error::Format(FormatError::SampleOutOfRange { index: 1, .. }))
        ));
    }
}
