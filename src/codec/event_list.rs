//! Event-list trajectories: a sample count followed by `(time, angle)` pairs.
//!
//! ```text
//! u32 N | f32 t0 | f32 a0 | f32 t1 | f32 a1 | ...
//! ```
//!
//! All fields are little-endian. The stream carries no tag, so readers must
//! know in advance that they are looking at this format.

use alloc::vec::Vec;

use crate::error::{Error, FormatError, Result};
use crate::trajectory::Trajectory;

use super::le_array;

/// Bytes taken by the count prefix.
pub const COUNT_LEN: usize = 4;

/// Bytes per `(time, angle)` pair.
pub const PAIR_LEN: usize = 8;

/// Encoded size of a trajectory with `samples` pairs.
#[inline]
pub fn encoded_len(samples: usize) -> usize {
    COUNT_LEN + PAIR_LEN * samples
}

/// Encode a trajectory as f32 pairs.
///
/// # Errors
///
/// `LengthMismatch` if times and angles differ in length, `TooManySamples`
/// if the count doesn't fit in a u32.
pub fn encode(trajectory: &Trajectory) -> Result<Vec<u8>> {
    trajectory.validate()?;
    let n = trajectory.times.len();
    let count = u32::try_from(n).map_err(|_| Error::from(FormatError::TooManySamples(n)))?;

    let mut out = Vec::with_capacity(encoded_len(n));
    out.extend_from_slice(&count.to_le_bytes());
    for (t, a) in trajectory.iter() {
        out.extend_from_slice(&(t as f32).to_le_bytes());
        out.extend_from_slice(&(a as f32).to_le_bytes());
    }
    Ok(out)
}

/// Decode f32 pairs.
///
/// The whole `2N`-float block is read before it is split into times and
/// angles; nothing is returned for a short block. Trailing bytes are ignored.
///
/// # Errors
///
/// `UnexpectedEof` if the count or any of the `2N` floats is missing.
pub fn decode(bytes: &[u8]) -> Result<Trajectory> {
    let n = u32::from_le_bytes(le_array(bytes, 0)?) as usize;
    let expected = n
        .checked_mul(PAIR_LEN)
        .and_then(|body| body.checked_add(COUNT_LEN))
        .ok_or_else(|| Error::from(FormatError::TooManySamples(n)))?;
    if bytes.len() < expected {
        return Err(FormatError::UnexpectedEof {
            expected,
            actual: bytes.len(),
        }
        .into());
    }

    let block: Vec<f32> = bytes[COUNT_LEN..expected]
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    let times = block.iter().step_by(2).map(|&v| v as f64).collect();
    let angles = block.iter().skip(1).step_by(2).map(|&v| v as f64).collect();
    Ok(Trajectory { times, angles })
}
