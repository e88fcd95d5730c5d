//! Time domains and sampled trajectories.

use alloc::vec::Vec;

use crate::error::{DiscretizeError, FormatError, Result};

/// Half-open time interval `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    start: f64,
    end: f64,
}

impl Domain {
    /// Create a domain.
    ///
    /// # Errors
    ///
    /// Returns `DiscretizeError::InvalidDomain` unless both bounds are finite
    /// and `start < end`.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if start.is_finite() && end.is_finite() && start < end {
            Ok(Self { start, end })
        } else {
            Err(DiscretizeError::InvalidDomain { start, end }.into())
        }
    }

    /// Start time.
    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// End time.
    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// `end - start`, always positive.
    #[inline]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// `count` evenly spaced times from `start` to `end` inclusive.
    ///
    /// The last time is exactly `end`.
    pub fn linspace(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => alloc::vec![self.start],
            _ => {
                let step = self.length() / (count - 1) as f64;
                let mut times: Vec<f64> = (0..count)
                    .map(|i| self.start + i as f64 * step)
                    .collect();
                times[count - 1] = self.end;
                times
            }
        }
    }
}

/// Sampled motion of one axis.
///
/// Trajectories produced by this crate have equal-length vectors and strictly
/// increasing times. The fields are public so raw arrays can be handed in;
/// consumers that depend on the invariant call [`Trajectory::validate`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    /// Sample times in seconds.
    pub times: Vec<f64>,
    /// Angle in degrees at each sample time.
    pub angles: Vec<f64>,
}

impl Trajectory {
    /// Create from raw arrays without checking them.
    pub fn new(times: Vec<f64>, angles: Vec<f64>) -> Self {
        Self { times, angles }
    }

    /// Number of samples (length of `times`).
    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True if there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty() && self.angles.is_empty()
    }

    /// Check that `times` and `angles` have the same length.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::LengthMismatch` otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.times.len() == self.angles.len() {
            Ok(())
        } else {
            Err(FormatError::LengthMismatch {
                times: self.times.len(),
                angles: self.angles.len(),
            }
            .into())
        }
    }

    /// True if every time is strictly greater than the one before.
    pub fn is_strictly_increasing(&self) -> bool {
        self.times.windows(2).all(|w| w[1] > w[0])
    }

    /// Largest absolute angle change between consecutive samples.
    pub fn max_step(&self) -> f64 {
        self.angles
            .windows(2)
            .map(|w| libm::fabs(w[1] - w[0]))
            .fold(0.0, f64::max)
    }

    /// Time of the last sample.
    pub fn duration(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Iterate `(time, angle)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.angles.iter().copied())
    }
}
