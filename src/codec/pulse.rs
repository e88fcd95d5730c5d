//! Step-pulse records for edge-timed playback.
//!
//! Each record is five bytes: a little-endian `u32` interval in microseconds
//! since the previous step edge, then a direction byte (1 forward, 0 reverse).

use alloc::vec::Vec;

use crate::config::ControllerResolution;
use crate::error::{FormatError, Result};
use crate::trajectory::Trajectory;

/// Bytes per record.
pub const RECORD_LEN: usize = 5;

/// Upper bound on the pulses produced from one trajectory.
pub const MAX_PULSES: usize = 1 << 24;

/// One step edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPulse {
    /// Microseconds since the previous pulse (or the trajectory start).
    pub interval_us: u32,
    /// Step direction.
    pub forward: bool,
}

/// Ordered step pulses for one axis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepPulseTrain {
    /// Pulses in playback order.
    pub pulses: Vec<StepPulse>,
}

impl StepPulseTrain {
    /// Convert sampled angles into step edges.
    ///
    /// Angles are quantized to the nearest microstep. A change of `k` steps
    /// between two samples emits `k` pulses spread evenly across that
    /// interval.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::LengthMismatch` for unequal times and angles,
    /// `FormatError::SampleOutOfRange` for an angle whose step index doesn't
    /// fit in `i32`, or `FormatError::TooManySamples` if the train would
    /// exceed [`MAX_PULSES`].
    pub fn from_trajectory(
        trajectory: &Trajectory,
        resolution: &ControllerResolution,
    ) -> Result<Self> {
        trajectory.validate()?;

        let mut pulses = Vec::new();
        let Some(&t0) = trajectory.times.first() else {
            return Ok(Self { pulses });
        };

        let steps = trajectory
            .angles
            .iter()
            .enumerate()
            .map(|(index, &angle)| {
                resolution
                    .angle_to_steps(angle)
                    .ok_or(FormatError::SampleOutOfRange { index, angle })
            })
            .collect::<core::result::Result<Vec<i64>, _>>()?;

        // Step indices fit in i32, so neither the difference nor the running
        // total can overflow.
        let total: u64 = steps.windows(2).map(|w| (w[1] - w[0]).unsigned_abs()).sum();
        if total > MAX_PULSES as u64 {
            return Err(FormatError::TooManySamples(total as usize).into());
        }
        pulses.reserve(total as usize);

        let mut last_us = 0.0;
        for i in 1..steps.len() {
            let delta = steps[i] - steps[i - 1];
            if delta == 0 {
                continue;
            }

            let k = delta.unsigned_abs();
            let start = trajectory.times[i - 1];
            let span = trajectory.times[i] - start;
            for j in 1..=k {
                let at = start + span * j as f64 / k as f64;
                let at_us = libm::round((at - t0) * 1e6);
                let interval = (at_us - last_us).clamp(0.0, u32::MAX as f64);
                pulses.push(StepPulse {
                    interval_us: interval as u32,
                    forward: delta > 0,
                });
                last_us = at_us;
            }
        }

        Ok(Self { pulses })
    }

    /// Number of pulses.
    #[inline]
    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    /// True if there are no pulses.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Net signed step count.
    pub fn net_steps(&self) -> i64 {
        self.pulses
            .iter()
            .map(|p| if p.forward { 1 } else { -1 })
            .sum()
    }

    /// Time of the last pulse in microseconds.
    pub fn duration_us(&self) -> u64 {
        self.pulses.iter().map(|p| p.interval_us as u64).sum()
    }

    /// Serialize to 5-byte records.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pulses.len() * RECORD_LEN);
        for pulse in &self.pulses {
            out.extend_from_slice(&pulse.interval_us.to_le_bytes());
            out.push(u8::from(pulse.forward));
        }
        out
    }

    /// Parse 5-byte records. Any nonzero direction byte means forward.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::UnexpectedEof` for a trailing partial record.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let rem = bytes.len() % RECORD_LEN;
        if rem != 0 {
            return Err(FormatError::UnexpectedEof {
                expected: bytes.len() - rem + RECORD_LEN,
                actual: bytes.len(),
            }
            .into());
        }

        let pulses = bytes
            .chunks_exact(RECORD_LEN)
            .map(|r| StepPulse {
                interval_us: u32::from_le_bytes([r[0], r[1], r[2], r[3]]),
                forward: r[4] != 0,
            })
            .collect();
        Ok(Self { pulses })
    }
}
