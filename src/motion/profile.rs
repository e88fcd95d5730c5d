//! Jerk-limited S-curve motion profiles.
//!
//! A seven-segment profile moves from rest to a target displacement and back
//! to rest in a fixed time. Each segment has constant jerk; acceleration,
//! velocity and position follow from integrating it in closed form:
//!
//! | # | segment           | jerk | duration    |
//! |---|-------------------|------|-------------|
//! | 1 | accel build       | +J   | Tj          |
//! | 2 | accel hold        | 0    | Ta − 2·Tj   |
//! | 3 | accel release     | −J   | Tj          |
//! | 4 | cruise            | 0    | T − 2·Ta    |
//! | 5 | decel build       | −J   | Tj          |
//! | 6 | decel hold        | 0    | Ta − 2·Tj   |
//! | 7 | decel release     | +J   | Tj          |
//!
//! The integrated curve is rescaled so the final position equals the
//! requested displacement exactly.

use alloc::vec::Vec;

use crate::error::{ProfileError, Result};

use super::function::{Evaluation, MotionFunction};

/// Default jerk phase length as a fraction of the move time.
pub const DEFAULT_JERK_FRACTION: f64 = 0.1;

/// Default full acceleration phase length as a fraction of the move time.
pub const DEFAULT_ACCEL_FRACTION: f64 = 0.2;

/// One constant-jerk segment with its (unscaled) entry state.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Phase {
    start: f64,
    duration: f64,
    jerk: f64,
    p0: f64,
    v0: f64,
    a0: f64,
}

impl Phase {
    /// Position, velocity and acceleration `tau` seconds into the segment.
    #[inline]
    fn state(&self, tau: f64) -> (f64, f64, f64) {
        let j = self.jerk;
        let p = self.p0
            + self.v0 * tau
            + self.a0 * tau * tau / 2.0
            + j * tau * tau * tau / 6.0;
        let v = self.v0 + self.a0 * tau + j * tau * tau / 2.0;
        let a = self.a0 + j * tau;
        (p, v, a)
    }

    #[inline]
    fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Kinematic state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProfileState {
    /// Position in displacement units.
    pub position: f64,
    /// Velocity in displacement units per second.
    pub velocity: f64,
    /// Acceleration in displacement units per second².
    pub acceleration: f64,
}

/// Uniformly sampled profile.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileSamples {
    /// Sample times in seconds, `0..=T`.
    pub times: Vec<f64>,
    /// Position at each time.
    pub position: Vec<f64>,
    /// Velocity at each time.
    pub velocity: Vec<f64>,
    /// Acceleration at each time.
    pub acceleration: Vec<f64>,
}

/// Seven-segment S-curve from rest to `displacement` in `move_time`.
///
/// Holds the displacement with zero velocity for any time past the move.
/// Before zero it reports rest at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SCurveProfile {
    move_time: f64,
    max_jerk: f64,
    displacement: f64,
    jerk_time: f64,
    accel_time: f64,
    scale: f64,
    phases: [Phase; 7],
}

impl SCurveProfile {
    /// Create a profile with the default phase fractions (Tj = T/10, Ta = T/5).
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::InvalidMoveTime` or `ProfileError::InvalidJerk`
    /// for non-finite or non-positive inputs.
    pub fn new(max_jerk: f64, move_time: f64, displacement: f64) -> Result<Self> {
        Self::with_timing(
            max_jerk,
            move_time,
            displacement,
            DEFAULT_JERK_FRACTION,
            DEFAULT_ACCEL_FRACTION,
        )
    }

    /// Create a profile with explicit phase fractions.
    ///
    /// `jerk_fraction` sets Tj and `accel_fraction` sets the full acceleration
    /// phase Ta (build, hold and release), both relative to `move_time`.
    /// Requires `0 < 2·jerk_fraction <= accel_fraction <= 0.5`.
    ///
    /// # Errors
    ///
    /// Returns a `ProfileError` if any parameter is out of range.
    pub fn with_timing(
        max_jerk: f64,
        move_time: f64,
        displacement: f64,
        jerk_fraction: f64,
        accel_fraction: f64,
    ) -> Result<Self> {
        if !move_time.is_finite() || move_time <= 0.0 {
            return Err(ProfileError::InvalidMoveTime(move_time).into());
        }
        if !max_jerk.is_finite() || max_jerk <= 0.0 {
            return Err(ProfileError::InvalidJerk(max_jerk).into());
        }
        let timing_ok = jerk_fraction.is_finite()
            && accel_fraction.is_finite()
            && jerk_fraction > 0.0
            && 2.0 * jerk_fraction <= accel_fraction
            && 2.0 * accel_fraction <= 1.0;
        if !timing_ok || !displacement.is_finite() {
            return Err(ProfileError::InvalidTiming {
                jerk_fraction,
                accel_fraction,
            }
            .into());
        }

        let tj = jerk_fraction * move_time;
        let ta = accel_fraction * move_time;
        let hold = ta - 2.0 * tj;
        let cruise = move_time - 2.0 * ta;
        let j = max_jerk;

        let plan = [
            (tj, j),
            (hold, 0.0),
            (tj, -j),
            (cruise, 0.0),
            (tj, -j),
            (hold, 0.0),
            (tj, j),
        ];

        let mut phases = [Phase {
            start: 0.0,
            duration: 0.0,
            jerk: 0.0,
            p0: 0.0,
            v0: 0.0,
            a0: 0.0,
        }; 7];

        let (mut t, mut p, mut v, mut a) = (0.0, 0.0, 0.0, 0.0);
        for (phase, &(duration, jerk)) in phases.iter_mut().zip(plan.iter()) {
            *phase = Phase {
                start: t,
                duration,
                jerk,
                p0: p,
                v0: v,
                a0: a,
            };
            let (pe, ve, ae) = phase.state(duration);
            t += duration;
            p = pe;
            v = ve;
            a = ae;
        }

        // p > 0 here: every admissible timing reaches a positive cruise speed.
        let scale = displacement / p;

        Ok(Self {
            move_time,
            max_jerk,
            displacement,
            jerk_time: tj,
            accel_time: ta,
            scale,
            phases,
        })
    }

    /// Total move time T in seconds.
    #[inline]
    pub fn move_time(&self) -> f64 {
        self.move_time
    }

    /// Jerk used to shape the unscaled curve.
    #[inline]
    pub fn max_jerk(&self) -> f64 {
        self.max_jerk
    }

    /// Final position.
    #[inline]
    pub fn displacement(&self) -> f64 {
        self.displacement
    }

    /// Jerk phase duration Tj.
    #[inline]
    pub fn jerk_time(&self) -> f64 {
        self.jerk_time
    }

    /// Full acceleration phase duration Ta.
    #[inline]
    pub fn accel_time(&self) -> f64 {
        self.accel_time
    }

    /// Cruise duration Tv = T − 2·Ta.
    #[inline]
    pub fn cruise_time(&self) -> f64 {
        self.move_time - 2.0 * self.accel_time
    }

    /// Factor applied to the integrated curve to land on the displacement.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Cruise velocity after rescaling.
    pub fn peak_velocity(&self) -> f64 {
        self.phases[3].v0 * self.scale
    }

    /// Peak acceleration after rescaling.
    pub fn peak_acceleration(&self) -> f64 {
        self.phases[1].a0 * self.scale
    }

    /// Kinematic state at time `t`.
    pub fn state_at(&self, t: f64) -> ProfileState {
        if t <= 0.0 {
            return ProfileState::default();
        }
        if t >= self.move_time {
            return ProfileState {
                position: self.displacement,
                velocity: 0.0,
                acceleration: 0.0,
            };
        }

        let phase = self
            .phases
            .iter()
            .find(|ph| t < ph.end())
            .unwrap_or(&self.phases[6]);
        let (p, v, a) = phase.state(t - phase.start);

        ProfileState {
            position: p * self.scale,
            velocity: v * self.scale,
            acceleration: a * self.scale,
        }
    }

    /// Position at time `t`.
    #[inline]
    pub fn position_at(&self, t: f64) -> f64 {
        self.state_at(t).position
    }

    /// Sample `count` uniformly spaced instants over `[0, T]`.
    ///
    /// The last sample sits exactly at T with position equal to the
    /// displacement.
    pub fn sample(&self, count: usize) -> ProfileSamples {
        let mut out = ProfileSamples {
            times: Vec::with_capacity(count),
            position: Vec::with_capacity(count),
            velocity: Vec::with_capacity(count),
            acceleration: Vec::with_capacity(count),
        };
        if count == 0 {
            return out;
        }

        let step = if count > 1 {
            self.move_time / (count - 1) as f64
        } else {
            0.0
        };
        for i in 0..count {
            let t = if count > 1 && i == count - 1 {
                self.move_time
            } else {
                i as f64 * step
            };
            let s = self.state_at(t);
            out.times.push(t);
            out.position.push(s.position);
            out.velocity.push(s.velocity);
            out.acceleration.push(s.acceleration);
        }
        out
    }
}

impl MotionFunction for SCurveProfile {
    fn evaluate(&self, times: &[f64]) -> Evaluation {
        Evaluation::Vector(times.iter().map(|&t| self.position_at(t)).collect())
    }
}
