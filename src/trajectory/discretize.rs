//! Adaptive discretization of motion functions.
//!
//! The sample interval is chosen so that the fastest part of the motion moves
//! at most one microstep per sample:
//!
//! 1. Evaluate the function at `coarse_samples` uniform points and take the
//!    largest finite-difference velocity `vmax`.
//! 2. `dt = theta_res / vmax` (or the whole domain for a constant or when the
//!    ratio overflows), floored at `min_interval`.
//! 3. Evaluate at `ceil(L / dt) + 1` uniform points, ending exactly on the
//!    domain end.

use alloc::vec::Vec;

use log::debug;

use crate::config::{ControllerConfig, ControllerResolution, DegreesPerSec};
use crate::error::{DiscretizeError, Result};
use crate::motion::MotionFunction;

use super::samples::{Domain, Trajectory};

/// Default floor on the sample interval (2 ms).
pub const DEFAULT_MIN_INTERVAL: f64 = 0.002;

/// Default number of coarse samples used to estimate peak velocity.
pub const DEFAULT_COARSE_SAMPLES: usize = 1000;

/// Result of discretizing one function over one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Discretized {
    /// The samples.
    pub trajectory: Trajectory,
    /// Chosen sample interval in seconds.
    pub dt: f64,
    /// Estimated peak absolute velocity in degrees per second.
    pub vmax: f64,
}

/// Resolution-bounded sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discretizer {
    resolution: ControllerResolution,
    min_interval: f64,
    coarse_samples: usize,
}

impl Discretizer {
    /// Create a discretizer for a controller resolution with default limits.
    pub fn new(resolution: ControllerResolution) -> Self {
        Self {
            resolution,
            min_interval: DEFAULT_MIN_INTERVAL,
            coarse_samples: DEFAULT_COARSE_SAMPLES,
        }
    }

    /// Create from the `[controller]` configuration section.
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(ControllerResolution::from_config(config))
            .with_min_interval(config.min_sample_interval)
            .with_coarse_samples(config.coarse_samples)
    }

    /// Set the floor on the sample interval in seconds.
    ///
    /// Values that are not finite and positive leave the floor unchanged.
    pub fn with_min_interval(mut self, seconds: f64) -> Self {
        if seconds.is_finite() && seconds > 0.0 {
            self.min_interval = seconds;
        }
        self
    }

    /// Set the coarse sample count (at least 2).
    pub fn with_coarse_samples(mut self, count: usize) -> Self {
        self.coarse_samples = count.max(2);
        self
    }

    /// Controller resolution in use.
    #[inline]
    pub fn resolution(&self) -> ControllerResolution {
        self.resolution
    }

    /// Sample interval floor in seconds.
    #[inline]
    pub fn min_interval(&self) -> f64 {
        self.min_interval
    }

    /// Coarse sample count.
    #[inline]
    pub fn coarse_samples(&self) -> usize {
        self.coarse_samples
    }

    /// Sample `function` over `domain`.
    ///
    /// # Errors
    ///
    /// Returns `DiscretizeError::ShapeMismatch` if the function returns an
    /// unbroadcastable vector, or `DiscretizeError::NonFiniteSample` if it
    /// produces NaN or infinity.
    pub fn discretize<F>(&self, function: &F, domain: Domain) -> Result<Discretized>
    where
        F: MotionFunction + ?Sized,
    {
        let length = domain.length();

        let coarse_times = domain.linspace(self.coarse_samples);
        let coarse = evaluate_checked(function, &coarse_times)?;
        let vmax = peak_velocity(&coarse_times, &coarse);

        // A vanishing vmax can push the ratio to infinity.
        let candidate = self
            .resolution
            .interval_for(DegreesPerSec(vmax))
            .filter(|dt| dt.is_finite())
            .unwrap_or(length);
        let dt = candidate.max(self.min_interval);

        let count = libm::ceil(length / dt) as usize + 1;
        let times = domain.linspace(count);
        let angles = evaluate_checked(function, &times)?;

        debug!(
            "discretize [{}, {}]: vmax={:.6} deg/s dt={:.6} s samples={}",
            domain.start(),
            domain.end(),
            vmax,
            dt,
            count
        );

        Ok(Discretized {
            trajectory: Trajectory { times, angles },
            dt,
            vmax,
        })
    }
}

impl Default for Discretizer {
    fn default() -> Self {
        Self::new(ControllerResolution::default())
    }
}

fn evaluate_checked<F>(function: &F, times: &[f64]) -> Result<Vec<f64>>
where
    F: MotionFunction + ?Sized,
{
    let values = function.evaluate(times).resolve(times.len())?;
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(DiscretizeError::NonFiniteSample { time: times[i] }.into());
    }
    Ok(values)
}

fn peak_velocity(times: &[f64], angles: &[f64]) -> f64 {
    times
        .windows(2)
        .zip(angles.windows(2))
        .map(|(t, a)| libm::fabs((a[1] - a[0]) / (t[1] - t[0])))
        .fold(0.0, f64::max)
}
