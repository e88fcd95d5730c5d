//! Continuous motion functions: angle in degrees as a function of time in seconds.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::{DiscretizeError, Result};

/// Result of evaluating a motion function over a batch of times.
///
/// Upstream evaluators may collapse a time-independent expression to a single
/// number; `Scalar` keeps that case explicit instead of guessing from shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// One value valid at every requested time.
    Scalar(f64),
    /// One value per requested time (or a single value to broadcast).
    Vector(Vec<f64>),
}

impl Evaluation {
    /// Resolve into exactly `count` samples.
    ///
    /// Scalars and one-element vectors are broadcast. A vector of any other
    /// length than `count` is rejected, never truncated or padded.
    ///
    /// # Errors
    ///
    /// Returns `DiscretizeError::ShapeMismatch` on a length mismatch.
    pub fn resolve(self, count: usize) -> Result<Vec<f64>> {
        match self {
            Evaluation::Scalar(v) => Ok(vec![v; count]),
            Evaluation::Vector(values) if values.len() == count => Ok(values),
            Evaluation::Vector(values) if values.len() == 1 => Ok(vec![values[0]; count]),
            Evaluation::Vector(values) => Err(DiscretizeError::ShapeMismatch {
                expected: count,
                actual: values.len(),
            }
            .into()),
        }
    }
}

/// A pure mapping from time to angle.
///
/// Implementations must be stateless: evaluating the same times twice gives
/// the same result.
pub trait MotionFunction {
    /// Evaluate the angle in degrees at each of `times` (seconds).
    fn evaluate(&self, times: &[f64]) -> Evaluation;
}

impl<M: MotionFunction + ?Sized> MotionFunction for Box<M> {
    fn evaluate(&self, times: &[f64]) -> Evaluation {
        (**self).evaluate(times)
    }
}

impl<M: MotionFunction + ?Sized> MotionFunction for &M {
    fn evaluate(&self, times: &[f64]) -> Evaluation {
        (**self).evaluate(times)
    }
}

/// Time-independent angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl MotionFunction for Constant {
    fn evaluate(&self, _times: &[f64]) -> Evaluation {
        Evaluation::Scalar(self.0)
    }
}

/// Closure-backed motion function, see [`from_fn`].
#[derive(Clone, Copy)]
pub struct FnMotion<F>(F);

impl<F: Fn(f64) -> f64> MotionFunction for FnMotion<F> {
    fn evaluate(&self, times: &[f64]) -> Evaluation {
        Evaluation::Vector(times.iter().map(|&t| (self.0)(t)).collect())
    }
}

impl<F> core::fmt::Debug for FnMotion<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnMotion")
    }
}

/// Wrap a per-sample closure as a motion function.
///
/// # Example
///
/// ```rust
/// use stepper_trajectory::motion::{from_fn, MotionFunction};
///
/// let ramp = from_fn(|t| 15.0 * t);
/// let angles = ramp.evaluate(&[0.0, 1.0]).resolve(2).unwrap();
/// assert_eq!(angles, vec![0.0, 15.0]);
/// ```
pub fn from_fn<F: Fn(f64) -> f64>(f: F) -> FnMotion<F> {
    FnMotion(f)
}

/// A function built in local time, shifted onto a shared clock.
///
/// Evaluates `inner(t - time_offset) + angle_offset`.
#[derive(Debug, Clone)]
pub struct Rebased<M> {
    /// Function in local time.
    pub inner: M,
    /// Shared-clock time at which local time is zero.
    pub time_offset: f64,
    /// Angle added to every value.
    pub angle_offset: f64,
}

impl<M> Rebased<M> {
    /// Shift `inner` to start at `time_offset` and add `angle_offset`.
    pub fn new(inner: M, time_offset: f64, angle_offset: f64) -> Self {
        Self {
            inner,
            time_offset,
            angle_offset,
        }
    }
}

impl<M: MotionFunction> MotionFunction for Rebased<M> {
    fn evaluate(&self, times: &[f64]) -> Evaluation {
        let local: Vec<f64> = times.iter().map(|t| t - self.time_offset).collect();
        match self.inner.evaluate(&local) {
            Evaluation::Scalar(v) => Evaluation::Scalar(v + self.angle_offset),
            Evaluation::Vector(mut values) => {
                for v in &mut values {
                    *v += self.angle_offset;
                }
                Evaluation::Vector(values)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_scalar_broadcast() {
        let values = Constant(5.0).evaluate(&[0.0, 1.0, 2.0]).resolve(3).unwrap();
        assert_eq!(values, vec![5.0, 5.0, 5.0]);
    }

    #[test]
    fn test_single_element_vector_broadcast() {
        let values = Evaluation::Vector(vec![2.5]).resolve(4).unwrap();
        assert_eq!(values, vec![2.5; 4]);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let result = Evaluation::Vector(vec![1.0, 2.0]).resolve(3);
        assert_eq!(
            result,
            Err(Error::Discretize(DiscretizeError::ShapeMismatch {
                expected: 3,
                actual: 2
            }))
        );
    }

    #[test]
    fn test_rebased_shifts_time_and_angle() {
        let f = Rebased::new(from_fn(|t| 2.0 * t), 10.0, 100.0);
        let values = f.evaluate(&[10.0, 11.0]).resolve(2).unwrap();
        assert_eq!(values, vec![100.0, 102.0]);

        let c = Rebased::new(Constant(1.0), 3.0, 4.0);
        assert_eq!(c.evaluate(&[0.0]), Evaluation::Scalar(5.0));
    }

    #[test]
    fn test_boxed_dyn_function() {
        let f: Box<dyn MotionFunction> = Box::new(from_fn(|t| t + 1.0));
        assert_eq!(f.evaluate(&[1.0]), Evaluation::Vector(vec![2.0]));
    }
}
