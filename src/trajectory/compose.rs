//! Piecewise timelines: validate, discretize and stitch segments.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Display;

use log::debug;

use crate::error::{DiscretizeError, Error, Result, SegmentError, SegmentErrorKind};
use crate::motion::MotionFunction;

use super::discretize::Discretizer;
use super::samples::{Domain, Trajectory};

/// One piece of an axis timeline.
///
/// `function` carries either a ready motion function or the message of the
/// upstream failure that prevented building one, so every bad segment can be
/// reported together.
#[derive(Debug, Clone)]
pub struct Segment<F> {
    /// Motion function, or why it couldn't be built.
    pub function: core::result::Result<F, String>,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl<F> Segment<F> {
    /// Segment with a ready function.
    pub fn new(function: F, start: f64, end: f64) -> Self {
        Self {
            function: Ok(function),
            start,
            end,
        }
    }

    /// Segment from the result of an upstream expression builder.
    pub fn from_expression<E: Display>(
        function: core::result::Result<F, E>,
        start: f64,
        end: f64,
    ) -> Self {
        Self {
            function: function.map_err(|e| e.to_string()),
            start,
            end,
        }
    }
}

/// Per-segment discretization report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSummary {
    /// 1-based segment index.
    pub index: usize,
    /// Sample interval chosen for the segment.
    pub dt: f64,
    /// Samples the segment contributed to the combined trajectory.
    pub samples: usize,
}

/// Combined trajectory with per-segment reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Stitched samples.
    pub trajectory: Trajectory,
    /// One entry per segment, in order.
    pub segments: Vec<SegmentSummary>,
}

/// Discretize each segment and concatenate the results.
///
/// Every segment is validated before any is sampled. When a segment starts
/// exactly where the previous one ended, its first sample duplicates that
/// instant and is dropped. Gaps between segments are allowed and keep every
/// sample. Angle continuity across boundaries is up to the caller.
///
/// # Errors
///
/// - `DiscretizeError::EmptyTimeline` for an empty list
/// - `Error::Segments` listing every invalid segment (1-based)
/// - any discretization error of an individual segment
pub fn compose<F>(discretizer: &Discretizer, segments: &[Segment<F>]) -> Result<Composition>
where
    F: MotionFunction,
{
    if segments.is_empty() {
        return Err(DiscretizeError::EmptyTimeline.into());
    }

    let mut failures = Vec::new();
    let mut domains = Vec::with_capacity(segments.len());
    let mut previous_end: Option<f64> = None;

    for (i, segment) in segments.iter().enumerate() {
        let index = i + 1;

        match Domain::new(segment.start, segment.end) {
            Ok(domain) => domains.push(domain),
            Err(_) => failures.push(SegmentError {
                index,
                kind: SegmentErrorKind::InvalidDomain {
                    start: segment.start,
                    end: segment.end,
                },
            }),
        }

        if let Err(message) = &segment.function {
            failures.push(SegmentError {
                index,
                kind: SegmentErrorKind::InvalidExpression(message.clone()),
            });
        }

        if let Some(prev) = previous_end {
            if segment.start < prev {
                failures.push(SegmentError {
                    index,
                    kind: SegmentErrorKind::OutOfOrder {
                        start: segment.start,
                        previous_end: prev,
                    },
                });
            }
        }
        previous_end = Some(segment.end);
    }

    if !failures.is_empty() {
        return Err(Error::Segments(failures));
    }

    let mut trajectory = Trajectory::default();
    let mut summaries = Vec::with_capacity(segments.len());

    for (i, (segment, domain)) in segments.iter().zip(domains).enumerate() {
        let function = match &segment.function {
            Ok(f) => f,
            Err(_) => continue,
        };
        let out = discretizer.discretize(function, domain)?;
        // Only a shared boundary instant is dropped; across a gap the first
        // sample is a distinct time and stays.
        let shared = i > 0 && segments[i - 1].end == segment.start;
        let skip = usize::from(shared);

        let samples = out.trajectory.len().saturating_sub(skip);
        trajectory
            .times
            .extend(out.trajectory.times.into_iter().skip(skip));
        trajectory
            .angles
            .extend(out.trajectory.angles.into_iter().skip(skip));

        summaries.push(SegmentSummary {
            index: i + 1,
            dt: out.dt,
            samples,
        });
    }

    debug!(
        "composed {} segment(s) into {} samples",
        summaries.len(),
        trajectory.len()
    );

    Ok(Composition {
        trajectory,
        segments: summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{from_fn, Constant};
    use alloc::boxed::Box;
    use alloc::vec;

    #[test]
    fn test_concatenated_length() {
        let discretizer = Discretizer::default();
        let segments: Vec<Segment<Box<dyn MotionFunction>>> = vec![
            Segment::new(Box::new(from_fn(|t| 15.0 * t)), 0.0, 2.0),
            Segment::new(Box::new(Constant(30.0)), 2.0, 3.0),
        ];

        let composition = compose(&discretizer, &segments).unwrap();

        let l1 = discretizer
            .discretize(&from_fn(|t| 15.0 * t), Domain::new(0.0, 2.0).unwrap())
            .unwrap()
            .trajectory
            .len();
        let l2 = discretizer
            .discretize(&Constant(30.0), Domain::new(2.0, 3.0).unwrap())
            .unwrap()
            .trajectory
            .len();

        assert_eq!(composition.trajectory.len(), l1 + l2 - 1);
        assert!(composition.trajectory.is_strictly_increasing());
        assert_eq!(composition.segments[0].samples, l1);
        assert_eq!(composition.segments[1].samples, l2 - 1);
    }

    #[test]
    fn test_empty_timeline() {
        let segments: Vec<Segment<Constant>> = Vec::new();
        assert_eq!(
            compose(&Discretizer::default(), &segments),
            Err(Error::Discretize(DiscretizeError::EmptyTimeline))
        );
    }

    #[test]
    fn test_collects_all_failures() {
        let segments: Vec<Segment<Constant>> = vec![
            Segment::new(Constant(0.0), 0.0, 1.0),
            Segment::from_expression(Err("unknown symbol 'q'"), 1.0, 2.0),
            Segment::new(Constant(0.0), 3.0, 3.0),
        ];

        let failures = match compose(&Discretizer::default(), &segments) {
            Err(Error::Segments(failures)) => failures,
            other => panic!("expected segment errors, got {:?}", other),
        };

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 2);
        assert_eq!(
            failures[0].kind,
            SegmentErrorKind::InvalidExpression("unknown symbol 'q'".into())
        );
        assert_eq!(failures[1].index, 3);
        assert!(matches!(
            failures[1].kind,
            SegmentErrorKind::InvalidDomain { .. }
        ));
    }

    #[test]
    fn test_overlapping_segments_rejected() {
        let segments = vec![
            Segment::new(Constant(0.0), 0.0, 2.0),
            Segment::new(Constant(0.0), 1.0, 3.0),
        ];

        let err = compose(&Discretizer::default(), &segments).unwrap_err();
        assert_eq!(
            err,
            Error::Segments(vec![SegmentError {
                index: 2,
                kind: SegmentErrorKind::OutOfOrder {
                    start: 1.0,
                    previous_end: 2.0
                },
            }])
        );
    }

    #[test]
    fn test_gap_keeps_first_sample() {
        let segments = vec![
            Segment::new(Constant(0.0), 0.0, 1.0),
            Segment::new(Constant(5.0), 2.0, 3.0),
        ];

        let composition = compose(&Discretizer::default(), &segments).unwrap();

        assert_eq!(composition.trajectory.times, [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(composition.trajectory.angles, [0.0, 0.0, 5.0, 5.0]);
        assert_eq!(composition.segments[1].samples, 2);
    }
}
