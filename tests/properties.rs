//! Property tests for discretization bounds and codec fidelity.

use std::f64::consts::PI;

use proptest::prelude::*;

use stepper_trajectory::codec::{event_list, FixedRateTrajectory};
use stepper_trajectory::config::{ControllerResolution, Degrees, Microsteps};
use stepper_trajectory::motion::{from_fn, MotionFunction};
use stepper_trajectory::trajectory::{compose, Discretizer, Domain, Segment, Trajectory};

fn finite_f32() -> impl Strategy<Value = f32> {
    prop::num::f32::NORMAL | prop::num::f32::SUBNORMAL | prop::num::f32::ZERO
}

proptest! {
    /// Consecutive samples never move more than one microstep while the
    /// interval floor isn't reached (peak speed stays at or below 10 deg/s).
    #[test]
    fn sine_steps_bounded_by_resolution(
        step_angle in 0.9f64..3.6,
        microsteps in 1u16..=32,
        amplitude in 0.5f64..2.0,
        omega in 1.0f64..5.0,
        phase in 0.0f64..(2.0 * PI),
        periods in 1.0f64..3.0,
    ) {
        let res = ControllerResolution::new(Degrees(step_angle), Microsteps::new(microsteps).unwrap());
        let discretizer = Discretizer::new(res);
        let length = periods * 2.0 * PI / omega;
        let f = from_fn(move |t| amplitude * (omega * t + phase).sin());

        let out = discretizer.discretize(&f, Domain::new(0.0, length).unwrap()).unwrap();

        prop_assert!(out.dt > discretizer.min_interval());
        prop_assert!(out.trajectory.max_step() <= res.theta_res() * (1.0 + 1e-3));
        prop_assert_eq!(*out.trajectory.times.last().unwrap(), length);
    }

    /// Event-list pairs survive encoding bit for bit.
    #[test]
    fn event_list_bit_exact(pairs in prop::collection::vec((finite_f32(), finite_f32()), 0..200)) {
        let traj = Trajectory::new(
            pairs.iter().map(|&(t, _)| t as f64).collect(),
            pairs.iter().map(|&(_, a)| a as f64).collect(),
        );

        let decoded = event_list::decode(&event_list::encode(&traj).unwrap()).unwrap();

        prop_assert_eq!(decoded.len(), pairs.len());
        for (i, &(t, a)) in pairs.iter().enumerate() {
            prop_assert_eq!((decoded.times[i] as f32).to_bits(), t.to_bits());
            prop_assert_eq!((decoded.angles[i] as f32).to_bits(), a.to_bits());
        }
    }

    /// Fixed-point samples come back within one quantum.
    #[test]
    fn fixed_rate_within_one_quantum(angles in prop::collection::vec(-2000.0f64..2000.0, 1..300)) {
        let traj = FixedRateTrajectory::single_axis(1000, angles.clone());

        let decoded = FixedRateTrajectory::decode(&traj.encode().unwrap()).unwrap();

        for (a, b) in angles.iter().zip(&decoded.samples) {
            prop_assert!((a - b).abs() <= 1.0 / 1_000_000.0);
        }
    }

    /// Composing two adjacent segments drops exactly one shared sample.
    #[test]
    fn composed_length_is_sum_minus_one(
        rate in -40.0f64..40.0,
        split in 0.5f64..5.0,
        tail in 0.5f64..5.0,
    ) {
        let discretizer = Discretizer::default();
        let first = from_fn(move |t| rate * t);
        let second = from_fn(move |t| rate * split - rate * (t - split));
        let segments: Vec<Segment<Box<dyn MotionFunction>>> = vec![
            Segment::new(Box::new(first), 0.0, split),
            Segment::new(Box::new(second), split, split + tail),
        ];

        let l1 = discretizer.discretize(&first, Domain::new(0.0, split).unwrap()).unwrap().trajectory.len();
        let l2 = discretizer.discretize(&second, Domain::new(split, split + tail).unwrap()).unwrap().trajectory.len();
        let composition = compose(&discretizer, &segments).unwrap();

        prop_assert_eq!(composition.trajectory.len(), l1 + l2 - 1);
        prop_assert!(composition.trajectory.is_strictly_increasing());
    }
}
