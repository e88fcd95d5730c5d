//! Serial transport tests against in-memory links.

use std::io::{self, Read, Write};
use std::time::Duration;

use stepper_trajectory::codec::event_list;
use stepper_trajectory::config::AckPolicy;
use stepper_trajectory::error::{Error, TransferError};
use stepper_trajectory::trajectory::Trajectory;
use stepper_trajectory::transport::{
    AckOutcome, Axis, AxisSet, MemoryLink, SerialLink, SerialSession,
};

fn ramp(n: usize) -> Trajectory {
    Trajectory::new(
        (0..n).map(|i| i as f64 * 0.005).collect(),
        (0..n).map(|i| i as f64 * 0.1).collect(),
    )
}

/// Split captured output into `BEGIN` lines, payloads and trailing commands.
fn parse_wire(mut bytes: &[u8]) -> (Vec<(String, Vec<u8>)>, Vec<String>) {
    let mut frames = Vec::new();
    let mut commands = Vec::new();

    while !bytes.is_empty() {
        let end = bytes.iter().position(|&b| b == b'\n').expect("unterminated line");
        let line = String::from_utf8(bytes[..end].to_vec()).unwrap();
        bytes = &bytes[end + 1..];

        let parts: Vec<&str> = line.split(' ').collect();
        if parts[0] == "BEGIN" {
            let len: usize = parts[2].parse().unwrap();
            frames.push((parts[1].to_string(), bytes[..len].to_vec()));
            bytes = &bytes[len..];
        } else {
            commands.push(line);
        }
    }

    (frames, commands)
}

#[test]
fn three_axes_in_order_then_go_despite_timeouts() {
    // X acknowledged, Y and Z never answer.
    let link = MemoryLink::with_responses("OK\n");
    let mut session = SerialSession::new(link, Duration::from_millis(10), AckPolicy::Lenient);

    session.stage(Axis::Z, ramp(5));
    session.stage(Axis::X, ramp(3));
    session.stage(Axis::Y, ramp(4));

    let outcomes: Vec<(Axis, AckOutcome)> = session
        .transfer()
        .unwrap()
        .iter()
        .map(|t| (t.axis, t.outcome.clone()))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            (Axis::X, AckOutcome::Acknowledged),
            (Axis::Y, AckOutcome::TimedOut),
            (Axis::Z, AckOutcome::TimedOut),
        ]
    );

    let (frames, commands) = parse_wire(session.link().written());
    let labels: Vec<&str> = frames.iter().map(|(a, _)| a.as_str()).collect();
    assert_eq!(labels, ["X", "Y", "Z"]);
    assert_eq!(commands, ["GO"]);

    let z = event_list::decode(&frames[2].1).unwrap();
    assert_eq!(z.len(), 5);
}

#[test]
fn one_shot_transfer_without_staging() {
    let mut session = SerialSession::new(
        MemoryLink::with_responses("OK\nOK\n"),
        Duration::from_millis(10),
        AckPolicy::Strict,
    );
    let axes = AxisSet::new()
        .with(Axis::X, ramp(2))
        .with(Axis::Z, ramp(2));

    let transfers = session.transfer_axes(&axes).unwrap();
    assert_eq!(transfers.len(), 2);
    assert!(transfers.iter().all(|t| t.outcome.is_acknowledged()));
    assert!(session.staged().get(Axis::X).is_none());
}

#[test]
fn strict_timeout_is_fatal() {
    let mut session = SerialSession::new(
        MemoryLink::new(),
        Duration::from_millis(10),
        AckPolicy::Strict,
    );
    session.stage(Axis::Y, ramp(2));

    assert_eq!(
        session.transfer().map(|t| t.len()),
        Err(Error::Transfer(TransferError::Timeout { axis: 'Y' }))
    );
}

#[test]
fn staged_set_survives_transfer() {
    let mut session = SerialSession::new(
        MemoryLink::with_responses("OK\nOK\n"),
        Duration::from_millis(10),
        AckPolicy::Lenient,
    );
    session.stage(Axis::X, ramp(2));

    session.transfer().unwrap();
    session.transfer().unwrap();

    let (frames, commands) = parse_wire(session.link().written());
    assert_eq!(frames.len(), 2);
    assert_eq!(commands, ["GO", "GO"]);

    session.clear();
    assert!(session.staged().get(Axis::X).is_none());
}

/// Link whose writes always fail.
struct BrokenLink;

impl Read for BrokenLink {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl Write for BrokenLink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialLink for BrokenLink {
    fn set_read_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn write_failure_is_serial_error() {
    let mut session = SerialSession::new(BrokenLink, Duration::from_millis(10), AckPolicy::Lenient);
    session.stage(Axis::X, ramp(2));

    match session.transfer() {
        Err(Error::Transfer(TransferError::Serial(msg))) => assert!(msg.contains("unplugged")),
        other => panic!("expected serial error, got {:?}", other),
    }
}
