//! Per-device upload session.
//!
//! Protocol, per axis in X, Y, Z order:
//!
//! ```text
//! host -> BEGIN <AXIS> <payload bytes>\n
//! host -> <event-list payload>
//! ctrl -> OK\n
//! ```
//!
//! followed by a single `GO\n` once every axis has been sent.

use std::io::Write;
use std::time::Duration;

use log::{debug, info, trace, warn};

use crate::codec::event_list;
use crate::config::{AckPolicy, SerialConfig};
use crate::error::{Result, TransferError};
use crate::trajectory::Trajectory;

use super::link::{read_line, SerialLink};

/// Controller axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// First axis.
    X,
    /// Second axis.
    Y,
    /// Third axis.
    Z,
}

impl Axis {
    /// All axes in transfer order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Label used on the wire.
    pub fn label(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }

    /// Position in [`Axis::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl core::fmt::Display for Axis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Up to one trajectory per axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisSet {
    axes: [Option<Trajectory>; 3],
}

impl AxisSet {
    /// No axes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`AxisSet::set`].
    pub fn with(mut self, axis: Axis, trajectory: Trajectory) -> Self {
        self.set(axis, trajectory);
        self
    }

    /// Assign `axis`, returning what it held before.
    pub fn set(&mut self, axis: Axis, trajectory: Trajectory) -> Option<Trajectory> {
        self.axes[axis.index()].replace(trajectory)
    }

    /// Remove `axis`, returning what it held.
    pub fn remove(&mut self, axis: Axis) -> Option<Trajectory> {
        self.axes[axis.index()].take()
    }

    /// Trajectory assigned to `axis`.
    pub fn get(&self, axis: Axis) -> Option<&Trajectory> {
        self.axes[axis.index()].as_ref()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.axes = Default::default();
    }

    /// Assigned axes in X, Y, Z order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &Trajectory)> + '_ {
        Axis::ALL
            .into_iter()
            .filter_map(move |axis| self.get(axis).map(|t| (axis, t)))
    }
}

/// How the controller answered one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    /// `OK` received.
    Acknowledged,
    /// Some other line received.
    Rejected(String),
    /// No complete line before the timeout.
    TimedOut,
}

impl AckOutcome {
    /// True for [`AckOutcome::Acknowledged`].
    pub fn is_acknowledged(&self) -> bool {
        matches!(self, AckOutcome::Acknowledged)
    }
}

/// Record of one axis upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisTransfer {
    /// Axis sent.
    pub axis: Axis,
    /// Payload size announced in `BEGIN`.
    pub payload_len: usize,
    /// Controller answer.
    pub outcome: AckOutcome,
}

/// One open link to one controller.
///
/// The session stages per-axis trajectories and uploads them on
/// [`SerialSession::transfer`]. Methods take `&mut self`, so concurrent
/// uploads over one link are ruled out by the borrow checker.
pub struct SerialSession<L: SerialLink> {
    link: L,
    ack_timeout: Duration,
    policy: AckPolicy,
    staged: AxisSet,
    transfers: heapless::Vec<AxisTransfer, 3>,
}

impl SerialSession<Box<dyn serialport::SerialPort>> {
    /// Open the configured serial port.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::Serial` if the port can't be opened.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.ack_timeout_ms);
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|e| TransferError::Serial(format!("open {}: {}", config.port, e)))?;

        info!(
            "opened {} at {} baud (ack timeout {:?}, {:?} policy)",
            config.port, config.baud_rate, timeout, config.ack_policy
        );

        Ok(Self::new(port, timeout, config.ack_policy))
    }
}

impl<L: SerialLink> SerialSession<L> {
    /// Wrap an already open link.
    pub fn new(link: L, ack_timeout: Duration, policy: AckPolicy) -> Self {
        Self {
            link,
            ack_timeout,
            policy,
            staged: AxisSet::new(),
            transfers: heapless::Vec::new(),
        }
    }

    /// Stage `trajectory` for `axis`, returning the one it replaces.
    pub fn stage(&mut self, axis: Axis, trajectory: Trajectory) -> Option<Trajectory> {
        debug!("staged axis {} ({} samples)", axis, trajectory.len());
        self.staged.set(axis, trajectory)
    }

    /// Drop the staged trajectory for `axis`.
    pub fn unstage(&mut self, axis: Axis) -> Option<Trajectory> {
        self.staged.remove(axis)
    }

    /// Drop every staged trajectory.
    pub fn clear(&mut self) {
        self.staged.clear();
    }

    /// Currently staged trajectories.
    pub fn staged(&self) -> &AxisSet {
        &self.staged
    }

    /// ACK failure policy.
    pub fn policy(&self) -> AckPolicy {
        self.policy
    }

    /// Records of the most recent transfer, in send order.
    pub fn transfers(&self) -> &[AxisTransfer] {
        &self.transfers
    }

    /// Borrow the underlying link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Close the session, returning the link.
    pub fn into_link(self) -> L {
        self.link
    }

    /// Upload the staged trajectories, then send `GO`.
    ///
    /// Staged trajectories are kept, so the same set can be sent again.
    ///
    /// # Errors
    ///
    /// See [`SerialSession::transfer_axes`].
    pub fn transfer(&mut self) -> Result<&[AxisTransfer]> {
        let staged = core::mem::take(&mut self.staged);
        let result = self.upload(&staged);
        self.staged = staged;
        result?;
        Ok(&self.transfers)
    }

    /// Upload `axes` directly, bypassing the staging area.
    ///
    /// Every axis is checked before the first byte is written. Axes without
    /// samples are skipped.
    ///
    /// # Errors
    ///
    /// - `TransferError::LengthMismatch` before any I/O
    /// - `TransferError::Serial` on write or read failures
    /// - `TransferError::Rejected` / `TransferError::Timeout` under
    ///   [`AckPolicy::Strict`]; `GO` is not sent in that case
    pub fn transfer_axes(&mut self, axes: &AxisSet) -> Result<&[AxisTransfer]> {
        self.upload(axes)?;
        Ok(&self.transfers)
    }

    fn upload(&mut self, axes: &AxisSet) -> Result<()> {
        for (axis, trajectory) in axes.iter() {
            if trajectory.times.len() != trajectory.angles.len() {
                return Err(TransferError::LengthMismatch {
                    axis: axis.label(),
                    times: trajectory.times.len(),
                    angles: trajectory.angles.len(),
                }
                .into());
            }
        }

        self.transfers.clear();
        self.link
            .set_read_timeout(self.ack_timeout)
            .map_err(serial_error)?;

        for (axis, trajectory) in axes.iter() {
            if trajectory.is_empty() {
                debug!("axis {} has no samples, skipped", axis);
                continue;
            }

            let payload = event_list::encode(trajectory)?;
            let begin = format!("BEGIN {} {}\n", axis.label(), payload.len());
            trace!("serial send: {:?}", begin.trim_end());

            self.link.write_all(begin.as_bytes()).map_err(serial_error)?;
            self.link.write_all(&payload).map_err(serial_error)?;
            self.link.flush().map_err(serial_error)?;

            let response = read_line(&mut self.link, self.ack_timeout).map_err(serial_error)?;
            let outcome = match response {
                Some(line) if line == "OK" => AckOutcome::Acknowledged,
                Some(line) => AckOutcome::Rejected(line),
                None => AckOutcome::TimedOut,
            };

            // One record per axis, so capacity 3 is never exceeded.
            let _ = self.transfers.push(AxisTransfer {
                axis,
                payload_len: payload.len(),
                outcome: outcome.clone(),
            });

            match outcome {
                AckOutcome::Acknowledged => {
                    info!("axis {}: {} bytes acknowledged", axis, payload.len());
                }
                AckOutcome::Rejected(line) => {
                    if self.policy == AckPolicy::Strict {
                        return Err(TransferError::Rejected {
                            axis: axis.label(),
                            response: line,
                        }
                        .into());
                    }
                    warn!("axis {}: unexpected response {:?}", axis, line);
                }
                AckOutcome::TimedOut => {
                    if self.policy == AckPolicy::Strict {
                        return Err(TransferError::Timeout { axis: axis.label() }.into());
                    }
                    warn!(
                        "axis {}: no ACK within {:?}, continuing",
                        axis, self.ack_timeout
                    );
                }
            }
        }

        trace!("serial send: \"GO\"");
        self.link.write_all(b"GO\n").map_err(serial_error)?;
        self.link.flush().map_err(serial_error)?;
        info!("GO sent after {} axis transfer(s)", self.transfers.len());

        Ok(())
    }
}

fn serial_error(e: std::io::Error) -> crate::error::Error {
    TransferError::Serial(e.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::{MemoryLink, MAX_LINE_LEN};

    fn traj(n: usize) -> Trajectory {
        let times = (0..n).map(|i| i as f64 * 0.01).collect();
        let angles = (0..n).map(|i| i as f64).collect();
        Trajectory::new(times, angles)
    }

    fn session(responses: &str, policy: AckPolicy) -> SerialSession<MemoryLink> {
        SerialSession::new(
            MemoryLink::with_responses(responses),
            Duration::from_millis(50),
            policy,
        )
    }

    #[test]
    fn test_single_axis_wire_format() {
        let mut s = session("OK\n", AckPolicy::Lenient);
        s.stage(Axis::Y, traj(2));

        let transfers = s.transfer().unwrap().to_vec();
        assert_eq!(
            transfers,
            vec![AxisTransfer {
                axis: Axis::Y,
                payload_len: 20,
                outcome: AckOutcome::Acknowledged,
            }]
        );

        let written = s.link().written();
        assert!(written.starts_with(b"BEGIN Y 20\n"));
        assert!(written.ends_with(b"GO\n"));
        assert_eq!(written.len(), "BEGIN Y 20\n".len() + 20 + 3);
        assert_eq!(s.link().read_timeout(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_length_mismatch_writes_nothing() {
        let mut s = session("OK\nOK\n", AckPolicy::Lenient);
        s.stage(Axis::X, traj(3));
        s.stage(Axis::Z, Trajectory::new(vec![0.0, 1.0], vec![0.0]));

        assert_eq!(
            s.transfer(),
            Err(Error::Transfer(TransferError::LengthMismatch {
                axis: 'Z',
                times: 2,
                angles: 1
            }))
        );
        assert!(s.link().written().is_empty());
        assert!(s.staged().get(Axis::X).is_some());
    }

    #[test]
    fn test_strict_policy_aborts_before_go() {
        let mut s = session("NAK\n", AckPolicy::Strict);
        s.stage(Axis::X, traj(2));
        s.stage(Axis::Y, traj(2));

        assert_eq!(
            s.transfer(),
            Err(Error::Transfer(TransferError::Rejected {
                axis: 'X',
                response: "NAK".into()
            }))
        );
        assert!(!s.link().written().ends_with(b"GO\n"));
        assert_eq!(s.transfers().len(), 1);
    }

    #[test]
    fn test_lenient_policy_records_timeouts() {
        let mut s = session("", AckPolicy::Lenient);
        s.stage(Axis::X, traj(1));

        let transfers = s.transfer().unwrap();
        assert_eq!(transfers[0].outcome, AckOutcome::TimedOut);
        assert!(s.link().written().ends_with(b"GO\n"));
    }

    #[test]
    fn test_empty_axis_skipped() {
        let mut s = session("OK\n", AckPolicy::Lenient);
        s.stage(Axis::X, Trajectory::default());
        s.stage(Axis::Z, traj(1));

        let transfers = s.transfer().unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].axis, Axis::Z);
    }

    #[test]
    fn test_ack_must_be_exact() {
        let mut s = session(" OK\t\nOK\r\n", AckPolicy::Lenient);
        s.stage(Axis::X, traj(1));
        s.stage(Axis::Y, traj(1));

        let outcomes: Vec<AckOutcome> = s
            .transfer()
            .unwrap()
            .iter()
            .map(|t| t.outcome.clone())
            .collect();
        assert_eq!(
            outcomes,
            vec![AckOutcome::Rejected(" OK\t".into()), AckOutcome::Acknowledged]
        );
    }

    #[test]
    fn test_chatty_device_does_not_stall_transfer() {
        let noise = "A".repeat(MAX_LINE_LEN * 2);
        let mut s = session(&noise, AckPolicy::Lenient);
        s.stage(Axis::X, traj(1));

        let transfers = s.transfer().unwrap();
        assert!(matches!(
            transfers[0].outcome,
            AckOutcome::Rejected(ref line) if line.len() == MAX_LINE_LEN
        ));
        assert!(s.link().written().ends_with(b"GO\n"));
    }
}
