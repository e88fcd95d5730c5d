//! Serial upload of trajectories to the controller (std only).
//!
//! A [`SerialSession`] owns one link to one device, stages a trajectory per
//! axis and uploads them as event-list payloads with a per-axis `BEGIN`/`OK`
//! handshake, followed by `GO`.
//!
//! # Example
//!
//! ```rust,ignore
//! use stepper_trajectory::transport::{Axis, SerialSession};
//!
//! let mut session = SerialSession::open(&config.serial)?;
//! session.stage(Axis::X, trajectory);
//! for t in session.transfer()? {
//!     println!("{}: {:?}", t.axis, t.outcome);
//! }
//! ```

mod link;
mod session;

pub use crate::config::AckPolicy;
pub use link::{read_line, MemoryLink, SerialLink, MAX_LINE_LEN};
pub use session::{AckOutcome, Axis, AxisSet, AxisTransfer, SerialSession};
