//! Byte links to the controller and line framing on top of them.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use log::trace;

/// Longest response line read before giving up on a terminator.
pub const MAX_LINE_LEN: usize = 256;

/// A bidirectional byte stream with a configurable read timeout.
pub trait SerialLink: Read + Write {
    /// Bound how long a single read may block.
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl SerialLink for Box<dyn serialport::SerialPort> {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        serialport::SerialPort::set_timeout(self.as_mut(), timeout).map_err(io::Error::from)
    }
}

impl<L: SerialLink + ?Sized> SerialLink for &mut L {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).set_read_timeout(timeout)
    }
}

/// Read one `\n`-terminated line, without the terminator or a trailing `\r`.
///
/// Returns `Ok(None)` if the link times out or closes before a full line
/// arrives, or if `timeout` elapses across the whole line. After
/// [`MAX_LINE_LEN`] bytes without a terminator the bytes so far are returned
/// as the line.
pub fn read_line<L: Read + ?Sized>(link: &mut L, timeout: Duration) -> io::Result<Option<String>> {
    let deadline = Instant::now() + timeout;
    let mut buf = [0u8; 1];
    let mut bytes = Vec::new();

    while bytes.len() < MAX_LINE_LEN {
        if Instant::now() >= deadline {
            trace!("serial recv: deadline passed after {} bytes", bytes.len());
            return Ok(None);
        }
        match link.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => {
                if buf[0] == b'\n' {
                    break;
                }
                bytes.push(buf[0]);
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    let line = String::from_utf8_lossy(&bytes).into_owned();
    trace!("serial recv: {:?}", line);
    Ok(Some(line))
}

/// In-memory link: reads come from a scripted response buffer, writes are
/// captured. An exhausted buffer reads as a timeout.
///
/// Useful for dry runs and tests without hardware attached.
#[derive(Debug, Default)]
pub struct MemoryLink {
    input: VecDeque<u8>,
    output: Vec<u8>,
    read_timeout: Option<Duration>,
}

impl MemoryLink {
    /// Empty link: every read times out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Link that will answer with `responses` (raw bytes, lines included).
    pub fn with_responses(responses: &str) -> Self {
        let mut link = Self::new();
        link.push_response(responses);
        link
    }

    /// Queue more response bytes.
    pub fn push_response(&mut self, response: &str) {
        self.input.extend(response.bytes());
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.output
    }

    /// Last timeout set through [`SerialLink::set_read_timeout`].
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }
}

impl Read for MemoryLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.input.pop_front() {
            Some(b) => {
                buf[0] = b;
                Ok(1)
            }
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "no response queued")),
        }
    }
}

impl Write for MemoryLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialLink for MemoryLink {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.read_timeout = Some(timeout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn test_read_line_strips_terminators() {
        let mut link = MemoryLink::with_responses("OK\r\nERR busy\n");

        assert_eq!(read_line(&mut link, TIMEOUT).unwrap().as_deref(), Some("OK"));
        assert_eq!(read_line(&mut link, TIMEOUT).unwrap().as_deref(), Some("ERR busy"));
        assert_eq!(read_line(&mut link, TIMEOUT).unwrap(), None);
    }

    #[test]
    fn test_partial_line_is_timeout() {
        let mut link = MemoryLink::with_responses("O");
        assert_eq!(read_line(&mut link, TIMEOUT).unwrap(), None);
    }

    #[test]
    fn test_long_line_stops_at_limit() {
        let long = "A".repeat(MAX_LINE_LEN + 10) + "\n";
        let mut link = MemoryLink::with_responses(&long);

        let line = read_line(&mut link, TIMEOUT).unwrap().unwrap();
        assert_eq!(line.len(), MAX_LINE_LEN);
        assert_eq!(read_line(&mut link, TIMEOUT).unwrap().unwrap().len(), 10);
    }

    /// Never sends a newline.
    struct Chatty {
        reads: usize,
        delay: Duration,
    }

    impl Read for Chatty {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            std::thread::sleep(self.delay);
            buf[0] = b'A';
            Ok(1)
        }
    }

    #[test]
    fn test_endless_stream_is_bounded_by_length() {
        let mut link = Chatty {
            reads: 0,
            delay: Duration::ZERO,
        };

        let line = read_line(&mut link, TIMEOUT).unwrap().unwrap();
        assert_eq!(line.len(), MAX_LINE_LEN);
        assert_eq!(link.reads, MAX_LINE_LEN);
    }

    #[test]
    fn test_slow_stream_is_bounded_by_deadline() {
        let mut link = Chatty {
            reads: 0,
            delay: Duration::from_millis(5),
        };

        assert_eq!(read_line(&mut link, Duration::from_millis(30)).unwrap(), None);
        assert!(link.reads < MAX_LINE_LEN);
    }
}
