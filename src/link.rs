//! Command link: non-blocking line sources.
//!
//! The device loop must never block on input, so a source either returns a
//! complete line that has already arrived or `None`.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::mpsc::{Receiver, TryRecvError};

use log::warn;

use crate::config::MAX_LINE_LEN;

/// Trait for Read + Write + Send, allowing different transport backends.
pub trait Transport: Read + Write + Send {}
impl<T: Read + Write + Send> Transport for T {}

/// A source of newline-delimited command lines.
pub trait LineSource {
    /// Next complete line without its terminator, if one has arrived.
    ///
    /// Lines are returned one per call in arrival order.
    fn poll_line(&mut self) -> io::Result<Option<String>>;
}

// ============================================================================
// Byte Stream Source
// ============================================================================

/// Assembles lines from a byte reader such as a serial port.
///
/// Reader timeouts and `WouldBlock` mean "nothing yet". `\r\n` and `\n` are
/// both accepted as terminators. A line longer than [`MAX_LINE_LEN`] is
/// discarded up to its terminator.
pub struct SerialLines<R: Read> {
    reader: R,
    pending: Vec<u8>,
    overflowed: bool,
    ready: VecDeque<String>,
}

impl<R: Read> SerialLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::with_capacity(MAX_LINE_LEN),
            overflowed: false,
            ready: VecDeque::new(),
        }
    }

    fn accept(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if byte == b'\n' {
                if self.overflowed {
                    warn!("discarded over-long command line");
                    self.overflowed = false;
                } else {
                    if self.pending.last() == Some(&b'\r') {
                        self.pending.pop();
                    }
                    self.ready
                        .push_back(String::from_utf8_lossy(&self.pending).into_owned());
                }
                self.pending.clear();
            } else if self.pending.len() >= MAX_LINE_LEN {
                self.overflowed = true;
                self.pending.clear();
            } else if !self.overflowed {
                self.pending.push(byte);
            }
        }
    }
}

impl<R: Read> LineSource for SerialLines<R> {
    fn poll_line(&mut self) -> io::Result<Option<String>> {
        if let Some(line) = self.ready.pop_front() {
            return Ok(Some(line));
        }

        let mut buf = [0u8; MAX_LINE_LEN];
        match self.reader.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => self.accept(&buf[..n]),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) => {}
            Err(e) => return Err(e),
        }

        Ok(self.ready.pop_front())
    }
}

// ============================================================================
// Channel Source
// ============================================================================

/// Lines delivered by another thread, e.g. a blocking stdin reader.
///
/// Once the sending side is gone and the queue is drained, polling returns
/// an `UnexpectedEof` error.
pub struct ChannelLines {
    rx: Receiver<String>,
}

impl ChannelLines {
    pub fn new(rx: Receiver<String>) -> Self {
        Self { rx }
    }
}

impl LineSource for ChannelLines {
    fn poll_line(&mut self) -> io::Result<Option<String>> {
        match self.rx.try_recv() {
            Ok(line) => Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                "command channel closed",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    /// Reader that hands out one scripted chunk (or error) per read call.
    struct Chunks(VecDeque<io::Result<Vec<u8>>>);

    impl Read for Chunks {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }

    fn chunks(items: Vec<io::Result<Vec<u8>>>) -> SerialLines<Chunks> {
        SerialLines::new(Chunks(items.into_iter().collect()))
    }

    fn ok(bytes: &[u8]) -> io::Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }

    fn err(kind: ErrorKind) -> io::Result<Vec<u8>> {
        Err(io::Error::new(kind, "scripted"))
    }

    #[test]
    fn assembles_split_lines_and_strips_cr() {
        let mut lines = chunks(vec![ok(b"S"), ok(b"\r\n")]);
        assert_eq!(lines.poll_line().unwrap(), None);
        assert_eq!(lines.poll_line().unwrap(), Some("S".to_string()));
        assert_eq!(lines.poll_line().unwrap(), None);
    }

    #[test]
    fn burst_is_delivered_one_line_per_poll() {
        let mut lines = chunks(vec![ok(b"S\n\nD\n")]);
        assert_eq!(lines.poll_line().unwrap(), Some("S".to_string()));
        assert_eq!(lines.poll_line().unwrap(), Some(String::new()));
        assert_eq!(lines.poll_line().unwrap(), Some("D".to_string()));
        assert_eq!(lines.poll_line().unwrap(), None);
    }

    #[test]
    fn timeouts_mean_no_input() {
        let mut lines = chunks(vec![
            err(ErrorKind::TimedOut),
            err(ErrorKind::WouldBlock),
            ok(b"x\n"),
        ]);
        assert_eq!(lines.poll_line().unwrap(), None);
        assert_eq!(lines.poll_line().unwrap(), None);
        assert_eq!(lines.poll_line().unwrap(), Some("x".to_string()));
    }

    #[test]
    fn hard_errors_propagate() {
        let mut lines = chunks(vec![err(ErrorKind::BrokenPipe)]);
        assert_eq!(
            lines.poll_line().unwrap_err().kind(),
            ErrorKind::BrokenPipe
        );
    }

    #[test]
    fn over_long_line_is_dropped() {
        let long = vec![b'A'; MAX_LINE_LEN + 10];
        let mut lines = chunks(vec![
            ok(&long[..MAX_LINE_LEN]),
            ok(&long[MAX_LINE_LEN..]),
            ok(b"\nS\n"),
        ]);
        assert_eq!(lines.poll_line().unwrap(), None);
        assert_eq!(lines.poll_line().unwrap(), None);
        assert_eq!(lines.poll_line().unwrap(), Some("S".to_string()));
    }

    #[test]
    fn channel_source_reports_closed_link() {
        let (tx, rx) = mpsc::channel();
        let mut lines = ChannelLines::new(rx);
        assert_eq!(lines.poll_line().unwrap(), None);
        tx.send("d\n".to_string()).unwrap();
        assert_eq!(lines.poll_line().unwrap(), Some("d".to_string()));
        drop(tx);
        assert_eq!(
            lines.poll_line().unwrap_err().kind(),
            ErrorKind::UnexpectedEof
        );
    }
}
