//! Line-oriented command protocol.
//!
//! | Input       | Idle                 | Sampling            |
//! |-------------|----------------------|---------------------|
//! | `S`         | start, status echo   | rejected            |
//! | `D`         | dump buffered data   | rejected            |
//! | `X`         | stop (no-op), echo   | rejected            |
//! | empty line  | ignored              | stop, status echo   |
//! | other       | ignored              | rejected            |
//!
//! Tokens are trimmed and case-insensitive.

use std::io::{self, Write};

use log::{debug, warn};

use crate::acquisition::Acquisition;
use crate::download;

/// Printed once at boot.
pub const BOOT_PROMPT: &str =
    "Send 'S' to start sampling, an empty line to stop, 'D' to download";
pub const STATUS_STARTED: &str = "Sampling started";
pub const STATUS_STOPPED: &str = "Sampling stopped";
pub const DIAG_BUSY: &str = "Sampling in progress, send an empty line to stop";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Download,
    Stop,
    Blank,
    Other(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let token = line.trim();
        if token.is_empty() {
            Command::Blank
        } else if token.eq_ignore_ascii_case("S") {
            Command::Start
        } else if token.eq_ignore_ascii_case("D") {
            Command::Download
        } else if token.eq_ignore_ascii_case("X") {
            Command::Stop
        } else {
            Command::Other(token.to_string())
        }
    }
}

/// What the handler did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Started,
    Stopped,
    /// Number of records written.
    Downloaded(usize),
    /// Input not allowed while sampling; a diagnostic was sent.
    Rejected,
    Ignored,
}

/// Apply one command line to the acquisition and write any response to `out`.
pub fn dispatch<W, const N: usize>(
    line: &str,
    acquisition: &mut Acquisition<N>,
    out: &mut W,
) -> io::Result<Reply>
where
    W: Write + ?Sized,
{
    let command = Command::parse(line);

    if acquisition.is_sampling() {
        return match command {
            Command::Blank => {
                acquisition.stop();
                status(out, STATUS_STOPPED)?;
                Ok(Reply::Stopped)
            }
            other => {
                warn!("rejected {:?} while sampling", other);
                status(out, DIAG_BUSY)?;
                Ok(Reply::Rejected)
            }
        };
    }

    match command {
        Command::Start => {
            acquisition.start();
            status(out, STATUS_STARTED)?;
            Ok(Reply::Started)
        }
        Command::Download => {
            let n = download::write_samples(out, acquisition.samples())?;
            debug!("downloaded {} records", n);
            Ok(Reply::Downloaded(n))
        }
        Command::Stop => {
            acquisition.stop();
            status(out, STATUS_STOPPED)?;
            Ok(Reply::Stopped)
        }
        Command::Blank | Command::Other(_) => {
            debug!("ignored {:?} while idle", command);
            Ok(Reply::Ignored)
        }
    }
}

fn status<W: Write + ?Sized>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "{}", text)?;
    out.flush()
}
