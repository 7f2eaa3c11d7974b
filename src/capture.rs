//! Host-side capture of downloaded sessions into labelled dataset files.
//!
//! The host forwards operator commands to the device. A `D` command switches
//! recording on; every response line is then appended to the current sample
//! file with the character label in front. A response is complete when the
//! link stays silent for the port timeout, at which point the sample number
//! advances and the next file is created with its header.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::config::SAMPLE_RATE_HZ;
use crate::errors::DatasetError;
use crate::link::Transport;
use crate::naming::SampleName;

const UTF8_BOM: &str = "\u{feff}";

/// Column header line preceding the records.
pub const COLUMNS: &str = "Label;accX;accY;accZ;gyrX;gyrY;gyrZ";

// ============================================================================
// Operator Input
// ============================================================================

/// The character drawn in the air and its numeric label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterLabel {
    pub text: String,
    pub code: u32,
}

impl CharacterLabel {
    /// A single character (labelled with its code point) or one of the words
    /// `IDLE` (22, synchronous idle), `enter` (13) and `backspace` (8).
    pub fn parse(input: &str) -> Result<Self, DatasetError> {
        let text = input.trim();
        let code = match text {
            "IDLE" => 22,
            "enter" => 13,
            "backspace" => 8,
            _ => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c as u32,
                    _ => {
                        return Err(DatasetError::InvalidInput(format!(
                            "{text:?}: enter a single character or one of IDLE, enter, backspace"
                        )))
                    }
                }
            }
        };
        Ok(Self {
            text: text.to_string(),
            code,
        })
    }
}

/// Subject or version identifier: up to two digits.
pub fn parse_two_digit(input: &str, what: &str) -> Result<u8, DatasetError> {
    let text = input.trim();
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DatasetError::InvalidInput(format!(
            "invalid {what} {text:?}: enter a number with up to 2 digits"
        )));
    }
    text.parse()
        .map_err(|_| DatasetError::InvalidInput(format!("invalid {what} {text:?}")))
}

/// Sample number: any digit string.
pub fn parse_sample_number(input: &str) -> Result<u32, DatasetError> {
    let text = input.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DatasetError::InvalidInput(format!(
            "invalid sample number {text:?}: enter a number"
        )));
    }
    text.parse()
        .map_err(|_| DatasetError::InvalidInput(format!("sample number {text:?} is too large")))
}

// ============================================================================
// Capture Files
// ============================================================================

/// Fixed metadata header of a fresh capture, including the column line.
pub fn header(name: &SampleName, imu: &str) -> String {
    format!(
        "AirChar - The in-the-Air Handwritten Dataset\n\
         for Character Recognition Based on Acceleration (IMU) Data\n\
         #\n\
         IMU: {imu}\n\
         Sampling Frequency: {rate}Hz\n\
         Size: ???\n\
         FileName: {name}\n\
         Character: {character}\n\
         Subject: {subject:02}\n\
         Version: {version:02}\n\
         Sample Number: {sample:04}\n\
         Preprocessing Filter: No\n\
         Augmentation: No\n\
         Features: No\n\
         Format: csv\n\
         #\n\
         {COLUMNS}\n",
        rate = SAMPLE_RATE_HZ,
        character = name.character,
        subject = name.subject,
        version = name.version,
        sample = name.sample,
    )
}

/// An open sample file receiving labelled records.
pub struct CaptureFile {
    path: PathBuf,
    file: File,
    records: usize,
}

impl CaptureFile {
    /// Create (or truncate) `<dir>/<name>` and write the header.
    pub fn create(dir: &Path, name: &SampleName, imu: &str) -> io::Result<Self> {
        let path = dir.join(name.to_string());
        fs::write(&path, format!("{UTF8_BOM}{}", header(name, imu)))?;
        let file = OpenOptions::new().append(true).open(&path)?;
        Ok(Self {
            path,
            file,
            records: 0,
        })
    }

    pub fn append(&mut self, label: u32, line: &str) -> io::Result<()> {
        writeln!(self.file, "{label};{line}")?;
        self.records += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> usize {
        self.records
    }
}

// ============================================================================
// Host Link
// ============================================================================

/// Line exchange with the device over a transport with a read timeout.
pub struct HostLink<T: Transport> {
    transport: T,
    pending: Vec<u8>,
}

impl<T: Transport> HostLink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pending: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Send one command line.
    pub fn send(&mut self, command: &str) -> io::Result<()> {
        self.transport.write_all(command.as_bytes())?;
        self.transport.write_all(b"\n")?;
        self.transport.flush()
    }

    /// Next response line, trimmed.
    ///
    /// A timeout (or end of stream) before a terminator returns whatever has
    /// arrived so far; `None` means the device had nothing more to say.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=pos).collect();
                return Ok(Some(String::from_utf8_lossy(&line).trim().to_string()));
            }

            let mut buf = [0u8; 256];
            match self.transport.read(&mut buf) {
                Ok(n) if n > 0 => self.pending.extend_from_slice(&buf[..n]),
                Ok(_) => return Ok(self.take_partial()),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(self.take_partial())
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn take_partial(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).trim().to_string();
        self.pending.clear();
        Some(line)
    }
}

/// Six `;`-separated fields, as the device's download emits them.
fn is_record_line(line: &str) -> bool {
    line.split(';').count() == 6
}

// ============================================================================
// Capture Session
// ============================================================================

/// Result of one operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The command was forwarded; these are the device's response lines.
    Continue { responses: Vec<String> },
    Exit,
}

pub struct CaptureSession<T: Transport> {
    link: HostLink<T>,
    label: CharacterLabel,
    name: SampleName,
    directory: PathBuf,
    imu: String,
    file: CaptureFile,
    recording: bool,
}

impl<T: Transport> CaptureSession<T> {
    /// Create the output directory and the first sample file.
    pub fn new(
        transport: T,
        label: CharacterLabel,
        name: SampleName,
        directory: &Path,
        imu: &str,
    ) -> Result<Self> {
        fs::create_dir_all(directory)
            .with_context(|| format!("Failed to create {}", directory.display()))?;
        let file = CaptureFile::create(directory, &name, imu)
            .with_context(|| format!("Failed to create sample file {}", name))?;
        info!("the file will be saved as {}", file.path().display());

        Ok(Self {
            link: HostLink::new(transport),
            label,
            name,
            directory: directory.to_path_buf(),
            imu: imu.to_string(),
            file,
            recording: false,
        })
    }

    /// Sample file currently receiving records.
    pub fn current_file(&self) -> &Path {
        self.file.path()
    }

    pub fn name(&self) -> &SampleName {
        &self.name
    }

    pub fn link(&self) -> &HostLink<T> {
        &self.link
    }

    /// Forward `command` and collect the response.
    ///
    /// `X` is sent and ends the session without waiting for a reply. `D`
    /// records the response into the current file and then moves on to the
    /// next sample number.
    pub fn execute(&mut self, command: &str) -> Result<Step> {
        self.link
            .send(command)
            .context("Failed to send command to device")?;

        let token = command.trim().to_ascii_uppercase();
        if token == "X" {
            return Ok(Step::Exit);
        }
        if token == "D" {
            self.recording = true;
            info!("recording data to {}", self.file.path().display());
        }

        let mut responses = Vec::new();
        while let Some(line) = self
            .link
            .read_line()
            .context("Failed to read device response")?
        {
            if line.is_empty() {
                break;
            }
            if self.recording && !is_record_line(&line) {
                warn!("not a sample record, left out of {}: {}", self.file.path().display(), line);
            } else if self.recording {
                self.file
                    .append(self.label.code, &line)
                    .with_context(|| format!("Failed to write {}", self.file.path().display()))?;
            }
            responses.push(line);
        }

        if self.recording {
            self.recording = false;
            debug!(
                "{} records written to {}",
                self.file.records(),
                self.file.path().display()
            );
            self.name = self.name.next_sample();
            self.file = CaptureFile::create(&self.directory, &self.name, &self.imu)
                .with_context(|| format!("Failed to create sample file {}", self.name))?;
            info!("the next file will be saved at {}", self.file.path().display());
        }

        Ok(Step::Continue { responses })
    }
}
