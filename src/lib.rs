//! AirChar IMU acquisition core.
//!
//! This crate samples a 6-axis inertial sensor (acceleration and angular
//! rate) into a bounded buffer and serves a small line protocol over a serial
//! link to start and stop sampling and to download the buffered data as text.
//! It also carries the host-side tooling that turns downloads into labelled
//! dataset files and augments them offline.
//!
//! # Device Loop
//!
//! The device is a single cooperative loop. Each iteration:
//!
//! 1. polls the command link and handles at most one line;
//! 2. makes at most one sample attempt, pausing `1000 / SAMPLE_RATE_HZ` ms
//!    after a successful read.
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use std::sync::mpsc;
//! use airchar::{ChannelLines, Device, SamplingClock, StdDelay, SyntheticImu};
//!
//! let (tx, rx) = mpsc::channel::<String>();
//! let mut device: Device<_, _, _, _> = Device::boot(
//!     ChannelLines::new(rx),
//!     std::io::stdout(),
//!     SyntheticImu::default(),
//!     StdDelay,
//!     SamplingClock::default(),
//! )?;
//! tx.send("S".into()).unwrap();
//! device.run(&AtomicBool::new(true))?;
//! # Ok::<(), airchar::DeviceError>(())
//! ```
//!
//! # Protocol
//!
//! | Line       | Idle                     | Sampling             |
//! |------------|--------------------------|----------------------|
//! | `S`        | start a session          | rejected             |
//! | `D`        | `ax;ay;az;gx;gy;gz` rows | rejected             |
//! | `X`        | stop (no-op)             | rejected             |
//! | empty line | ignored                  | stop                 |

pub mod acquisition;
pub mod augment;
pub mod buffer;
pub mod capture;
pub mod clock;
pub mod config;
pub mod device;
pub mod download;
pub mod errors;
pub mod link;
pub mod logging;
pub mod naming;
pub mod protocol;
pub mod record;
pub mod sensor;

pub use acquisition::{Acquisition, AcquisitionState, SampleOutcome};
pub use buffer::{Sample, SampleBuffer};
pub use clock::{Delay, SamplingClock, StdDelay};
pub use config::{CaptureConfig, BUFFER_SIZE, SAMPLE_RATE_HZ};
pub use device::{Device, Iteration};
pub use errors::*;
pub use link::{ChannelLines, LineSource, SerialLines, Transport};
pub use protocol::{Command, Reply};
pub use sensor::{ImuSensor, ScriptedImu, SyntheticImu};
