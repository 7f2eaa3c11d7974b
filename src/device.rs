//! Cooperative control loop.
//!
//! One iteration polls the command link for at most one line and processes
//! it, then makes at most one sample attempt. The pacing delay inside the
//! sample attempt is the only place the loop suspends.

use std::io::{ErrorKind, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};

use crate::acquisition::{Acquisition, AcquisitionState, SampleOutcome};
use crate::clock::{Delay, SamplingClock};
use crate::config::BUFFER_SIZE;
use crate::errors::{DeviceError, Result};
use crate::link::LineSource;
use crate::protocol::{self, Reply};
use crate::sensor::ImuSensor;

/// What happened during one [`Device::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iteration {
    pub reply: Option<Reply>,
    pub sample: SampleOutcome,
}

pub struct Device<L, W, S, D, const N: usize = BUFFER_SIZE>
where
    L: LineSource,
    W: Write,
    S: ImuSensor,
    D: Delay,
{
    lines: L,
    out: W,
    sensor: S,
    delay: D,
    acquisition: Acquisition<N>,
}

impl<L, W, S, D, const N: usize> Device<L, W, S, D, N>
where
    L: LineSource,
    W: Write,
    S: ImuSensor,
    D: Delay,
{
    /// Initialize the sensor and print the boot prompt.
    ///
    /// A sensor that fails to initialize is an unrecoverable fault; the
    /// caller is expected to halt.
    pub fn boot(lines: L, mut out: W, mut sensor: S, delay: D, clock: SamplingClock) -> Result<Self> {
        if !sensor.initialize() {
            error!("failed to initialize IMU");
            return Err(DeviceError::SensorInit(
                "IMU did not respond to configuration".to_string(),
            ));
        }
        info!("IMU initialized, sampling at {} Hz", clock.rate_hz());

        writeln!(out, "{}", protocol::BOOT_PROMPT)?;
        out.flush()?;

        Ok(Self {
            lines,
            out,
            sensor,
            delay,
            acquisition: Acquisition::new(clock),
        })
    }

    /// Run one loop iteration.
    pub fn step(&mut self) -> Result<Iteration> {
        let line = self.lines.poll_line().map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => DeviceError::LinkClosed,
            _ => DeviceError::Io(e),
        })?;
        let reply = match line {
            Some(line) => Some(protocol::dispatch(
                &line,
                &mut self.acquisition,
                &mut self.out,
            )?),
            None => None,
        };
        let sample = self.acquisition.poll(&mut self.sensor, &mut self.delay);
        Ok(Iteration { reply, sample })
    }

    /// Loop until `running` is cleared or the link fails.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        while running.load(Ordering::SeqCst) {
            self.step()?;
        }
        info!("device loop stopped");
        Ok(())
    }

    pub fn state(&self) -> AcquisitionState {
        self.acquisition.state()
    }

    pub fn acquisition(&self) -> &Acquisition<N> {
        &self.acquisition
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }
}
