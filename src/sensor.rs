//! Inertial sensor collaborator.
//!
//! The acquisition core only needs readiness predicates and read calls for the
//! two triples. Two implementations ship with the crate: [`ScriptedImu`], which
//! replays a fixed list of readings, and [`SyntheticImu`], which produces a
//! smooth synthetic signal at a fixed output data rate.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::debug;

use crate::buffer::Sample;

/// Sensor driver interface consumed by the acquisition state machine.
pub trait ImuSensor {
    /// Configure the device. `false` is a fatal hardware fault.
    fn initialize(&mut self) -> bool;
    fn acceleration_available(&mut self) -> bool;
    fn gyroscope_available(&mut self) -> bool;
    /// Acceleration in g.
    fn read_acceleration(&mut self) -> [f32; 3];
    /// Angular rate in degrees per second.
    fn read_gyroscope(&mut self) -> [f32; 3];
}

impl<S: ImuSensor + ?Sized> ImuSensor for Box<S> {
    fn initialize(&mut self) -> bool {
        (**self).initialize()
    }
    fn acceleration_available(&mut self) -> bool {
        (**self).acceleration_available()
    }
    fn gyroscope_available(&mut self) -> bool {
        (**self).gyroscope_available()
    }
    fn read_acceleration(&mut self) -> [f32; 3] {
        (**self).read_acceleration()
    }
    fn read_gyroscope(&mut self) -> [f32; 3] {
        (**self).read_gyroscope()
    }
}

// ============================================================================
// Scripted Sensor
// ============================================================================

/// Replays queued readings, one per ready poll.
///
/// A queued [`ScriptedImu::push_not_ready`] entry makes exactly one poll report
/// that acceleration data is not available yet. With an empty queue the sensor
/// is never ready.
#[derive(Debug, Default)]
pub struct ScriptedImu {
    script: VecDeque<Option<Sample>>,
    init_ok: bool,
    reads: usize,
}

impl ScriptedImu {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            init_ok: true,
            reads: 0,
        }
    }

    /// Sensor whose initialization fails.
    pub fn faulty() -> Self {
        Self {
            init_ok: false,
            ..Self::new()
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.script.push_back(Some(sample));
    }

    pub fn push_not_ready(&mut self) {
        self.script.push_back(None);
    }

    pub fn extend<I: IntoIterator<Item = Sample>>(&mut self, samples: I) {
        self.script.extend(samples.into_iter().map(Some));
    }

    /// Entries still queued, ready or not.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Completed read pairs.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl ImuSensor for ScriptedImu {
    fn initialize(&mut self) -> bool {
        self.init_ok
    }

    fn acceleration_available(&mut self) -> bool {
        match self.script.front() {
            Some(Some(_)) => true,
            Some(None) => {
                self.script.pop_front();
                false
            }
            None => false,
        }
    }

    fn gyroscope_available(&mut self) -> bool {
        matches!(self.script.front(), Some(Some(_)))
    }

    fn read_acceleration(&mut self) -> [f32; 3] {
        match self.script.front() {
            Some(Some(sample)) => sample.accel,
            _ => [0.0; 3],
        }
    }

    fn read_gyroscope(&mut self) -> [f32; 3] {
        match self.script.pop_front() {
            Some(Some(sample)) => {
                self.reads += 1;
                sample.gyro
            }
            _ => [0.0; 3],
        }
    }
}

// ============================================================================
// Synthetic Sensor
// ============================================================================

/// Default output data rate, matching the LSM9DS1 accel/gyro ODR closest to 100 Hz.
pub const SYNTHETIC_ODR_HZ: u32 = 119;

/// Smooth synthetic motion with a new reading every output data period.
///
/// Data becomes available one ODR period after the previous read, so the
/// acquisition loop busy-polls exactly like it would against real hardware.
#[derive(Debug)]
pub struct SyntheticImu {
    odr_period: Duration,
    epoch: Instant,
    last_read: Option<Instant>,
    pending_gyro: bool,
}

impl SyntheticImu {
    pub fn new(odr_hz: u32) -> Self {
        Self {
            odr_period: Duration::from_secs_f64(1.0 / odr_hz.max(1) as f64),
            epoch: Instant::now(),
            last_read: None,
            pending_gyro: false,
        }
    }

    fn data_ready(&self) -> bool {
        self.pending_gyro
            || self
                .last_read
                .map_or(true, |t| t.elapsed() >= self.odr_period)
    }

    fn phase(&self) -> f32 {
        self.epoch.elapsed().as_secs_f32() * std::f32::consts::TAU
    }
}

impl Default for SyntheticImu {
    fn default() -> Self {
        Self::new(SYNTHETIC_ODR_HZ)
    }
}

impl ImuSensor for SyntheticImu {
    fn initialize(&mut self) -> bool {
        debug!("synthetic IMU ready, odr period {:?}", self.odr_period);
        self.epoch = Instant::now();
        true
    }

    fn acceleration_available(&mut self) -> bool {
        self.data_ready()
    }

    fn gyroscope_available(&mut self) -> bool {
        self.data_ready()
    }

    fn read_acceleration(&mut self) -> [f32; 3] {
        let p = self.phase();
        self.pending_gyro = true;
        [0.3 * p.sin(), 0.3 * (0.5 * p).cos(), 1.0 + 0.05 * (2.0 * p).sin()]
    }

    fn read_gyroscope(&mut self) -> [f32; 3] {
        let p = self.phase();
        self.pending_gyro = false;
        self.last_read = Some(Instant::now());
        [40.0 * p.cos(), -25.0 * (0.5 * p).sin(), 10.0 * (2.0 * p).cos()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(v: f32) -> Sample {
        Sample::new([v; 3], [-v; 3])
    }

    #[test]
    fn scripted_replays_in_order() {
        let mut imu = ScriptedImu::new();
        imu.extend([sample(1.0), sample(2.0)]);

        assert!(imu.initialize());
        assert!(imu.acceleration_available() && imu.gyroscope_available());
        assert_eq!(imu.read_acceleration(), [1.0; 3]);
        assert_eq!(imu.read_gyroscope(), [-1.0; 3]);
        assert_eq!(imu.read_acceleration(), [2.0; 3]);
        assert_eq!(imu.read_gyroscope(), [-2.0; 3]);
        assert_eq!(imu.reads(), 2);
        assert!(!imu.acceleration_available());
    }

    #[test]
    fn not_ready_entry_costs_one_poll() {
        let mut imu = ScriptedImu::new();
        imu.push_not_ready();
        imu.push(sample(3.0));

        assert!(!imu.acceleration_available());
        assert_eq!(imu.remaining(), 1);
        assert!(imu.acceleration_available());
    }

    #[test]
    fn faulty_sensor_fails_init() {
        assert!(!ScriptedImu::faulty().initialize());
    }

    #[test]
    fn synthetic_waits_for_next_period() {
        let mut imu = SyntheticImu::new(1);
        assert!(imu.initialize());
        assert!(imu.acceleration_available());
        let accel = imu.read_acceleration();
        assert!(imu.gyroscope_available());
        imu.read_gyroscope();
        assert!((accel[2] - 1.0).abs() < 0.1);
        // next reading is a full second away
        assert!(!imu.acceleration_available());
    }
}
