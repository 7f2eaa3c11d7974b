//! Acquisition state machine.
//!
//! [`Acquisition`] owns the session state, the sample buffer and the sampling
//! clock. It is the only writer of the buffer; everything else gets shared
//! access through [`Acquisition::samples`].
//!
//! ```text
//!            start()                 poll(): ready -> append + pace
//!   Idle ─────────────▶ Sampling ◀──┐         not ready -> skip
//!     ▲                    │   └────┘         full -> quiescent
//!     └────── stop() ──────┘
//! ```
//!
//! A full buffer does not end the session; the machine stays in `Sampling`
//! and stops taking samples until it is explicitly stopped.

use log::{debug, info, trace};

use crate::buffer::{Sample, SampleBuffer};
use crate::clock::{Delay, SamplingClock};
use crate::config::BUFFER_SIZE;
use crate::sensor::ImuSensor;

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionState {
    #[default]
    Idle,
    Sampling,
}

/// Result of one [`Acquisition::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Not in a session; nothing attempted.
    Idle,
    /// Sensor data not available yet; retried next iteration.
    NotReady,
    /// A sample was stored at `index` and the pacing delay was taken.
    Sampled { index: usize },
    /// Buffer exhausted; waiting for an explicit stop.
    BufferFull,
}

pub struct Acquisition<const N: usize = BUFFER_SIZE> {
    state: AcquisitionState,
    buffer: SampleBuffer<N>,
    clock: SamplingClock,
}

impl<const N: usize> Acquisition<N> {
    pub fn new(clock: SamplingClock) -> Self {
        Self {
            state: AcquisitionState::Idle,
            buffer: SampleBuffer::new(),
            clock,
        }
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    pub fn is_sampling(&self) -> bool {
        self.state == AcquisitionState::Sampling
    }

    /// Samples stored in the current (or last) session.
    pub fn samples(&self) -> &[Sample] {
        self.buffer.as_slice()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.is_full()
    }

    /// Begin a new session, discarding the previous one.
    ///
    /// Only valid from `Idle`; returns false (and changes nothing) otherwise.
    pub fn start(&mut self) -> bool {
        if self.is_sampling() {
            return false;
        }
        self.buffer.reset();
        self.state = AcquisitionState::Sampling;
        info!(
            "sampling started: {} Hz, up to {} samples",
            self.clock.rate_hz(),
            self.buffer.capacity()
        );
        true
    }

    /// End the session. Stopping while `Idle` is a no-op.
    pub fn stop(&mut self) {
        if self.is_sampling() {
            info!("sampling stopped with {} samples", self.buffer.len());
        } else {
            debug!("stop requested while idle");
        }
        self.state = AcquisitionState::Idle;
    }

    /// Attempt at most one sample.
    pub fn poll<S, D>(&mut self, sensor: &mut S, delay: &mut D) -> SampleOutcome
    where
        S: ImuSensor + ?Sized,
        D: Delay + ?Sized,
    {
        if !self.is_sampling() {
            return SampleOutcome::Idle;
        }
        if self.buffer.is_full() {
            return SampleOutcome::BufferFull;
        }
        if !(sensor.acceleration_available() && sensor.gyroscope_available()) {
            trace!("sensor data not ready");
            return SampleOutcome::NotReady;
        }

        let sample = Sample::new(sensor.read_acceleration(), sensor.read_gyroscope());
        let index = self.buffer.len();
        // cannot fail: fullness was checked above and nothing else writes
        self.buffer.append(sample);
        if self.buffer.is_full() {
            info!("buffer full after {} samples, waiting for stop", index + 1);
        }

        self.clock.pace(delay);
        SampleOutcome::Sampled { index }
    }
}

impl<const N: usize> Default for Acquisition<N> {
    fn default() -> Self {
        Self::new(SamplingClock::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::tests::RecordingDelay;
    use crate::sensor::ScriptedImu;

    fn sample(v: f32) -> Sample {
        Sample::new([v, 2.0 * v, 3.0 * v], [-v, -2.0 * v, -3.0 * v])
    }

    #[test]
    fn idle_takes_no_samples() {
        let mut acq = Acquisition::<8>::default();
        let mut imu = ScriptedImu::new();
        imu.push(sample(1.0));
        let mut delay = RecordingDelay::default();

        assert_eq!(acq.poll(&mut imu, &mut delay), SampleOutcome::Idle);
        assert_eq!(imu.remaining(), 1);
        assert!(delay.calls.is_empty());
    }

    #[test]
    fn samples_are_paced_and_ordered() {
        let mut acq = Acquisition::<8>::new(SamplingClock::new(100));
        let mut imu = ScriptedImu::new();
        imu.extend((0..3).map(|i| sample(i as f32)));
        let mut delay = RecordingDelay::default();

        assert!(acq.start());
        for i in 0..3 {
            assert_eq!(
                acq.poll(&mut imu, &mut delay),
                SampleOutcome::Sampled { index: i }
            );
        }
        assert_eq!(acq.samples(), &[sample(0.0), sample(1.0), sample(2.0)]);
        assert_eq!(delay.calls, vec![10, 10, 10]);
    }

    #[test]
    fn not_ready_is_skipped_without_pacing() {
        let mut acq = Acquisition::<8>::default();
        let mut imu = ScriptedImu::new();
        imu.push_not_ready();
        imu.push(sample(5.0));
        let mut delay = RecordingDelay::default();

        acq.start();
        assert_eq!(acq.poll(&mut imu, &mut delay), SampleOutcome::NotReady);
        assert_eq!(acq.len(), 0);
        assert!(delay.calls.is_empty());
        assert_eq!(
            acq.poll(&mut imu, &mut delay),
            SampleOutcome::Sampled { index: 0 }
        );
        // empty script: sensor never ready again
        assert_eq!(acq.poll(&mut imu, &mut delay), SampleOutcome::NotReady);
    }

    #[test]
    fn full_buffer_is_quiescent_until_stop() {
        let mut acq = Acquisition::<2>::default();
        let mut imu = ScriptedImu::new();
        imu.extend((0..4).map(|i| sample(i as f32)));
        let mut delay = RecordingDelay::default();

        acq.start();
        acq.poll(&mut imu, &mut delay);
        acq.poll(&mut imu, &mut delay);
        assert!(acq.is_full());

        assert_eq!(acq.poll(&mut imu, &mut delay), SampleOutcome::BufferFull);
        assert_eq!(acq.state(), AcquisitionState::Sampling);
        assert_eq!(acq.len(), 2);
        assert_eq!(imu.remaining(), 2);
        assert_eq!(acq.samples()[1], sample(1.0));

        acq.stop();
        assert_eq!(acq.state(), AcquisitionState::Idle);
        assert_eq!(acq.len(), 2);
    }

    #[test]
    fn start_resets_buffer_and_is_rejected_while_sampling() {
        let mut acq = Acquisition::<4>::default();
        let mut imu = ScriptedImu::new();
        imu.extend((0..3).map(|i| sample(i as f32)));
        let mut delay = RecordingDelay::default();

        acq.start();
        acq.poll(&mut imu, &mut delay);
        assert!(!acq.start());
        assert_eq!(acq.len(), 1);

        acq.stop();
        assert!(acq.start());
        assert_eq!(acq.len(), 0);
        acq.poll(&mut imu, &mut delay);
        assert_eq!(acq.samples(), &[sample(1.0)]);
    }

    #[test]
    fn length_never_decreases_within_a_session() {
        let mut acq = Acquisition::<16>::default();
        let mut imu = ScriptedImu::new();
        for i in 0..20 {
            if i % 3 == 0 {
                imu.push_not_ready();
            }
            imu.push(sample(i as f32));
        }
        let mut delay = RecordingDelay::default();

        acq.start();
        let mut last = 0;
        for _ in 0..40 {
            acq.poll(&mut imu, &mut delay);
            assert!(acq.len() >= last);
            assert!(acq.len() <= 16);
            last = acq.len();
        }
        assert!(acq.is_full());
    }

    #[test]
    fn stop_while_idle_is_noop() {
        let mut acq = Acquisition::<4>::default();
        acq.stop();
        assert_eq!(acq.state(), AcquisitionState::Idle);
        assert!(acq.is_empty());
    }
}
