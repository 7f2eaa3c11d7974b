//! Sampling pace.
//!
//! Pacing is a fixed pause after each successful read. There is no deadline
//! tracking, so poll overhead and slow sensor turnaround stretch the period
//! rather than causing skipped or duplicated samples.

use std::time::Duration;

use crate::config::SAMPLE_RATE_HZ;

/// Blocking millisecond delay, the only suspension point of the device loop.
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

/// [`Delay`] backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// Paces acquisition at a configured rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingClock {
    rate_hz: u32,
    delay_ms: u32,
}

impl SamplingClock {
    /// Clock for `rate_hz` samples per second. A zero rate is treated as 1 Hz.
    pub fn new(rate_hz: u32) -> Self {
        let rate_hz = rate_hz.max(1);
        Self {
            rate_hz,
            delay_ms: 1000 / rate_hz,
        }
    }

    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    /// Pause inserted after each successful sample.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.delay_ms as u64)
    }

    /// Suspend for one sampling period.
    pub fn pace<D: Delay + ?Sized>(&self, delay: &mut D) {
        delay.delay_ms(self.delay_ms);
    }
}

impl Default for SamplingClock {
    fn default() -> Self {
        Self::new(SAMPLE_RATE_HZ)
    }
}
