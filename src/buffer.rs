//! Fixed-capacity sample storage.
//!
//! The buffer is an array sized for the longest session plus a write index.
//! It never grows and never wraps: once full, further appends are rejected
//! until the next session resets it.

use crate::config::BUFFER_SIZE;

/// One synchronized acceleration + angular-rate reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    pub accel: [f32; 3],
    pub gyro: [f32; 3],
}

impl Sample {
    #[inline]
    pub fn new(accel: [f32; 3], gyro: [f32; 3]) -> Self {
        Self { accel, gyro }
    }

    /// The six channels in wire order: accel x, y, z then gyro x, y, z.
    pub fn channels(&self) -> [f32; 6] {
        let [ax, ay, az] = self.accel;
        let [gx, gy, gz] = self.gyro;
        [ax, ay, az, gx, gy, gz]
    }
}

/// Bounded, append-only sample arena.
pub struct SampleBuffer<const N: usize = BUFFER_SIZE> {
    samples: [Sample; N],
    len: usize,
}

impl<const N: usize> SampleBuffer<N> {
    pub fn new() -> Self {
        Self {
            samples: [Sample::default(); N],
            len: 0,
        }
    }

    /// Append without overwrite. Returns false (and changes nothing) when full.
    pub fn append(&mut self, sample: Sample) -> bool {
        if self.is_full() {
            return false;
        }
        self.samples[self.len] = sample;
        self.len += 1;
        true
    }

    /// Sample at `index`.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    pub fn get(&self, index: usize) -> &Sample {
        &self.as_slice()[index]
    }

    /// Logically truncate to zero; storage is kept.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.as_slice().iter()
    }
}

impl<const N: usize> Default for SampleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
