//! Acquisition constants and host-side capture configuration.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Device Constants
// ============================================================================

/// Target sampling rate of the acquisition loop.
pub const SAMPLE_RATE_HZ: u32 = 100;

/// Longest session the buffer can hold, in seconds.
pub const MAX_DURATION_SECS: u32 = 3;

/// Capacity of the sample buffer.
pub const BUFFER_SIZE: usize = (SAMPLE_RATE_HZ * MAX_DURATION_SECS) as usize;

/// Fixed pause after each successful sample.
pub const PACING_DELAY_MS: u32 = 1000 / SAMPLE_RATE_HZ;

/// Serial link speed shared by device and host.
pub const BAUD_RATE: u32 = 115200;

/// Port timeout used by the device loop; a timeout means "no input yet".
pub const LINK_POLL_TIMEOUT: Duration = Duration::from_millis(1);

/// Longest command line accepted before the pending bytes are discarded.
pub const MAX_LINE_LEN: usize = 64;

/// Sensor named in capture file headers.
pub const IMU_NAME: &str = "LSM9DS1";

// ============================================================================
// Host Capture Configuration
// ============================================================================

/// Errors loading a [`CaptureConfig`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Settings for the host capture utility.
///
/// Every field is optional in the YAML file; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CaptureConfig {
    /// Serial port path, e.g. `/dev/ttyACM0` or `COM4`.
    pub port: String,
    pub baud_rate: u32,
    /// Directory the capture files are written to.
    pub directory: PathBuf,
    /// A response is considered complete after this long without a line.
    pub response_timeout_ms: u64,
    pub imu: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud_rate: BAUD_RATE,
            directory: PathBuf::from("samples"),
            response_timeout_ms: 1000,
            imu: IMU_NAME.to_string(),
        }
    }
}

impl CaptureConfig {
    /// Load a [CaptureConfig] from the given YAML string
    pub fn from_yaml(content: &str) -> Result<CaptureConfig, LoadError> {
        let config: CaptureConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load a [CaptureConfig] from the given YAML file
    pub fn from_yaml_file(path: &std::path::Path) -> Result<CaptureConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: CaptureConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}
