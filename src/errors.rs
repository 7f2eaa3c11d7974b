use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serial error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("sensor initialization failed: {0}")]
    SensorInit(String),
    #[error("command link closed")]
    LinkClosed,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid sample file name: {0}")]
    InvalidName(String),
    #[error("invalid rotation axis: {0} (use x, y or z)")]
    InvalidAxis(String),
    #[error("could not locate numeric data section")]
    MissingDataSection,
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("sample is already augmented: {0}")]
    AlreadyAugmented(String),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
