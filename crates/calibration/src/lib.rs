//! Calibration Store
//!
//! Holds the reference ("ideal") measurements captured once per training
//! phase, and persists them across sessions as flat JSON records.

mod phase;
mod persist;
mod store;

pub use phase::{MeasurementKind, Phase};
pub use persist::CalibrationFile;
pub use store::{Calibration, CalibrationRecord, CalibrationStore};

use thiserror::Error;

/// Calibration capture and decoding errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// The calibration frame failed visibility or validity checks
    #[error("Invalid calibration frame for {phase}: {reason}")]
    InvalidFrame { phase: Phase, reason: String },

    /// A persisted record lacks a named measurement
    #[error("Calibration for {phase} is missing value '{name}'")]
    MissingValue { phase: Phase, name: &'static str },

    /// A persisted measurement is outside its valid range
    #[error("Calibration value '{name}' = {value} is out of range")]
    OutOfRange { name: &'static str, value: f64 },
}

/// Persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored calibration: {0}")]
    Invalid(#[from] CalibrationError),
}
