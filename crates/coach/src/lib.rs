//! Pose Coach Driver
//!
//! Wires the coaching pipeline to the outside world: configuration loading,
//! logging setup, calibration capture from frame files, and replay of
//! JSON-lines landmark streams through a training session.

mod config;
mod replay;

pub use config::CoachConfig;
pub use replay::{Replay, ReplayOptions, StreamRecord};

use calibration::{CalibrationError, StorageError};
use pose_frame::FrameError;
use session::{SessionController, SessionError};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Driver errors
#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Initialize logging; `RUST_LOG` overrides the default `info` level
pub fn init_logging(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Build a controller with calibrations loaded from the configured file
pub fn build_controller(config: &CoachConfig) -> Result<SessionController, CoachError> {
    let calibrations = config.calibration_file().load()?;
    Ok(SessionController::new(
        config.session.clone(),
        config.evaluator.clone(),
        config.feedback.clone(),
        calibrations,
    ))
}
