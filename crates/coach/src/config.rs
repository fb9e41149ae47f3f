//! Driver configuration

use crate::CoachError;
use calibration::CalibrationFile;
use evaluator::EvaluatorConfig;
use feedback::FeedbackConfig;
use serde::{Deserialize, Serialize};
use session::SessionConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    /// Where calibrations are persisted between sessions
    pub calibration_path: PathBuf,

    /// Frame rate assumed for records without a timestamp
    pub tick_rate_hz: f64,

    /// Emit logs as JSON
    pub log_json: bool,

    pub evaluator: EvaluatorConfig,
    pub feedback: FeedbackConfig,
    pub session: SessionConfig,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            calibration_path: PathBuf::from("calibration.json"),
            tick_rate_hz: 30.0,
            log_json: false,
            evaluator: EvaluatorConfig::default(),
            feedback: FeedbackConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl CoachConfig {
    /// Load from an optional file, then `COACH__SECTION__KEY` environment overrides.
    /// `COACH__SESSION__PHASES` takes a comma-separated list.
    pub fn load(path: Option<&Path>) -> Result<Self, CoachError> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: ::config::Environment) -> Result<Self, CoachError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let config = builder.add_source(env).build()?.try_deserialize()?;

        Ok(config)
    }

    pub fn calibration_file(&self) -> CalibrationFile {
        CalibrationFile::new(&self.calibration_path)
    }

    /// Milliseconds between synthesized frame timestamps
    pub fn tick_interval_ms(&self) -> u64 {
        if self.tick_rate_hz > 0.0 {
            (1000.0 / self.tick_rate_hz).round() as u64
        } else {
            33
        }
    }
}

fn environment() -> ::config::Environment {
    ::config::Environment::with_prefix("COACH")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("session.phases")
}
