//! Session configuration

use calibration::Phase;
use serde::{Deserialize, Serialize};

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Successful reps needed to finish a phase
    pub max_reps: u32,

    /// Phases in training order
    pub phases: Vec<Phase>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_reps: 5,
            phases: Phase::ALL.to_vec(),
        }
    }
}
