//! Training phases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which measurement a phase checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementKind {
    /// Bow-arm and shoulder-lift angles (profile view)
    ArmShoulder,
    /// Foot spacing relative to shoulder width (front view)
    Stance,
}

/// A stage of the training session with its own calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Side,
    Front,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Side, Phase::Front];

    pub fn measurement(self) -> MeasurementKind {
        match self {
            Phase::Side => MeasurementKind::ArmShoulder,
            Phase::Front => MeasurementKind::Stance,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Side => "side",
            Phase::Front => "front",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "side" => Ok(Phase::Side),
            "front" => Ok(Phase::Front),
            other => Err(format!("unknown phase '{}'", other)),
        }
    }
}
