//! Comparison results

use calibration::{Calibration, Phase};
use serde::{Deserialize, Serialize};

/// Named measurement compared against the calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementName {
    BowArm,
    ShoulderLift,
    StanceRatio,
}

/// One live measurement and how far it is from ideal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: MeasurementName,
    pub live: f64,
    pub ideal: f64,
    /// |live - ideal|, never negative
    pub deviation: f64,
    /// 1.0 at exact match, floored at 0.0
    pub proximity: f64,
    pub within_tolerance: bool,
}

/// Per-frame comparison against the active phase's calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub phase: Phase,
    pub measurements: Vec<Measurement>,
    /// Mean of per-measurement proximities
    pub proximity: f64,
    /// All measurements within tolerance
    pub within_tolerance: bool,
}

impl ComparisonResult {
    pub fn from_measurements(phase: Phase, measurements: Vec<Measurement>) -> Self {
        let proximity = if measurements.is_empty() {
            0.0
        } else {
            measurements.iter().map(|m| m.proximity).sum::<f64>() / measurements.len() as f64
        };
        let within_tolerance =
            !measurements.is_empty() && measurements.iter().all(|m| m.within_tolerance);

        Self {
            phase,
            measurements,
            proximity,
            within_tolerance,
        }
    }

    /// A comparison where every live value equals the ideal
    pub fn exact(phase: Phase, ideal: &Calibration) -> Self {
        let exact = |name: MeasurementName, value: f64| Measurement {
            name,
            live: value,
            ideal: value,
            deviation: 0.0,
            proximity: 1.0,
            within_tolerance: true,
        };

        let measurements = match *ideal {
            Calibration::ArmShoulder {
                bow_arm,
                shoulder_lift,
            } => vec![
                exact(MeasurementName::BowArm, bow_arm),
                exact(MeasurementName::ShoulderLift, shoulder_lift),
            ],
            Calibration::Stance { stance_ratio } => {
                vec![exact(MeasurementName::StanceRatio, stance_ratio)]
            }
        };
        Self::from_measurements(phase, measurements)
    }

    pub fn deviation(&self, name: MeasurementName) -> Option<f64> {
        self.measurements
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.deviation)
    }

    /// Measurement with the lowest proximity
    pub fn worst(&self) -> Option<&Measurement> {
        self.measurements
            .iter()
            .min_by(|a, b| a.proximity.total_cmp(&b.proximity))
    }
}

/// Outcome of evaluating one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evaluation {
    /// A required landmark was below the visibility floor
    NotVisible,
    /// No calibration exists for the active phase
    NotCalibrated,
    Compared(ComparisonResult),
}

impl Evaluation {
    pub fn comparison(&self) -> Option<&ComparisonResult> {
        match self {
            Evaluation::Compared(result) => Some(result),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Evaluation::NotVisible => "not_visible",
            Evaluation::NotCalibrated => "not_calibrated",
            Evaluation::Compared(result) if result.within_tolerance => "on_target",
            Evaluation::Compared(_) => "off_target",
        }
    }
}
