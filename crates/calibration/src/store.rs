//! In-memory calibration store

use crate::{CalibrationError, MeasurementKind, Phase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

const BOW_ARM: &str = "bow_arm";
const SHOULDER_LIFT: &str = "shoulder_lift";
const STANCE_RATIO: &str = "stance_ratio";

/// Reference measurements for one phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Calibration {
    /// Ideal angles in degrees
    ArmShoulder { bow_arm: f64, shoulder_lift: f64 },
    /// Ideal foot spacing / shoulder width
    Stance { stance_ratio: f64 },
}

impl Calibration {
    pub fn kind(&self) -> MeasurementKind {
        match self {
            Calibration::ArmShoulder { .. } => MeasurementKind::ArmShoulder,
            Calibration::Stance { .. } => MeasurementKind::Stance,
        }
    }

    /// Flatten into named numeric values
    pub fn to_values(&self) -> BTreeMap<String, f64> {
        let mut values = BTreeMap::new();
        match *self {
            Calibration::ArmShoulder {
                bow_arm,
                shoulder_lift,
            } => {
                values.insert(BOW_ARM.to_string(), bow_arm);
                values.insert(SHOULDER_LIFT.to_string(), shoulder_lift);
            }
            Calibration::Stance { stance_ratio } => {
                values.insert(STANCE_RATIO.to_string(), stance_ratio);
            }
        }
        values
    }

    /// Rebuild from named numeric values for the given phase
    pub fn from_values(phase: Phase, values: &BTreeMap<String, f64>) -> Result<Self, CalibrationError> {
        let value = |name: &'static str| {
            values
                .get(name)
                .copied()
                .ok_or(CalibrationError::MissingValue { phase, name })
        };

        let calibration = match phase.measurement() {
            MeasurementKind::ArmShoulder => Calibration::ArmShoulder {
                bow_arm: value(BOW_ARM)?,
                shoulder_lift: value(SHOULDER_LIFT)?,
            },
            MeasurementKind::Stance => Calibration::Stance {
                stance_ratio: value(STANCE_RATIO)?,
            },
        };
        calibration.check()?;
        Ok(calibration)
    }

    /// Range-check measurements (angles in [0, 180], ratio finite and positive)
    pub fn check(&self) -> Result<(), CalibrationError> {
        let angle_ok = |name, value: f64| {
            if value.is_finite() && (0.0..=180.0).contains(&value) {
                Ok(())
            } else {
                Err(CalibrationError::OutOfRange { name, value })
            }
        };

        match *self {
            Calibration::ArmShoulder {
                bow_arm,
                shoulder_lift,
            } => {
                angle_ok(BOW_ARM, bow_arm)?;
                angle_ok(SHOULDER_LIFT, shoulder_lift)
            }
            Calibration::Stance { stance_ratio } => {
                if stance_ratio.is_finite() && stance_ratio > 0.0 {
                    Ok(())
                } else {
                    Err(CalibrationError::OutOfRange {
                        name: STANCE_RATIO,
                        value: stance_ratio,
                    })
                }
            }
        }
    }
}

/// Stored calibration with its capture time
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationRecord {
    pub calibration: Calibration,
    pub captured_at: DateTime<Utc>,
}

/// Per-phase reference measurements, immutable until recalibrated
#[derive(Debug, Clone, Default)]
pub struct CalibrationStore {
    entries: HashMap<Phase, CalibrationRecord>,
}

impl CalibrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a validated calibration for a phase, replacing any previous one
    pub fn set(&mut self, phase: Phase, calibration: Calibration) {
        self.insert(
            phase,
            CalibrationRecord {
                calibration,
                captured_at: Utc::now(),
            },
        );
    }

    pub(crate) fn insert(&mut self, phase: Phase, record: CalibrationRecord) {
        info!(%phase, values = ?record.calibration.to_values(), "Calibration stored");
        self.entries.insert(phase, record);
    }

    pub fn get(&self, phase: Phase) -> Option<&Calibration> {
        self.entries.get(&phase).map(|record| &record.calibration)
    }

    pub fn record(&self, phase: Phase) -> Option<&CalibrationRecord> {
        self.entries.get(&phase)
    }

    pub fn is_calibrated(&self, phase: Phase) -> bool {
        self.entries.contains_key(&phase)
    }

    /// Drop one phase's calibration (explicit recalibration request)
    pub fn clear(&mut self, phase: Phase) -> bool {
        let removed = self.entries.remove(&phase).is_some();
        if removed {
            info!(%phase, "Calibration cleared");
        }
        removed
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Stored records in phase order
    pub fn records(&self) -> Vec<(Phase, &CalibrationRecord)> {
        let mut records: Vec<_> = self.entries.iter().map(|(p, r)| (*p, r)).collect();
        records.sort_by_key(|(phase, _)| *phase);
        records
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
