//! Frame Evaluator
//!
//! Compares one landmark frame against the active phase's calibration:
//! - Visibility gating of the joints a phase needs
//! - Bow-arm and shoulder-lift angles (profile view)
//! - Stance ratio, foot spacing over shoulder width (front view)
//! - Deviation, proximity and tolerance verdict per measurement
//!
//! Also captures calibrations from a still frame under the same checks.

pub mod config;
pub mod result;

pub use config::EvaluatorConfig;
pub use result::{ComparisonResult, Evaluation, Measurement, MeasurementName};

use calibration::{Calibration, CalibrationError, MeasurementKind, Phase};
use metrics::counter;
use pose_frame::{angle, horizontal_span, BodyPart, LandmarkFrame};
use tracing::{debug, info, warn};

const ARM_SHOULDER_PARTS: [BodyPart; 4] = [
    BodyPart::LeftShoulder,
    BodyPart::LeftElbow,
    BodyPart::LeftWrist,
    BodyPart::LeftHip,
];

const STANCE_PARTS: [BodyPart; 4] = [
    BodyPart::LeftShoulder,
    BodyPart::RightShoulder,
    BodyPart::LeftAnkle,
    BodyPart::RightAnkle,
];

/// Joints that must be visible for a measurement kind
pub fn required_parts(kind: MeasurementKind) -> &'static [BodyPart] {
    match kind {
        MeasurementKind::ArmShoulder => &ARM_SHOULDER_PARTS,
        MeasurementKind::Stance => &STANCE_PARTS,
    }
}

/// Map a deviation onto [0, 1]: 1 at zero deviation, 0 at `span` and beyond
pub fn proximity(deviation: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return if deviation <= 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - deviation / span).max(0.0).min(1.0)
}

/// Why a frame could not be measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unmeasurable {
    NotVisible(BodyPart),
    DegenerateShoulders,
}

impl Unmeasurable {
    fn reason(self) -> String {
        match self {
            Unmeasurable::NotVisible(part) => format!("{:?} is not clearly visible", part),
            Unmeasurable::DegenerateShoulders => "shoulder width is too small".to_string(),
        }
    }
}

/// Per-frame pose evaluator
pub struct FrameEvaluator {
    config: EvaluatorConfig,
}

impl FrameEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        info!("Creating frame evaluator with config: {:?}", config);
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Compare a live frame with the phase's calibration
    pub fn evaluate(
        &self,
        frame: &LandmarkFrame,
        calibration: Option<&Calibration>,
        phase: Phase,
    ) -> Evaluation {
        let evaluation = match calibration {
            Some(ideal) if ideal.kind() == phase.measurement() => match self.measure(frame, phase) {
                Ok(live) => Evaluation::Compared(self.compare(phase, &live, ideal)),
                Err(cause) => {
                    debug!(%phase, ?cause, "Frame not measurable");
                    Evaluation::NotVisible
                }
            },
            _ => Evaluation::NotCalibrated,
        };

        counter!("pose_frames_evaluated_total", "outcome" => evaluation.label()).increment(1);
        evaluation
    }

    /// Measure a still frame for use as the phase's ideal pose
    pub fn capture(&self, frame: &LandmarkFrame, phase: Phase) -> Result<Calibration, CalibrationError> {
        let calibration = self.measure(frame, phase).map_err(|cause| {
            warn!(%phase, ?cause, "Calibration frame rejected");
            CalibrationError::InvalidFrame {
                phase,
                reason: cause.reason(),
            }
        })?;

        calibration.check().map_err(|e| CalibrationError::InvalidFrame {
            phase,
            reason: e.to_string(),
        })?;

        info!(%phase, ?calibration, "Calibration captured");
        Ok(calibration)
    }

    /// Live measurements in the same shape as a calibration
    fn measure(&self, frame: &LandmarkFrame, phase: Phase) -> Result<Calibration, Unmeasurable> {
        let kind = phase.measurement();
        let floor = self.config.visibility_floor;

        // All required joints must be present and visible before any geometry
        let mut points = Vec::with_capacity(4);
        for &part in required_parts(kind) {
            match frame.get(part) {
                Some(lm) if lm.is_visible(floor) => points.push(lm.point()),
                _ => return Err(Unmeasurable::NotVisible(part)),
            }
        }

        match kind {
            MeasurementKind::ArmShoulder => {
                let (shoulder, elbow, wrist, hip) = (points[0], points[1], points[2], points[3]);
                Ok(Calibration::ArmShoulder {
                    bow_arm: angle(shoulder, elbow, wrist),
                    shoulder_lift: angle(elbow, shoulder, hip),
                })
            }
            MeasurementKind::Stance => {
                let shoulder_width = horizontal_span(points[0], points[1]);
                if shoulder_width <= self.config.min_shoulder_width {
                    return Err(Unmeasurable::DegenerateShoulders);
                }
                let foot_width = horizontal_span(points[2], points[3]);
                Ok(Calibration::Stance {
                    stance_ratio: foot_width / shoulder_width,
                })
            }
        }
    }

    fn compare(&self, phase: Phase, live: &Calibration, ideal: &Calibration) -> ComparisonResult {
        let measurements = match (*live, *ideal) {
            (
                Calibration::ArmShoulder {
                    bow_arm,
                    shoulder_lift,
                },
                Calibration::ArmShoulder {
                    bow_arm: ideal_arm,
                    shoulder_lift: ideal_lift,
                },
            ) => vec![
                self.angle_measurement(MeasurementName::BowArm, bow_arm, ideal_arm),
                self.angle_measurement(MeasurementName::ShoulderLift, shoulder_lift, ideal_lift),
            ],
            (
                Calibration::Stance { stance_ratio },
                Calibration::Stance {
                    stance_ratio: ideal_ratio,
                },
            ) => {
                let deviation = (stance_ratio - ideal_ratio).abs();
                vec![Measurement {
                    name: MeasurementName::StanceRatio,
                    live: stance_ratio,
                    ideal: ideal_ratio,
                    deviation,
                    proximity: proximity(deviation, self.config.ratio_span),
                    within_tolerance: deviation <= self.config.ratio_tolerance,
                }]
            }
            // measure() follows the phase and evaluate() checked the calibration kind
            _ => Vec::new(),
        };

        ComparisonResult::from_measurements(phase, measurements)
    }

    fn angle_measurement(&self, name: MeasurementName, live: f64, ideal: f64) -> Measurement {
        let deviation = (live - ideal).abs();
        Measurement {
            name,
            live,
            ideal,
            deviation,
            proximity: proximity(deviation, self.config.angle_span_deg),
            within_tolerance: deviation <= self.config.angle_tolerance_deg,
        }
    }
}

impl Default for FrameEvaluator {
    fn default() -> Self {
        Self::new(EvaluatorConfig::default())
    }
}
