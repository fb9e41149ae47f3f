//! Evaluator configuration

use serde::{Deserialize, Serialize};

/// Tolerance and sensitivity settings for pose comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Minimum landmark visibility for a joint to be used
    pub visibility_floor: f64,

    /// Maximum angle deviation still counted as on target (degrees)
    pub angle_tolerance_deg: f64,

    /// Angle deviation at which proximity reaches zero (degrees)
    pub angle_span_deg: f64,

    /// Maximum stance ratio deviation still counted as on target
    pub ratio_tolerance: f64,

    /// Stance ratio deviation at which proximity reaches zero
    pub ratio_span: f64,

    /// Shoulder widths at or below this are treated as degenerate
    pub min_shoulder_width: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            visibility_floor: 0.5,
            angle_tolerance_deg: 8.0,
            angle_span_deg: 30.0,
            ratio_tolerance: 0.2,
            ratio_span: 0.5,
            min_shoulder_width: 1e-3,
        }
    }
}

impl EvaluatorConfig {
    /// Create strict config (tighter tolerance, steeper proximity)
    pub fn strict() -> Self {
        Self {
            angle_tolerance_deg: 5.0,
            angle_span_deg: 20.0,
            ratio_tolerance: 0.1,
            ..Default::default()
        }
    }

    /// Create lenient config (wider tolerance)
    pub fn lenient() -> Self {
        Self {
            angle_tolerance_deg: 10.0,
            angle_span_deg: 30.0,
            ratio_tolerance: 0.3,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_preset() {
        let config = EvaluatorConfig::strict();
        assert_eq!(config.angle_tolerance_deg, 5.0);
        assert_eq!(config.angle_span_deg, 20.0);
        assert_eq!(config.ratio_tolerance, 0.1);
        assert_eq!(config.ratio_span, 0.5);
        assert_eq!(config.visibility_floor, 0.5);
    }

    #[test]
    fn test_lenient_preset() {
        let config = EvaluatorConfig::lenient();
        assert_eq!(config.angle_tolerance_deg, 10.0);
        assert_eq!(config.angle_span_deg, 30.0);
        assert_eq!(config.ratio_tolerance, 0.3);
        assert_eq!(config.min_shoulder_width, 1e-3);
    }

    #[test]
    fn test_presets_bracket_default() {
        let (strict, default, lenient) = (
            EvaluatorConfig::strict(),
            EvaluatorConfig::default(),
            EvaluatorConfig::lenient(),
        );
        assert!(strict.angle_tolerance_deg < default.angle_tolerance_deg);
        assert!(default.angle_tolerance_deg < lenient.angle_tolerance_deg);
        assert!(strict.ratio_tolerance < default.ratio_tolerance);
        assert!(default.ratio_tolerance < lenient.ratio_tolerance);
        // Tolerance always sits inside the proximity span
        for config in [strict, default, lenient] {
            assert!(config.angle_tolerance_deg < config.angle_span_deg);
            assert!(config.ratio_tolerance < config.ratio_span);
        }
    }
}
