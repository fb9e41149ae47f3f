//! Feedback configuration

use serde::{Deserialize, Serialize};

/// A single tone for the audio layer to synthesize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: f64,
    /// Gain in [0, 1]
    pub volume: f64,
    pub duration_ms: u64,
    /// Start offset from the event, for sequenced tones
    #[serde(default)]
    pub offset_ms: u64,
}

/// Proximity-to-cue mapping for the repeating guidance signal.
///
/// Every parameter is linear in proximity: the `*_far` value applies at
/// proximity 0 and the `*_near` value at proximity 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceProfile {
    pub frequency_far_hz: f64,
    pub frequency_near_hz: f64,
    pub interval_far_ms: f64,
    pub interval_near_ms: f64,
    pub volume_far: f64,
    pub volume_near: f64,
    /// Length of each cue
    pub cue_duration_ms: u64,
}

impl Default for GuidanceProfile {
    fn default() -> Self {
        Self {
            frequency_far_hz: 200.0,
            frequency_near_hz: 800.0,
            interval_far_ms: 800.0,
            interval_near_ms: 100.0,
            volume_far: 0.1,
            volume_near: 0.2,
            cue_duration_ms: 100,
        }
    }
}

/// Feedback timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Continuous in-tolerance time before a rep counts (milliseconds)
    pub hold_duration_ms: u64,

    /// Minimum time between two success events (milliseconds)
    pub success_cooldown_ms: u64,

    /// How long the visual success pulse stays up (milliseconds)
    pub success_pulse_ms: u64,

    /// Drone level per unit of proximity while off target
    pub drone_off_target_gain: f64,

    pub guidance: GuidanceProfile,

    /// Success chime, played in order
    pub chime: Vec<Tone>,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            hold_duration_ms: 300,
            success_cooldown_ms: 2000,
            success_pulse_ms: 200,
            drone_off_target_gain: 0.5,
            guidance: GuidanceProfile::default(),
            chime: vec![
                Tone {
                    frequency_hz: 659.25,
                    volume: 0.3,
                    duration_ms: 120,
                    offset_ms: 0,
                },
                Tone {
                    frequency_hz: 987.77,
                    volume: 0.3,
                    duration_ms: 200,
                    offset_ms: 120,
                },
            ],
        }
    }
}
