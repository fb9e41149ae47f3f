//! Feedback state machine implementation

use crate::guidance::should_fire_guidance;
use crate::{FeedbackConfig, Tone};
use evaluator::Evaluation;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-frame feedback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackState {
    /// No usable pose, or no calibration
    Searching,
    /// Pose visible but outside tolerance
    OffTarget,
    /// Within tolerance, hold timer running
    Holding,
    /// Hold satisfied and cooldown elapsed (one-shot)
    Success,
    /// Still holding after a success, cooldown running
    Celebrating,
}

/// Declarative feedback for the renderer and audio layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedbackEvent {
    /// Pose lost: silence guidance, show searching state
    Searching,
    /// One proximity-modulated guidance cue
    Guidance {
        frequency_hz: f64,
        volume: f64,
        duration_ms: u64,
        fire_at_ms: u64,
    },
    /// Visual cue while the hold timer runs
    Stabilizing { held_ms: u64 },
    /// Rep achieved: chime plus visual pulse
    Success { chime: Vec<Tone>, pulse_ms: u64 },
}

/// Result of feeding one evaluation to the machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackOutcome {
    pub state: FeedbackState,
    /// Combined proximity, when the frame was compared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proximity: Option<f64>,
    /// Background drone loudness in [0, 1]
    pub drone_level: f64,
    pub events: Vec<FeedbackEvent>,
}

impl FeedbackOutcome {
    pub fn is_success(&self) -> bool {
        self.state == FeedbackState::Success
    }
}

/// Session-scoped timers; `None` means "not holding" / "never"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackTimers {
    pub holding_since: Option<u64>,
    pub last_success_at: Option<u64>,
    pub last_guidance_at: Option<u64>,
}

/// Hold-debounced, cooldown-gated feedback machine
pub struct FeedbackMachine {
    config: FeedbackConfig,
    timers: FeedbackTimers,
    /// State after the previous frame, `None` right after a reset
    last_state: Option<FeedbackState>,
}

impl FeedbackMachine {
    pub fn new(config: FeedbackConfig) -> Self {
        info!("Creating feedback machine with config: {:?}", config);
        Self {
            config,
            timers: FeedbackTimers::default(),
            last_state: None,
        }
    }

    pub fn config(&self) -> &FeedbackConfig {
        &self.config
    }

    pub fn timers(&self) -> &FeedbackTimers {
        &self.timers
    }

    pub fn state(&self) -> Option<FeedbackState> {
        self.last_state
    }

    /// Clear all timers (session start, phase change)
    pub fn reset(&mut self) {
        debug!("Feedback timers reset");
        self.timers = FeedbackTimers::default();
        self.last_state = None;
    }

    /// Advance the machine by one evaluated frame
    pub fn update(&mut self, evaluation: &Evaluation, now_ms: u64) -> FeedbackOutcome {
        let outcome = match evaluation.comparison() {
            None => self.searching(),
            Some(result) if !result.within_tolerance => self.off_target(result.proximity, now_ms),
            Some(result) => self.on_target(result.proximity, now_ms),
        };

        self.last_state = Some(outcome.state);
        outcome
    }

    fn searching(&mut self) -> FeedbackOutcome {
        self.timers.holding_since = None;

        let events = if self.last_state == Some(FeedbackState::Searching) {
            Vec::new()
        } else {
            vec![FeedbackEvent::Searching]
        };

        FeedbackOutcome {
            state: FeedbackState::Searching,
            proximity: None,
            drone_level: 0.0,
            events,
        }
    }

    fn off_target(&mut self, proximity: f64, now_ms: u64) -> FeedbackOutcome {
        self.timers.holding_since = None;

        let profile = &self.config.guidance;
        let mut events = Vec::new();
        if should_fire_guidance(profile, self.timers.last_guidance_at, proximity, now_ms) {
            events.push(FeedbackEvent::Guidance {
                frequency_hz: profile.frequency_hz(proximity),
                volume: profile.volume(proximity),
                duration_ms: profile.cue_duration_ms,
                fire_at_ms: now_ms,
            });
            self.timers.last_guidance_at = Some(now_ms);
            counter!("feedback_guidance_cues_total").increment(1);
        }

        FeedbackOutcome {
            state: FeedbackState::OffTarget,
            proximity: Some(proximity),
            drone_level: (proximity * self.config.drone_off_target_gain).max(0.0).min(1.0),
            events,
        }
    }

    fn on_target(&mut self, proximity: f64, now_ms: u64) -> FeedbackOutcome {
        let since = *self.timers.holding_since.get_or_insert(now_ms);
        let held_ms = now_ms.saturating_sub(since);

        let (state, events) = if held_ms < self.config.hold_duration_ms {
            (
                FeedbackState::Holding,
                vec![FeedbackEvent::Stabilizing { held_ms }],
            )
        } else if self.cooldown_elapsed(now_ms) {
            // holding_since stays set: only the cooldown gates the next success
            self.timers.last_success_at = Some(now_ms);
            counter!("feedback_success_total").increment(1);
            info!(held_ms, "Pose held, success");
            (
                FeedbackState::Success,
                vec![FeedbackEvent::Success {
                    chime: self.config.chime.clone(),
                    pulse_ms: self.config.success_pulse_ms,
                }],
            )
        } else {
            (FeedbackState::Celebrating, Vec::new())
        };

        FeedbackOutcome {
            state,
            proximity: Some(proximity),
            drone_level: 1.0,
            events,
        }
    }

    fn cooldown_elapsed(&self, now_ms: u64) -> bool {
        self.timers
            .last_success_at
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.config.success_cooldown_ms)
    }
}

impl Default for FeedbackMachine {
    fn default() -> Self {
        Self::new(FeedbackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibration::Phase;
    use evaluator::{ComparisonResult, Measurement, MeasurementName};

    fn compared(proximity: f64, within_tolerance: bool) -> Evaluation {
        Evaluation::Compared(ComparisonResult::from_measurements(
            Phase::Side,
            vec![Measurement {
                name: MeasurementName::BowArm,
                live: 0.0,
                ideal: 0.0,
                deviation: 0.0,
                proximity,
                within_tolerance,
            }],
        ))
    }

    fn on() -> Evaluation {
        compared(0.95, true)
    }

    fn off(proximity: f64) -> Evaluation {
        compared(proximity, false)
    }

    /// Feed `evaluation` every `step` ms over [start, end], collecting success times
    fn run(machine: &mut FeedbackMachine, evaluation: &Evaluation, start: u64, end: u64, step: u64) -> Vec<u64> {
        (start..=end)
            .step_by(step as usize)
            .filter(|&t| machine.update(evaluation, t).is_success())
            .collect()
    }

    #[test]
    fn test_hold_shorter_than_duration_never_succeeds() {
        let mut machine = FeedbackMachine::default();
        assert!(run(&mut machine, &on(), 0, 290, 10).is_empty());
        assert_eq!(machine.state(), Some(FeedbackState::Holding));
    }

    #[test]
    fn test_hold_reaching_duration_succeeds_once() {
        let mut machine = FeedbackMachine::default();
        assert_eq!(run(&mut machine, &on(), 0, 400, 10), vec![300]);
        assert_eq!(machine.state(), Some(FeedbackState::Celebrating));
        // holding_since survives the success
        assert_eq!(machine.timers().holding_since, Some(0));
    }

    #[test]
    fn test_cooldown_limits_repeat_success() {
        let mut machine = FeedbackMachine::default();
        // Continuous hold: one success per cooldown window
        assert_eq!(run(&mut machine, &on(), 0, 4500, 50), vec![300, 2300, 4300]);
    }

    #[test]
    fn test_windows_closer_than_cooldown_yield_one_success() {
        let mut machine = FeedbackMachine::default();
        assert_eq!(run(&mut machine, &on(), 0, 400, 10), vec![300]);
        machine.update(&off(0.5), 500);
        // Second hold completes at 1300, only 1000 ms after the first success
        assert!(run(&mut machine, &on(), 1000, 1400, 10).is_empty());
    }

    #[test]
    fn test_windows_further_than_cooldown_yield_two_successes() {
        let mut machine = FeedbackMachine::default();
        assert_eq!(run(&mut machine, &on(), 0, 400, 10), vec![300]);
        machine.update(&off(0.5), 500);
        assert_eq!(run(&mut machine, &on(), 2500, 2900, 10), vec![2800]);
    }

    #[test]
    fn test_failing_frame_resets_hold() {
        let mut machine = FeedbackMachine::default();
        assert!(run(&mut machine, &on(), 0, 200, 10).is_empty());
        machine.update(&off(0.8), 210);
        assert_eq!(machine.timers().holding_since, None);

        // 0..200 must not count: success only 300 ms after 220
        assert_eq!(run(&mut machine, &on(), 220, 600, 10), vec![520]);
    }

    #[test]
    fn test_not_visible_resets_hold_and_is_silent() {
        let mut machine = FeedbackMachine::default();
        machine.update(&on(), 0);
        machine.update(&on(), 100);

        let outcome = machine.update(&Evaluation::NotVisible, 150);
        assert_eq!(outcome.state, FeedbackState::Searching);
        assert_eq!(outcome.events, vec![FeedbackEvent::Searching]);
        assert_eq!(outcome.drone_level, 0.0);
        assert_eq!(machine.timers().holding_since, None);

        // Searching is announced once, not every frame
        let outcome = machine.update(&Evaluation::NotCalibrated, 183);
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn test_guidance_cues_are_rate_limited() {
        let mut machine = FeedbackMachine::default();
        let far = off(0.0);

        let fired: Vec<u64> = (0..=2000u64)
            .step_by(100)
            .filter(|&t| !machine.update(&far, t).events.is_empty())
            .collect();
        assert_eq!(fired, vec![0, 800, 1600]);
    }

    #[test]
    fn test_guidance_pitch_tracks_proximity() {
        let mut machine = FeedbackMachine::default();
        let outcome = machine.update(&off(0.5), 0);

        match &outcome.events[..] {
            [FeedbackEvent::Guidance {
                frequency_hz,
                volume,
                fire_at_ms,
                ..
            }] => {
                assert!((frequency_hz - 500.0).abs() < 1e-9);
                assert!((volume - 0.15).abs() < 1e-9);
                assert_eq!(*fire_at_ms, 0);
            }
            other => panic!("expected one guidance cue, got {:?}", other),
        }
        assert!((outcome.drone_level - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_holding_emits_stabilizing_without_audio() {
        let mut machine = FeedbackMachine::default();
        machine.update(&on(), 0);
        let outcome = machine.update(&on(), 100);
        assert_eq!(outcome.state, FeedbackState::Holding);
        assert_eq!(outcome.events, vec![FeedbackEvent::Stabilizing { held_ms: 100 }]);
    }

    #[test]
    fn test_success_event_carries_chime() {
        let mut machine = FeedbackMachine::default();
        machine.update(&on(), 0);
        let outcome = machine.update(&on(), 300);
        match &outcome.events[..] {
            [FeedbackEvent::Success { chime, pulse_ms }] => {
                assert_eq!(chime.len(), 2);
                assert_eq!(*pulse_ms, 200);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_clears_timers() {
        let mut machine = FeedbackMachine::default();
        run(&mut machine, &on(), 0, 400, 10);
        machine.reset();
        assert_eq!(*machine.timers(), FeedbackTimers::default());
        assert_eq!(machine.state(), None);
    }
}
