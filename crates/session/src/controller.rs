//! Session/phase controller

use crate::{Session, SessionConfig, SessionError, SessionEvent, SessionSummary};
use calibration::{Calibration, CalibrationError, CalibrationStore, Phase};
use evaluator::{ComparisonResult, Evaluation, EvaluatorConfig, FrameEvaluator};
use feedback::{FeedbackConfig, FeedbackMachine, FeedbackOutcome};
use metrics::counter;
use pose_frame::LandmarkFrame;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Everything one tick produced
#[derive(Debug, Clone, Serialize)]
pub struct TickOutput {
    pub phase: Phase,
    pub evaluation: Evaluation,
    pub feedback: FeedbackOutcome,
    pub session_events: Vec<SessionEvent>,
}

/// Owns the calibrations, the evaluator and the feedback machine, and
/// sequences them through a training session
pub struct SessionController {
    config: SessionConfig,
    evaluator: FrameEvaluator,
    feedback: FeedbackMachine,
    calibrations: CalibrationStore,
    session: Session,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        evaluator: EvaluatorConfig,
        feedback: FeedbackConfig,
        calibrations: CalibrationStore,
    ) -> Self {
        let session = Session::new(config.phases.clone(), config.max_reps);
        Self {
            evaluator: FrameEvaluator::new(evaluator),
            feedback: FeedbackMachine::new(feedback),
            calibrations,
            session,
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_active(&self) -> bool {
        self.session.active
    }

    pub fn phase(&self) -> Option<Phase> {
        self.session.phase()
    }

    pub fn feedback(&self) -> &FeedbackMachine {
        &self.feedback
    }

    pub fn calibrations(&self) -> &CalibrationStore {
        &self.calibrations
    }

    /// Capture a phase's ideal pose from a still frame.
    /// A rejected frame leaves the stored calibration untouched.
    pub fn calibrate(&mut self, phase: Phase, frame: &LandmarkFrame) -> Result<Calibration, CalibrationError> {
        let calibration = self.evaluator.capture(frame, phase)?;
        self.calibrations.set(phase, calibration);
        Ok(calibration)
    }

    /// Forget a phase's calibration so it can be captured again
    pub fn recalibrate(&mut self, phase: Phase) -> bool {
        self.calibrations.clear(phase)
    }

    /// Begin a fresh session at the first phase
    pub fn start(&mut self) -> Result<SessionEvent, SessionError> {
        if self.config.max_reps == 0 {
            return Err(SessionError::ZeroReps);
        }

        let session = Session::new(self.config.phases.clone(), self.config.max_reps);
        let phase = session.phase().ok_or(SessionError::NoPhases)?;

        for &p in session.phases() {
            if !self.calibrations.is_calibrated(p) {
                warn!(phase = %p, "Starting session without calibration for phase");
            }
        }

        self.session = session;
        self.session.active = true;
        self.feedback.reset();

        info!(session_id = %self.session.id, %phase, "Session started");
        Ok(SessionEvent::Started {
            session_id: self.session.id,
            phase,
        })
    }

    /// Run one frame through the pipeline. Frames are ignored while inactive.
    pub fn process(&mut self, frame: &LandmarkFrame, now_ms: u64) -> Option<TickOutput> {
        let phase = self.active_phase()?;
        let evaluation = self
            .evaluator
            .evaluate(frame, self.calibrations.get(phase), phase);
        Some(self.apply(phase, evaluation, now_ms))
    }

    /// Feed a perfect match for the current phase, as if the user nailed the pose
    pub fn simulate_success(&mut self, now_ms: u64) -> Option<TickOutput> {
        let phase = self.active_phase()?;
        let evaluation = match self.calibrations.get(phase) {
            Some(ideal) => Evaluation::Compared(ComparisonResult::exact(phase, ideal)),
            None => Evaluation::NotCalibrated,
        };
        debug!(%phase, "Simulated perfect frame");
        Some(self.apply(phase, evaluation, now_ms))
    }

    /// Finish the current phase: next phase, or session complete after the last
    pub fn advance(&mut self) -> Result<SessionEvent, SessionError> {
        if !self.session.active {
            return Err(SessionError::Inactive);
        }

        self.feedback.reset();
        counter!("session_phase_changes_total").increment(1);

        match self.session.next_phase() {
            Some(phase) => {
                info!(%phase, "Phase advanced");
                Ok(SessionEvent::PhaseChanged { phase })
            }
            None => {
                let summary = self.session.finish(true);
                info!(
                    session_id = %summary.session_id,
                    successes = summary.total_successes,
                    "Session completed"
                );
                Ok(SessionEvent::Completed { summary })
            }
        }
    }

    /// Stop processing at any point; calibrations are kept.
    /// Returns `None` when no session is running.
    pub fn abort(&mut self) -> Option<SessionEvent> {
        if !self.session.active {
            return None;
        }
        let summary = self.session.finish(false);
        self.feedback.reset();
        info!(session_id = %summary.session_id, "Session aborted");
        Some(SessionEvent::Aborted { summary })
    }

    pub fn summary(&self) -> SessionSummary {
        self.session.summary()
    }

    fn active_phase(&self) -> Option<Phase> {
        if self.session.active {
            self.session.phase()
        } else {
            None
        }
    }

    fn apply(&mut self, phase: Phase, evaluation: Evaluation, now_ms: u64) -> TickOutput {
        let feedback = self.feedback.update(&evaluation, now_ms);

        let mut session_events = Vec::new();
        if feedback.is_success() {
            session_events.extend(self.record_rep(phase));
        }

        TickOutput {
            phase,
            evaluation,
            feedback,
            session_events,
        }
    }

    fn record_rep(&mut self, phase: Phase) -> Vec<SessionEvent> {
        let rep_count = self.session.record_rep(phase);
        counter!("session_reps_total", "phase" => phase.as_str()).increment(1);

        info!(%phase, rep_count, max_reps = self.session.max_reps, "Rep completed");

        let mut events = vec![SessionEvent::RepCompleted { rep_count, phase }];
        if rep_count >= self.session.max_reps {
            // The session is active here, so advance cannot fail
            if let Ok(event) = self.advance() {
                events.push(event);
            }
        }
        events
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(
            SessionConfig::default(),
            EvaluatorConfig::default(),
            FeedbackConfig::default(),
            CalibrationStore::new(),
        )
    }
}
