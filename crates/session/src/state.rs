//! Session state tracking

use calibration::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Session events for UI text and narration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    Started { session_id: Uuid, phase: Phase },
    RepCompleted { rep_count: u32, phase: Phase },
    PhaseChanged { phase: Phase },
    Completed { summary: SessionSummary },
    Aborted { summary: SessionSummary },
}

/// What a finished (or aborted) session achieved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    /// Reps completed per phase
    pub reps_per_phase: BTreeMap<Phase, u32>,
    pub total_successes: u32,
    pub completed: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Training session (tracked over time)
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    /// Phases in training order
    phases: Vec<Phase>,
    /// Index of the current phase
    phase_index: usize,
    /// Reps in the current phase, always < max_reps between frames
    reps: u32,
    pub max_reps: u32,
    pub active: bool,
    /// Reps completed per phase
    pub reps_per_phase: BTreeMap<Phase, u32>,
    pub total_successes: u32,
    pub completed: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Inactive session positioned at the first phase
    pub fn new(phases: Vec<Phase>, max_reps: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            phases,
            phase_index: 0,
            reps: 0,
            max_reps,
            active: false,
            reps_per_phase: BTreeMap::new(),
            total_successes: 0,
            completed: false,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Current phase; `None` only when no phases are configured
    pub fn phase(&self) -> Option<Phase> {
        self.phases.get(self.phase_index).copied()
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Reps completed in the current phase
    pub fn reps(&self) -> u32 {
        self.reps
    }

    /// Count a rep for `phase`; returns the phase's new rep count
    pub(crate) fn record_rep(&mut self, phase: Phase) -> u32 {
        self.reps += 1;
        self.total_successes += 1;
        *self.reps_per_phase.entry(phase).or_insert(0) += 1;
        self.reps
    }

    /// Move to the next phase. Returns it, or `None` past the last one.
    pub(crate) fn next_phase(&mut self) -> Option<Phase> {
        self.reps = 0;
        self.phase_index += 1;
        self.phase()
    }

    /// Mark ended and build the summary
    pub(crate) fn finish(&mut self, completed: bool) -> SessionSummary {
        self.active = false;
        self.completed = completed;
        self.ended_at = Some(Utc::now());
        self.summary()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            reps_per_phase: self.reps_per_phase.clone(),
            total_successes: self.total_successes,
            completed: self.completed,
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }
}
