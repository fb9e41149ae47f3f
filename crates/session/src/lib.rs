//! Training Session
//!
//! Sequences the training phases (profile view, then front view), counts
//! successful reps and drives the per-frame pipeline:
//! frame → evaluator → feedback machine → session bookkeeping.

mod config;
mod controller;
mod state;

pub use config::SessionConfig;
pub use controller::{SessionController, TickOutput};
pub use state::{Session, SessionEvent, SessionSummary};

use thiserror::Error;

/// Session lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session has no phases configured")]
    NoPhases,

    #[error("max_reps must be at least 1")]
    ZeroReps,

    #[error("No active session")]
    Inactive,
}
