//! Feedback State Machine
//!
//! Turns per-frame comparison results into declarative feedback events:
//! continuous guidance cues while off target, a stabilizing cue while the
//! hold timer runs, and a cooldown-gated success chime once the pose has been
//! held long enough. Rendering and tone generation interpret the events.

mod config;
mod guidance;
mod machine;

pub use config::{FeedbackConfig, GuidanceProfile, Tone};
pub use guidance::should_fire_guidance;
pub use machine::{FeedbackEvent, FeedbackMachine, FeedbackOutcome, FeedbackState, FeedbackTimers};
