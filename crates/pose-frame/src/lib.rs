//! Pose Frames
//!
//! Landmark types produced by the external pose model and the planar
//! geometry used to compare them:
//! - Landmark and frame representation (BlazePose 33-point topology)
//! - Joint angle at a vertex
//! - Horizontal span between two landmarks

pub mod geometry;
pub mod landmark;

pub use geometry::{angle, horizontal_span, Point2};
pub use landmark::{BodyPart, Landmark, LandmarkFrame, LANDMARK_COUNT};

use thiserror::Error;

/// Frame parsing errors
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Malformed landmark payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Frame has {actual} landmarks, expected at most {max}")]
    TooManyLandmarks { actual: usize, max: usize },
}
