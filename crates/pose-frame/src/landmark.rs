//! Landmark types and frame parsing

use crate::geometry::Point2;
use crate::FrameError;
use serde::{Deserialize, Serialize};

/// Number of landmarks in the BlazePose topology
pub const LANDMARK_COUNT: usize = 33;

/// Anatomical roles used by the coach, with their BlazePose indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Nose = 0,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
}

impl BodyPart {
    /// Index into a landmark frame
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single tracked body point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, normalized to [0, 1]
    pub x: f64,
    /// Vertical position, normalized to [0, 1]
    pub y: f64,
    /// Relative depth (unitless)
    #[serde(default)]
    pub z: f64,
    /// Detection confidence in [0, 1]
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Planar position
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    pub fn is_visible(&self, floor: f64) -> bool {
        self.visibility >= floor
    }
}

/// One frame of landmarks, indexed by anatomical role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Frame with every landmark at the origin and zero visibility
    pub fn empty() -> Self {
        Self {
            landmarks: vec![Landmark::default(); LANDMARK_COUNT],
        }
    }

    /// Parse the `{"landmarks": [{x, y, z, visibility}, ...]}` payload
    pub fn from_json(payload: &str) -> Result<Self, FrameError> {
        let frame: Self = serde_json::from_str(payload)?;
        frame.validated()
    }

    /// Reject frames that cannot be a single-person pose
    pub fn validated(self) -> Result<Self, FrameError> {
        if self.landmarks.len() > LANDMARK_COUNT {
            return Err(FrameError::TooManyLandmarks {
                actual: self.landmarks.len(),
                max: LANDMARK_COUNT,
            });
        }
        Ok(self)
    }

    /// Landmark for a body part, if the frame is long enough to hold it
    pub fn get(&self, part: BodyPart) -> Option<&Landmark> {
        self.landmarks.get(part.index())
    }

    /// Set a landmark, growing the frame with invisible points as needed
    pub fn set(&mut self, part: BodyPart, landmark: Landmark) {
        let idx = part.index();
        if self.landmarks.len() <= idx {
            self.landmarks.resize(idx + 1, Landmark::default());
        }
        self.landmarks[idx] = landmark;
    }

    /// True when every listed part is present with visibility >= `floor`
    pub fn all_visible(&self, parts: &[BodyPart], floor: f64) -> bool {
        parts
            .iter()
            .all(|&part| self.get(part).map_or(false, |lm| lm.is_visible(floor)))
    }
}
