// Data models for body landmarks as delivered by the pose provider

use serde::{Deserialize, Serialize};

// ==============================================================================
// Points
// ==============================================================================

/// A 2-D point in normalized image coordinates (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A 3D keypoint with confidence score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint3D {
    pub x: f32, // Normalized [0, 1] for image coordinates
    pub y: f32, // Normalized [0, 1] for image coordinates
    #[serde(default)]
    pub z: f32, // Depth relative to the hip midpoint
    #[serde(default = "default_confidence")]
    pub confidence: f32, // Detection confidence [0, 1]
}

fn default_confidence() -> f32 {
    1.0
}

impl Keypoint3D {
    pub fn new(x: f32, y: f32, z: f32, confidence: f32) -> Self {
        Self {
            x,
            y,
            z,
            confidence,
        }
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }

    /// Drop depth and confidence
    pub fn to_point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

// ==============================================================================
// Body Landmarks (33 keypoints)
// ==============================================================================

/// MediaPipe Pose Landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    pub const COUNT: usize = 33;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Landmark indices of a joint: (proximal, hinge, distal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointIndices {
    pub proximal: BodyLandmark,
    pub hinge: BodyLandmark,
    pub distal: BodyLandmark,
}

impl JointIndices {
    pub const fn new(proximal: BodyLandmark, hinge: BodyLandmark, distal: BodyLandmark) -> Self {
        Self {
            proximal,
            hinge,
            distal,
        }
    }

    pub fn as_array(&self) -> [BodyLandmark; 3] {
        [self.proximal, self.hinge, self.distal]
    }
}

/// Resolved points of a joint: (proximal, hinge, distal)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTriple {
    pub proximal: Point2D,
    pub hinge: Point2D,
    pub distal: Point2D,
}

// ==============================================================================
// Landmark Frame
// ==============================================================================

/// Landmarks reported by the provider for one video frame.
///
/// `landmarks == None` means the provider found no body in the frame. A
/// present vector may still be partial: entries can be `None`, or the vector
/// can be shorter than [`BodyLandmark::COUNT`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub timestamp_ms: i64,
    #[serde(default)]
    pub landmarks: Option<Vec<Option<Keypoint3D>>>,
}

impl LandmarkFrame {
    pub fn new(timestamp_ms: i64, landmarks: Vec<Option<Keypoint3D>>) -> Self {
        Self {
            timestamp_ms,
            landmarks: Some(landmarks),
        }
    }

    /// A frame in which nothing was detected
    pub fn empty(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            landmarks: None,
        }
    }

    pub fn has_landmarks(&self) -> bool {
        self.landmarks.is_some()
    }

    /// Get a landmark if it was detected with at least `min_confidence`
    pub fn get(&self, landmark: BodyLandmark, min_confidence: f32) -> Option<Keypoint3D> {
        self.landmarks
            .as_ref()?
            .get(landmark.index())
            .copied()
            .flatten()
            .filter(|kp| kp.is_visible(min_confidence))
    }

    /// Resolve all three points of a joint, or `None` if any is missing
    pub fn joint(&self, indices: &JointIndices, min_confidence: f32) -> Option<JointTriple> {
        Some(JointTriple {
            proximal: self.get(indices.proximal, min_confidence)?.to_point(),
            hinge: self.get(indices.hinge, min_confidence)?.to_point(),
            distal: self.get(indices.distal, min_confidence)?.to_point(),
        })
    }

    /// Lowest confidence across a joint's landmarks; `None` if any is missing
    pub fn joint_confidence(&self, indices: &JointIndices) -> Option<f32> {
        indices
            .as_array()
            .iter()
            .map(|lm| self.get(*lm, f32::NEG_INFINITY).map(|kp| kp.confidence))
            .try_fold(f32::INFINITY, |acc, c| c.map(|c| acc.min(c)))
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("Rep tracking already running")]
    AlreadyRunning,

    #[error("Rep tracking not running")]
    NotRunning,

    #[error("Invalid landmark frame at line {line}: {reason}")]
    InvalidFrame { line: usize, reason: String },

    #[error("Landmark source I/O failed: {0}")]
    Io(String),
}

pub type PoseResult<T> = Result<T, PoseError>;
