// Data models for exercise modes, movement phases and user feedback

use crate::models::pose::{BodyLandmark, JointIndices};
use serde::{Deserialize, Serialize};

// ==============================================================================
// Exercise Mode
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseMode {
    Pushups,
    Squats,
}

/// Tracked joint per exercise: (mode, left side, right side).
///
/// New exercises are added by extending this table.
pub const JOINT_TABLE: [(ExerciseMode, JointIndices, JointIndices); 2] = [
    (
        ExerciseMode::Pushups,
        JointIndices::new(
            BodyLandmark::LeftShoulder,
            BodyLandmark::LeftElbow,
            BodyLandmark::LeftWrist,
        ),
        JointIndices::new(
            BodyLandmark::RightShoulder,
            BodyLandmark::RightElbow,
            BodyLandmark::RightWrist,
        ),
    ),
    (
        ExerciseMode::Squats,
        JointIndices::new(
            BodyLandmark::LeftHip,
            BodyLandmark::LeftKnee,
            BodyLandmark::LeftAnkle,
        ),
        JointIndices::new(
            BodyLandmark::RightHip,
            BodyLandmark::RightKnee,
            BodyLandmark::RightAnkle,
        ),
    ),
];

impl ExerciseMode {
    pub const ALL: [ExerciseMode; 2] = [ExerciseMode::Pushups, ExerciseMode::Squats];

    pub fn to_string(&self) -> &'static str {
        match self {
            ExerciseMode::Pushups => "pushups",
            ExerciseMode::Squats => "squats",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pushups" | "pushup" | "push-ups" => Ok(ExerciseMode::Pushups),
            "squats" | "squat" => Ok(ExerciseMode::Squats),
            other => Err(format!("Unknown exercise mode: {}", other)),
        }
    }

    /// Joint landmarks tracked for this exercise on the given side
    pub fn joint_indices(&self, side: Side) -> JointIndices {
        // Rows are ordered by variant, so the discriminant is the row index
        let (_, left, right) = JOINT_TABLE[*self as usize];
        match side {
            Side::Left => left,
            Side::Right => right,
        }
    }
}

impl Default for ExerciseMode {
    fn default() -> Self {
        ExerciseMode::Pushups
    }
}

// ==============================================================================
// Body Side
// ==============================================================================

/// A concrete side of the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// Which side of the body to read joints from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySide {
    Left,
    Right,
    /// Per frame, the side whose least confident joint landmark scores higher
    MostVisible,
}

impl BodySide {
    pub fn to_string(&self) -> &'static str {
        match self {
            BodySide::Left => "left",
            BodySide::Right => "right",
            BodySide::MostVisible => "most_visible",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "left" => Ok(BodySide::Left),
            "right" => Ok(BodySide::Right),
            "most_visible" | "auto" => Ok(BodySide::MostVisible),
            other => Err(format!("Unknown body side: {}", other)),
        }
    }
}

impl Default for BodySide {
    fn default() -> Self {
        BodySide::Left
    }
}

// ==============================================================================
// Movement Phase
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseState {
    /// Joint extended
    Up,
    /// Joint flexed
    Down,
}

impl PoseState {
    pub fn to_string(&self) -> &'static str {
        match self {
            PoseState::Up => "up",
            PoseState::Down => "down",
        }
    }
}

impl Default for PoseState {
    fn default() -> Self {
        PoseState::Up
    }
}

// ==============================================================================
// Feedback
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    PositionYourself,
    /// Just reached the bottom of the movement
    DriveUp,
    /// Still extended, the user should descend further
    GoLower,
    /// A rep was counted
    GoodRep,
}

impl Feedback {
    pub fn label(&self, mode: ExerciseMode) -> &'static str {
        match (self, mode) {
            (Feedback::PositionYourself, _) => "Position yourself",
            (Feedback::DriveUp, ExerciseMode::Pushups) => "Push up!",
            (Feedback::DriveUp, ExerciseMode::Squats) => "Drive up!",
            (Feedback::GoLower, ExerciseMode::Pushups) => "Go lower!",
            (Feedback::GoLower, ExerciseMode::Squats) => "Squat lower!",
            (Feedback::GoodRep, _) => "Good rep!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_table_rows_match_variants() {
        for (i, (mode, _, _)) in JOINT_TABLE.iter().enumerate() {
            assert_eq!(*mode as usize, i);
        }
        assert_eq!(JOINT_TABLE.len(), ExerciseMode::ALL.len());
    }

    #[test]
    fn test_pushup_joints() {
        let left = ExerciseMode::Pushups.joint_indices(Side::Left);
        assert_eq!(
            left.as_array().map(BodyLandmark::index),
            [11, 13, 15]
        );
        let right = ExerciseMode::Pushups.joint_indices(Side::Right);
        assert_eq!(
            right.as_array().map(BodyLandmark::index),
            [12, 14, 16]
        );
    }

    #[test]
    fn test_squat_joints() {
        let left = ExerciseMode::Squats.joint_indices(Side::Left);
        assert_eq!(left.as_array().map(BodyLandmark::index), [23, 25, 27]);
        let right = ExerciseMode::Squats.joint_indices(Side::Right);
        assert_eq!(right.as_array().map(BodyLandmark::index), [24, 26, 28]);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(ExerciseMode::from_string("Pushups"), Ok(ExerciseMode::Pushups));
        assert_eq!(ExerciseMode::from_string("squat"), Ok(ExerciseMode::Squats));
        assert!(ExerciseMode::from_string("burpees").is_err());

        for mode in ExerciseMode::ALL {
            assert_eq!(ExerciseMode::from_string(mode.to_string()), Ok(mode));
        }
    }

    #[test]
    fn test_body_side_parsing() {
        assert_eq!(BodySide::from_string("LEFT"), Ok(BodySide::Left));
        assert_eq!(BodySide::from_string("most-visible"), Ok(BodySide::MostVisible));
        assert!(BodySide::from_string("middle").is_err());
    }

    #[test]
    fn test_feedback_labels() {
        assert_eq!(Feedback::DriveUp.label(ExerciseMode::Pushups), "Push up!");
        assert_eq!(Feedback::GoLower.label(ExerciseMode::Squats), "Squat lower!");
        assert_eq!(Feedback::GoodRep.label(ExerciseMode::Squats), "Good rep!");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&ExerciseMode::Squats).unwrap(),
            "\"squats\""
        );
        let side: BodySide = serde_json::from_str("\"most_visible\"").unwrap();
        assert_eq!(side, BodySide::MostVisible);
        assert_eq!(PoseState::default(), PoseState::Up);
    }
}
