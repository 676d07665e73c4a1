// Two-state classification of a joint angle stream

use crate::models::exercise::{ExerciseMode, PoseState};
use serde::{Deserialize, Serialize};

/// Angle below which the joint counts as flexed
pub const DOWN_ANGLE: f32 = 90.0;
/// Angle above which a flexed joint counts as extended again
pub const UP_ANGLE: f32 = 160.0;

/// Hysteresis thresholds in degrees. Between the two nothing changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepThresholds {
    pub down_below: f32,
    pub up_above: f32,
}

impl Default for RepThresholds {
    fn default() -> Self {
        Self {
            down_below: DOWN_ANGLE,
            up_above: UP_ANGLE,
        }
    }
}

impl RepThresholds {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=180.0).contains(&self.down_below) || !(0.0..=180.0).contains(&self.up_above) {
            return Err(format!(
                "Invalid thresholds: {} / {}. Both must be between 0 and 180 degrees",
                self.down_below, self.up_above
            ));
        }
        if self.down_below >= self.up_above {
            return Err(format!(
                "Invalid thresholds: down ({}) must be below up ({})",
                self.down_below, self.up_above
            ));
        }
        Ok(())
    }
}

/// Next movement phase for `angle` with the default thresholds.
///
/// Both exercise modes currently share the same thresholds.
pub fn next_state(angle: f32, current: PoseState, _mode: ExerciseMode) -> PoseState {
    next_state_with(&RepThresholds::default(), angle, current)
}

/// Next movement phase for `angle`.
///
/// A flexed angle always yields `Down`. An extended angle only yields `Up`
/// coming from `Down`, so a cycle closes exactly once.
pub fn next_state_with(thresholds: &RepThresholds, angle: f32, current: PoseState) -> PoseState {
    if angle < thresholds.down_below {
        return PoseState::Down;
    }
    if angle > thresholds.up_above && current == PoseState::Down {
        return PoseState::Up;
    }
    current
}
