// Rep counting on top of the state machine: completion rule, debounce and feedback

use crate::core::rep_state::{next_state_with, RepThresholds};
use crate::models::exercise::{ExerciseMode, Feedback, PoseState};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum time between two counted reps unless configured otherwise
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

// ==============================================================================
// Policy
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepPolicy {
    pub thresholds: RepThresholds,
    /// 0 disables debouncing
    pub debounce_ms: u64,
}

impl Default for RepPolicy {
    fn default() -> Self {
        Self {
            thresholds: RepThresholds::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl RepPolicy {
    pub fn without_debounce() -> Self {
        Self {
            debounce_ms: 0,
            ..Self::default()
        }
    }

    /// Whether a rep at `now_ms` is far enough from the last counted one
    fn accepts(&self, last_count_ms: Option<i64>, now_ms: i64) -> bool {
        if self.debounce_ms == 0 {
            return true;
        }
        match last_count_ms {
            // A clock that went backwards never clears the window
            Some(last) => u64::try_from(now_ms.saturating_sub(last))
                .is_ok_and(|elapsed| elapsed > self.debounce_ms),
            None => true,
        }
    }
}

// ==============================================================================
// Counter State
// ==============================================================================

/// Everything the frame loop has to carry from one frame to the next
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepCounter {
    pub mode: ExerciseMode,
    pub pose_state: PoseState,
    pub reps: u32,
    pub last_count_ms: Option<i64>,
}

impl RepCounter {
    pub fn new(mode: ExerciseMode) -> Self {
        Self {
            mode,
            pose_state: PoseState::Up,
            reps: 0,
            last_count_ms: None,
        }
    }

    /// Zero the count and return to `Up`, keeping the mode
    pub fn reset(&mut self) {
        *self = Self::new(self.mode);
    }

    /// Switch exercise; always starts a fresh count
    pub fn set_mode(&mut self, mode: ExerciseMode) {
        *self = Self::new(mode);
    }

    /// In-place form of [`advance`]
    pub fn apply(&mut self, angle: f32, timestamp_ms: i64, policy: &RepPolicy) -> FrameOutcome {
        let (next, outcome) = advance(*self, angle, timestamp_ms, policy);
        *self = next;
        outcome
    }
}

impl Default for RepCounter {
    fn default() -> Self {
        Self::new(ExerciseMode::default())
    }
}

// ==============================================================================
// Frame Outcome
// ==============================================================================

/// What happened on one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameOutcome {
    pub timestamp_ms: i64,
    /// `None` when the frame was skipped for missing landmarks
    pub angle: Option<f32>,
    pub previous_state: PoseState,
    pub state: PoseState,
    pub rep_counted: bool,
    /// A `Down -> Up` transition that fell inside the debounce window
    pub rep_suppressed: bool,
    pub feedback: Option<Feedback>,
    pub reps: u32,
}

impl FrameOutcome {
    /// Outcome of a frame where no angle could be measured
    pub fn skipped(counter: &RepCounter, timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            angle: None,
            previous_state: counter.pose_state,
            state: counter.pose_state,
            rep_counted: false,
            rep_suppressed: false,
            feedback: None,
            reps: counter.reps,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.angle.is_none()
    }

    pub fn transitioned(&self) -> bool {
        self.previous_state != self.state
    }
}

/// Feed one angle sample into the counter.
///
/// Takes the counter by value and returns its successor together with what
/// happened on this frame. A rep is counted on a `Down -> Up` transition
/// when the debounce window since the last count has elapsed.
pub fn advance(
    counter: RepCounter,
    angle: f32,
    timestamp_ms: i64,
    policy: &RepPolicy,
) -> (RepCounter, FrameOutcome) {
    let previous = counter.pose_state;
    let state = next_state_with(&policy.thresholds, angle, previous);

    let mut next = counter;
    let mut rep_counted = false;
    let mut rep_suppressed = false;
    let mut feedback = None;

    if state != previous {
        match (previous, state) {
            (PoseState::Down, PoseState::Up) => {
                if policy.accepts(counter.last_count_ms, timestamp_ms) {
                    next.reps += 1;
                    next.last_count_ms = Some(timestamp_ms);
                    rep_counted = true;
                    feedback = Some(Feedback::GoodRep);
                } else {
                    rep_suppressed = true;
                    debug!(timestamp_ms, angle, "Rep inside debounce window ignored");
                }
            }
            _ => feedback = Some(Feedback::DriveUp),
        }
        debug!(
            from = previous.to_string(),
            to = state.to_string(),
            angle,
            "Pose state transition"
        );
        next.pose_state = state;
    } else if previous == PoseState::Up && angle > policy.thresholds.up_above {
        feedback = Some(Feedback::GoLower);
    }

    let outcome = FrameOutcome {
        timestamp_ms,
        angle: Some(angle),
        previous_state: previous,
        state,
        rep_counted,
        rep_suppressed,
        feedback,
        reps: next.reps,
    };

    (next, outcome)
}
