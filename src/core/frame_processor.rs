// Per-frame pipeline: joint selection -> angle -> rep counter

use crate::core::angle::joint_angle;
use crate::core::rep_counter::{FrameOutcome, RepCounter, RepPolicy};
use crate::models::exercise::{BodySide, ExerciseMode, Side};
use crate::models::pose::{JointTriple, LandmarkFrame};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameProcessorConfig {
    pub policy: RepPolicy,
    pub body_side: BodySide,
    /// Landmarks below this confidence are treated as not detected
    pub min_confidence: f32,
}

impl Default for FrameProcessorConfig {
    fn default() -> Self {
        Self {
            policy: RepPolicy::default(),
            body_side: BodySide::Left,
            min_confidence: 0.0,
        }
    }
}

/// Frame counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Every frame handed in, skipped ones included
    pub frames_seen: u64,
    pub frames_skipped: u64,
    pub reps_suppressed: u32,
}

/// Owns the rep counter for one tracked subject and runs each frame through it
#[derive(Debug, Clone)]
pub struct FrameProcessor {
    config: FrameProcessorConfig,
    counter: RepCounter,
    stats: FrameStats,
}

impl FrameProcessor {
    pub fn new(mode: ExerciseMode, config: FrameProcessorConfig) -> Self {
        Self {
            config,
            counter: RepCounter::new(mode),
            stats: FrameStats::default(),
        }
    }

    pub fn counter(&self) -> &RepCounter {
        &self.counter
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn set_mode(&mut self, mode: ExerciseMode) {
        self.counter.set_mode(mode);
    }

    pub fn reset(&mut self) {
        self.counter.reset();
    }

    /// Process one frame.
    ///
    /// If the tracked joint is not fully visible the frame is skipped: the
    /// state machine is not invoked and the counter is left untouched.
    pub fn process(&mut self, frame: &LandmarkFrame) -> FrameOutcome {
        self.stats.frames_seen += 1;

        let joint = match self.select_joint(frame) {
            Some(joint) => joint,
            None => {
                self.stats.frames_skipped += 1;
                trace!(timestamp_ms = frame.timestamp_ms, "Tracked joint not visible, frame skipped");
                return FrameOutcome::skipped(&self.counter, frame.timestamp_ms);
            }
        };

        let angle = joint_angle(&joint);
        let outcome = self
            .counter
            .apply(angle, frame.timestamp_ms, &self.config.policy);
        if outcome.rep_suppressed {
            self.stats.reps_suppressed += 1;
        }
        outcome
    }

    fn select_joint(&self, frame: &LandmarkFrame) -> Option<JointTriple> {
        let mode = self.counter.mode;
        let min_confidence = self.config.min_confidence;

        let side = match self.config.body_side {
            BodySide::Left => Side::Left,
            BodySide::Right => Side::Right,
            BodySide::MostVisible => {
                let left = frame.joint_confidence(&mode.joint_indices(Side::Left));
                let right = frame.joint_confidence(&mode.joint_indices(Side::Right));
                match (left, right) {
                    (Some(l), Some(r)) if r > l => Side::Right,
                    (None, Some(_)) => Side::Right,
                    _ => Side::Left,
                }
            }
        };

        frame.joint(&mode.joint_indices(side), min_confidence)
    }
}
