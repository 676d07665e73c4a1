use crate::core::frame_processor::{FrameProcessor, FrameProcessorConfig, FrameStats};
use crate::core::rep_counter::FrameOutcome;
use crate::models::exercise::{ExerciseMode, Feedback, PoseState};
use crate::models::pose::{LandmarkFrame, PoseError, PoseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Most events a single frame can publish (`RepCounted` plus `Feedback`)
pub const MIN_EVENT_BUFFER: usize = 2;

// ==============================================================================
// Events
// ==============================================================================

/// Notifications for observers (UI, sound, confetti). Observers never feed
/// back into counting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepEvent {
    RepCounted {
        session_id: String,
        timestamp_ms: i64,
        reps: u32,
    },
    Feedback {
        session_id: String,
        timestamp_ms: i64,
        feedback: Feedback,
        label: String,
    },
    ModeChanged {
        session_id: String,
        mode: ExerciseMode,
    },
    Reset {
        session_id: String,
    },
}

// ==============================================================================
// Session Types
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub session_id: String,
    pub mode: ExerciseMode,
    pub reps: u32,
    pub frames_seen: u64,
    pub frames_skipped: u64,
    pub reps_suppressed: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub session_id: String,
    pub mode: ExerciseMode,
    pub pose_state: PoseState,
    pub reps: u32,
    pub feedback: Feedback,
    pub feedback_label: String,
}

struct ActiveSession {
    id: String,
    started_at: DateTime<Utc>,
    processor: FrameProcessor,
    feedback: Feedback,
    events: mpsc::Sender<RepEvent>,
}

impl ActiveSession {
    fn publish(&self, event: RepEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(session_id = %self.id, "Event buffer full, dropping rep event");
            }
            // No one is listening anymore
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}

// ==============================================================================
// Rep Tracker
// ==============================================================================

/// Serializes frame processing for one tracked subject and publishes
/// [`RepEvent`]s to observers.
pub struct RepTracker {
    config: RwLock<FrameProcessorConfig>,
    event_buffer: usize,
    session: RwLock<Option<ActiveSession>>,
}

impl RepTracker {
    /// `event_buffer` is raised to [`MIN_EVENT_BUFFER`] so one frame's
    /// events always fit between two drains.
    pub fn new(config: FrameProcessorConfig, event_buffer: usize) -> Self {
        Self {
            config: RwLock::new(config),
            event_buffer: event_buffer.max(MIN_EVENT_BUFFER),
            session: RwLock::new(None),
        }
    }

    /// Start a workout session.
    ///
    /// Returns the session id and the receiving end of the event stream.
    pub async fn start(&self, mode: ExerciseMode) -> PoseResult<(String, mpsc::Receiver<RepEvent>)> {
        let mut session = self.session.write().await;
        if session.is_some() {
            return Err(PoseError::AlreadyRunning);
        }

        let config = *self.config.read().await;
        let (tx, rx) = mpsc::channel(self.event_buffer);
        let id = Uuid::new_v4().to_string();

        *session = Some(ActiveSession {
            id: id.clone(),
            started_at: Utc::now(),
            processor: FrameProcessor::new(mode, config),
            feedback: Feedback::PositionYourself,
            events: tx,
        });

        info!(session_id = %id, mode = mode.to_string(), "Started rep tracking");
        Ok((id, rx))
    }

    /// Stop the active session and summarize it
    pub async fn stop(&self) -> PoseResult<WorkoutSummary> {
        let active = self.session.write().await.take().ok_or(PoseError::NotRunning)?;

        let counter = active.processor.counter();
        let FrameStats {
            frames_seen,
            frames_skipped,
            reps_suppressed,
        } = active.processor.stats();

        let summary = WorkoutSummary {
            session_id: active.id.clone(),
            mode: counter.mode,
            reps: counter.reps,
            frames_seen,
            frames_skipped,
            reps_suppressed,
            started_at: active.started_at,
            ended_at: Utc::now(),
        };

        info!(
            session_id = %summary.session_id,
            reps = summary.reps,
            frames = summary.frames_seen,
            "Stopped rep tracking"
        );
        Ok(summary)
    }

    pub async fn is_tracking(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Run one frame through the active session
    pub async fn process_frame(&self, frame: &LandmarkFrame) -> PoseResult<FrameOutcome> {
        let mut guard = self.session.write().await;
        let active = guard.as_mut().ok_or(PoseError::NotRunning)?;

        let outcome = active.processor.process(frame);

        if outcome.rep_counted {
            debug!(session_id = %active.id, reps = outcome.reps, "Rep counted");
            active.publish(RepEvent::RepCounted {
                session_id: active.id.clone(),
                timestamp_ms: outcome.timestamp_ms,
                reps: outcome.reps,
            });
        }

        if let Some(feedback) = outcome.feedback {
            if feedback != active.feedback {
                active.feedback = feedback;
                let mode = active.processor.counter().mode;
                active.publish(RepEvent::Feedback {
                    session_id: active.id.clone(),
                    timestamp_ms: outcome.timestamp_ms,
                    feedback,
                    label: feedback.label(mode).to_string(),
                });
            }
        }

        Ok(outcome)
    }

    /// Switch exercise. The count and phase always start over.
    pub async fn set_mode(&self, mode: ExerciseMode) -> PoseResult<()> {
        let mut guard = self.session.write().await;
        let active = guard.as_mut().ok_or(PoseError::NotRunning)?;

        active.processor.set_mode(mode);
        active.feedback = Feedback::PositionYourself;
        active.publish(RepEvent::ModeChanged {
            session_id: active.id.clone(),
            mode,
        });

        info!(session_id = %active.id, mode = mode.to_string(), "Exercise mode changed");
        Ok(())
    }

    /// Zero the count without ending the session
    pub async fn reset(&self) -> PoseResult<()> {
        let mut guard = self.session.write().await;
        let active = guard.as_mut().ok_or(PoseError::NotRunning)?;

        active.processor.reset();
        active.feedback = Feedback::PositionYourself;
        active.publish(RepEvent::Reset {
            session_id: active.id.clone(),
        });

        info!(session_id = %active.id, "Rep count reset");
        Ok(())
    }

    pub async fn snapshot(&self) -> PoseResult<TrackerSnapshot> {
        let guard = self.session.read().await;
        let active = guard.as_ref().ok_or(PoseError::NotRunning)?;
        let counter = active.processor.counter();

        Ok(TrackerSnapshot {
            session_id: active.id.clone(),
            mode: counter.mode,
            pose_state: counter.pose_state,
            reps: counter.reps,
            feedback: active.feedback,
            feedback_label: active.feedback.label(counter.mode).to_string(),
        })
    }

    /// Replace the processing config. Takes effect from the next session.
    pub async fn update_config(&self, config: FrameProcessorConfig) {
        *self.config.write().await = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rep_counter::RepPolicy;
    use crate::models::exercise::Side;
    use crate::models::pose::{BodyLandmark, Keypoint3D};

    fn frame_with_angle(mode: ExerciseMode, angle: f32, timestamp_ms: i64) -> LandmarkFrame {
        let joint = mode.joint_indices(Side::Left);
        let rad = angle.to_radians();
        let mut landmarks = vec![None; BodyLandmark::COUNT];
        landmarks[joint.proximal.index()] = Some(Keypoint3D::new(0.7, 0.5, 0.0, 1.0));
        landmarks[joint.hinge.index()] = Some(Keypoint3D::new(0.5, 0.5, 0.0, 1.0));
        landmarks[joint.distal.index()] = Some(Keypoint3D::new(
            0.5 + 0.2 * rad.cos(),
            0.5 + 0.2 * rad.sin(),
            0.0,
            1.0,
        ));
        LandmarkFrame::new(timestamp_ms, landmarks)
    }

    fn tracker(debounce_ms: u64) -> RepTracker {
        let config = FrameProcessorConfig {
            policy: RepPolicy {
                debounce_ms,
                ..RepPolicy::default()
            },
            ..FrameProcessorConfig::default()
        };
        RepTracker::new(config, 100)
    }

    async fn feed(tracker: &RepTracker, mode: ExerciseMode, samples: &[(i64, f32)]) {
        for (ts, angle) in samples {
            tracker
                .process_frame(&frame_with_angle(mode, *angle, *ts))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let tracker = tracker(0);
        tracker.start(ExerciseMode::Pushups).await.unwrap();
        assert!(matches!(
            tracker.start(ExerciseMode::Squats).await,
            Err(PoseError::AlreadyRunning)
        ));
    }

    #[tokio::test]
    async fn test_requires_session() {
        let tracker = tracker(0);
        let frame = frame_with_angle(ExerciseMode::Pushups, 80.0, 0);
        assert!(matches!(tracker.process_frame(&frame).await, Err(PoseError::NotRunning)));
        assert!(matches!(tracker.stop().await, Err(PoseError::NotRunning)));
        assert!(matches!(tracker.reset().await, Err(PoseError::NotRunning)));
        assert!(!tracker.is_tracking().await);
    }

    #[tokio::test]
    async fn test_events_for_one_rep() {
        let tracker = tracker(0);
        let (session_id, mut rx) = tracker.start(ExerciseMode::Pushups).await.unwrap();

        feed(
            &tracker,
            ExerciseMode::Pushups,
            &[(0, 170.0), (33, 175.0), (66, 80.0), (99, 165.0)],
        )
        .await;

        let summary = tracker.stop().await.unwrap();
        assert_eq!(summary.reps, 1);
        assert_eq!(summary.session_id, session_id);
        assert_eq!(summary.frames_seen, 4);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        // "Go lower!" is only published once even though two frames produced it
        let labels: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                RepEvent::Feedback { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["Go lower!", "Push up!", "Good rep!"]);

        let counted: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                RepEvent::RepCounted { reps, timestamp_ms, .. } => Some((*reps, *timestamp_ms)),
                _ => None,
            })
            .collect();
        assert_eq!(counted, vec![(1, 99)]);
    }

    #[tokio::test]
    async fn test_debounced_reps() {
        let tracker = tracker(500);
        tracker.start(ExerciseMode::Squats).await.unwrap();

        feed(
            &tracker,
            ExerciseMode::Squats,
            &[(0, 80.0), (1_000, 170.0), (1_050, 80.0), (1_100, 170.0)],
        )
        .await;
        assert_eq!(tracker.snapshot().await.unwrap().reps, 1);

        feed(&tracker, ExerciseMode::Squats, &[(1_400, 80.0), (1_700, 170.0)]).await;
        assert_eq!(tracker.snapshot().await.unwrap().reps, 2);

        let summary = tracker.stop().await.unwrap();
        assert_eq!(summary.reps_suppressed, 1);
    }

    #[tokio::test]
    async fn test_mode_change_resets_count() {
        let tracker = tracker(0);
        let (_, mut rx) = tracker.start(ExerciseMode::Pushups).await.unwrap();

        feed(&tracker, ExerciseMode::Pushups, &[(0, 80.0), (10, 170.0), (20, 80.0)]).await;
        let before = tracker.snapshot().await.unwrap();
        assert_eq!(before.reps, 1);
        assert_eq!(before.pose_state, PoseState::Down);

        tracker.set_mode(ExerciseMode::Squats).await.unwrap();
        let after = tracker.snapshot().await.unwrap();
        assert_eq!(after.reps, 0);
        assert_eq!(after.pose_state, PoseState::Up);
        assert_eq!(after.mode, ExerciseMode::Squats);
        assert_eq!(after.feedback_label, "Position yourself");

        tracker.stop().await.unwrap();
        let mut saw_mode_change = false;
        while let Some(event) = rx.recv().await {
            if let RepEvent::ModeChanged { mode, .. } = event {
                assert_eq!(mode, ExerciseMode::Squats);
                saw_mode_change = true;
            }
        }
        assert!(saw_mode_change);
    }

    #[tokio::test]
    async fn test_reset_keeps_session() {
        let tracker = tracker(0);
        let (session_id, _rx) = tracker.start(ExerciseMode::Pushups).await.unwrap();
        feed(&tracker, ExerciseMode::Pushups, &[(0, 80.0), (10, 170.0)]).await;

        tracker.reset().await.unwrap();
        let snapshot = tracker.snapshot().await.unwrap();
        assert_eq!(snapshot.reps, 0);
        assert_eq!(snapshot.session_id, session_id);
        assert_eq!(snapshot.mode, ExerciseMode::Pushups);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_not_an_error() {
        let tracker = tracker(0);
        let (_, rx) = tracker.start(ExerciseMode::Pushups).await.unwrap();
        drop(rx);
        feed(&tracker, ExerciseMode::Pushups, &[(0, 80.0), (10, 170.0)]).await;
        assert_eq!(tracker.stop().await.unwrap().reps, 1);
    }

    #[tokio::test]
    async fn test_config_update_applies_to_next_session() {
        let tracker = tracker(0);
        let reps = [(0, 80.0), (1_000, 170.0), (1_050, 80.0), (1_100, 170.0)];

        tracker.start(ExerciseMode::Pushups).await.unwrap();
        tracker
            .update_config(FrameProcessorConfig {
                policy: RepPolicy {
                    debounce_ms: 500,
                    ..RepPolicy::default()
                },
                ..FrameProcessorConfig::default()
            })
            .await;
        feed(&tracker, ExerciseMode::Pushups, &reps).await;
        assert_eq!(tracker.stop().await.unwrap().reps, 2);

        tracker.start(ExerciseMode::Pushups).await.unwrap();
        feed(&tracker, ExerciseMode::Pushups, &reps).await;
        let summary = tracker.stop().await.unwrap();
        assert_eq!(summary.reps, 1);
        assert_eq!(summary.reps_suppressed, 1);
    }

    #[tokio::test]
    async fn test_event_buffer_fits_one_frame() {
        let tracker = RepTracker::new(FrameProcessorConfig::default(), 1);
        let (_, mut rx) = tracker.start(ExerciseMode::Pushups).await.unwrap();
        feed(&tracker, ExerciseMode::Pushups, &[(0, 80.0)]).await;
        rx.recv().await.unwrap();

        feed(&tracker, ExerciseMode::Pushups, &[(1_000, 170.0)]).await;
        tracker.stop().await.unwrap();
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert!(matches!(events[0], RepEvent::RepCounted { reps: 1, .. }));
        assert!(matches!(
            events[1],
            RepEvent::Feedback {
                feedback: Feedback::GoodRep,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_frames_leave_state() {
        let tracker = tracker(0);
        tracker.start(ExerciseMode::Pushups).await.unwrap();
        feed(&tracker, ExerciseMode::Pushups, &[(0, 80.0)]).await;

        let outcome = tracker.process_frame(&LandmarkFrame::empty(10)).await.unwrap();
        assert!(outcome.is_skipped());
        assert_eq!(tracker.snapshot().await.unwrap().pose_state, PoseState::Down);

        let summary = tracker.stop().await.unwrap();
        assert_eq!(summary.frames_skipped, 1);
    }
}
