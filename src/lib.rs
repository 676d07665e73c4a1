pub mod core;
pub mod logging;
pub mod models;
pub mod platform;

use crate::core::rep_tracker::{RepEvent, RepTracker, WorkoutSummary};
use crate::models::exercise::ExerciseMode;
use crate::models::pose::PoseResult;
use crate::platform::pose::LandmarkSource;
use tracing::info;

pub use crate::core::angle::calculate_angle;
pub use crate::core::rep_counter::{advance, FrameOutcome, RepCounter, RepPolicy};
pub use crate::core::rep_state::{next_state, RepThresholds};

/// Result of running a whole landmark stream through a tracker
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub summary: WorkoutSummary,
    pub events: Vec<RepEvent>,
}

/// Drive `source` frame by frame through a fresh session on `tracker`.
///
/// This is the frame loop: one frame at a time, events drained after each
/// frame so observers see them in order.
pub async fn replay<S: LandmarkSource + ?Sized>(
    source: &mut S,
    tracker: &RepTracker,
    mode: ExerciseMode,
) -> PoseResult<ReplayReport> {
    info!(source = %source.describe(), mode = mode.to_string(), "Replaying landmarks");

    let (_session_id, mut rx) = tracker.start(mode).await?;
    let mut events = Vec::new();

    loop {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            // Leave the tracker reusable
            Err(e) => {
                let _ = tracker.stop().await;
                return Err(e);
            }
        };

        if let Err(e) = tracker.process_frame(&frame).await {
            let _ = tracker.stop().await;
            return Err(e);
        }
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
    }

    let summary = tracker.stop().await?;
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    Ok(ReplayReport { summary, events })
}
