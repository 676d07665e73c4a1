// Landmark provider abstraction
// The pose model itself runs elsewhere; this crate only consumes its output

use crate::models::pose::{LandmarkFrame, PoseError, PoseResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Source of per-frame body landmarks
pub trait LandmarkSource: Send {
    /// Next frame, or `Ok(None)` when the stream has ended
    fn next_frame(&mut self) -> PoseResult<Option<LandmarkFrame>>;

    /// Human readable description for logs
    fn describe(&self) -> String;
}

// ==============================================================================
// Replay (JSON Lines)
// ==============================================================================

/// Replays recorded frames, one JSON [`LandmarkFrame`] per line.
///
/// Blank lines are ignored.
pub struct ReplaySource<R> {
    reader: R,
    name: String,
    line: usize,
    buf: String,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: &Path) -> PoseResult<Self> {
        let file = File::open(path)
            .map_err(|e| PoseError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            line: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead + Send> LandmarkSource for ReplaySource<R> {
    fn next_frame(&mut self) -> PoseResult<Option<LandmarkFrame>> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_line(&mut self.buf)
                .map_err(|e| PoseError::Io(e.to_string()))?;
            if read == 0 {
                return Ok(None);
            }
            self.line += 1;

            let trimmed = self.buf.trim();
            if trimmed.is_empty() {
                continue;
            }

            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(|e| PoseError::InvalidFrame {
                    line: self.line,
                    reason: e.to_string(),
                });
        }
    }

    fn describe(&self) -> String {
        format!("replay:{}", self.name)
    }
}

// ==============================================================================
// In-memory
// ==============================================================================

/// Frames supplied up front, mainly for tests and tooling
pub struct VecSource {
    frames: std::vec::IntoIter<LandmarkFrame>,
}

impl VecSource {
    pub fn new(frames: Vec<LandmarkFrame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl LandmarkSource for VecSource {
    fn next_frame(&mut self) -> PoseResult<Option<LandmarkFrame>> {
        Ok(self.frames.next())
    }

    fn describe(&self) -> String {
        format!("memory:{} frames left", self.frames.len())
    }
}
