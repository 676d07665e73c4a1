// Landmark provider integration
// Provides the source trait and replay helpers

pub mod landmark_source;

pub use landmark_source::{LandmarkSource, ReplaySource, VecSource};
