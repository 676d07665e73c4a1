// Data models for landmarks, exercise modes and rep feedback

pub mod exercise;
pub mod pose;
