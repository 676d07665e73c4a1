pub mod angle;
pub mod config;
pub mod rep_state;
pub mod rep_counter;
pub mod frame_processor;

// Session handling on top of the frame pipeline
pub mod rep_tracker;
