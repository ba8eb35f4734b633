//! State module for tracking clone job progress
//!
//! `JobState` tracks the phase of a single clone job and guards its
//! transitions.

mod job_state;

pub use job_state::JobState;
