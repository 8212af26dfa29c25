//! Session progress: stages, completion percentage and time estimates.

mod stage;
mod tracker;

pub use stage::ProgressStage;
pub use tracker::{ProgressSnapshot, ProgressTracker, DEFAULT_ROUND_SECS};
