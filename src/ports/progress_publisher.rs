//! ProgressPublisher port - Pushes progress snapshots to observers.
//!
//! Publishing is fire-and-forget: observers that lag or disappear must never
//! slow down or fail the refinement loop.

use crate::domain::progress::ProgressSnapshot;

/// Port for progress notifications.
pub trait ProgressPublisher: Send + Sync {
    fn publish(&self, snapshot: &ProgressSnapshot);
}

/// Publisher that drops every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgressPublisher;

impl ProgressPublisher for NoopProgressPublisher {
    fn publish(&self, _snapshot: &ProgressSnapshot) {}
}
