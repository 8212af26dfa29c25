use crate::domain::progress::ProgressSnapshot;
use crate::ports::ProgressPublisher;

/// Writes every snapshot as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgressPublisher;

impl ProgressPublisher for TracingProgressPublisher {
    fn publish(&self, snapshot: &ProgressSnapshot) {
        tracing::info!(
            session_id = %snapshot.session_id,
            stage = snapshot.stage.as_str(),
            round = snapshot.round,
            total_rounds = snapshot.total_rounds,
            percent = snapshot.percent,
            score = snapshot.current_score.map(|s| s.value()),
            on_track = snapshot.on_track,
            eta_secs = snapshot.estimated_seconds_remaining,
            "{}",
            snapshot.message
        );
    }
}
