use serde::{Deserialize, Serialize};

use super::record::RoundRecord;
use super::session::{RefinementSession, SessionStatus};
use super::stopping::StopReason;
use crate::domain::analysis::ScoringResult;
use crate::domain::foundation::{Score, SessionId, Timestamp};
use crate::domain::framework::FrameworkAnalysis;
use crate::domain::presentation::Document;
use crate::domain::scoring::{DimensionScores, Issue};

/// Outcome of a refinement session, handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub stop_reason: StopReason,
    pub target: Score,
    pub target_achieved: bool,
    pub initial_document: Document,
    pub final_document: Document,
    pub initial_score: Score,
    pub final_score: Score,
    pub final_dimensions: DimensionScores,
    pub remaining_issues: Vec<Issue>,
    pub rounds: Vec<RoundRecord>,
    pub framework_analysis: Option<FrameworkAnalysis>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl SessionResult {
    /// Builds the result from a sealed session and the scoring of its best document.
    pub fn from_session(
        session: &RefinementSession,
        best: &ScoringResult,
        framework_analysis: Option<FrameworkAnalysis>,
        now: Timestamp,
    ) -> Self {
        Self {
            session_id: session.id(),
            status: session.status(),
            stop_reason: session.stop_reason().unwrap_or(StopReason::MaxRoundsReached),
            target: session.target(),
            target_achieved: session.target_achieved(),
            initial_document: session.initial_document().clone(),
            final_document: session.best_document().clone(),
            initial_score: session.initial_score(),
            final_score: session.best_score(),
            final_dimensions: best.scores,
            remaining_issues: best.issues.clone(),
            rounds: session.rounds().to_vec(),
            framework_analysis,
            started_at: session.started_at(),
            finished_at: session.finished_at().unwrap_or(now),
        }
    }

    pub fn improvement(&self) -> f64 {
        self.final_score.delta_from(self.initial_score)
    }

    /// Number of rounds whose candidate was adopted.
    pub fn adopted_rounds(&self) -> usize {
        self.rounds.iter().filter(|r| r.adopted).count()
    }

    /// One-line outcome for logs.
    pub fn summary(&self) -> String {
        let target = if self.target_achieved {
            "target reached"
        } else {
            "target missed"
        };
        format!(
            "{}: {:.1} -> {:.1} ({:+.1}) over {} round(s), {} ({:.1}), stopped: {}",
            self.status.as_str(),
            self.initial_score.value(),
            self.final_score.value(),
            self.improvement(),
            self.rounds.len(),
            target,
            self.target.value(),
            self.stop_reason
        )
    }
}
