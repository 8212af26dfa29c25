use serde::{Deserialize, Serialize};

use super::stopping::StopReason;
use crate::domain::feedback::RoundLesson;
use crate::domain::foundation::{Score, Timestamp};
use crate::domain::regeneration::ChangeRecord;
use crate::domain::scoring::{DimensionDelta, Issue, IssueType};

/// What happened in one refinement round. Immutable once appended to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub start_score: Score,
    /// Score of the candidate, or the start score when none was produced.
    pub end_score: Score,
    pub dimension_deltas: Vec<DimensionDelta>,
    /// Issue types present before the round and gone after it.
    pub issues_addressed: Vec<IssueType>,
    pub issues_remaining: usize,
    pub duration_secs: f64,
    pub success: bool,
    /// Whether the candidate replaced the prior document.
    pub adopted: bool,
    pub stop_reason: Option<StopReason>,
    pub failure_reason: Option<String>,
    pub changes: Vec<ChangeRecord>,
    pub lesson: Option<RoundLesson>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl RoundRecord {
    /// A round whose candidate was scored, adopted or not.
    #[allow(clippy::too_many_arguments)]
    pub fn scored(
        round: u32,
        start_score: Score,
        end_score: Score,
        dimension_deltas: Vec<DimensionDelta>,
        before: &[Issue],
        after: &[Issue],
        changes: Vec<ChangeRecord>,
        started_at: Timestamp,
        finished_at: Timestamp,
    ) -> Self {
        let lesson = RoundLesson::derive(
            round,
            end_score.delta_from(start_score),
            dimension_deltas.clone(),
            &changes,
        );
        Self {
            round,
            start_score,
            end_score,
            dimension_deltas,
            issues_addressed: addressed_types(before, after),
            issues_remaining: after.len(),
            duration_secs: finished_at.secs_since(&started_at),
            success: true,
            adopted: true,
            stop_reason: None,
            failure_reason: None,
            changes,
            lesson: Some(lesson),
            started_at,
            finished_at,
        }
    }

    /// A round that produced no usable candidate.
    pub fn failed(
        round: u32,
        start_score: Score,
        remaining: &[Issue],
        reason: impl Into<String>,
        started_at: Timestamp,
        finished_at: Timestamp,
    ) -> Self {
        let reason = reason.into();
        Self {
            round,
            start_score,
            end_score: start_score,
            dimension_deltas: Vec::new(),
            issues_addressed: Vec::new(),
            issues_remaining: remaining.len(),
            duration_secs: finished_at.secs_since(&started_at),
            success: false,
            adopted: false,
            stop_reason: None,
            changes: Vec::new(),
            lesson: Some(RoundLesson::from_failure(round, &reason)),
            failure_reason: Some(reason),
            started_at,
            finished_at,
        }
    }

    pub fn rejected(mut self) -> Self {
        self.adopted = false;
        self
    }

    pub fn with_stop_reason(mut self, reason: StopReason) -> Self {
        self.stop_reason = Some(reason);
        self
    }

    pub fn improvement(&self) -> f64 {
        self.end_score.delta_from(self.start_score)
    }
}

/// Issue types present in `before` and absent from `after`, in first-seen order.
pub fn addressed_types(before: &[Issue], after: &[Issue]) -> Vec<IssueType> {
    let mut addressed: Vec<IssueType> = Vec::new();
    for issue in before {
        let still_there = after.iter().any(|i| i.issue_type == issue.issue_type);
        if !still_there && !addressed.contains(&issue.issue_type) {
            addressed.push(issue.issue_type);
        }
    }
    addressed
}
