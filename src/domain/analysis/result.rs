use serde::{Deserialize, Serialize};

use crate::domain::foundation::Score;
use crate::domain::scoring::{
    prioritize, AssessmentSource, DimensionScores, DimensionWeights, Issue,
};

/// Output of one scoring pass, identical in shape for both scoring paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub scores: DimensionScores,
    pub overall: Score,
    /// Issues in priority order.
    pub issues: Vec<Issue>,
    pub source: AssessmentSource,
}

impl ScoringResult {
    /// Computes the overall score from the weights and sorts the issues.
    pub fn new(
        scores: DimensionScores,
        issues: Vec<Issue>,
        weights: &DimensionWeights,
        source: AssessmentSource,
    ) -> Self {
        Self {
            overall: scores.overall(weights),
            scores,
            issues: prioritize(&issues),
            source,
        }
    }

    pub fn actionable_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_actionable())
    }

    pub fn has_actionable_issues(&self) -> bool {
        self.actionable_issues().next().is_some()
    }
}
