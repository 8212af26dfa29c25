use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Phase of the refinement loop.
///
/// ```text
/// Idle -> FrameworkAnalysis -> InitialScoring
///      -> [Analyzing -> Regenerating -> Scoring -> Deciding]*
///      -> Completed | Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementPhase {
    Idle,
    FrameworkAnalysis,
    InitialScoring,
    Analyzing,
    Regenerating,
    Scoring,
    Deciding,
    Completed,
    Failed,
}

impl RefinementPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefinementPhase::Idle => "idle",
            RefinementPhase::FrameworkAnalysis => "framework_analysis",
            RefinementPhase::InitialScoring => "initial_scoring",
            RefinementPhase::Analyzing => "analyzing",
            RefinementPhase::Regenerating => "regenerating",
            RefinementPhase::Scoring => "scoring",
            RefinementPhase::Deciding => "deciding",
            RefinementPhase::Completed => "completed",
            RefinementPhase::Failed => "failed",
        }
    }
}

impl StateMachine for RefinementPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RefinementPhase::*;
        match self {
            Idle => vec![FrameworkAnalysis, Failed],
            FrameworkAnalysis => vec![InitialScoring, Failed],
            InitialScoring => vec![Analyzing, Completed, Failed],
            Analyzing => vec![Regenerating, Completed, Failed],
            Regenerating => vec![Scoring, Deciding, Failed],
            Scoring => vec![Deciding, Failed],
            Deciding => vec![Analyzing, Completed, Failed],
            Completed | Failed => vec![],
        }
    }
}
