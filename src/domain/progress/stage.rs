use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Stage of a refinement session as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    Initializing,
    Analyzing,
    Generating,
    Validating,
    Applying,
    Completing,
    Completed,
    Failed,
}

impl ProgressStage {
    /// Progress within the current round, 0-100.
    pub fn sub_progress(&self) -> f64 {
        match self {
            ProgressStage::Initializing => 0.0,
            ProgressStage::Analyzing => 20.0,
            ProgressStage::Generating => 50.0,
            ProgressStage::Validating => 80.0,
            ProgressStage::Applying => 90.0,
            ProgressStage::Completing => 95.0,
            ProgressStage::Completed => 100.0,
            ProgressStage::Failed => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStage::Initializing => "initializing",
            ProgressStage::Analyzing => "analyzing",
            ProgressStage::Generating => "generating",
            ProgressStage::Validating => "validating",
            ProgressStage::Applying => "applying",
            ProgressStage::Completing => "completing",
            ProgressStage::Completed => "completed",
            ProgressStage::Failed => "failed",
        }
    }
}

impl StateMachine for ProgressStage {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ProgressStage::*;
        match self {
            Initializing => vec![Analyzing, Completing, Failed],
            Analyzing => vec![Generating, Completing, Failed],
            // a failed regeneration may move on to the next round
            Generating => vec![Validating, Analyzing, Completing, Failed],
            Validating => vec![Applying, Completing, Failed],
            Applying => vec![Analyzing, Completing, Failed],
            Completing => vec![Completed, Failed],
            Completed | Failed => vec![],
        }
    }
}
