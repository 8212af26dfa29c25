//! Round-by-round focus.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Score, ValidationError};
use crate::domain::scoring::{Dimension, IssueType};

/// One stage of the curriculum, active from `from_round` until the next
/// stage starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumStage {
    pub from_round: u32,
    pub label: String,
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub issue_types: Vec<IssueType>,
    /// Expected score gain; `None` aims for whatever gap remains.
    #[serde(default)]
    pub expected_gain: Option<f64>,
}

/// Ordered stages. Configurable; the default moves from structure to
/// audience and impact to polish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    pub stages: Vec<CurriculumStage>,
}

impl Default for Curriculum {
    fn default() -> Self {
        Self {
            stages: vec![
                CurriculumStage {
                    from_round: 1,
                    label: "structure and framework compliance".to_string(),
                    dimensions: vec![Dimension::FrameworkAdherence],
                    issue_types: vec![IssueType::Structural, IssueType::FrameworkViolation],
                    expected_gain: Some(15.0),
                },
                CurriculumStage {
                    from_round: 2,
                    label: "audience fit and business impact".to_string(),
                    dimensions: vec![Dimension::AudienceReadiness, Dimension::BusinessImpact],
                    issue_types: vec![
                        IssueType::AudienceMismatch,
                        IssueType::Evidence,
                        IssueType::Actionability,
                    ],
                    expected_gain: Some(10.0),
                },
                CurriculumStage {
                    from_round: 3,
                    label: "clarity and flow".to_string(),
                    dimensions: vec![Dimension::Clarity],
                    issue_types: vec![IssueType::Clarity, IssueType::Flow, IssueType::Redundancy],
                    expected_gain: None,
                },
            ],
        }
    }
}

/// The focus of one round, resolved against the current score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundFocus {
    pub round: u32,
    pub label: String,
    pub dimensions: Vec<Dimension>,
    pub issue_types: Vec<IssueType>,
    pub expected_gain: f64,
}

impl Curriculum {
    /// Stages must start at round 1 with strictly increasing start rounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let Some(first) = self.stages.first() else {
            return Err(ValidationError::empty_field("curriculum.stages"));
        };
        if first.from_round != 1 {
            return Err(ValidationError::invalid_format(
                "curriculum.stages",
                "first stage must start at round 1",
            ));
        }
        for pair in self.stages.windows(2) {
            if pair[1].from_round <= pair[0].from_round {
                return Err(ValidationError::invalid_format(
                    "curriculum.stages",
                    "stage start rounds must increase",
                ));
            }
        }
        Ok(())
    }

    pub fn stage_for(&self, round: u32) -> Option<&CurriculumStage> {
        self.stages.iter().rev().find(|s| s.from_round <= round)
    }

    pub fn focus_for(&self, round: u32, current: Score, target: Score) -> RoundFocus {
        let remaining = target.delta_from(current).max(0.0);
        match self.stage_for(round) {
            Some(stage) => RoundFocus {
                round,
                label: stage.label.clone(),
                dimensions: stage.dimensions.clone(),
                issue_types: stage.issue_types.clone(),
                expected_gain: stage.expected_gain.unwrap_or(remaining),
            },
            None => RoundFocus {
                round,
                label: "overall quality".to_string(),
                dimensions: Dimension::ALL.to_vec(),
                issue_types: Vec::new(),
                expected_gain: remaining,
            },
        }
    }
}
