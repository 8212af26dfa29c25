//! Lessons carried from one round into the next brief.

use serde::{Deserialize, Serialize};

use crate::domain::regeneration::ChangeRecord;
use crate::domain::scoring::DimensionDelta;

/// Dimension moves smaller than this are noise.
const NOTABLE_DELTA: f64 = 0.5;

/// What a finished round taught.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundLesson {
    pub round: u32,
    pub score_delta: f64,
    pub dimension_deltas: Vec<DimensionDelta>,
    pub worked: Vec<String>,
    pub did_not_work: Vec<String>,
}

impl RoundLesson {
    /// Derives the lesson from a round's score movement and change log.
    pub fn derive(
        round: u32,
        score_delta: f64,
        dimension_deltas: Vec<DimensionDelta>,
        changes: &[ChangeRecord],
    ) -> Self {
        let mut worked = Vec::new();
        let mut did_not_work = Vec::new();

        for delta in &dimension_deltas {
            if delta.delta >= NOTABLE_DELTA {
                worked.push(format!("{} rose by {:.1}", delta.dimension.label(), delta.delta));
            } else if delta.delta <= -NOTABLE_DELTA {
                did_not_work.push(format!("{} fell by {:.1}", delta.dimension.label(), -delta.delta));
            }
        }

        if !changes.is_empty() {
            let slides: Vec<&str> = changes.iter().map(|c| c.slide_id.as_str()).collect();
            let summary = format!("changes to {}", slides.join(", "));
            if score_delta > 0.0 {
                worked.push(format!("{} raised the score by {:.1}", summary, score_delta));
            } else {
                did_not_work.push(format!("{} did not raise the score", summary));
            }
        }

        Self {
            round,
            score_delta,
            dimension_deltas,
            worked,
            did_not_work,
        }
    }

    /// Lesson of a round whose regeneration produced nothing usable.
    pub fn from_failure(round: u32, reason: &str) -> Self {
        Self {
            round,
            score_delta: 0.0,
            dimension_deltas: Vec::new(),
            worked: Vec::new(),
            did_not_work: vec![format!("regeneration was rejected ({})", reason)],
        }
    }
}
