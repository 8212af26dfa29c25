//! Stopping policy for the refinement loop.
//!
//! Pure functions over the score history. The history holds the adopted score
//! at the start of every round: `history[0]` is the initial score and each
//! adopted round appends one entry, so it never decreases.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Score, ValidationError};

/// Distance to target below which the loop counts as converged.
pub const CONVERGENCE_GAP: f64 = 2.0;

/// Per-round improvement below which two consecutive rounds count as a plateau.
pub const PLATEAU_DELTA: f64 = 1.0;

/// Default minimum improvement for a candidate to be adopted after round 1.
pub const DEFAULT_MIN_IMPROVEMENT: f64 = 2.0;

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TargetReached,
    Converged,
    RegenerationFailed,
    NoChanges,
    Regression,
    MinimalImprovement,
    MaxRoundsReached,
    Cancelled,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::TargetReached => "target_reached",
            StopReason::Converged => "converged",
            StopReason::RegenerationFailed => "regeneration_failed",
            StopReason::NoChanges => "no_changes",
            StopReason::Regression => "regression",
            StopReason::MinimalImprovement => "minimal_improvement",
            StopReason::MaxRoundsReached => "max_rounds_reached",
            StopReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict on a freshly scored candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateVerdict {
    /// Adopt the candidate and keep going.
    Adopt { improvement: f64 },
    /// Keep the prior document and stop.
    Reject { reason: StopReason, improvement: f64 },
}

impl CandidateVerdict {
    pub fn is_adopted(&self) -> bool {
        matches!(self, CandidateVerdict::Adopt { .. })
    }

    pub fn improvement(&self) -> f64 {
        match self {
            CandidateVerdict::Adopt { improvement } | CandidateVerdict::Reject { improvement, .. } => *improvement,
        }
    }
}

/// Thresholds deciding when the loop stops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingPolicy {
    pub target: Score,
    pub max_rounds: u32,
    pub min_improvement: f64,
}

impl StoppingPolicy {
    pub fn new(target: Score, max_rounds: u32) -> Self {
        Self {
            target,
            max_rounds,
            min_improvement: DEFAULT_MIN_IMPROVEMENT,
        }
    }

    pub fn with_min_improvement(mut self, min_improvement: f64) -> Self {
        self.min_improvement = min_improvement;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_rounds == 0 {
            return Err(ValidationError::out_of_range(
                "max_rounds",
                1.0,
                f64::from(u32::MAX),
                0.0,
            ));
        }
        if !self.min_improvement.is_finite() || self.min_improvement < 0.0 {
            return Err(ValidationError::out_of_range(
                "min_improvement",
                0.0,
                100.0,
                self.min_improvement,
            ));
        }
        Ok(())
    }

    pub fn target_reached(&self, score: Score) -> bool {
        score.value() >= self.target.value()
    }

    /// Checks run before round `round` starts (1-based).
    pub fn check_before_round(&self, round: u32, history: &[Score]) -> Option<StopReason> {
        let current = *history.last()?;
        if self.target_reached(current) {
            return Some(StopReason::TargetReached);
        }
        if round > self.max_rounds {
            return Some(StopReason::MaxRoundsReached);
        }
        if self.converged(round, history) {
            return Some(StopReason::Converged);
        }
        None
    }

    /// True when the score has stalled, sits just under target, or plateaued.
    pub fn converged(&self, round: u32, history: &[Score]) -> bool {
        let Some(current) = history.last() else {
            return false;
        };
        let improvements: Vec<f64> = history.windows(2).map(|w| w[1].delta_from(w[0])).collect();

        let unchanged = round > 1
            && improvements
                .last()
                .is_some_and(|delta| delta.abs() < f64::EPSILON * 100.0);
        let near_target = self.target.delta_from(*current).abs() < CONVERGENCE_GAP;
        let plateau = round > 2
            && improvements.len() >= 2
            && improvements[improvements.len() - 2..]
                .iter()
                .all(|delta| *delta < PLATEAU_DELTA);

        unchanged || near_target || plateau
    }

    /// Decides whether a candidate scored `candidate` replaces `current`.
    pub fn judge_candidate(&self, round: u32, current: Score, candidate: Score) -> CandidateVerdict {
        let improvement = candidate.delta_from(current);
        if improvement <= 0.0 {
            return CandidateVerdict::Reject {
                reason: StopReason::Regression,
                improvement,
            };
        }
        if round > 1 && improvement < self.min_improvement {
            return CandidateVerdict::Reject {
                reason: StopReason::MinimalImprovement,
                improvement,
            };
        }
        CandidateVerdict::Adopt { improvement }
    }
}
