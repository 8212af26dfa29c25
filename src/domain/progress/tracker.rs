//! Progress tracking for a refinement session.
//!
//! Pure bookkeeping: callers pass the current time in, nothing here reads a
//! clock or performs I/O.

use serde::{Deserialize, Serialize};

use super::stage::ProgressStage;
use crate::domain::foundation::{Score, SessionId, StateMachine, Timestamp, ValidationError};

/// Assumed round duration before any round has finished.
pub const DEFAULT_ROUND_SECS: f64 = 30.0;

/// Point-in-time view of a session's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub session_id: SessionId,
    pub stage: ProgressStage,
    pub round: u32,
    pub total_rounds: u32,
    pub percent: f64,
    pub current_score: Option<Score>,
    pub target: Score,
    pub projected_final: Option<Score>,
    pub on_track: bool,
    pub estimated_seconds_remaining: f64,
    pub elapsed_seconds: f64,
    pub message: String,
    pub at: Timestamp,
}

/// Tracks stage, round timing and score history of one session.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    session_id: SessionId,
    total_rounds: u32,
    target: Score,
    stage: ProgressStage,
    current_round: u32,
    completed_rounds: u32,
    scores: Vec<Score>,
    round_durations: Vec<f64>,
    round_started_at: Option<Timestamp>,
    started_at: Timestamp,
    message: String,
}

impl ProgressTracker {
    pub fn new(session_id: SessionId, total_rounds: u32, target: Score, now: Timestamp) -> Self {
        Self {
            session_id,
            total_rounds: total_rounds.max(1),
            target,
            stage: ProgressStage::Initializing,
            current_round: 0,
            completed_rounds: 0,
            scores: Vec::new(),
            round_durations: Vec::new(),
            round_started_at: None,
            started_at: now,
            message: "starting".to_string(),
        }
    }

    pub fn stage(&self) -> ProgressStage {
        self.stage
    }

    pub fn score_history(&self) -> &[Score] {
        &self.scores
    }

    /// Moves to `stage`, rejecting transitions the stage machine forbids.
    pub fn enter(&mut self, stage: ProgressStage, message: impl Into<String>) -> Result<(), ValidationError> {
        self.stage = self.stage.transition_to(stage)?;
        self.message = message.into();
        Ok(())
    }

    /// Starts round `round`; the stage becomes analyzing.
    pub fn start_round(&mut self, round: u32, now: Timestamp) -> Result<(), ValidationError> {
        self.enter(ProgressStage::Analyzing, format!("round {} of {}", round, self.total_rounds))?;
        self.current_round = round;
        self.round_started_at = Some(now);
        Ok(())
    }

    /// Closes the running round and records its duration.
    pub fn finish_round(&mut self, now: Timestamp) {
        if let Some(started) = self.round_started_at.take() {
            self.round_durations.push(now.secs_since(&started));
            self.completed_rounds = (self.completed_rounds + 1).min(self.total_rounds);
        }
    }

    pub fn record_score(&mut self, score: Score) {
        self.scores.push(score);
    }

    pub fn complete(&mut self, message: impl Into<String>) -> Result<(), ValidationError> {
        if self.stage != ProgressStage::Completing {
            self.enter(ProgressStage::Completing, "completing")?;
        }
        self.enter(ProgressStage::Completed, message)
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), ValidationError> {
        self.enter(ProgressStage::Failed, message)
    }

    /// Overall completion, 0-100.
    pub fn percent(&self) -> f64 {
        match self.stage {
            ProgressStage::Completed => 100.0,
            ProgressStage::Failed => 0.0,
            stage => {
                let in_round = if self.round_started_at.is_some() || stage == ProgressStage::Completing {
                    stage.sub_progress() / 100.0
                } else {
                    0.0
                };
                let done = self.completed_rounds as f64 + in_round;
                (100.0 * done / self.total_rounds as f64).clamp(0.0, 100.0)
            }
        }
    }

    /// Average per-round improvement over the score history.
    pub fn average_improvement(&self) -> f64 {
        match (self.scores.first(), self.scores.last()) {
            (Some(first), Some(last)) if self.scores.len() > 1 => {
                last.delta_from(*first) / (self.scores.len() - 1) as f64
            }
            _ => 0.0,
        }
    }

    /// Last score plus average improvement for each remaining round.
    pub fn projected_final(&self) -> Option<Score> {
        let last = self.scores.last()?;
        let remaining = self.total_rounds.saturating_sub(self.completed_rounds) as f64;
        Some(Score::new(last.value() + self.average_improvement() * remaining))
    }

    pub fn average_round_secs(&self) -> f64 {
        if self.round_durations.is_empty() {
            return DEFAULT_ROUND_SECS;
        }
        self.round_durations.iter().sum::<f64>() / self.round_durations.len() as f64
    }

    /// Whole rounds still to run after the current one, times the average
    /// round duration, plus what is left of the current round.
    pub fn estimated_seconds_remaining(&self) -> f64 {
        if self.stage.is_terminal() {
            return 0.0;
        }
        let remaining_rounds = self.total_rounds.saturating_sub(self.completed_rounds);
        if remaining_rounds == 0 {
            return 0.0;
        }
        let average = self.average_round_secs();
        let current_remainder = average * (1.0 - self.stage.sub_progress() / 100.0);
        (remaining_rounds - 1) as f64 * average + current_remainder
    }

    pub fn snapshot(&self, now: Timestamp) -> ProgressSnapshot {
        let projected_final = self.projected_final();
        ProgressSnapshot {
            session_id: self.session_id,
            stage: self.stage,
            round: self.current_round,
            total_rounds: self.total_rounds,
            percent: self.percent(),
            current_score: self.scores.last().copied(),
            target: self.target,
            projected_final,
            on_track: projected_final.is_some_and(|p| p.value() >= self.target.value()),
            estimated_seconds_remaining: self.estimated_seconds_remaining(),
            elapsed_seconds: now.secs_since(&self.started_at),
            message: self.message.clone(),
            at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tracker(total: u32) -> (ProgressTracker, Timestamp) {
        let start = Timestamp::now();
        (ProgressTracker::new(SessionId::new(), total, Score::new(85.0), start), start)
    }

    #[test]
    fn percent_combines_rounds_and_stage() {
        let (mut t, start) = tracker(4);
        assert_eq!(t.percent(), 0.0);

        t.start_round(1, start).unwrap();
        assert!((t.percent() - 5.0).abs() < 1e-9); // 0.2 / 4

        t.enter(ProgressStage::Generating, "gen").unwrap();
        t.enter(ProgressStage::Validating, "val").unwrap();
        t.enter(ProgressStage::Applying, "apply").unwrap();
        t.finish_round(start.plus_secs(10));
        t.start_round(2, start.plus_secs(10)).unwrap();
        // one round done plus 20% of the second
        assert!((t.percent() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn terminal_stages_pin_percent() {
        let (mut t, _) = tracker(3);
        t.complete("done").unwrap();
        assert_eq!(t.percent(), 100.0);

        let (mut t, _) = tracker(3);
        t.fail("boom").unwrap();
        assert_eq!(t.percent(), 0.0);
    }

    #[test]
    fn invalid_stage_jump_is_rejected() {
        let (mut t, _) = tracker(3);
        assert!(t.enter(ProgressStage::Validating, "skip").is_err());
        assert_eq!(t.stage(), ProgressStage::Initializing);
    }

    #[test]
    fn projection_uses_average_improvement() {
        let (mut t, start) = tracker(5);
        t.record_score(Score::new(60.0));
        t.start_round(1, start).unwrap();
        t.enter(ProgressStage::Generating, "").unwrap();
        t.enter(ProgressStage::Validating, "").unwrap();
        t.record_score(Score::new(66.0));
        t.enter(ProgressStage::Applying, "").unwrap();
        t.finish_round(start.plus_secs(20));

        assert!((t.average_improvement() - 6.0).abs() < 1e-9);
        // 66 + 6 * 4 remaining rounds
        let snapshot = t.snapshot(start.plus_secs(20));
        assert!((snapshot.projected_final.unwrap().value() - 90.0).abs() < 1e-9);
        assert!(snapshot.on_track);
        assert_eq!(snapshot.current_score, Some(Score::new(66.0)));
    }

    #[test]
    fn time_remaining_defaults_to_thirty_seconds_per_round() {
        let (t, _) = tracker(3);
        // initializing: two whole rounds plus the full current one
        assert!((t.estimated_seconds_remaining() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn time_remaining_uses_measured_rounds() {
        let (mut t, start) = tracker(3);
        t.start_round(1, start).unwrap();
        t.enter(ProgressStage::Generating, "").unwrap();
        t.enter(ProgressStage::Validating, "").unwrap();
        t.enter(ProgressStage::Applying, "").unwrap();
        t.finish_round(start.plus_secs(10));
        t.start_round(2, start.plus_secs(10)).unwrap();
        t.enter(ProgressStage::Generating, "").unwrap();
        // one more round after this one at 10s, plus half of the current
        assert!((t.estimated_seconds_remaining() - 15.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn percent_stays_in_bounds(total in 1u32..10, rounds in 0u32..15) {
            let (mut t, start) = tracker(total);
            for round in 1..=rounds {
                if t.start_round(round, start).is_err() {
                    break;
                }
                t.enter(ProgressStage::Generating, "").unwrap();
                t.enter(ProgressStage::Validating, "").unwrap();
                t.enter(ProgressStage::Applying, "").unwrap();
                t.finish_round(start.plus_secs(u64::from(round)));
                let p = t.percent();
                prop_assert!((0.0..=100.0).contains(&p));
            }
        }
    }
}
