//! Refinement session aggregate.
//!
//! Created when a refinement starts, appended to once per round and sealed on
//! completion. The best document seen so far is always retained so that any
//! stop, including cancellation, can hand it back.

use serde::{Deserialize, Serialize};

use super::phase::RefinementPhase;
use super::record::RoundRecord;
use super::stopping::StopReason;
use crate::domain::foundation::{Score, SessionId, StateMachine, Timestamp, ValidationError};
use crate::domain::presentation::Document;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

/// One run of the refinement loop over a document.
///
/// # Invariants
///
/// - `best_score` never decreases
/// - rounds are numbered 1, 2, 3, ... in append order
/// - a sealed session accepts no further rounds or documents
#[derive(Debug, Clone)]
pub struct RefinementSession {
    id: SessionId,
    initial_document: Document,
    initial_score: Score,
    best_document: Document,
    best_score: Score,
    target: Score,
    max_rounds: u32,
    rounds: Vec<RoundRecord>,
    phase: RefinementPhase,
    status: SessionStatus,
    stop_reason: Option<StopReason>,
    started_at: Timestamp,
    finished_at: Option<Timestamp>,
}

impl RefinementSession {
    pub fn new(initial_document: Document, target: Score, max_rounds: u32, now: Timestamp) -> Self {
        Self {
            id: SessionId::new(),
            best_document: initial_document.clone(),
            initial_document,
            initial_score: Score::ZERO,
            best_score: Score::ZERO,
            target,
            max_rounds,
            rounds: Vec::new(),
            phase: RefinementPhase::Idle,
            status: SessionStatus::InProgress,
            stop_reason: None,
            started_at: now,
            finished_at: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn initial_document(&self) -> &Document {
        &self.initial_document
    }

    pub fn initial_score(&self) -> Score {
        self.initial_score
    }

    pub fn best_document(&self) -> &Document {
        &self.best_document
    }

    pub fn best_score(&self) -> Score {
        self.best_score
    }

    pub fn target(&self) -> Score {
        self.target
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn phase(&self) -> RefinementPhase {
        self.phase
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<Timestamp> {
        self.finished_at
    }

    pub fn target_achieved(&self) -> bool {
        self.best_score.value() >= self.target.value()
    }

    pub fn is_sealed(&self) -> bool {
        self.status != SessionStatus::InProgress
    }

    /// Adopted score at the start of every round so far, initial score first.
    pub fn score_history(&self) -> Vec<Score> {
        std::iter::once(self.initial_score)
            .chain(self.rounds.iter().filter(|r| r.adopted).map(|r| r.end_score))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn advance(&mut self, phase: RefinementPhase) -> Result<(), ValidationError> {
        self.phase = self.phase.transition_to(phase)?;
        Ok(())
    }

    /// Records the score of the initial document.
    pub fn set_baseline(&mut self, score: Score) -> Result<(), ValidationError> {
        self.ensure_open()?;
        if !self.rounds.is_empty() {
            return Err(ValidationError::invalid_format(
                "baseline",
                "baseline cannot change after rounds were recorded",
            ));
        }
        self.initial_score = score;
        self.best_score = score;
        Ok(())
    }

    /// Replaces the best document. Rejects a lower score.
    pub fn adopt(&mut self, document: Document, score: Score) -> Result<(), ValidationError> {
        self.ensure_open()?;
        if score.value() < self.best_score.value() {
            return Err(ValidationError::out_of_range(
                "score",
                self.best_score.value(),
                100.0,
                score.value(),
            ));
        }
        self.best_document = document;
        self.best_score = score;
        Ok(())
    }

    pub fn append_round(&mut self, record: RoundRecord) -> Result<(), ValidationError> {
        self.ensure_open()?;
        let expected = self.rounds.len() as u32 + 1;
        if record.round != expected {
            return Err(ValidationError::invalid_format(
                "round",
                format!("expected round {}, got {}", expected, record.round),
            ));
        }
        self.rounds.push(record);
        Ok(())
    }

    /// Seals the session as completed.
    pub fn complete(&mut self, reason: StopReason, now: Timestamp) -> Result<(), ValidationError> {
        self.seal(SessionStatus::Completed, reason, now)
    }

    /// Seals the session as cancelled; the best document is kept.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), ValidationError> {
        self.seal(SessionStatus::Cancelled, StopReason::Cancelled, now)
    }

    fn seal(&mut self, status: SessionStatus, reason: StopReason, now: Timestamp) -> Result<(), ValidationError> {
        self.ensure_open()?;
        self.status = status;
        self.stop_reason = Some(reason);
        self.finished_at = Some(now);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), ValidationError> {
        if self.is_sealed() {
            return Err(ValidationError::invalid_format(
                "session",
                format!("session is {}", self.status.as_str()),
            ));
        }
        Ok(())
    }
}
