//! DocumentScorer port - Scores a document against the quality dimensions.
//!
//! The production implementation is the validation agent, which falls back to
//! rule-based scoring and therefore always returns a result. Tests plug in
//! scripted scorers to drive the refinement loop through exact score paths.

use async_trait::async_trait;

use crate::domain::analysis::ScoringResult;
use crate::domain::foundation::SessionId;
use crate::domain::framework::Framework;
use crate::domain::presentation::Document;

/// Inputs for one scoring pass.
#[derive(Debug, Clone, Copy)]
pub struct ScoringRequest<'a> {
    pub session_id: SessionId,
    /// 0 for the initial document.
    pub round: u32,
    pub document: &'a Document,
    pub framework: Option<&'a Framework>,
}

/// Port for scoring documents.
#[async_trait]
pub trait DocumentScorer: Send + Sync {
    /// Scores the document. Never fails; degraded paths are reported
    /// through `ScoringResult::source`.
    async fn score(&self, request: ScoringRequest<'_>) -> ScoringResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn DocumentScorer) {}
}
