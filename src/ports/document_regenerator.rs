//! DocumentRegenerator port - Produces an improved document from a brief.

use async_trait::async_trait;

use crate::domain::feedback::RefinementBrief;
use crate::domain::foundation::SessionId;
use crate::domain::presentation::Document;
use crate::domain::regeneration::{PreservationPlan, RegenerationOutcome};
use crate::domain::scoring::Issue;

/// Inputs for one regeneration round.
#[derive(Debug, Clone, Copy)]
pub struct RegenerationRequest<'a> {
    pub session_id: SessionId,
    pub round: u32,
    pub document: &'a Document,
    pub brief: &'a RefinementBrief,
    pub plan: &'a PreservationPlan,
    /// Issues the brief was built from; used to attribute changes.
    pub issues: &'a [Issue],
}

/// Port for regenerating documents.
///
/// Implementations must leave the caller's document untouched on failure and
/// report the failure inside the outcome instead of panicking.
#[async_trait]
pub trait DocumentRegenerator: Send + Sync {
    async fn regenerate(&self, request: RegenerationRequest<'_>) -> RegenerationOutcome;
}
