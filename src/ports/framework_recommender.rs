//! FrameworkRecommender port - Picks the narrative framework for a document.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::domain::framework::{FrameworkAnalysis, RequestContext};
use crate::domain::presentation::Document;

/// Port for framework recommendation.
#[async_trait]
pub trait FrameworkRecommender: Send + Sync {
    /// Recommends a framework and measures the document's current fit.
    /// Falls back to keyword classification rather than failing.
    async fn recommend(
        &self,
        session_id: SessionId,
        document: &Document,
        context: &RequestContext,
    ) -> FrameworkAnalysis;
}
