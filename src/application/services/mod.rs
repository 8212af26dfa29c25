//! Application services - adapters between the loop ports and the AI
//! provider.
//!
//! Each service wraps remote calls in a timeout, parses the untrusted
//! response with [`StructuredResponseParser`](crate::domain::structured::StructuredResponseParser),
//! and degrades to the deterministic domain implementation instead of
//! failing.

mod content_regenerator;
mod framework_analyzer;
mod validation_agent;

pub use content_regenerator::ContentRegenerator;
pub use framework_analyzer::FrameworkAnalyzer;
pub use validation_agent::ValidationAgent;

use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::domain::presentation::Document;
use crate::domain::structured::ParseFailure;
use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse};

/// Why one service call produced nothing usable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceCallError {
    #[error(transparent)]
    Provider(#[from] AIError),

    #[error("call timed out after {0}s")]
    Timeout(u64),

    #[error(transparent)]
    Parse(#[from] ParseFailure),
}

impl ServiceCallError {
    /// Timeouts and malformed payloads are transient; provider errors carry
    /// their own classification.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceCallError::Provider(err) => err.is_retryable(),
            ServiceCallError::Timeout(_) => true,
            ServiceCallError::Parse(failure) => failure.is_retryable(),
        }
    }
}

/// Runs one completion under `limit`.
pub(crate) async fn complete_within(
    provider: &dyn AIProvider,
    request: CompletionRequest,
    limit: Duration,
) -> Result<CompletionResponse, ServiceCallError> {
    match timeout(limit, provider.complete(request)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ServiceCallError::Timeout(limit.as_secs())),
    }
}

/// Document as JSON for a prompt. Falls back to the plain text when the
/// document cannot be serialized.
pub(crate) fn document_json(document: &Document) -> String {
    serde_json::to_string_pretty(document).unwrap_or_else(|_| document.searchable_text())
}
