//! Failover AI Provider - Wrapper that fails over from a primary to a secondary provider.
//!
//! When the primary fails with a retryable error (rate limit, unavailable,
//! network, timeout), the same request goes to the fallback if one is
//! configured. Non-retryable errors are returned as they are.
//!
//! # Example
//!
//! ```ignore
//! let provider = FailoverAIProvider::new(Arc::new(AnthropicProvider::new(primary_config)?))
//!     .with_fallback(Arc::new(AnthropicProvider::new(secondary_config)?));
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// AI provider wrapper with failover to a secondary provider.
pub struct FailoverAIProvider {
    primary: Arc<dyn AIProvider>,
    fallback: Option<Arc<dyn AIProvider>>,
    failovers: AtomicU64,
}

impl FailoverAIProvider {
    pub fn new(primary: Arc<dyn AIProvider>) -> Self {
        Self {
            primary,
            fallback: None,
            failovers: AtomicU64::new(0),
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn AIProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Number of requests that went to the fallback.
    pub fn failover_count(&self) -> u64 {
        self.failovers.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AIProvider for FailoverAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let err = match self.primary.complete(request.clone()).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        match &self.fallback {
            Some(fallback) if err.is_retryable() => {
                self.failovers.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    primary = %self.primary.provider_info().name,
                    fallback = %fallback.provider_info().name,
                    trace_id = %request.metadata.trace_id,
                    error = %err,
                    "primary provider failed, using fallback"
                );
                fallback.complete(request).await
            }
            _ => Err(err),
        }
    }

    fn estimate_tokens(&self, text: &str) -> u32 {
        self.primary.estimate_tokens(text)
    }

    fn provider_info(&self) -> ProviderInfo {
        self.primary.provider_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::foundation::SessionId;
    use crate::ports::{MessageRole, RequestMetadata, RequestPurpose};

    fn make_request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(SessionId::new(), 1, RequestPurpose::Scoring))
            .with_message(MessageRole::User, "Score this deck")
    }

    #[tokio::test]
    async fn primary_success_no_fallback_used() {
        let fallback = MockAIProvider::new().with_response("Fallback response");
        let provider = FailoverAIProvider::new(Arc::new(MockAIProvider::new().with_response("Hi there!")))
            .with_fallback(Arc::new(fallback.clone()));

        let response = provider.complete(make_request()).await.unwrap();

        assert_eq!(response.content, "Hi there!");
        assert_eq!(provider.failover_count(), 0);
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn primary_rate_limited_uses_fallback() {
        let primary = MockAIProvider::new().with_error(MockError::RateLimited { retry_after_secs: 30 });
        let provider = FailoverAIProvider::new(Arc::new(primary))
            .with_fallback(Arc::new(MockAIProvider::new().with_response("Fallback response")));

        let response = provider.complete(make_request()).await.unwrap();

        assert_eq!(response.content, "Fallback response");
        assert_eq!(provider.failover_count(), 1);
    }

    #[tokio::test]
    async fn primary_timeout_uses_fallback() {
        let primary = MockAIProvider::new().with_error(MockError::Timeout { timeout_secs: 30 });
        let provider = FailoverAIProvider::new(Arc::new(primary))
            .with_fallback(Arc::new(MockAIProvider::new().with_response("Fallback response")));

        assert!(provider.complete(make_request()).await.is_ok());
        assert_eq!(provider.failover_count(), 1);
    }

    #[tokio::test]
    async fn non_retryable_error_not_fallback() {
        let fallback = MockAIProvider::new().with_response("Fallback response");
        let provider = FailoverAIProvider::new(Arc::new(
            MockAIProvider::new().with_error(MockError::AuthenticationFailed),
        ))
        .with_fallback(Arc::new(fallback.clone()));

        let result = provider.complete(make_request()).await;

        assert_eq!(result.unwrap_err(), AIError::AuthenticationFailed);
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn no_fallback_configured_returns_error() {
        let provider = FailoverAIProvider::new(Arc::new(
            MockAIProvider::new().with_error(MockError::RateLimited { retry_after_secs: 30 }),
        ));

        assert!(!provider.has_fallback());
        assert!(provider.complete(make_request()).await.is_err());
    }

    #[tokio::test]
    async fn fallback_also_fails_returns_fallback_error() {
        let provider = FailoverAIProvider::new(Arc::new(
            MockAIProvider::new().with_error(MockError::RateLimited { retry_after_secs: 30 }),
        ))
        .with_fallback(Arc::new(
            MockAIProvider::new().with_error(MockError::AuthenticationFailed),
        ));

        let result = provider.complete(make_request()).await;

        assert_eq!(result.unwrap_err(), AIError::AuthenticationFailed);
        assert_eq!(provider.failover_count(), 1);
    }

    #[test]
    fn reports_primary_info() {
        let provider = FailoverAIProvider::new(Arc::new(MockAIProvider::new()));
        assert_eq!(provider.provider_info().name, "mock");
    }
}
