//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing the refinement loop to run without calling real services.
//!
//! # Features
//!
//! - Queued responses, consumed in order
//! - Simulated delays for timeout testing
//! - Error injection for retry and fallback testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response(r#"{"dimension_scores": {...}, "issues": []}"#)
//!     .with_error(MockError::Timeout { timeout_secs: 30 })
//!     .with_delay(Duration::from_millis(100));
//!
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    RequestPurpose, TokenUsage,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        content: String,
        finish_reason: FinishReason,
    },
    /// Wait before answering; used to trip caller-side timeouts.
    Delayed {
        content: String,
        delay: Duration,
    },
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContextTooLong { tokens: u32, max: u32 },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u64 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContextTooLong { tokens, max } => AIError::context_too_long(tokens, max),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::timeout(timeout_secs),
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1", 128_000),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
            finish_reason: FinishReason::Stop,
        })
    }

    /// Adds a response cut off at the token limit.
    pub fn with_truncated_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
            finish_reason: FinishReason::Length,
        })
    }

    /// Adds a response that arrives after `delay`.
    pub fn with_delayed_response(self, content: impl Into<String>, delay: Duration) -> Self {
        self.push(MockResponse::Delayed {
            content: content.into(),
            delay,
        })
    }

    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Sets simulated latency for every request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Queues a response on a provider already shared with the code under test.
    pub fn enqueue(&self, response: MockResponse) {
        locked(&self.responses).push_back(response);
    }

    pub fn call_count(&self) -> usize {
        locked(&self.calls).len()
    }

    /// Calls made for one purpose.
    pub fn calls_for(&self, purpose: RequestPurpose) -> usize {
        locked(&self.calls)
            .iter()
            .filter(|c| c.metadata.purpose == purpose)
            .count()
    }

    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        locked(&self.calls).clone()
    }

    pub fn remaining_responses(&self) -> usize {
        locked(&self.responses).len()
    }

    fn push(self, response: MockResponse) -> Self {
        self.enqueue(response);
        self
    }

    fn next_response(&self) -> Option<MockResponse> {
        locked(&self.responses).pop_front()
    }

    fn respond(&self, content: String, finish_reason: FinishReason) -> CompletionResponse {
        CompletionResponse {
            usage: TokenUsage::new(self.estimate_tokens(&content), 0),
            content,
            model: self.info.model.clone(),
            finish_reason,
        }
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        locked(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            Some(MockResponse::Success {
                content,
                finish_reason,
            }) => Ok(self.respond(content, finish_reason)),
            Some(MockResponse::Delayed { content, delay }) => {
                sleep(delay).await;
                Ok(self.respond(content, FinishReason::Stop))
            }
            Some(MockResponse::Error(err)) => Err(err.into()),
            None => Err(AIError::unavailable("mock responses exhausted")),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::ports::{MessageRole, RequestMetadata};

    fn request(purpose: RequestPurpose) -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(SessionId::new(), 1, purpose))
            .with_message(MessageRole::User, "Hello")
    }

    #[tokio::test]
    async fn responses_are_consumed_in_order() {
        let provider = MockAIProvider::new()
            .with_response("first")
            .with_response("second");

        let a = provider.complete(request(RequestPurpose::Scoring)).await.unwrap();
        let b = provider.complete(request(RequestPurpose::Scoring)).await.unwrap();
        assert_eq!(a.content, "first");
        assert_eq!(b.content, "second");
        assert_eq!(a.model, "mock-model-1");
    }

    #[tokio::test]
    async fn exhausted_queue_is_unavailable() {
        let provider = MockAIProvider::new();
        let err = provider.complete(request(RequestPurpose::Generation)).await.unwrap_err();
        assert!(matches!(err, AIError::Unavailable { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn injected_errors_convert() {
        let provider = MockAIProvider::new()
            .with_error(MockError::AuthenticationFailed)
            .with_error(MockError::Timeout { timeout_secs: 5 });

        let first = provider.complete(request(RequestPurpose::Scoring)).await.unwrap_err();
        let second = provider.complete(request(RequestPurpose::Scoring)).await.unwrap_err();
        assert_eq!(first, AIError::AuthenticationFailed);
        assert_eq!(second, AIError::timeout(5));
    }

    #[tokio::test]
    async fn truncated_response_reports_length() {
        let provider = MockAIProvider::new().with_truncated_response("{\"a\": [1, 2");
        let response = provider.complete(request(RequestPurpose::Generation)).await.unwrap();
        assert!(response.is_truncated());
    }

    #[tokio::test]
    async fn calls_are_tracked_by_purpose() {
        let provider = MockAIProvider::new()
            .with_response("a")
            .with_response("b")
            .with_response("c");
        provider.complete(request(RequestPurpose::Scoring)).await.unwrap();
        provider.complete(request(RequestPurpose::Generation)).await.unwrap();
        provider.complete(request(RequestPurpose::Scoring)).await.unwrap();

        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.calls_for(RequestPurpose::Scoring), 2);
        assert_eq!(provider.calls_for(RequestPurpose::FrameworkAnalysis), 0);
        assert_eq!(provider.remaining_responses(), 0);
    }

    #[tokio::test]
    async fn clones_share_the_queue() {
        let provider = MockAIProvider::new();
        let shared = provider.clone();
        shared.enqueue(MockResponse::Success {
            content: "late".into(),
            finish_reason: FinishReason::Stop,
        });
        let response = provider.complete(request(RequestPurpose::Scoring)).await.unwrap();
        assert_eq!(response.content, "late");
        assert_eq!(shared.call_count(), 1);
    }

    #[tokio::test]
    async fn delayed_response_waits() {
        let provider = MockAIProvider::new().with_delayed_response("slow", Duration::from_millis(40));
        let start = std::time::Instant::now();
        let response = provider.complete(request(RequestPurpose::Scoring)).await.unwrap();
        assert_eq!(response.content, "slow");
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
