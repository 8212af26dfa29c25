//! ContentRegenerator - One generation call per round, merged field by field.
//!
//! The candidate from the generation service must keep the slide skeleton
//! of the prior document (see [`validate_integrity`]); structurally invalid
//! candidates are retried up to the configured bound and never merged.
//! Timeouts fail the round at once.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::{complete_within, document_json, ServiceCallError};
use crate::config::RefinementConfig;
use crate::domain::presentation::{Document, Slide};
use crate::domain::regeneration::{
    diff_documents, merge_documents, validate_integrity, IntegrityViolation, PreservationPlan,
    PreservationStrategy, RegenerationError, RegenerationOutcome,
};
use crate::domain::structured::{ResponseSchema, StructuredResponseParser};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, DocumentRegenerator, MessageRole, RegenerationRequest,
    RequestMetadata, RequestPurpose,
};

const SYSTEM_PROMPT: &str = "You revise business presentations. Apply the refinement brief to \
the deck. Keep every slide, in the same order, with the same id and type. Change only the \
fields the brief allows you to change. Respond with a single JSON object of the form \
{\"slides\": [...]} using the same slide schema as the input deck.";

const DEFAULT_ATTEMPTS: u32 = 2;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_TOKENS: u32 = 8192;

#[derive(Debug, Deserialize)]
struct GeneratedDeck {
    slides: Vec<Slide>,
}

/// Regenerates the weak parts of a document through the generation service.
pub struct ContentRegenerator {
    provider: Arc<dyn AIProvider>,
    parser: StructuredResponseParser,
    call_timeout: Duration,
    max_attempts: u32,
}

impl ContentRegenerator {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            parser: StructuredResponseParser::new(),
            call_timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_ATTEMPTS,
        }
    }

    pub fn from_config(provider: Arc<dyn AIProvider>, config: &RefinementConfig) -> Self {
        Self::new(provider)
            .with_timeout(config.call_timeout())
            .with_attempts(config.generation_attempts)
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Generation calls per round, at least one.
    pub fn with_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    async fn attempt(&self, request: &RegenerationRequest<'_>) -> Result<Document, RegenerationError> {
        let completion = CompletionRequest::new(RequestMetadata::new(
            request.session_id,
            request.round,
            RequestPurpose::Generation,
        ))
        .with_system_prompt(SYSTEM_PROMPT)
        .with_message(MessageRole::User, build_prompt(request))
        .with_max_tokens(MAX_TOKENS)
        .with_temperature(0.4);

        let response = complete_within(self.provider.as_ref(), completion, self.call_timeout)
            .await
            .map_err(to_regeneration_error)?;
        if response.is_truncated() {
            tracing::debug!(round = request.round, "generation response hit the token limit");
        }

        let schema = ResponseSchema::new().require("slides");
        let parsed = self.parser.parse_with_schema(&response.content, &schema)?;
        let deck: GeneratedDeck = serde_json::from_value(parsed.value)
            .map_err(|e| IntegrityViolation::Unreadable(e.to_string()))?;

        let candidate = request.document.with_slides(deck.slides);
        validate_integrity(request.document, &candidate)?;
        Ok(candidate)
    }
}

#[async_trait]
impl DocumentRegenerator for ContentRegenerator {
    async fn regenerate(&self, request: RegenerationRequest<'_>) -> RegenerationOutcome {
        if request.plan.is_noop() {
            tracing::debug!(
                session_id = %request.session_id,
                round = request.round,
                "every slide preserved, skipping generation"
            );
            return RegenerationOutcome::skipped(request.document.clone());
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(&request).await {
                Ok(candidate) => {
                    let merged = merge_documents(request.document, &candidate, request.plan);
                    let changes = diff_documents(request.document, &merged, request.issues);
                    tracing::info!(
                        session_id = %request.session_id,
                        round = request.round,
                        attempt,
                        changed_slides = changes.len(),
                        "document regenerated"
                    );
                    return RegenerationOutcome::succeeded(merged, changes, attempt);
                }
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        session_id = %request.session_id,
                        round = request.round,
                        attempt,
                        error = %err,
                        "unusable regeneration, retrying"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        session_id = %request.session_id,
                        round = request.round,
                        attempt,
                        error = %err,
                        "regeneration failed, keeping prior document"
                    );
                    return RegenerationOutcome::failed(request.document.clone(), err, attempt);
                }
            }
        }
    }
}

fn to_regeneration_error(err: ServiceCallError) -> RegenerationError {
    match err {
        ServiceCallError::Timeout(seconds) => RegenerationError::Timeout { seconds },
        ServiceCallError::Provider(AIError::Timeout { timeout_secs }) => RegenerationError::Timeout {
            seconds: timeout_secs,
        },
        ServiceCallError::Provider(err) => RegenerationError::Provider {
            retryable: err.is_retryable(),
            message: err.to_string(),
        },
        ServiceCallError::Parse(failure) => RegenerationError::Parse(failure),
    }
}

fn build_prompt(request: &RegenerationRequest<'_>) -> String {
    let mut prompt = request.brief.render_prompt();

    let locked: Vec<String> = request
        .plan
        .slides
        .iter()
        .filter(|s| s.strategy == PreservationStrategy::PreserveCompletely)
        .map(|s| s.slide_id.to_string())
        .collect();
    if !locked.is_empty() {
        prompt.push_str(&format!(
            "\n\nReturn these slides unchanged: {}.",
            locked.join(", ")
        ));
    }

    prompt.push_str("\n\nCurrent deck JSON:\n");
    prompt.push_str(&document_json(request.document));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::feedback::{ConversionInput, FeedbackConverter, RefinementBrief};
    use crate::domain::foundation::{IssueId, Score, SessionId, SlideId};
    use crate::domain::presentation::{SlideContent, SlideLayout, SlideType};
    use crate::domain::scoring::{DimensionScores, Issue, IssueType, Severity};
    use serde_json::json;

    fn sid(id: &str) -> SlideId {
        SlideId::new(id).unwrap()
    }

    fn deck() -> Document {
        Document::new(
            "Pilot",
            vec![
                Slide::new(sid("s1"), SlideType::Title, SlideLayout::Title, SlideContent::titled("Pilot")),
                Slide::new(
                    sid("s2"),
                    SlideType::Problem,
                    SlideLayout::Bullets,
                    SlideContent::titled("Stuff").with_bullets(["things"]),
                ),
            ],
        )
    }

    fn issues() -> Vec<Issue> {
        vec![Issue::new(IssueId::sequential(0), IssueType::Clarity, Severity::Critical, "Vague headline")
            .on_slide(sid("s2"))]
    }

    fn brief(doc: &Document, issues: &[Issue], plan: &PreservationPlan) -> RefinementBrief {
        let scores = DimensionScores::uniform(60.0);
        FeedbackConverter::default().convert(&ConversionInput {
            issues,
            scores: &scores,
            overall: Score::new(60.0),
            target: Score::new(85.0),
            round: 1,
            history: &[],
            plan,
            framework_fit: None,
        })
    }

    fn candidate_json(slides: Vec<Slide>) -> String {
        json!({ "slides": slides }).to_string()
    }

    fn improved_slides() -> Vec<Slide> {
        let mut slides = deck().slides;
        slides[1].content = SlideContent::titled("Manual reporting costs 10 hours a week")
            .with_bullets(["Analysts rebuild the same reports"]);
        slides
    }

    fn regenerator(provider: MockAIProvider) -> ContentRegenerator {
        ContentRegenerator::new(Arc::new(provider)).with_timeout(Duration::from_millis(200))
    }

    async fn run(regenerator: &ContentRegenerator, doc: &Document, issues: &[Issue]) -> RegenerationOutcome {
        let plan = PreservationPlan::from_issues(doc, issues);
        let brief = brief(doc, issues, &plan);
        regenerator
            .regenerate(RegenerationRequest {
                session_id: SessionId::new(),
                round: 1,
                document: doc,
                brief: &brief,
                plan: &plan,
                issues,
            })
            .await
    }

    #[tokio::test]
    async fn merges_valid_candidate() {
        let provider = MockAIProvider::new().with_response(candidate_json(improved_slides()));
        let doc = deck();
        let outcome = run(&regenerator(provider), &doc, &issues()).await;

        assert!(outcome.success);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(
            outcome.document.slides[1].headline(),
            Some("Manual reporting costs 10 hours a week")
        );
        assert_eq!(outcome.document.slides[0], doc.slides[0]);
        assert_eq!(outcome.document.metadata.version, doc.metadata.version + 1);
        assert!(!outcome.changes.is_empty());
    }

    #[tokio::test]
    async fn noop_plan_skips_the_call() {
        let provider = MockAIProvider::new();
        let doc = deck();
        let outcome = run(&regenerator(provider.clone()), &doc, &[]).await;

        assert!(outcome.was_skipped());
        assert_eq!(outcome.document, doc);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn structural_violation_is_retried() {
        let mut dropped = improved_slides();
        dropped.pop();
        let provider = MockAIProvider::new()
            .with_response(candidate_json(dropped))
            .with_response(candidate_json(improved_slides()));
        let doc = deck();
        let outcome = run(&regenerator(provider.clone()), &doc, &issues()).await;

        assert!(outcome.success);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn repeated_violation_fails_the_round_untouched() {
        let mut retyped = improved_slides();
        retyped[1].slide_type = SlideType::Solution;
        let provider = MockAIProvider::new()
            .with_response(candidate_json(retyped.clone()))
            .with_response(candidate_json(retyped));
        let doc = deck();
        let outcome = run(&regenerator(provider), &doc, &issues()).await;

        assert!(!outcome.success);
        assert_eq!(outcome.document, doc);
        assert!(outcome.error.as_ref().unwrap().is_structural());
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test]
    async fn unreadable_slides_are_structural() {
        let provider = MockAIProvider::new()
            .with_response(r#"{"slides": [{"id": "s1"}]}"#)
            .with_response(r#"{"slides": "none"}"#);
        let doc = deck();
        let outcome = run(&regenerator(provider), &doc, &issues()).await;

        assert!(!outcome.success);
        assert!(matches!(
            outcome.error,
            Some(RegenerationError::Integrity(IntegrityViolation::Unreadable(_)))
        ));
    }

    #[tokio::test]
    async fn timeout_fails_without_retry() {
        let provider = MockAIProvider::new()
            .with_delayed_response(candidate_json(improved_slides()), Duration::from_millis(500))
            .with_response(candidate_json(improved_slides()));
        let doc = deck();
        let outcome = run(
            &regenerator(provider.clone()).with_timeout(Duration::from_millis(20)),
            &doc,
            &issues(),
        )
        .await;

        assert!(!outcome.success);
        assert!(matches!(outcome.error, Some(RegenerationError::Timeout { .. })));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn permanent_provider_error_fails_once() {
        let provider = MockAIProvider::new().with_error(MockError::ContentFiltered {
            reason: "policy".into(),
        });
        let doc = deck();
        let outcome = run(&regenerator(provider.clone()), &doc, &issues()).await;

        assert!(!outcome.success);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn prompt_carries_brief_and_deck() {
        let provider = MockAIProvider::new().with_response(candidate_json(improved_slides()));
        let doc = deck();
        run(&regenerator(provider.clone()), &doc, &issues()).await;

        let prompt = provider.get_calls()[0].last_user_message().unwrap();
        assert!(prompt.contains("Round 1"));
        assert!(prompt.contains("Return these slides unchanged: s1."));
        assert!(prompt.contains("\"id\": \"s2\""));
    }
}
