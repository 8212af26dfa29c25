//! FrameworkAnalyzer - Recommends the narrative framework for a document.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use super::{complete_within, ServiceCallError};
use crate::config::RefinementConfig;
use crate::config::ValidationError as ConfigValidationError;
use crate::domain::foundation::{Score, SessionId};
use crate::domain::framework::{
    rank_candidates, FitAssessor, FrameworkAnalysis, FrameworkCandidate, FrameworkCatalog,
    FrameworkId, RequestContext, RuleBasedClassifier,
};
use crate::domain::presentation::Document;
use crate::domain::scoring::AssessmentSource;
use crate::domain::structured::{ParseFailure, ResponseSchema, StructuredResponseParser};
use crate::ports::{
    AIProvider, CompletionRequest, FrameworkRecommender, MessageRole, RequestMetadata,
    RequestPurpose,
};

const SYSTEM_PROMPT: &str = "You choose the storytelling framework that best fits a business \
presentation. Score every framework you are given from 0 to 100 for the request and the deck. \
Respond with a single JSON object:\n\
{\"candidates\": [{\"framework_id\": \"scqa\", \"score\": 0}], \"confidence\": 0, \"rationale\": \"...\"}";

const DEFAULT_RETRIES: u32 = 2;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct RecommendationPayload {
    candidates: Vec<CandidatePayload>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    rationale: String,
}

#[derive(Debug, Deserialize)]
struct CandidatePayload {
    #[serde(alias = "framework", alias = "id")]
    framework_id: String,
    score: f64,
}

/// Framework recommendation via the service, with a keyword classifier
/// fallback. The current fit is always measured deterministically.
pub struct FrameworkAnalyzer {
    provider: Arc<dyn AIProvider>,
    catalog: FrameworkCatalog,
    pinned: Option<FrameworkId>,
    parser: StructuredResponseParser,
    call_timeout: Duration,
    max_retries: u32,
}

impl FrameworkAnalyzer {
    pub fn new(provider: Arc<dyn AIProvider>, catalog: FrameworkCatalog) -> Self {
        Self {
            provider,
            catalog,
            pinned: None,
            parser: StructuredResponseParser::new(),
            call_timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_RETRIES,
        }
    }

    /// Loads the catalog and pinned framework from configuration.
    pub fn from_config(
        provider: Arc<dyn AIProvider>,
        config: &RefinementConfig,
    ) -> Result<Self, ConfigValidationError> {
        let catalog = config.load_catalog()?;
        let pinned = config.pinned_framework(&catalog)?;
        let mut analyzer = Self::new(provider, catalog)
            .with_timeout(config.call_timeout())
            .with_retries(config.scoring_retries);
        analyzer.pinned = pinned;
        Ok(analyzer)
    }

    /// Skips recommendation and always uses `framework`.
    pub fn with_pinned(mut self, framework: FrameworkId) -> Self {
        self.pinned = Some(framework);
        self
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn catalog(&self) -> &FrameworkCatalog {
        &self.catalog
    }

    async fn recommend_with_service(
        &self,
        session_id: SessionId,
        document: &Document,
        context: &RequestContext,
    ) -> Result<(FrameworkId, f64, String, Vec<FrameworkCandidate>), ServiceCallError> {
        let request = CompletionRequest::new(RequestMetadata::new(
            session_id,
            0,
            RequestPurpose::FrameworkAnalysis,
        ))
        .with_system_prompt(SYSTEM_PROMPT)
        .with_message(MessageRole::User, self.build_prompt(document, context))
        .with_temperature(0.0);

        let response = complete_within(self.provider.as_ref(), request, self.call_timeout).await?;
        let schema = ResponseSchema::new()
            .require("candidates")
            .default_value("rationale", json!(""));
        let payload: RecommendationPayload = self.parser.parse_with_schema(&response.content, &schema)?.into_typed()?;

        let mut candidates: Vec<FrameworkCandidate> = payload
            .candidates
            .into_iter()
            .filter_map(|c| {
                let id = FrameworkId::new(c.framework_id).ok()?;
                self.catalog.contains(&id).then(|| FrameworkCandidate {
                    framework_id: id,
                    score: Score::new(c.score),
                })
            })
            .collect();
        rank_candidates(&mut candidates, &self.catalog);

        let Some(best) = candidates.first() else {
            return Err(ParseFailure::SchemaViolation("no candidate names a known framework".to_string()).into());
        };
        let recommended = best.framework_id.clone();
        let confidence = payload
            .confidence
            .unwrap_or_else(|| best.score.value())
            .clamp(0.0, 100.0);
        Ok((recommended, confidence, payload.rationale, candidates))
    }

    fn build_prompt(&self, document: &Document, context: &RequestContext) -> String {
        let frameworks: Vec<String> = self
            .catalog
            .frameworks()
            .iter()
            .map(|f| format!("- {}: {} (steps: {})", f.id, f.description, f.step_names().join(", ")))
            .collect();
        let headlines: Vec<String> = document
            .slides
            .iter()
            .map(|s| format!("- [{}] {}", s.slide_type.as_str(), s.headline().unwrap_or("")))
            .collect();
        format!(
            "Request: {}\nAudience: {}\nIndustry: {}\n\nFrameworks:\n{}\n\nDeck \"{}\":\n{}",
            context.intent,
            context.audience.as_str(),
            context.industry.as_deref().unwrap_or("unspecified"),
            frameworks.join("\n"),
            document.title,
            headlines.join("\n")
        )
    }

    /// Candidates from the document's fit to every framework, best first.
    fn fit_candidates(&self, document: &Document) -> Vec<FrameworkCandidate> {
        let mut candidates: Vec<FrameworkCandidate> = self
            .catalog
            .frameworks()
            .iter()
            .map(|f| FrameworkCandidate {
                framework_id: f.id.clone(),
                score: FitAssessor::assess(f, document).score,
            })
            .collect();
        rank_candidates(&mut candidates, &self.catalog);
        candidates
    }

    fn analysis(
        &self,
        document: &Document,
        recommended: FrameworkId,
        confidence: f64,
        rationale: String,
        candidates: Vec<FrameworkCandidate>,
        source: AssessmentSource,
    ) -> FrameworkAnalysis {
        let framework = self.catalog.get(&recommended).unwrap_or_else(|| self.catalog.first());
        FrameworkAnalysis {
            recommended: framework.id.clone(),
            confidence,
            rationale,
            current_fit: FitAssessor::assess(framework, document),
            candidates,
            source,
        }
    }
}

#[async_trait]
impl FrameworkRecommender for FrameworkAnalyzer {
    async fn recommend(
        &self,
        session_id: SessionId,
        document: &Document,
        context: &RequestContext,
    ) -> FrameworkAnalysis {
        if let Some(pinned) = &self.pinned {
            tracing::debug!(session_id = %session_id, framework = %pinned, "using pinned framework");
            return self.analysis(
                document,
                pinned.clone(),
                100.0,
                "framework pinned by configuration".to_string(),
                self.fit_candidates(document),
                AssessmentSource::RuleBased,
            );
        }

        let attempts = self.max_retries + 1;
        for attempt in 1..=attempts {
            match self.recommend_with_service(session_id, document, context).await {
                Ok((recommended, confidence, rationale, candidates)) => {
                    tracing::info!(
                        session_id = %session_id,
                        framework = %recommended,
                        confidence,
                        "framework recommended"
                    );
                    return self.analysis(
                        document,
                        recommended,
                        confidence,
                        rationale,
                        candidates,
                        AssessmentSource::Service,
                    );
                }
                Err(err) if err.is_retryable() && attempt < attempts => {
                    tracing::debug!(session_id = %session_id, attempt, error = %err, "framework analysis failed, retrying");
                }
                Err(err) => {
                    tracing::warn!(
                        session_id = %session_id,
                        attempt,
                        error = %err,
                        "framework service unusable, falling back to keyword classifier"
                    );
                    break;
                }
            }
        }

        let classification = RuleBasedClassifier::classify(context, &self.catalog);
        self.analysis(
            document,
            classification.framework_id,
            classification.confidence,
            classification.rationale,
            self.fit_candidates(document),
            AssessmentSource::RuleBased,
        )
    }
}
