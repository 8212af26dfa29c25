//! ValidationAgent - Scores documents through the scoring service.
//!
//! Service path: prompt, bounded call, structured parse, schema check.
//! Transient failures (timeouts, retryable provider errors, malformed
//! payloads) are retried with identical inputs up to the configured bound;
//! after that, or on a permanent failure, the deterministic
//! [`RuleBasedScorer`] produces a result of the same shape.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{complete_within, document_json, ServiceCallError};
use crate::config::{RefinementConfig, ScoringConfig};
use crate::domain::analysis::{RuleBasedScorer, ScoringResult};
use crate::domain::foundation::{IssueId, Score, SlideId};
use crate::domain::framework::Framework;
use crate::domain::presentation::Document;
use crate::domain::scoring::{
    AssessmentSource, Dimension, DimensionScores, DimensionWeights, Issue, IssueType, Severity,
};
use crate::domain::structured::{ParseFailure, ResponseSchema, StructuredResponseParser};
use crate::ports::{
    AIProvider, CompletionRequest, DocumentScorer, MessageRole, RequestMetadata, RequestPurpose,
    ScoringRequest,
};

const SYSTEM_PROMPT: &str = "You are a presentation quality reviewer for business audiences. \
Score the deck on four dimensions from 0 to 100: framework_adherence, audience_readiness, \
clarity, business_impact. Optionally break each dimension into its sub-assessments. \
List concrete issues separately from the scores. Respond with a single JSON object:\n\
{\"dimension_scores\": {\"framework_adherence\": 0, \"audience_readiness\": 0, \"clarity\": 0, \"business_impact\": 0},\n \
\"sub_assessments\": {\"clarity\": {\"message_focus\": 0, \"concision\": 0, \"headline_quality\": 0}},\n \
\"issues\": [{\"type\": \"clarity\", \"severity\": \"important\", \"description\": \"...\", \
\"suggested_fix\": \"...\", \"confidence\": 80, \"affected_slides\": [\"slide-id\"], \"framework_related\": false}]}\n\
Issue types: structural, framework_violation, audience_mismatch, clarity, evidence, flow, \
missing_content, actionability, redundancy, formatting. Severities: critical, important, minor.";

const DEFAULT_RETRIES: u32 = 2;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ScoringPayload {
    dimension_scores: HashMap<String, Value>,
    #[serde(default)]
    sub_assessments: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    issues: Vec<IssuePayload>,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    #[serde(rename = "type", alias = "issue_type")]
    issue_type: String,
    severity: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    suggested_fix: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    affected_slides: Vec<String>,
    #[serde(default)]
    framework_related: bool,
}

/// Scores documents via the scoring service, falling back to rules.
pub struct ValidationAgent {
    provider: Arc<dyn AIProvider>,
    parser: StructuredResponseParser,
    schema: ResponseSchema,
    weights: DimensionWeights,
    call_timeout: Duration,
    max_retries: u32,
}

impl ValidationAgent {
    pub fn new(provider: Arc<dyn AIProvider>, weights: DimensionWeights) -> Self {
        Self {
            provider,
            parser: StructuredResponseParser::new(),
            schema: scoring_schema(),
            weights,
            call_timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_RETRIES,
        }
    }

    pub fn from_config(
        provider: Arc<dyn AIProvider>,
        scoring: &ScoringConfig,
        refinement: &RefinementConfig,
    ) -> Self {
        Self::new(provider, scoring.weights)
            .with_timeout(refinement.call_timeout())
            .with_retries(refinement.scoring_retries)
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Retries after the first attempt before falling back.
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_parser(mut self, parser: StructuredResponseParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn weights(&self) -> &DimensionWeights {
        &self.weights
    }

    async fn score_with_service(&self, request: &ScoringRequest<'_>) -> Result<ScoringResult, ServiceCallError> {
        let completion = CompletionRequest::new(RequestMetadata::new(
            request.session_id,
            request.round,
            RequestPurpose::Scoring,
        ))
        .with_system_prompt(SYSTEM_PROMPT)
        .with_message(MessageRole::User, build_prompt(request.document, request.framework))
        .with_temperature(0.0);

        let response = complete_within(self.provider.as_ref(), completion, self.call_timeout).await?;
        let parsed = self.parser.parse_with_schema(&response.content, &self.schema)?;
        let payload: ScoringPayload = parsed.into_typed()?;
        Ok(self.to_result(payload, request.document)?)
    }

    fn to_result(&self, payload: ScoringPayload, document: &Document) -> Result<ScoringResult, ParseFailure> {
        let scores = dimension_scores(&payload)?;
        let issues = payload
            .issues
            .into_iter()
            .filter_map(|raw| to_issue(raw, document))
            .enumerate()
            .map(|(index, issue)| Issue {
                id: IssueId::sequential(index),
                ..issue
            })
            .collect();
        Ok(ScoringResult::new(scores, issues, &self.weights, AssessmentSource::Service))
    }
}

#[async_trait]
impl DocumentScorer for ValidationAgent {
    async fn score(&self, request: ScoringRequest<'_>) -> ScoringResult {
        let attempts = self.max_retries + 1;
        for attempt in 1..=attempts {
            match self.score_with_service(&request).await {
                Ok(result) => {
                    tracing::debug!(
                        session_id = %request.session_id,
                        round = request.round,
                        attempt,
                        score = %result.overall,
                        "scored by service"
                    );
                    return result;
                }
                Err(err) if err.is_retryable() && attempt < attempts => {
                    tracing::debug!(
                        session_id = %request.session_id,
                        round = request.round,
                        attempt,
                        error = %err,
                        "scoring attempt failed, retrying"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        session_id = %request.session_id,
                        round = request.round,
                        attempt,
                        error = %err,
                        "scoring service unusable, falling back to rule-based scoring"
                    );
                    break;
                }
            }
        }
        RuleBasedScorer::score(request.document, request.framework, &self.weights)
    }
}

fn scoring_schema() -> ResponseSchema {
    ResponseSchema::new()
        .require("dimension_scores")
        .default_value("issues", json!([]))
        .default_in_each("issues", "confidence", json!(80.0))
        .default_in_each("issues", "severity", json!("minor"))
}

fn build_prompt(document: &Document, framework: Option<&Framework>) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "Audience: {}\n",
        document.metadata.audience.as_str()
    ));
    if let Some(framework) = framework {
        prompt.push_str(&format!(
            "Framework: {} ({})\nExpected steps, in order: {}\nRecommended slide count: {}-{}\n",
            framework.name,
            framework.id,
            framework.step_names().join(" -> "),
            framework.slide_range.min,
            framework.slide_range.max
        ));
    }
    prompt.push_str("\nDeck JSON:\n");
    prompt.push_str(&document_json(document));
    prompt
}

/// Every dimension must be present, numeric and within 0-100. Sub-assessment
/// breakdowns replace the headline value when given; missing entries count
/// as neutral.
fn dimension_scores(payload: &ScoringPayload) -> Result<DimensionScores, ParseFailure> {
    let mut scores = DimensionScores::uniform(0.0);
    for dimension in Dimension::ALL {
        let raw = payload
            .dimension_scores
            .iter()
            .find(|(key, _)| Dimension::from_label(key) == Some(dimension))
            .map(|(_, value)| value)
            .ok_or_else(|| ParseFailure::MissingField(format!("dimension_scores.{}", dimension.as_str())))?;

        let value = Score::try_new(raw.as_f64().unwrap_or(f64::NAN)).map_err(|_| {
            ParseFailure::SchemaViolation(format!(
                "{} must be a number within 0-100, got {}",
                dimension.as_str(),
                raw
            ))
        })?;

        let breakdown = payload
            .sub_assessments
            .iter()
            .find(|(key, _)| Dimension::from_label(key) == Some(dimension))
            .map(|(_, parts)| parts);
        let score = match breakdown {
            Some(parts) if !parts.is_empty() => dimension.combine(parts),
            _ => value,
        };
        scores.set(dimension, score);
    }
    Ok(scores)
}

/// Unknown types and severities are dropped; slide references are kept only
/// when they name slides of the document.
fn to_issue(raw: IssuePayload, document: &Document) -> Option<Issue> {
    let Some(issue_type) = IssueType::from_label(&raw.issue_type) else {
        tracing::debug!(issue_type = %raw.issue_type, "dropping issue of unknown type");
        return None;
    };
    let severity = Severity::from_label(&raw.severity)?;

    let mut issue = Issue::new(IssueId::sequential(0), issue_type, severity, raw.description)
        .with_fix(raw.suggested_fix)
        .with_confidence(raw.confidence.unwrap_or(80.0))
        .framework_related(raw.framework_related || issue_type == IssueType::FrameworkViolation);
    for id in raw.affected_slides {
        if let Ok(slide_id) = SlideId::new(id) {
            if document.slide(&slide_id).is_some() && !issue.affects(&slide_id) {
                issue = issue.on_slide(slide_id);
            }
        }
    }
    Some(issue)
}
