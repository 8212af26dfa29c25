//! RefinePresentationHandler - Drives the score, brief, regenerate, rescore loop.
//!
//! Flow:
//! 1. Framework analysis and initial scoring run concurrently
//! 2. Each round checks the stopping policy, builds a brief from the current
//!    best scoring, regenerates, rescores and either adopts the candidate or
//!    stops with the best document kept
//! 3. The sealed session becomes a [`SessionResult`]
//!
//! Cancellation is checked between rounds only.

use std::sync::Arc;

use super::cancellation::CancellationToken;
use super::error::{ConfigurationError, RefinePresentationError};
use crate::adapters::ai::{AnthropicProvider, FailoverAIProvider};
use crate::application::services::{ContentRegenerator, FrameworkAnalyzer, ValidationAgent};
use crate::config::{AiConfig, AppConfig, RefinementConfig, ValidationError as ConfigValidationError};
use crate::domain::analysis::{RuleBasedScorer, ScoringResult};
use crate::domain::feedback::{ConversionInput, FeedbackConverter, RoundLesson};
use crate::domain::foundation::Timestamp;
use crate::domain::framework::{FitAssessor, Framework, FrameworkCatalog, FrameworkId, RequestContext};
use crate::domain::presentation::Document;
use crate::domain::progress::{ProgressStage, ProgressTracker};
use crate::domain::refinement::{
    CandidateVerdict, RefinementPhase, RefinementSession, RoundRecord, SessionResult, StopReason,
    StoppingPolicy,
};
use crate::domain::regeneration::PreservationPlan;
use crate::domain::scoring::{AssessmentSource, DimensionWeights};
use crate::ports::{
    AIProvider, DocumentRegenerator, DocumentScorer, FrameworkRecommender, NoopProgressPublisher,
    ProgressPublisher, RegenerationRequest, ScoringRequest,
};

/// Command to refine one presentation.
#[derive(Debug, Clone)]
pub struct RefinePresentationCommand {
    pub document: Document,
    /// What the deck is for; derived from the document when absent.
    pub context: Option<RequestContext>,
}

impl RefinePresentationCommand {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            context: None,
        }
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }
}

enum RoundEnd {
    Continue,
    Stop(StopReason),
}

/// Handler for refinement sessions.
pub struct RefinePresentationHandler {
    scorer: Arc<dyn DocumentScorer>,
    recommender: Arc<dyn FrameworkRecommender>,
    regenerator: Arc<dyn DocumentRegenerator>,
    publisher: Arc<dyn ProgressPublisher>,
    converter: FeedbackConverter,
    catalog: FrameworkCatalog,
    pinned: Option<FrameworkId>,
    policy: StoppingPolicy,
    weights: DimensionWeights,
    continue_after_failed_round: bool,
}

impl RefinePresentationHandler {
    /// Validates `config` and loads its catalog and curriculum.
    pub fn new(
        scorer: Arc<dyn DocumentScorer>,
        recommender: Arc<dyn FrameworkRecommender>,
        regenerator: Arc<dyn DocumentRegenerator>,
        config: &RefinementConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let policy = config.stopping_policy();
        let catalog = config.load_catalog()?;
        let pinned = config.pinned_framework(&catalog)?;

        Ok(Self {
            scorer,
            recommender,
            regenerator,
            publisher: Arc::new(NoopProgressPublisher),
            converter: FeedbackConverter::new(config.load_curriculum()?),
            catalog,
            pinned,
            policy,
            weights: DimensionWeights::default(),
            continue_after_failed_round: config.continue_after_failed_round,
        })
    }

    /// Wires the Anthropic-backed services from application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let scoring_provider = build_provider(&config.ai, &config.ai.scoring_model)?;
        let generation_provider = build_provider(&config.ai, &config.ai.generation_model)?;

        let scorer = ValidationAgent::from_config(
            scoring_provider.clone(),
            &config.scoring,
            &config.refinement,
        );
        let recommender = FrameworkAnalyzer::from_config(scoring_provider, &config.refinement)?;
        let regenerator = ContentRegenerator::from_config(generation_provider, &config.refinement);

        Self::new(
            Arc::new(scorer),
            Arc::new(recommender),
            Arc::new(regenerator),
            &config.refinement,
        )?
        .with_weights(config.scoring.weights)
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn ProgressPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Weights for local rescoring of a rule-based baseline. Must match the
    /// weights of the injected scorer; defaults to [`DimensionWeights::default`].
    pub fn with_weights(mut self, weights: DimensionWeights) -> Result<Self, ConfigurationError> {
        weights
            .validate()
            .map_err(|e| ConfigValidationError::InvalidWeights(e.to_string()))?;
        self.weights = weights;
        Ok(self)
    }

    pub fn policy(&self) -> &StoppingPolicy {
        &self.policy
    }

    /// Runs a session to completion, cancellation or round cap.
    pub async fn handle(
        &self,
        cmd: RefinePresentationCommand,
        cancel: &CancellationToken,
    ) -> Result<SessionResult, RefinePresentationError> {
        cmd.document
            .validate()
            .map_err(ConfigurationError::InvalidDocument)?;

        let now = Timestamp::now();
        let mut session = RefinementSession::new(
            cmd.document.clone(),
            self.policy.target,
            self.policy.max_rounds,
            now,
        );
        let mut tracker =
            ProgressTracker::new(session.id(), self.policy.max_rounds, self.policy.target, now);
        self.publish(&tracker);

        tracing::info!(
            session_id = %session.id(),
            target = %self.policy.target,
            max_rounds = self.policy.max_rounds,
            slides = cmd.document.slide_count(),
            "refinement session started"
        );

        let context = cmd
            .context
            .unwrap_or_else(|| RequestContext::from_document(&cmd.document));

        match self.drive(&mut session, &mut tracker, &context, cancel).await {
            Ok(result) => {
                tracing::info!(session_id = %result.session_id, "{}", result.summary());
                Ok(result)
            }
            Err(err) => {
                tracing::error!(session_id = %session.id(), error = %err, "refinement session failed");
                let _ = session.advance(RefinementPhase::Failed);
                let _ = tracker.fail(err.to_string());
                self.publish(&tracker);
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        session: &mut RefinementSession,
        tracker: &mut ProgressTracker,
        context: &RequestContext,
        cancel: &CancellationToken,
    ) -> Result<SessionResult, RefinePresentationError> {
        let session_id = session.id();
        let document = session.initial_document().clone();

        session.advance(RefinementPhase::FrameworkAnalysis)?;
        session.advance(RefinementPhase::InitialScoring)?;
        let pinned = self.pinned.as_ref().and_then(|id| self.catalog.get(id));
        let (analysis, baseline) = futures::join!(
            self.recommender.recommend(session_id, &document, context),
            self.scorer.score(ScoringRequest {
                session_id,
                round: 0,
                document: &document,
                framework: pinned,
            })
        );

        // a pinned framework wins over the recommendation for every round
        let framework = pinned.or_else(|| self.catalog.get(&analysis.recommended));
        let mut current = self.align_baseline(baseline, &document, pinned, framework);
        session.set_baseline(current.overall)?;
        tracker.record_score(current.overall);
        self.publish(tracker);

        tracing::info!(
            session_id = %session_id,
            framework = framework.map_or(analysis.recommended.as_str(), |f| f.id.as_str()),
            framework_source = ?analysis.source,
            score = %current.overall,
            scoring_source = ?current.source,
            "initial assessment complete"
        );

        let mut round = 1;
        let reason = loop {
            if cancel.is_cancelled() {
                tracing::info!(session_id = %session_id, round, "refinement cancelled");
                break StopReason::Cancelled;
            }
            if let Some(reason) = self.policy.check_before_round(round, &session.score_history()) {
                break reason;
            }
            match self
                .run_round(session, tracker, &mut current, framework, round)
                .await?
            {
                RoundEnd::Continue => round += 1,
                RoundEnd::Stop(reason) => break reason,
            }
        };

        let now = Timestamp::now();
        session.advance(RefinementPhase::Completed)?;
        if reason == StopReason::Cancelled {
            session.cancel(now)?;
        } else {
            session.complete(reason, now)?;
        }
        tracker.complete(format!("stopped: {}", reason))?;
        self.publish(tracker);

        Ok(SessionResult::from_session(session, &current, Some(analysis), now))
    }

    async fn run_round(
        &self,
        session: &mut RefinementSession,
        tracker: &mut ProgressTracker,
        current: &mut ScoringResult,
        framework: Option<&Framework>,
        round: u32,
    ) -> Result<RoundEnd, RefinePresentationError> {
        let session_id = session.id();
        let started_at = Timestamp::now();
        let start_score = session.best_score();
        let document = session.best_document().clone();

        tracker.start_round(round, started_at)?;
        session.advance(RefinementPhase::Analyzing)?;
        self.publish(tracker);

        let plan = PreservationPlan::from_issues(&document, &current.issues);
        let lessons: Vec<RoundLesson> = session
            .rounds()
            .iter()
            .filter_map(|r| r.lesson.clone())
            .collect();
        let fit = framework.map(|f| FitAssessor::assess(f, &document));
        let brief = self.converter.convert(&ConversionInput {
            issues: &current.issues,
            scores: &current.scores,
            overall: current.overall,
            target: self.policy.target,
            round,
            history: &lessons,
            plan: &plan,
            framework_fit: fit.as_ref(),
        });

        tracker.enter(ProgressStage::Generating, format!("regenerating round {}", round))?;
        session.advance(RefinementPhase::Regenerating)?;
        self.publish(tracker);

        let outcome = self
            .regenerator
            .regenerate(RegenerationRequest {
                session_id,
                round,
                document: &document,
                brief: &brief,
                plan: &plan,
                issues: &current.issues,
            })
            .await;

        if !outcome.success {
            let reason = outcome
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "regeneration failed".to_string());
            let now = Timestamp::now();
            let record =
                RoundRecord::failed(round, start_score, &current.issues, reason, started_at, now);
            session.advance(RefinementPhase::Deciding)?;
            tracker.finish_round(now);

            if self.continue_after_failed_round {
                tracing::warn!(session_id = %session_id, round, "round failed, continuing");
                session.append_round(record)?;
                return Ok(RoundEnd::Continue);
            }
            tracing::warn!(session_id = %session_id, round, "round failed, stopping");
            session.append_round(record.with_stop_reason(StopReason::RegenerationFailed))?;
            return Ok(RoundEnd::Stop(StopReason::RegenerationFailed));
        }

        if outcome.document.same_content(&document) {
            let now = Timestamp::now();
            let record = RoundRecord::scored(
                round,
                start_score,
                start_score,
                Vec::new(),
                &current.issues,
                &current.issues,
                Vec::new(),
                started_at,
                now,
            )
            .rejected()
            .with_stop_reason(StopReason::NoChanges);
            session.advance(RefinementPhase::Deciding)?;
            session.append_round(record)?;
            tracker.finish_round(now);
            tracing::info!(session_id = %session_id, round, "regeneration changed nothing");
            return Ok(RoundEnd::Stop(StopReason::NoChanges));
        }

        tracker.enter(ProgressStage::Validating, format!("scoring round {}", round))?;
        session.advance(RefinementPhase::Scoring)?;
        self.publish(tracker);

        let candidate = self
            .scorer
            .score(ScoringRequest {
                session_id,
                round,
                document: &outcome.document,
                framework,
            })
            .await;

        session.advance(RefinementPhase::Deciding)?;
        let now = Timestamp::now();
        let record = RoundRecord::scored(
            round,
            start_score,
            candidate.overall,
            candidate.scores.deltas_from(&current.scores),
            &current.issues,
            &candidate.issues,
            outcome.changes,
            started_at,
            now,
        );

        match self.policy.judge_candidate(round, start_score, candidate.overall) {
            CandidateVerdict::Adopt { improvement } => {
                tracker.enter(ProgressStage::Applying, format!("applying round {}", round))?;
                session.adopt(outcome.document, candidate.overall)?;
                session.append_round(record)?;
                tracker.record_score(candidate.overall);
                tracker.finish_round(now);
                self.publish(tracker);
                tracing::info!(
                    session_id = %session_id,
                    round,
                    score = %candidate.overall,
                    improvement,
                    "round adopted"
                );
                *current = candidate;
                Ok(RoundEnd::Continue)
            }
            CandidateVerdict::Reject { reason, improvement } => {
                session.append_round(record.rejected().with_stop_reason(reason))?;
                tracker.finish_round(now);
                tracing::info!(
                    session_id = %session_id,
                    round,
                    score = %candidate.overall,
                    improvement,
                    reason = %reason,
                    "candidate rejected, keeping best document"
                );
                Ok(RoundEnd::Stop(reason))
            }
        }
    }

    /// A rule-based baseline scored without the recommended framework is
    /// rescored locally against it, so round 1 compares like with like.
    fn align_baseline(
        &self,
        baseline: ScoringResult,
        document: &Document,
        scored_with: Option<&Framework>,
        recommended: Option<&Framework>,
    ) -> ScoringResult {
        let same_framework = match (scored_with, recommended) {
            (Some(a), Some(b)) => a.id == b.id,
            (None, None) => true,
            _ => false,
        };
        if baseline.source == AssessmentSource::RuleBased && !same_framework {
            RuleBasedScorer::score(document, recommended, &self.weights)
        } else {
            baseline
        }
    }

    fn publish(&self, tracker: &ProgressTracker) {
        self.publisher.publish(&tracker.snapshot(Timestamp::now()));
    }
}

fn build_provider(ai: &AiConfig, model: &str) -> Result<Arc<dyn AIProvider>, ConfigurationError> {
    let primary_config = ai
        .primary(model)
        .ok_or(ConfigValidationError::MissingRequired("ANTHROPIC_API_KEY"))?;
    let primary: Arc<dyn AIProvider> = Arc::new(AnthropicProvider::new(primary_config)?);

    match ai.fallback(model) {
        Some(fallback_config) => {
            let fallback = AnthropicProvider::new(fallback_config)?;
            Ok(Arc::new(FailoverAIProvider::new(primary).with_fallback(Arc::new(fallback))))
        }
        None => Ok(primary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SlideId;
    use crate::domain::presentation::{Slide, SlideContent, SlideLayout, SlideType};
    use crate::domain::regeneration::RegenerationOutcome;
    use crate::domain::scoring::DimensionScores;
    use async_trait::async_trait;

    struct StubScorer;

    #[async_trait]
    impl DocumentScorer for StubScorer {
        async fn score(&self, request: ScoringRequest<'_>) -> ScoringResult {
            RuleBasedScorer::score(request.document, request.framework, &DimensionWeights::default())
        }
    }

    struct StubRecommender;

    #[async_trait]
    impl FrameworkRecommender for StubRecommender {
        async fn recommend(
            &self,
            _session_id: crate::domain::foundation::SessionId,
            document: &Document,
            context: &RequestContext,
        ) -> crate::domain::framework::FrameworkAnalysis {
            let catalog = FrameworkCatalog::builtin();
            let classification = crate::domain::framework::RuleBasedClassifier::classify(context, catalog);
            let framework = catalog
                .get(&classification.framework_id)
                .unwrap_or_else(|| catalog.first());
            crate::domain::framework::FrameworkAnalysis {
                current_fit: FitAssessor::assess(framework, document),
                recommended: classification.framework_id,
                confidence: classification.confidence,
                rationale: classification.rationale,
                candidates: Vec::new(),
                source: AssessmentSource::RuleBased,
            }
        }
    }

    struct StubRegenerator;

    #[async_trait]
    impl DocumentRegenerator for StubRegenerator {
        async fn regenerate(&self, request: RegenerationRequest<'_>) -> RegenerationOutcome {
            RegenerationOutcome::skipped(request.document.clone())
        }
    }

    fn handler(config: &RefinementConfig) -> RefinePresentationHandler {
        RefinePresentationHandler::new(
            Arc::new(StubScorer),
            Arc::new(StubRecommender),
            Arc::new(StubRegenerator),
            config,
        )
        .unwrap()
    }

    fn deck() -> Document {
        Document::new(
            "Pilot",
            vec![
                Slide::new(
                    SlideId::new("s1").unwrap(),
                    SlideType::Title,
                    SlideLayout::Title,
                    SlideContent::titled("Pilot"),
                ),
                Slide::new(
                    SlideId::new("s2").unwrap(),
                    SlideType::Problem,
                    SlideLayout::Bullets,
                    SlideContent::titled("Stuff").with_bullets(["things"]),
                ),
            ],
        )
    }

    fn pyramid() -> &'static Framework {
        FrameworkCatalog::builtin()
            .get(&FrameworkId::new(FrameworkId::PYRAMID).unwrap())
            .unwrap()
    }

    #[test]
    fn new_applies_configured_policy() {
        let config = RefinementConfig {
            target_score: 90.0,
            max_rounds: 3,
            ..RefinementConfig::default()
        };
        let handler = handler(&config);

        assert_eq!(handler.policy().target.value(), 90.0);
        assert_eq!(handler.policy().max_rounds, 3);
    }

    #[test]
    fn new_resolves_pinned_framework() {
        let config = RefinementConfig {
            framework: Some("Pyramid".to_string()),
            ..RefinementConfig::default()
        };
        let handler = handler(&config);

        assert_eq!(handler.pinned.as_ref().map(|id| id.as_str()), Some("pyramid"));
    }

    #[test]
    fn rule_based_baseline_is_rescored_against_recommendation() {
        let handler = handler(&RefinementConfig::default());
        let doc = deck();
        let weights = DimensionWeights::default();
        let unanchored = RuleBasedScorer::score(&doc, None, &weights);

        let aligned = handler.align_baseline(unanchored, &doc, None, Some(pyramid()));

        assert_eq!(aligned, RuleBasedScorer::score(&doc, Some(pyramid()), &weights));
    }

    #[test]
    fn weights_not_summing_to_one_are_rejected() {
        let weights = DimensionWeights {
            framework_adherence: 0.5,
            audience_readiness: 0.5,
            clarity: 0.5,
            business_impact: 0.5,
        };

        let result = handler(&RefinementConfig::default()).with_weights(weights);

        assert!(matches!(
            result,
            Err(ConfigurationError::Config(ConfigValidationError::InvalidWeights(_)))
        ));
    }

    #[test]
    fn custom_weights_drive_baseline_rescoring() {
        let weights = DimensionWeights {
            framework_adherence: 0.7,
            audience_readiness: 0.1,
            clarity: 0.1,
            business_impact: 0.1,
        };
        let handler = handler(&RefinementConfig::default()).with_weights(weights).unwrap();
        let doc = deck();
        let unanchored = RuleBasedScorer::score(&doc, None, &DimensionWeights::default());

        let aligned = handler.align_baseline(unanchored, &doc, None, Some(pyramid()));

        assert_eq!(aligned, RuleBasedScorer::score(&doc, Some(pyramid()), &weights));
    }

    #[test]
    fn service_baseline_is_kept() {
        let handler = handler(&RefinementConfig::default());
        let doc = deck();
        let service = ScoringResult::new(
            DimensionScores::uniform(70.0),
            Vec::new(),
            &DimensionWeights::default(),
            AssessmentSource::Service,
        );

        let aligned = handler.align_baseline(service.clone(), &doc, None, Some(pyramid()));

        assert_eq!(aligned, service);
    }

    #[tokio::test]
    async fn skipped_regeneration_ends_with_no_changes() {
        let handler = handler(&RefinementConfig {
            target_score: 100.0,
            ..RefinementConfig::default()
        });
        let doc = deck();

        let result = handler
            .handle(RefinePresentationCommand::new(doc.clone()), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.final_document, doc);
        assert!(matches!(
            result.stop_reason,
            StopReason::NoChanges | StopReason::Converged
        ));
    }
}
