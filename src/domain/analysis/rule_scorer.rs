//! Rule-based scoring.
//!
//! The deterministic fallback for the scoring service. Two independent passes
//! over the same [`ContentProfile`]: one computes dimension scores from
//! weighted sub-assessments, the other lists issues. Neither pass reads the
//! other's output.

use std::collections::HashMap;

use super::profile::{ContentProfile, HEADLINE_WORDS, MAX_BULLETS_PER_SLIDE};
use super::result::ScoringResult;
use crate::domain::foundation::IssueId;
use crate::domain::framework::{FitAssessor, Framework, FrameworkFit};
use crate::domain::presentation::{Audience, Document};
use crate::domain::scoring::{
    AssessmentSource, Dimension, DimensionScores, DimensionWeights, Issue, IssueType, Severity,
};

/// Jargon penalty per hit, by audience.
fn jargon_penalty(audience: Audience) -> f64 {
    match audience {
        Audience::Technical => 0.0,
        Audience::Executive | Audience::Investor | Audience::Customer => 12.0,
        Audience::Internal | Audience::General => 6.0,
    }
}

fn capped(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Deterministic scorer. Same document in, same result out.
pub struct RuleBasedScorer;

impl RuleBasedScorer {
    pub fn score(
        document: &Document,
        framework: Option<&Framework>,
        weights: &DimensionWeights,
    ) -> ScoringResult {
        let profile = ContentProfile::extract(document);
        let fit = framework.map(|f| FitAssessor::assess(f, document));
        let audience = document.metadata.audience;

        let scores = Self::dimension_scores(&profile, fit.as_ref(), audience);
        let issues = Self::detect_issues(&profile, fit.as_ref(), audience);

        ScoringResult::new(scores, issues, weights, AssessmentSource::RuleBased)
    }

    /// Scoring pass.
    pub fn dimension_scores(
        profile: &ContentProfile,
        fit: Option<&FrameworkFit>,
        audience: Audience,
    ) -> DimensionScores {
        let mut scores = DimensionScores::uniform(0.0);
        for dimension in Dimension::ALL {
            let parts = match dimension {
                Dimension::FrameworkAdherence => {
                    // without a framework every part is neutral
                    fit.map(FrameworkFit::sub_assessments).unwrap_or_default()
                }
                Dimension::AudienceReadiness => Self::audience_parts(profile, audience),
                Dimension::Clarity => Self::clarity_parts(profile),
                Dimension::BusinessImpact => Self::impact_parts(profile),
            };
            scores.set(dimension, dimension.combine(&parts));
        }
        scores
    }

    fn audience_parts(profile: &ContentProfile, audience: Audience) -> HashMap<String, f64> {
        let language = 100.0 - profile.total_jargon() as f64 * jargon_penalty(audience);
        let value_clarity = 40.0 + 20.0 * profile.value_hits as f64;
        let actionability = if profile.has_cta_slide {
            100.0
        } else if profile.next_step_hits > 0 {
            70.0
        } else {
            30.0
        };
        HashMap::from([
            ("language_appropriateness".to_string(), capped(language)),
            ("value_clarity".to_string(), capped(value_clarity)),
            ("actionability".to_string(), actionability),
        ])
    }

    fn clarity_parts(profile: &ContentProfile) -> HashMap<String, f64> {
        let slides = profile.slide_count().max(1) as f64;
        let excess = (profile.average_bullets() - 5.0).max(0.0);
        let focus = 100.0 - 15.0 * excess;
        let concision = match profile.total_bullets() {
            0 => 100.0,
            total => 100.0 * (total - profile.total_long_bullets()) as f64 / total as f64,
        };
        let headlines = 100.0 * profile.good_headlines() as f64 / slides;
        HashMap::from([
            ("message_focus".to_string(), capped(focus)),
            ("concision".to_string(), capped(concision)),
            ("headline_quality".to_string(), capped(headlines)),
        ])
    }

    fn impact_parts(profile: &ContentProfile) -> HashMap<String, f64> {
        let evidence = 25.0 * profile.total_numeric_points() as f64;
        let outcomes = 20.0 + 20.0 * profile.outcome_hits as f64;
        let cta = if profile.has_cta_slide {
            100.0
        } else if profile.next_step_hits > 0 {
            60.0
        } else {
            20.0
        };
        HashMap::from([
            ("quantified_evidence".to_string(), capped(evidence)),
            ("outcome_language".to_string(), capped(outcomes)),
            ("call_to_action".to_string(), cta),
        ])
    }

    /// Issue pass.
    pub fn detect_issues(
        profile: &ContentProfile,
        fit: Option<&FrameworkFit>,
        audience: Audience,
    ) -> Vec<Issue> {
        let mut found: Vec<Issue> = Vec::new();
        let next = |found: &Vec<Issue>, issue_type, severity, description: String, fix: &str| {
            Issue::new(IssueId::sequential(found.len()), issue_type, severity, description).with_fix(fix)
        };

        for slide in &profile.slides {
            if slide.is_empty {
                let issue = next(
                    &found,
                    IssueType::Structural,
                    Severity::Critical,
                    format!("Slide {} has no visible content", slide.id),
                    "Fill the slide with content that serves its role or merge it into a neighbour",
                );
                found.push(issue.on_slide(slide.id.clone()));
                continue;
            }
            if !slide.missing_fields.is_empty() {
                let names: Vec<&str> = slide.missing_fields.iter().map(|f| f.as_str()).collect();
                let issue = next(
                    &found,
                    IssueType::MissingContent,
                    Severity::Important,
                    format!("Slide {} is missing required fields: {}", slide.id, names.join(", ")),
                    "Provide every field the slide layout requires",
                );
                found.push(issue.on_slide(slide.id.clone()));
            }
            if slide.bullet_count > MAX_BULLETS_PER_SLIDE {
                let issue = next(
                    &found,
                    IssueType::Clarity,
                    Severity::Important,
                    format!("Slide {} carries {} bullets", slide.id, slide.bullet_count),
                    "Cut to the strongest five points",
                );
                found.push(issue.on_slide(slide.id.clone()));
            }
            if slide.long_bullets > 0 {
                let issue = next(
                    &found,
                    IssueType::Clarity,
                    Severity::Minor,
                    format!("Slide {} has {} wordy bullets", slide.id, slide.long_bullets),
                    "Shorten bullets to a single idea each",
                );
                found.push(issue.on_slide(slide.id.clone()));
            }
            if slide.headline_words < HEADLINE_WORDS.0 {
                let issue = next(
                    &found,
                    IssueType::Formatting,
                    Severity::Minor,
                    format!("Slide {} lacks a descriptive headline", slide.id),
                    "Write a headline that states the slide's takeaway",
                );
                found.push(issue.on_slide(slide.id.clone()));
            }
        }

        let total_jargon = profile.total_jargon();
        if jargon_penalty(audience) > 0.0 && total_jargon > 0 {
            let severity = if total_jargon >= 3 { Severity::Important } else { Severity::Minor };
            let mut issue = next(
                &found,
                IssueType::AudienceMismatch,
                severity,
                format!("{} jargon terms for a {} audience", total_jargon, audience.as_str()),
                "Replace jargon with plain business language",
            );
            for slide in profile.slides.iter().filter(|s| s.jargon_hits > 0) {
                issue = issue.on_slide(slide.id.clone());
            }
            found.push(issue);
        }

        if let Some(fit) = fit {
            let severity = if fit.step_coverage < 50.0 {
                Severity::Critical
            } else {
                Severity::Important
            };
            for step in &fit.missing_steps {
                let issue = next(
                    &found,
                    IssueType::FrameworkViolation,
                    severity,
                    format!("The '{}' step of {} is not covered", step, fit.framework_id),
                    "Add or rework a slide to cover the missing step",
                );
                found.push(issue);
            }
            if fit.matched_steps.len() > 1 && fit.sequence_order < 100.0 {
                let issue = next(
                    &found,
                    IssueType::Flow,
                    Severity::Important,
                    format!("Slides do not follow the {} step order", fit.framework_id),
                    "Reorder content so the narrative follows the framework",
                );
                found.push(issue.framework_related(true));
            }
        }

        if profile.total_numeric_points() == 0 {
            let issue = next(
                &found,
                IssueType::Evidence,
                Severity::Important,
                "No quantified evidence anywhere in the deck".to_string(),
                "Support key claims with metrics",
            );
            found.push(issue);
        }

        if !profile.has_cta_slide && profile.next_step_hits == 0 {
            let issue = next(
                &found,
                IssueType::Actionability,
                Severity::Important,
                "The deck never asks the audience to do anything".to_string(),
                "End with a clear call to action",
            );
            found.push(issue);
        }

        for (headline, ids) in &profile.duplicate_headlines {
            let mut issue = next(
                &found,
                IssueType::Redundancy,
                Severity::Minor,
                format!("Headline '{}' is used on {} slides", headline, ids.len()),
                "Give each slide a distinct takeaway",
            );
            for id in ids {
                issue = issue.on_slide(id.clone());
            }
            found.push(issue);
        }

        found
    }
}
