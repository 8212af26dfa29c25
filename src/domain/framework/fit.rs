//! Deterministic framework fit.
//!
//! Measures how closely a document follows a framework from step indicator
//! keywords and slide types alone. Used both to rank candidate frameworks
//! and to report the current fit of the recommended one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::catalog::{Framework, FrameworkId, FrameworkStep};
use crate::domain::foundation::Score;
use crate::domain::presentation::{Document, Slide};
use crate::domain::scoring::Dimension;

/// Points lost per slide outside the framework's slide range.
const SLIDE_COUNT_PENALTY: f64 = 15.0;

/// How well a document follows one framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkFit {
    pub framework_id: FrameworkId,
    /// Overall adherence, combined like the framework adherence dimension.
    pub score: Score,
    pub step_coverage: f64,
    pub sequence_order: f64,
    pub slide_count_fit: f64,
    pub matched_steps: Vec<String>,
    pub missing_steps: Vec<String>,
}

impl FrameworkFit {
    /// The sub-assessment values keyed the way the framework adherence
    /// dimension expects them.
    pub fn sub_assessments(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("step_coverage".to_string(), self.step_coverage),
            ("sequence_order".to_string(), self.sequence_order),
            ("slide_count_fit".to_string(), self.slide_count_fit),
        ])
    }

    pub fn is_complete(&self) -> bool {
        self.missing_steps.is_empty()
    }
}

/// Stateless calculator for framework fit.
pub struct FitAssessor;

impl FitAssessor {
    pub fn assess(framework: &Framework, document: &Document) -> FrameworkFit {
        let mut matched_steps = Vec::new();
        let mut missing_steps = Vec::new();
        let mut positions = Vec::new();

        for step in &framework.steps {
            match first_matching_slide(step, &document.slides) {
                Some(position) => {
                    matched_steps.push(step.name.clone());
                    positions.push(position);
                }
                None => missing_steps.push(step.name.clone()),
            }
        }

        let step_coverage = 100.0 * matched_steps.len() as f64 / framework.steps.len().max(1) as f64;
        let sequence_order = Self::sequence_order(&positions);
        let slide_count_fit = Self::slide_count_fit(framework, document.slide_count());

        let mut fit = FrameworkFit {
            framework_id: framework.id.clone(),
            score: Score::ZERO,
            step_coverage,
            sequence_order,
            slide_count_fit,
            matched_steps,
            missing_steps,
        };
        fit.score = Dimension::FrameworkAdherence.combine(&fit.sub_assessments());
        fit
    }

    /// Share of consecutive matched steps that appear in framework order.
    fn sequence_order(positions: &[usize]) -> f64 {
        if positions.len() < 2 {
            return if positions.is_empty() { 0.0 } else { 100.0 };
        }
        let pairs = positions.len() - 1;
        let ordered = positions.windows(2).filter(|w| w[0] <= w[1]).count();
        100.0 * ordered as f64 / pairs as f64
    }

    fn slide_count_fit(framework: &Framework, slide_count: usize) -> f64 {
        let distance = framework.slide_range.distance(slide_count) as f64;
        (100.0 - distance * SLIDE_COUNT_PENALTY).max(0.0)
    }
}

/// Index of the first slide realizing the step, by type or keyword.
fn first_matching_slide(step: &FrameworkStep, slides: &[Slide]) -> Option<usize> {
    slides.iter().position(|slide| {
        if step.slide_types.contains(&slide.slide_type) {
            return true;
        }
        let text = slide
            .content
            .visible_text()
            .join(" ")
            .to_lowercase();
        step.indicators
            .iter()
            .any(|keyword| !keyword.is_empty() && text.contains(&keyword.to_lowercase()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SlideId;
    use crate::domain::framework::FrameworkCatalog;
    use crate::domain::presentation::{SlideContent, SlideLayout, SlideType};

    fn slide(id: &str, slide_type: SlideType, title: &str) -> Slide {
        Slide::new(
            SlideId::new(id).unwrap(),
            slide_type,
            SlideLayout::Bullets,
            SlideContent::titled(title).with_bullets(["point"]),
        )
    }

    fn psb() -> &'static Framework {
        FrameworkCatalog::builtin()
            .get(&FrameworkId::new(FrameworkId::PROBLEM_SOLUTION_BENEFIT).unwrap())
            .unwrap()
    }

    #[test]
    fn full_coverage_in_order_scores_high() {
        let doc = Document::new(
            "Deck",
            vec![
                slide("s1", SlideType::Title, "Acme"),
                slide("s2", SlideType::Problem, "Manual reporting wastes time"),
                slide("s3", SlideType::Solution, "Automated dashboards"),
                slide("s4", SlideType::Benefits, "Save 10 hours a week"),
                slide("s5", SlideType::CallToAction, "Start a pilot"),
            ],
        );
        let fit = FitAssessor::assess(psb(), &doc);
        assert_eq!(fit.step_coverage, 100.0);
        assert_eq!(fit.sequence_order, 100.0);
        assert_eq!(fit.slide_count_fit, 100.0);
        assert!(fit.is_complete());
        assert!((fit.score.value() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn missing_steps_are_reported() {
        let doc = Document::new(
            "Deck",
            vec![
                slide("s1", SlideType::Title, "Acme"),
                slide("s2", SlideType::Solution, "Our platform"),
                slide("s3", SlideType::Appendix, "Details"),
                slide("s4", SlideType::Appendix, "More details"),
            ],
        );
        let fit = FitAssessor::assess(psb(), &doc);
        assert_eq!(fit.matched_steps, vec!["solution"]);
        assert_eq!(fit.missing_steps, vec!["problem", "benefit", "call_to_action"]);
        assert_eq!(fit.step_coverage, 25.0);
    }

    #[test]
    fn keyword_indicators_match_without_slide_type() {
        let doc = Document::new(
            "Deck",
            vec![slide("s1", SlideType::Other, "The pain of manual work")],
        );
        let fit = FitAssessor::assess(psb(), &doc);
        assert!(fit.matched_steps.contains(&"problem".to_string()));
    }

    #[test]
    fn out_of_order_steps_lower_sequence_score() {
        let doc = Document::new(
            "Deck",
            vec![
                slide("s1", SlideType::CallToAction, "Sign today"),
                slide("s2", SlideType::Benefits, "Big savings"),
                slide("s3", SlideType::Solution, "The fix"),
                slide("s4", SlideType::Problem, "The problem"),
            ],
        );
        let fit = FitAssessor::assess(psb(), &doc);
        assert_eq!(fit.step_coverage, 100.0);
        assert_eq!(fit.sequence_order, 0.0);
    }

    #[test]
    fn slide_count_outside_range_is_penalized() {
        let doc = Document::new("Deck", vec![slide("s1", SlideType::Problem, "Problem")]);
        let fit = FitAssessor::assess(psb(), &doc);
        // range starts at 4, three slides short
        assert!((fit.slide_count_fit - 55.0).abs() < 1e-9);
    }
}
