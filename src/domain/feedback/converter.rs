//! Feedback-to-prompt conversion.
//!
//! Pure and deterministic: the same issues, scores, round and history always
//! give the same brief.

use super::brief::{DimensionTarget, FixInstruction, FrameworkGap, PreservationDirective, RefinementBrief};
use super::curriculum::Curriculum;
use super::lessons::RoundLesson;
use crate::domain::foundation::Score;
use crate::domain::framework::FrameworkFit;
use crate::domain::regeneration::PreservationPlan;
use crate::domain::scoring::{top_actionable, Dimension, DimensionScores, Issue, IssueType};

/// Cap on fix instructions per brief.
pub const MAX_CRITICAL_FIXES: usize = 10;

/// Standard remedy per issue type. Types without an entry use the issue's
/// own suggested fix.
const ACTIONS: &[(IssueType, &str)] = &[
    (
        IssueType::Structural,
        "Rebuild the slide so it has one clear purpose and complete content.",
    ),
    (
        IssueType::FrameworkViolation,
        "Restructure the narrative so every framework step is covered in order.",
    ),
    (
        IssueType::AudienceMismatch,
        "Rewrite in the audience's language; drop jargon and lead with what they care about.",
    ),
    (
        IssueType::Clarity,
        "Cut to one idea per bullet and state the takeaway in the headline.",
    ),
    (
        IssueType::Evidence,
        "Back the claims with specific, quantified data points.",
    ),
    (
        IssueType::Flow,
        "Reorder and add transitions so each slide leads into the next.",
    ),
    (
        IssueType::MissingContent,
        "Fill every field the slide layout requires.",
    ),
    (
        IssueType::Actionability,
        "Close with a concrete request: who decides what, by when.",
    ),
];

fn suggested_fix(issue: &Issue) -> Option<String> {
    let fix = issue.suggested_fix.trim();
    (!fix.is_empty()).then(|| fix.to_string())
}

fn action_for(issue: &Issue) -> String {
    if let Some((_, action)) = ACTIONS.iter().find(|(t, _)| *t == issue.issue_type) {
        return (*action).to_string();
    }
    suggested_fix(issue).unwrap_or_else(|| "Resolve the problem as described.".to_string())
}

/// Everything a brief is built from.
#[derive(Debug, Clone, Copy)]
pub struct ConversionInput<'a> {
    pub issues: &'a [Issue],
    pub scores: &'a DimensionScores,
    pub overall: Score,
    pub target: Score,
    pub round: u32,
    pub history: &'a [RoundLesson],
    pub plan: &'a PreservationPlan,
    pub framework_fit: Option<&'a FrameworkFit>,
}

/// Turns scoring feedback into a [`RefinementBrief`].
#[derive(Debug, Clone, Default)]
pub struct FeedbackConverter {
    curriculum: Curriculum,
}

impl FeedbackConverter {
    pub fn new(curriculum: Curriculum) -> Self {
        Self { curriculum }
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    pub fn convert(&self, input: &ConversionInput<'_>) -> RefinementBrief {
        let critical_fixes = top_actionable(input.issues, MAX_CRITICAL_FIXES)
            .into_iter()
            .map(|issue| FixInstruction {
                action: action_for(&issue),
                suggested_fix: suggested_fix(&issue),
                description: issue.description.clone(),
                issue_id: issue.id,
                issue_type: issue.issue_type,
                severity: issue.severity,
                affected_slides: issue.affected_slides,
                framework_related: issue.framework_related,
            })
            .collect();

        RefinementBrief {
            round: input.round,
            current_score: input.overall,
            target: input.target,
            critical_fixes,
            dimension_targets: dimension_targets(input.scores, input.target),
            preservation: preservation_directives(input.plan),
            focus: self.curriculum.focus_for(input.round, input.overall, input.target),
            framework_gap: input.framework_fit.map(|fit| FrameworkGap {
                framework_id: fit.framework_id.clone(),
                adherence: input.scores.framework_adherence,
                missing_steps: fit.missing_steps.clone(),
                related_issue_count: input.issues.iter().filter(|i| i.framework_related).count(),
            }),
            history: input.history.to_vec(),
        }
    }
}

/// Dimensions below target, largest gap first.
fn dimension_targets(scores: &DimensionScores, target: Score) -> Vec<DimensionTarget> {
    let mut targets: Vec<DimensionTarget> = Dimension::ALL
        .iter()
        .filter_map(|d| {
            let current = scores.get(*d);
            let gap = target.delta_from(current);
            (gap > 0.0).then_some(DimensionTarget {
                dimension: *d,
                current,
                target,
                gap,
            })
        })
        .collect();
    targets.sort_by(|a, b| b.gap.total_cmp(&a.gap).then(a.dimension.cmp(&b.dimension)));
    targets
}

fn preservation_directives(plan: &PreservationPlan) -> Vec<PreservationDirective> {
    plan.slides
        .iter()
        .map(|s| PreservationDirective {
            slide_id: s.slide_id.clone(),
            strategy: s.strategy,
            keep: s.preserved_fields(),
            regenerate: s.improved_fields(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{IssueId, SlideId};
    use crate::domain::framework::FrameworkId;
    use crate::domain::presentation::{Document, Slide, SlideContent, SlideLayout, SlideType};
    use crate::domain::scoring::{DimensionDelta, Severity};

    fn sid(id: &str) -> SlideId {
        SlideId::new(id).unwrap()
    }

    fn deck() -> Document {
        Document::new(
            "Deck",
            vec![
                Slide::new(sid("s1"), SlideType::Problem, SlideLayout::Bullets, SlideContent::titled("P")),
                Slide::new(sid("s2"), SlideType::Solution, SlideLayout::Bullets, SlideContent::titled("S")),
            ],
        )
    }

    fn issues() -> Vec<Issue> {
        vec![
            Issue::new(IssueId::sequential(0), IssueType::Formatting, Severity::Minor, "tiny").on_slide(sid("s1")),
            Issue::new(IssueId::sequential(1), IssueType::Evidence, Severity::Important, "no data").on_slide(sid("s2")),
            Issue::new(IssueId::sequential(2), IssueType::Redundancy, Severity::Critical, "repeated")
                .with_fix("Merge the duplicate slides")
                .on_slide(sid("s1")),
        ]
    }

    fn fit() -> FrameworkFit {
        FrameworkFit {
            framework_id: FrameworkId::new("scqa").unwrap(),
            score: Score::new(55.0),
            step_coverage: 50.0,
            sequence_order: 100.0,
            slide_count_fit: 0.0,
            matched_steps: vec!["situation".into(), "complication".into()],
            missing_steps: vec!["question".into(), "answer".into()],
        }
    }

    fn convert(issues: &[Issue], round: u32, history: &[RoundLesson]) -> RefinementBrief {
        let scores = DimensionScores::new(55.0, 70.0, 90.0, 60.0);
        let plan = PreservationPlan::from_issues(&deck(), issues);
        let fit = fit();
        let input = ConversionInput {
            issues,
            scores: &scores,
            overall: Score::new(68.0),
            target: Score::new(85.0),
            round,
            history,
            plan: &plan,
            framework_fit: Some(&fit),
        };
        FeedbackConverter::default().convert(&input)
    }

    #[test]
    fn fixes_are_actionable_and_prioritized() {
        let brief = convert(&issues(), 1, &[]);
        assert_eq!(brief.critical_fixes.len(), 2);
        assert_eq!(brief.critical_fixes[0].severity, Severity::Critical);
        // redundancy has no table entry, so the suggested fix is used
        assert_eq!(brief.critical_fixes[0].action, "Merge the duplicate slides");
        assert!(brief.critical_fixes[1].action.contains("quantified"));
    }

    #[test]
    fn fixes_carry_the_problem_and_the_scorers_remedy() {
        let issue = Issue::new(
            IssueId::sequential(0),
            IssueType::Clarity,
            Severity::Critical,
            "Headline says nothing about the 40% churn",
        )
        .with_fix("State the churn figure in the headline")
        .on_slide(sid("s2"));

        let brief = convert(&[issue], 1, &[]);
        let fix = &brief.critical_fixes[0];
        assert_eq!(fix.description, "Headline says nothing about the 40% churn");
        assert_eq!(fix.suggested_fix.as_deref(), Some("State the churn figure in the headline"));

        let prompt = brief.render_prompt();
        assert!(prompt.contains(
            "1. [critical] clarity on s2: Headline says nothing about the 40% churn\n   \
             Fix: State the churn figure in the headline\n   \
             Approach: Cut to one idea per bullet and state the takeaway in the headline."
        ));
    }

    #[test]
    fn issue_without_fix_or_table_entry_still_names_the_problem() {
        let issue = Issue::new(IssueId::sequential(0), IssueType::Redundancy, Severity::Critical, "Slides 3 and 4 repeat")
            .on_slide(sid("s1"));

        let prompt = convert(&[issue], 1, &[]).render_prompt();
        assert!(prompt.contains(
            "1. [critical] redundancy on s1: Slides 3 and 4 repeat\n   Approach: Resolve the problem as described."
        ));
    }

    #[test]
    fn fixes_are_capped() {
        let many: Vec<Issue> = (0..15)
            .map(|n| Issue::new(IssueId::sequential(n), IssueType::Clarity, Severity::Important, "x"))
            .collect();
        assert_eq!(convert(&many, 1, &[]).critical_fixes.len(), MAX_CRITICAL_FIXES);
    }

    #[test]
    fn targets_only_below_target_largest_gap_first() {
        let brief = convert(&issues(), 1, &[]);
        let dims: Vec<Dimension> = brief.dimension_targets.iter().map(|t| t.dimension).collect();
        assert_eq!(
            dims,
            vec![Dimension::FrameworkAdherence, Dimension::BusinessImpact, Dimension::AudienceReadiness]
        );
        assert!((brief.dimension_targets[0].gap - 30.0).abs() < 1e-9);
    }

    #[test]
    fn framework_gap_reports_missing_steps() {
        let brief = convert(&issues(), 1, &[]);
        let gap = brief.framework_gap.unwrap();
        assert_eq!(gap.missing_steps, vec!["question", "answer"]);
        assert_eq!(gap.adherence.value(), 55.0);
        assert_eq!(gap.related_issue_count, 0);
    }

    #[test]
    fn conversion_is_deterministic() {
        let history = vec![RoundLesson::derive(
            1,
            4.0,
            vec![DimensionDelta { dimension: Dimension::Clarity, delta: 4.0 }],
            &[],
        )];
        let a = convert(&issues(), 2, &history);
        let b = convert(&issues(), 2, &history);
        assert_eq!(a, b);
        assert_eq!(a.render_prompt(), b.render_prompt());
    }

    #[test]
    fn prompt_contains_every_populated_section() {
        let history = vec![RoundLesson::derive(1, 2.5, Vec::new(), &[])];
        let prompt = convert(&issues(), 2, &history).render_prompt();
        assert!(prompt.starts_with("## Refinement round\nRound 2: current score 68.0, target 85.0."));
        assert!(prompt.contains("## Fix first\n1. [critical] redundancy on s1: repeated\n   Fix: Merge the duplicate slides\n2."));
        assert!(prompt.contains("- Framework adherence: 55.0 -> 85.0 (gap 30.0)"));
        assert!(prompt.contains("Missing steps: question, answer."));
        assert!(prompt.contains("- s1: rewrite freely"));
        assert!(prompt.contains("- Round 1: score +2.5"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let brief = convert(&[], 1, &[]);
        let prompt = brief.render_prompt();
        assert!(!prompt.contains("## Fix first"));
        assert!(!prompt.contains("## Earlier rounds"));
        assert!(prompt.contains("- s1: return unchanged"));
    }
}
