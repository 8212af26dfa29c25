//! Preservation planning.
//!
//! Decides per slide how much of the prior content a regeneration may touch,
//! from the density of critical and important issues on that slide.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::SlideId;
use crate::domain::presentation::{ContentField, Document, Slide};
use crate::domain::scoring::{Issue, IssueType, Severity};

/// Slides with at most this many important issues (and no critical one)
/// keep their strong elements.
pub const STRONG_PRESERVATION_LIMIT: usize = 2;

/// How much of a slide may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreservationStrategy {
    /// Leave the slide exactly as it is.
    PreserveCompletely,
    /// Keep metrics, sections and speaker notes unless flagged; regenerate
    /// flagged elements.
    PreserveStrong,
    /// Rewrite the content, keeping id, type and layout family.
    RegenerateBroadly,
}

impl PreservationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreservationStrategy::PreserveCompletely => "preserve_completely",
            PreservationStrategy::PreserveStrong => "preserve_strong",
            PreservationStrategy::RegenerateBroadly => "regenerate_broadly",
        }
    }
}

/// The decision for one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlidePreservation {
    pub slide_id: SlideId,
    pub strategy: PreservationStrategy,
    /// Fields named by an issue on this slide.
    pub flagged_fields: Vec<ContentField>,
}

impl SlidePreservation {
    /// Fields the merge must take from the prior slide.
    pub fn preserved_fields(&self) -> Vec<ContentField> {
        match self.strategy {
            PreservationStrategy::PreserveCompletely => ContentField::ALL.to_vec(),
            PreservationStrategy::PreserveStrong => ContentField::STRONG
                .iter()
                .copied()
                .filter(|f| !self.flagged_fields.contains(f))
                .collect(),
            PreservationStrategy::RegenerateBroadly => Vec::new(),
        }
    }

    /// Fields the merge must take from the candidate slide.
    pub fn improved_fields(&self) -> Vec<ContentField> {
        match self.strategy {
            PreservationStrategy::PreserveCompletely => Vec::new(),
            PreservationStrategy::PreserveStrong => self.flagged_fields.clone(),
            PreservationStrategy::RegenerateBroadly => ContentField::ALL.to_vec(),
        }
    }
}

/// Preservation decisions for every slide of a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreservationPlan {
    pub slides: Vec<SlidePreservation>,
}

impl PreservationPlan {
    /// Builds the plan from the latest issues.
    ///
    /// A critical or important document-level issue means the deck as a
    /// whole must change, so otherwise untouched slides drop to
    /// [`PreservationStrategy::PreserveStrong`].
    pub fn from_issues(document: &Document, issues: &[Issue]) -> Self {
        let deck_needs_work = issues
            .iter()
            .any(|i| i.is_actionable() && i.is_document_level());

        let slides = document
            .slides
            .iter()
            .map(|slide| {
                let on_slide: Vec<&Issue> = issues.iter().filter(|i| i.affects(&slide.id)).collect();
                let critical = on_slide.iter().filter(|i| i.severity == Severity::Critical).count();
                let important = on_slide.iter().filter(|i| i.severity == Severity::Important).count();

                let strategy = if critical > 0 || important > STRONG_PRESERVATION_LIMIT {
                    PreservationStrategy::RegenerateBroadly
                } else if important > 0 || deck_needs_work {
                    PreservationStrategy::PreserveStrong
                } else {
                    PreservationStrategy::PreserveCompletely
                };

                let mut flagged_fields = Vec::new();
                for issue in on_slide.iter().filter(|i| i.is_actionable()) {
                    for field in flagged_by(issue, slide) {
                        if !flagged_fields.contains(&field) {
                            flagged_fields.push(field);
                        }
                    }
                }
                flagged_fields.sort();

                SlidePreservation {
                    slide_id: slide.id.clone(),
                    strategy,
                    flagged_fields,
                }
            })
            .collect();

        Self { slides }
    }

    pub fn for_slide(&self, id: &SlideId) -> Option<&SlidePreservation> {
        self.slides.iter().find(|s| &s.slide_id == id)
    }

    /// Strategy for a slide; slides the plan does not know are preserved.
    pub fn strategy_for(&self, id: &SlideId) -> PreservationStrategy {
        self.for_slide(id)
            .map(|s| s.strategy)
            .unwrap_or(PreservationStrategy::PreserveCompletely)
    }

    /// True when no slide may change.
    pub fn is_noop(&self) -> bool {
        self.slides
            .iter()
            .all(|s| s.strategy == PreservationStrategy::PreserveCompletely)
    }

    pub fn count(&self, strategy: PreservationStrategy) -> usize {
        self.slides.iter().filter(|s| s.strategy == strategy).count()
    }
}

/// Fields an issue points at on a given slide.
fn flagged_by(issue: &Issue, slide: &Slide) -> Vec<ContentField> {
    let mut fields: Vec<ContentField> = match issue.issue_type {
        IssueType::MissingContent => slide.missing_required_fields(),
        IssueType::Evidence => vec![ContentField::Metrics],
        IssueType::Clarity | IssueType::Redundancy => vec![ContentField::Title, ContentField::Bullets],
        IssueType::Formatting => vec![ContentField::Title],
        IssueType::AudienceMismatch => vec![ContentField::Bullets, ContentField::Callout],
        IssueType::Actionability => vec![ContentField::Callout, ContentField::Bullets],
        IssueType::Structural | IssueType::FrameworkViolation | IssueType::Flow => {
            vec![ContentField::Title, ContentField::Bullets, ContentField::Sections]
        }
    };

    let text = format!("{} {}", issue.description, issue.suggested_fix).to_lowercase();
    for field in ContentField::ALL {
        let name = field.as_str().replace('_', " ");
        if text.contains(&name) && !fields.contains(&field) {
            fields.push(field);
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::IssueId;
    use crate::domain::presentation::{Metric, SlideContent, SlideLayout, SlideType};

    fn sid(id: &str) -> SlideId {
        SlideId::new(id).unwrap()
    }

    fn deck() -> Document {
        let slides = ["s1", "s2", "s3"]
            .iter()
            .map(|id| {
                Slide::new(
                    sid(id),
                    SlideType::Evidence,
                    SlideLayout::Metrics,
                    SlideContent::titled("Results").with_metric(Metric::new("NPS", "62")),
                )
            })
            .collect();
        Document::new("Deck", slides)
    }

    fn issue(n: usize, issue_type: IssueType, severity: Severity, slide: Option<&str>) -> Issue {
        let issue = Issue::new(IssueId::sequential(n), issue_type, severity, "problem");
        match slide {
            Some(id) => issue.on_slide(sid(id)),
            None => issue,
        }
    }

    #[test]
    fn strategy_follows_issue_density() {
        let issues = vec![
            issue(0, IssueType::Clarity, Severity::Important, Some("s2")),
            issue(1, IssueType::Structural, Severity::Critical, Some("s3")),
            issue(2, IssueType::Formatting, Severity::Minor, Some("s1")),
        ];
        let plan = PreservationPlan::from_issues(&deck(), &issues);
        assert_eq!(plan.strategy_for(&sid("s1")), PreservationStrategy::PreserveCompletely);
        assert_eq!(plan.strategy_for(&sid("s2")), PreservationStrategy::PreserveStrong);
        assert_eq!(plan.strategy_for(&sid("s3")), PreservationStrategy::RegenerateBroadly);
    }

    #[test]
    fn three_important_issues_regenerate_broadly() {
        let issues: Vec<Issue> = (0..3)
            .map(|n| issue(n, IssueType::Clarity, Severity::Important, Some("s1")))
            .collect();
        let plan = PreservationPlan::from_issues(&deck(), &issues);
        assert_eq!(plan.strategy_for(&sid("s1")), PreservationStrategy::RegenerateBroadly);
    }

    #[test]
    fn no_actionable_issues_is_a_noop_plan() {
        let issues = vec![issue(0, IssueType::Formatting, Severity::Minor, Some("s1"))];
        let plan = PreservationPlan::from_issues(&deck(), &issues);
        assert!(plan.is_noop());
    }

    #[test]
    fn document_level_issue_downgrades_untouched_slides() {
        let issues = vec![issue(0, IssueType::Actionability, Severity::Important, None)];
        let plan = PreservationPlan::from_issues(&deck(), &issues);
        assert!(!plan.is_noop());
        assert_eq!(plan.count(PreservationStrategy::PreserveStrong), 3);
    }

    #[test]
    fn strong_fields_stay_unless_flagged() {
        let issues = vec![issue(0, IssueType::Evidence, Severity::Important, Some("s1"))];
        let plan = PreservationPlan::from_issues(&deck(), &issues);
        let s1 = plan.for_slide(&sid("s1")).unwrap();
        assert_eq!(s1.flagged_fields, vec![ContentField::Metrics]);
        assert_eq!(
            s1.preserved_fields(),
            vec![ContentField::Sections, ContentField::SpeakerNotes]
        );
        assert_eq!(s1.improved_fields(), vec![ContentField::Metrics]);
    }

    #[test]
    fn description_mentions_flag_fields() {
        let mut flagged = issue(0, IssueType::Clarity, Severity::Important, Some("s1"));
        flagged.description = "Speaker notes contradict the headline".into();
        let plan = PreservationPlan::from_issues(&deck(), &[flagged]);
        let s1 = plan.for_slide(&sid("s1")).unwrap();
        assert!(s1.flagged_fields.contains(&ContentField::SpeakerNotes));
        assert!(!s1.preserved_fields().contains(&ContentField::SpeakerNotes));
    }
}
