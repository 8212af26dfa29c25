//! The refinement brief and its prompt rendering.

use serde::{Deserialize, Serialize};

use super::curriculum::RoundFocus;
use super::lessons::RoundLesson;
use crate::domain::foundation::{IssueId, Score, SlideId};
use crate::domain::framework::FrameworkId;
use crate::domain::presentation::ContentField;
use crate::domain::regeneration::PreservationStrategy;
use crate::domain::scoring::{Dimension, IssueType, Severity};

/// One issue turned into an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixInstruction {
    pub issue_id: IssueId,
    pub issue_type: IssueType,
    pub severity: Severity,
    /// What the scorer found wrong.
    pub description: String,
    /// The scorer's own remedy, if it gave one.
    pub suggested_fix: Option<String>,
    /// Standard remedy for the issue type, or the suggested fix when the
    /// type has none.
    pub action: String,
    pub affected_slides: Vec<SlideId>,
    pub framework_related: bool,
}

/// A dimension still below target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTarget {
    pub dimension: Dimension,
    pub current: Score,
    pub target: Score,
    pub gap: f64,
}

/// What the regeneration must keep on one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreservationDirective {
    pub slide_id: SlideId,
    pub strategy: PreservationStrategy,
    pub keep: Vec<ContentField>,
    pub regenerate: Vec<ContentField>,
}

/// How far the document is from its framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkGap {
    pub framework_id: FrameworkId,
    pub adherence: Score,
    pub missing_steps: Vec<String>,
    pub related_issue_count: usize,
}

/// Machine-actionable instructions for one regeneration round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementBrief {
    pub round: u32,
    pub current_score: Score,
    pub target: Score,
    pub critical_fixes: Vec<FixInstruction>,
    pub dimension_targets: Vec<DimensionTarget>,
    pub preservation: Vec<PreservationDirective>,
    pub focus: RoundFocus,
    pub framework_gap: Option<FrameworkGap>,
    pub history: Vec<RoundLesson>,
}

struct PromptSection {
    heading: &'static str,
    lines: Vec<String>,
}

fn list(items: &[ContentField]) -> String {
    items.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(", ")
}

impl RefinementBrief {
    pub fn is_empty(&self) -> bool {
        self.critical_fixes.is_empty() && self.dimension_targets.is_empty()
    }

    /// Assembles the regeneration prompt. Empty sections are left out.
    pub fn render_prompt(&self) -> String {
        let sections = [
            self.overview_section(),
            self.fixes_section(),
            self.targets_section(),
            self.framework_section(),
            self.preservation_section(),
            self.history_section(),
        ];

        sections
            .iter()
            .filter(|s| !s.lines.is_empty())
            .map(|s| format!("## {}\n{}", s.heading, s.lines.join("\n")))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn overview_section(&self) -> PromptSection {
        let dimensions: Vec<&str> = self.focus.dimensions.iter().map(|d| d.label()).collect();
        PromptSection {
            heading: "Refinement round",
            lines: vec![
                format!(
                    "Round {}: current score {:.1}, target {:.1}.",
                    self.round,
                    self.current_score.value(),
                    self.target.value()
                ),
                format!(
                    "Focus on {} ({}), aiming for +{:.1} points.",
                    self.focus.label,
                    dimensions.join(", "),
                    self.focus.expected_gain
                ),
            ],
        }
    }

    fn fixes_section(&self) -> PromptSection {
        let lines = self
            .critical_fixes
            .iter()
            .enumerate()
            .map(|(i, fix)| {
                let scope = if fix.affected_slides.is_empty() {
                    "whole deck".to_string()
                } else {
                    fix.affected_slides
                        .iter()
                        .map(SlideId::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                let mut entry = format!(
                    "{}. [{}] {} on {}: {}",
                    i + 1,
                    fix.severity.as_str(),
                    fix.issue_type.as_str(),
                    scope,
                    fix.description.trim()
                );
                if let Some(suggested) = &fix.suggested_fix {
                    entry.push_str(&format!("\n   Fix: {}", suggested));
                }
                if fix.suggested_fix.as_deref() != Some(fix.action.as_str()) {
                    entry.push_str(&format!("\n   Approach: {}", fix.action));
                }
                entry
            })
            .collect();
        PromptSection {
            heading: "Fix first",
            lines,
        }
    }

    fn targets_section(&self) -> PromptSection {
        let lines = self
            .dimension_targets
            .iter()
            .map(|t| {
                format!(
                    "- {}: {:.1} -> {:.1} (gap {:.1})",
                    t.dimension.label(),
                    t.current.value(),
                    t.target.value(),
                    t.gap
                )
            })
            .collect();
        PromptSection {
            heading: "Dimension targets",
            lines,
        }
    }

    fn framework_section(&self) -> PromptSection {
        let lines = match &self.framework_gap {
            Some(gap) => {
                let mut lines = vec![format!(
                    "Follow the {} framework; adherence is {:.1} with {} related issues.",
                    gap.framework_id,
                    gap.adherence.value(),
                    gap.related_issue_count
                )];
                if !gap.missing_steps.is_empty() {
                    lines.push(format!("Missing steps: {}.", gap.missing_steps.join(", ")));
                }
                lines
            }
            None => Vec::new(),
        };
        PromptSection {
            heading: "Framework compliance",
            lines,
        }
    }

    fn preservation_section(&self) -> PromptSection {
        let mut lines: Vec<String> = self
            .preservation
            .iter()
            .map(|d| match d.strategy {
                PreservationStrategy::PreserveCompletely => {
                    format!("- {}: return unchanged", d.slide_id)
                }
                PreservationStrategy::PreserveStrong => format!(
                    "- {}: keep [{}], rewrite [{}]",
                    d.slide_id,
                    list(&d.keep),
                    list(&d.regenerate)
                ),
                PreservationStrategy::RegenerateBroadly => format!(
                    "- {}: rewrite freely, keep id, type and layout family",
                    d.slide_id
                ),
            })
            .collect();
        if !lines.is_empty() {
            lines.insert(
                0,
                "Return every slide with its original id and type, in the original order.".to_string(),
            );
        }
        PromptSection {
            heading: "Preservation",
            lines,
        }
    }

    fn history_section(&self) -> PromptSection {
        let lines = self
            .history
            .iter()
            .map(|lesson| {
                let mut line = format!("- Round {}: score {:+.1}", lesson.round, lesson.score_delta);
                if !lesson.worked.is_empty() {
                    line.push_str(&format!("; worked: {}", lesson.worked.join("; ")));
                }
                if !lesson.did_not_work.is_empty() {
                    line.push_str(&format!("; did not work: {}", lesson.did_not_work.join("; ")));
                }
                line
            })
            .collect();
        PromptSection {
            heading: "Earlier rounds",
            lines,
        }
    }
}
