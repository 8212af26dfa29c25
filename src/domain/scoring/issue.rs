//! Issue model - typed, severity-ranked defects found while scoring.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{IssueId, SlideId};

/// How bad an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "blocker", alias = "high")]
    Critical,
    #[serde(alias = "major", alias = "medium")]
    Important,
    #[serde(alias = "low", alias = "info")]
    Minor,
}

impl Severity {
    /// Numeric priority weight used for ordering.
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Critical => 100,
            Severity::Important => 50,
            Severity::Minor => 10,
        }
    }

    /// Critical and important issues drive regeneration; minor ones do not.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Severity::Critical | Severity::Important)
    }

    pub fn from_label(label: &str) -> Option<Severity> {
        match label.trim().to_lowercase().as_str() {
            "critical" | "blocker" | "high" => Some(Severity::Critical),
            "important" | "major" | "medium" => Some(Severity::Important),
            "minor" | "low" | "info" => Some(Severity::Minor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Important => "important",
            Severity::Minor => "minor",
        }
    }
}

/// Category of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Structural,
    FrameworkViolation,
    AudienceMismatch,
    Clarity,
    Evidence,
    Flow,
    MissingContent,
    Actionability,
    Redundancy,
    Formatting,
}

impl IssueType {
    pub const ALL: [IssueType; 10] = [
        IssueType::Structural,
        IssueType::FrameworkViolation,
        IssueType::AudienceMismatch,
        IssueType::Clarity,
        IssueType::Evidence,
        IssueType::Flow,
        IssueType::MissingContent,
        IssueType::Actionability,
        IssueType::Redundancy,
        IssueType::Formatting,
    ];

    /// Tie-break rank, lower sorts first.
    pub fn priority(&self) -> u8 {
        match self {
            IssueType::Structural => 0,
            IssueType::FrameworkViolation => 1,
            IssueType::AudienceMismatch => 2,
            IssueType::MissingContent => 3,
            IssueType::Evidence => 4,
            IssueType::Actionability => 5,
            IssueType::Clarity => 6,
            IssueType::Flow => 7,
            IssueType::Redundancy => 8,
            IssueType::Formatting => 9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Structural => "structural",
            IssueType::FrameworkViolation => "framework_violation",
            IssueType::AudienceMismatch => "audience_mismatch",
            IssueType::Clarity => "clarity",
            IssueType::Evidence => "evidence",
            IssueType::Flow => "flow",
            IssueType::MissingContent => "missing_content",
            IssueType::Actionability => "actionability",
            IssueType::Redundancy => "redundancy",
            IssueType::Formatting => "formatting",
        }
    }

    /// Lenient parsing of labels produced by the scoring service.
    pub fn from_label(label: &str) -> Option<IssueType> {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");
        let found = match normalized.as_str() {
            "structure" | "structural" => IssueType::Structural,
            "framework" | "framework_violation" | "framework_compliance" => {
                IssueType::FrameworkViolation
            }
            "audience" | "audience_mismatch" | "audience_fit" => IssueType::AudienceMismatch,
            "clarity" | "readability" => IssueType::Clarity,
            "evidence" | "data" | "missing_evidence" => IssueType::Evidence,
            "flow" | "narrative_flow" | "transition" => IssueType::Flow,
            "missing_content" | "incomplete" | "content_gap" => IssueType::MissingContent,
            "actionability" | "call_to_action" | "next_steps" => IssueType::Actionability,
            "redundancy" | "repetition" | "duplicate" => IssueType::Redundancy,
            "formatting" | "format" | "layout" | "design" => IssueType::Formatting,
            _ => return None,
        };
        Some(found)
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A specific defect found during one scoring pass. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: String,
    pub suggested_fix: String,
    /// Scorer's confidence in the finding, 0-100.
    pub confidence: f64,
    /// Slides the issue applies to; empty for document-level issues.
    #[serde(default)]
    pub affected_slides: Vec<SlideId>,
    #[serde(default)]
    pub framework_related: bool,
}

impl Issue {
    pub fn new(
        id: IssueId,
        issue_type: IssueType,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            issue_type,
            severity,
            description: description.into(),
            suggested_fix: String::new(),
            confidence: 80.0,
            affected_slides: Vec::new(),
            framework_related: issue_type == IssueType::FrameworkViolation,
        }
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = fix.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 100.0)
        };
        self
    }

    pub fn on_slide(mut self, slide: SlideId) -> Self {
        self.affected_slides.push(slide);
        self
    }

    pub fn framework_related(mut self, related: bool) -> Self {
        self.framework_related = related;
        self
    }

    pub fn is_actionable(&self) -> bool {
        self.severity.is_actionable()
    }

    pub fn is_document_level(&self) -> bool {
        self.affected_slides.is_empty()
    }

    pub fn affects(&self, slide: &SlideId) -> bool {
        self.affected_slides.contains(slide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_weights_match_priority_table() {
        assert_eq!(Severity::Critical.weight(), 100);
        assert_eq!(Severity::Important.weight(), 50);
        assert_eq!(Severity::Minor.weight(), 10);
    }

    #[test]
    fn severity_accepts_aliases_when_deserializing() {
        let s: Severity = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(s, Severity::Critical);
        let s: Severity = serde_json::from_str("\"major\"").unwrap();
        assert_eq!(s, Severity::Important);
    }

    #[test]
    fn issue_type_priorities_are_unique() {
        let mut priorities: Vec<u8> = IssueType::ALL.iter().map(|t| t.priority()).collect();
        priorities.sort_unstable();
        priorities.dedup();
        assert_eq!(priorities.len(), IssueType::ALL.len());
    }

    #[test]
    fn issue_type_from_label_normalizes() {
        assert_eq!(IssueType::from_label("Audience Mismatch"), Some(IssueType::AudienceMismatch));
        assert_eq!(IssueType::from_label("call-to-action"), Some(IssueType::Actionability));
        assert_eq!(IssueType::from_label("nonsense"), None);
    }

    #[test]
    fn framework_violation_defaults_to_framework_related() {
        let issue = Issue::new(IssueId::sequential(0), IssueType::FrameworkViolation, Severity::Important, "x");
        assert!(issue.framework_related);
        let issue = Issue::new(IssueId::sequential(1), IssueType::Clarity, Severity::Minor, "y");
        assert!(!issue.framework_related);
    }

    #[test]
    fn with_confidence_clamps() {
        let issue = Issue::new(IssueId::sequential(0), IssueType::Clarity, Severity::Minor, "y")
            .with_confidence(140.0);
        assert_eq!(issue.confidence, 100.0);
    }
}
