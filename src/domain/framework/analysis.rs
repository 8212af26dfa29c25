//! Framework recommendation results.

use serde::{Deserialize, Serialize};

use super::catalog::{FrameworkCatalog, FrameworkId};
use super::fit::FrameworkFit;
use crate::domain::foundation::Score;
use crate::domain::presentation::{Audience, Document};
use crate::domain::scoring::AssessmentSource;

/// What the requester asked for, alongside the document itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Free-text intent, e.g. "pitch our analytics platform to the board".
    pub intent: String,
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub industry: Option<String>,
}

impl RequestContext {
    pub fn new(intent: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            ..Default::default()
        }
    }

    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.audience = audience;
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// Context derived from the document when the caller supplies none.
    pub fn from_document(document: &Document) -> Self {
        let mut intent = document.title.clone();
        if let Some(subtitle) = &document.subtitle {
            intent.push_str(" - ");
            intent.push_str(subtitle);
        }
        Self {
            intent,
            audience: document.metadata.audience,
            industry: None,
        }
    }
}

/// Score of one candidate framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkCandidate {
    pub framework_id: FrameworkId,
    pub score: Score,
}

/// Output of the framework analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkAnalysis {
    pub recommended: FrameworkId,
    /// Confidence in the recommendation, 0-100.
    pub confidence: f64,
    pub rationale: String,
    /// Fit of the document to the recommended framework.
    pub current_fit: FrameworkFit,
    /// Every scored candidate, best first.
    pub candidates: Vec<FrameworkCandidate>,
    pub source: AssessmentSource,
}

/// Picks the best candidate. Ties go to the framework earlier in the
/// catalog; candidates unknown to the catalog are ignored.
pub fn select_best<'a>(
    candidates: &'a [FrameworkCandidate],
    catalog: &FrameworkCatalog,
) -> Option<&'a FrameworkCandidate> {
    candidates
        .iter()
        .filter_map(|c| catalog.priority_of(&c.framework_id).map(|p| (p, c)))
        .min_by(|(pa, a), (pb, b)| b.score.total_cmp(&a.score).then(pa.cmp(pb)))
        .map(|(_, c)| c)
}

/// Sorts candidates best first with the same tie-break as [`select_best`].
pub fn rank_candidates(candidates: &mut [FrameworkCandidate], catalog: &FrameworkCatalog) {
    candidates.sort_by(|a, b| {
        let pa = catalog.priority_of(&a.framework_id).unwrap_or(usize::MAX);
        let pb = catalog.priority_of(&b.framework_id).unwrap_or(usize::MAX);
        b.score.total_cmp(&a.score).then(pa.cmp(&pb))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, score: f64) -> FrameworkCandidate {
        FrameworkCandidate {
            framework_id: FrameworkId::new(id).unwrap(),
            score: Score::new(score),
        }
    }

    #[test]
    fn highest_score_wins() {
        let candidates = vec![candidate("scqa", 60.0), candidate("star", 80.0)];
        let best = select_best(&candidates, FrameworkCatalog::builtin()).unwrap();
        assert_eq!(best.framework_id.as_str(), "star");
    }

    #[test]
    fn ties_follow_catalog_priority() {
        let candidates = vec![
            candidate("before_after_bridge", 70.0),
            candidate("comparison", 70.0),
            candidate("scqa", 70.0),
        ];
        let best = select_best(&candidates, FrameworkCatalog::builtin()).unwrap();
        assert_eq!(best.framework_id.as_str(), "scqa");
    }

    #[test]
    fn unknown_candidates_are_ignored() {
        let candidates = vec![candidate("made_up", 99.0), candidate("star", 10.0)];
        let best = select_best(&candidates, FrameworkCatalog::builtin()).unwrap();
        assert_eq!(best.framework_id.as_str(), "star");
        assert!(select_best(&[candidate("made_up", 99.0)], FrameworkCatalog::builtin()).is_none());
    }

    #[test]
    fn ranking_matches_selection() {
        let mut candidates = vec![
            candidate("star", 40.0),
            candidate("comparison", 70.0),
            candidate("pyramid", 70.0),
        ];
        rank_candidates(&mut candidates, FrameworkCatalog::builtin());
        let order: Vec<&str> = candidates.iter().map(|c| c.framework_id.as_str()).collect();
        assert_eq!(order, vec!["pyramid", "comparison", "star"]);
    }

    #[test]
    fn context_from_document_uses_title_and_audience() {
        use crate::domain::presentation::DocumentMetadata;
        let doc = Document::new("Vendor review", vec![])
            .with_subtitle("Q3")
            .with_metadata(DocumentMetadata {
                audience: Audience::Executive,
                ..Default::default()
            });
        let context = RequestContext::from_document(&doc);
        assert_eq!(context.intent, "Vendor review - Q3");
        assert_eq!(context.audience, Audience::Executive);
    }
}
