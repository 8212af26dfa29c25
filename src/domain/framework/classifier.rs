//! Rule-based framework recommendation.
//!
//! Used when the scoring service is unavailable. Rules are checked in order
//! and the first match wins; rules naming a framework missing from the
//! catalog are skipped.

use super::analysis::RequestContext;
use super::catalog::{FrameworkCatalog, FrameworkId};
use crate::domain::presentation::Audience;

const MATCHED_CONFIDENCE: f64 = 75.0;
const DEFAULT_CONFIDENCE: f64 = 50.0;

enum Trigger {
    Keywords(&'static [&'static str]),
    Audience(Audience),
}

struct Rule {
    framework: &'static str,
    trigger: Trigger,
    rationale: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        framework: FrameworkId::COMPARISON,
        trigger: Trigger::Keywords(&["compare", "vendor", "versus", " vs ", "options"]),
        rationale: "request asks to weigh alternatives",
    },
    Rule {
        framework: FrameworkId::STAR,
        trigger: Trigger::Keywords(&["case study", "results", "success story"]),
        rationale: "request describes a case study",
    },
    Rule {
        framework: FrameworkId::PYRAMID,
        trigger: Trigger::Audience(Audience::Executive),
        rationale: "executive audience expects the answer first",
    },
    Rule {
        framework: FrameworkId::PROBLEM_SOLUTION_BENEFIT,
        trigger: Trigger::Keywords(&["problem", "pain"]),
        rationale: "request centres on a problem to solve",
    },
    Rule {
        framework: FrameworkId::BEFORE_AFTER_BRIDGE,
        trigger: Trigger::Keywords(&["transform", "future state"]),
        rationale: "request describes a transformation",
    },
];

/// Outcome of the keyword classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub framework_id: FrameworkId,
    pub confidence: f64,
    pub rationale: String,
}

/// Stateless keyword classifier over the request intent.
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn classify(context: &RequestContext, catalog: &FrameworkCatalog) -> Classification {
        let intent = format!(" {} ", context.intent.to_lowercase());

        for rule in RULES {
            let Ok(id) = FrameworkId::new(rule.framework) else {
                continue;
            };
            if !catalog.contains(&id) {
                continue;
            }
            let hit = match &rule.trigger {
                Trigger::Keywords(keywords) => keywords.iter().any(|k| intent.contains(k)),
                Trigger::Audience(audience) => context.audience == *audience,
            };
            if hit {
                return Classification {
                    framework_id: id,
                    confidence: MATCHED_CONFIDENCE,
                    rationale: rule.rationale.to_string(),
                };
            }
        }

        let fallback = FrameworkId::new(FrameworkId::SCQA)
            .ok()
            .filter(|id| catalog.contains(id))
            .unwrap_or_else(|| catalog.first().id.clone());
        Classification {
            framework_id: fallback,
            confidence: DEFAULT_CONFIDENCE,
            rationale: "no specific signal in the request; using the general-purpose structure"
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(intent: &str, audience: Audience) -> String {
        let context = RequestContext::new(intent).with_audience(audience);
        RuleBasedClassifier::classify(&context, FrameworkCatalog::builtin())
            .framework_id
            .to_string()
    }

    #[test]
    fn comparison_keywords_win_first() {
        assert_eq!(classify("Compare three CRM vendors", Audience::Executive), "comparison");
        assert_eq!(classify("AWS vs GCP", Audience::Technical), "comparison");
    }

    #[test]
    fn case_study_maps_to_star() {
        assert_eq!(classify("Customer success story for Acme", Audience::Customer), "star");
    }

    #[test]
    fn executive_audience_maps_to_pyramid() {
        assert_eq!(classify("Quarterly update", Audience::Executive), "pyramid");
    }

    #[test]
    fn problem_keywords_map_to_psb() {
        assert_eq!(classify("Our onboarding pain", Audience::Customer), "problem_solution_benefit");
    }

    #[test]
    fn transformation_maps_to_bab() {
        assert_eq!(classify("Digital transformation roadmap", Audience::Internal), "before_after_bridge");
    }

    #[test]
    fn defaults_to_scqa_with_lower_confidence() {
        let context = RequestContext::new("Team offsite");
        let result = RuleBasedClassifier::classify(&context, FrameworkCatalog::builtin());
        assert_eq!(result.framework_id.as_str(), "scqa");
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn skips_rules_for_frameworks_missing_from_catalog() {
        let yaml = r#"
frameworks:
  - id: elevator
    name: Elevator
    description: short
    slide_range: { min: 1, max: 3 }
    steps:
      - name: hook
        description: hook
"#;
        let catalog = FrameworkCatalog::from_yaml(yaml).unwrap();
        let context = RequestContext::new("compare vendors");
        let result = RuleBasedClassifier::classify(&context, &catalog);
        assert_eq!(result.framework_id.as_str(), "elevator");
    }
}
