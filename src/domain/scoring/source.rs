use serde::{Deserialize, Serialize};

/// Which path produced an assessment.
///
/// Callers treat both paths identically; the source is kept for telemetry
/// and for the session result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentSource {
    /// Parsed from the external scoring service.
    Service,
    /// Deterministic rule-based fallback.
    RuleBased,
}
