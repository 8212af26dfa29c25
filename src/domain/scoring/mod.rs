//! Scoring vocabulary - quality dimensions, issues and their ordering.
//!
//! Pure types shared by the validation agent, the feedback converter and
//! the orchestrator. No I/O.

mod dimensions;
mod issue;
mod prioritizer;
mod source;

pub use dimensions::{
    Dimension, DimensionDelta, DimensionScores, DimensionWeights, WEIGHT_TOLERANCE,
};
pub use issue::{Issue, IssueType, Severity};
pub use prioritizer::{compare_issues, prioritize, top_actionable, CONFIDENCE_BAND};
pub use source::AssessmentSource;
