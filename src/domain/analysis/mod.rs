//! Content analysis - rule-based scoring and issue detection.
//!
//! Pure domain services used when the scoring service is unavailable, and
//! the [`ScoringResult`] shape shared by both scoring paths.

mod profile;
mod result;
mod rule_scorer;

pub use profile::{
    ContentProfile, SlideProfile, HEADLINE_WORDS, LONG_BULLET_WORDS, MAX_BULLETS_PER_SLIDE,
};
pub use result::ScoringResult;
pub use rule_scorer::RuleBasedScorer;
