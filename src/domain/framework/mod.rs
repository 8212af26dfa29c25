//! Storytelling frameworks - catalog, fit assessment and recommendation.

mod analysis;
mod catalog;
mod classifier;
mod fit;

pub use analysis::{rank_candidates, select_best, FrameworkAnalysis, FrameworkCandidate, RequestContext};
pub use catalog::{Framework, FrameworkCatalog, FrameworkId, FrameworkStep, SlideRange};
pub use classifier::{Classification, RuleBasedClassifier};
pub use fit::{FitAssessor, FrameworkFit};
