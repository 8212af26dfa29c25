//! Domain layer containing the refinement logic and its types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (scores, IDs, timestamps, errors)
//! - `presentation` - Documents, slides and open slide content
//! - `scoring` - Quality dimensions, issues and issue ordering
//! - `framework` - Narrative framework catalog, classifier and fit assessment
//! - `analysis` - Content extraction and the rule-based scorer
//! - `structured` - Sanitizing and repairing service responses
//! - `feedback` - Converting scoring feedback into a regeneration brief
//! - `regeneration` - Preservation plans, merging and integrity checks
//! - `progress` - Stage tracking and time estimates
//! - `refinement` - Sessions, round records and the stopping policy

pub mod analysis;
pub mod feedback;
pub mod foundation;
pub mod framework;
pub mod presentation;
pub mod progress;
pub mod refinement;
pub mod regeneration;
pub mod scoring;
pub mod structured;
