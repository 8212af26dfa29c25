//! Selective regeneration - preservation planning, merge, integrity checks
//! and change tracking. The service call itself lives in the application
//! layer.

mod changes;
mod error;
mod integrity;
mod merge;
mod outcome;
mod preservation;

pub use changes::{diff_documents, ChangeRecord, ChangeType};
pub use error::RegenerationError;
pub use integrity::{validate_integrity, IntegrityViolation};
pub use merge::merge_documents;
pub use outcome::RegenerationOutcome;
pub use preservation::{
    PreservationPlan, PreservationStrategy, SlidePreservation, STRONG_PRESERVATION_LIMIT,
};
