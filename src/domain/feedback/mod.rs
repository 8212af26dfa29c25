//! Feedback-to-prompt conversion.
//!
//! Turns issues, scores and round history into a [`RefinementBrief`] for the
//! regenerator. No I/O.

mod brief;
mod converter;
mod curriculum;
mod lessons;

pub use brief::{
    DimensionTarget, FixInstruction, FrameworkGap, PreservationDirective, RefinementBrief,
};
pub use converter::{ConversionInput, FeedbackConverter, MAX_CRITICAL_FIXES};
pub use curriculum::{Curriculum, CurriculumStage, RoundFocus};
pub use lessons::RoundLesson;
