//! Structural integrity of a regenerated document.

use std::collections::HashSet;
use thiserror::Error;

use crate::domain::foundation::SlideId;
use crate::domain::presentation::{Document, SlideType};

/// A candidate document broke the slide skeleton. Never merged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IntegrityViolation {
    #[error("Slide count changed: expected {expected}, got {actual}")]
    SlideCountMismatch { expected: usize, actual: usize },

    #[error("Slide {0} is missing from the regenerated document")]
    MissingSlide(SlideId),

    #[error("Regenerated document introduced unknown slide {0}")]
    UnexpectedSlide(SlideId),

    #[error("Slide {0} appears more than once")]
    DuplicateSlide(SlideId),

    #[error("Slide {slide_id} changed type from {expected} to {actual}")]
    SlideTypeChanged {
        slide_id: SlideId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Regenerated document could not be read: {0}")]
    Unreadable(String),
}

/// Checks that `candidate` keeps the slide skeleton of `prior`: same count,
/// same ids exactly once, same types.
pub fn validate_integrity(prior: &Document, candidate: &Document) -> Result<(), IntegrityViolation> {
    if prior.slide_count() != candidate.slide_count() {
        return Err(IntegrityViolation::SlideCountMismatch {
            expected: prior.slide_count(),
            actual: candidate.slide_count(),
        });
    }

    let mut seen = HashSet::new();
    for slide in &candidate.slides {
        if !seen.insert(&slide.id) {
            return Err(IntegrityViolation::DuplicateSlide(slide.id.clone()));
        }
        let Some(original) = prior.slide(&slide.id) else {
            return Err(IntegrityViolation::UnexpectedSlide(slide.id.clone()));
        };
        if original.slide_type != slide.slide_type {
            return Err(type_changed(&slide.id, original.slide_type, slide.slide_type));
        }
    }

    if let Some(missing) = prior.slides.iter().find(|s| !seen.contains(&s.id)) {
        return Err(IntegrityViolation::MissingSlide(missing.id.clone()));
    }
    Ok(())
}

fn type_changed(id: &SlideId, expected: SlideType, actual: SlideType) -> IntegrityViolation {
    IntegrityViolation::SlideTypeChanged {
        slide_id: id.clone(),
        expected: expected.as_str(),
        actual: actual.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::presentation::{Slide, SlideContent, SlideLayout};

    fn slide(id: &str, slide_type: SlideType) -> Slide {
        Slide::new(SlideId::new(id).unwrap(), slide_type, SlideLayout::Bullets, SlideContent::titled(id))
    }

    fn prior() -> Document {
        Document::new("Deck", vec![slide("a", SlideType::Problem), slide("b", SlideType::Solution)])
    }

    #[test]
    fn identical_skeleton_passes() {
        let candidate = prior().with_slides(vec![slide("b", SlideType::Solution), slide("a", SlideType::Problem)]);
        assert!(validate_integrity(&prior(), &candidate).is_ok());
    }

    #[test]
    fn dropped_slide_is_a_count_mismatch() {
        let candidate = prior().with_slides(vec![slide("a", SlideType::Problem)]);
        assert_eq!(
            validate_integrity(&prior(), &candidate),
            Err(IntegrityViolation::SlideCountMismatch { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn renamed_slide_is_unexpected() {
        let candidate = prior().with_slides(vec![slide("a", SlideType::Problem), slide("c", SlideType::Solution)]);
        assert!(matches!(
            validate_integrity(&prior(), &candidate),
            Err(IntegrityViolation::UnexpectedSlide(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let candidate = prior().with_slides(vec![slide("a", SlideType::Problem), slide("a", SlideType::Problem)]);
        assert!(matches!(
            validate_integrity(&prior(), &candidate),
            Err(IntegrityViolation::DuplicateSlide(_))
        ));
    }

    #[test]
    fn changed_type_is_rejected() {
        let candidate = prior().with_slides(vec![slide("a", SlideType::Evidence), slide("b", SlideType::Solution)]);
        let err = validate_integrity(&prior(), &candidate).unwrap_err();
        assert_eq!(err.to_string(), "Slide a changed type from problem to evidence");
    }
}
