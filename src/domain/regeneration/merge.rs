//! Field-level merge of a regenerated document into the prior one.
//!
//! Per field: preserved fields come from the prior slide, improved fields
//! from the candidate, anything else from the candidate when it carries a
//! value and from the prior slide otherwise. Slide ids, types and order
//! always come from the prior document.

use super::preservation::{PreservationPlan, PreservationStrategy};
use crate::domain::presentation::{ContentField, Document, Slide};

/// Merges `candidate` into `prior`. The candidate must already have passed
/// [`validate_integrity`](super::validate_integrity); slides missing from
/// it are kept unchanged.
pub fn merge_documents(prior: &Document, candidate: &Document, plan: &PreservationPlan) -> Document {
    let slides = prior
        .slides
        .iter()
        .map(|old| match candidate.slide(&old.id) {
            Some(new) => merge_slide(old, new, plan),
            None => old.clone(),
        })
        .collect();
    prior.with_slides(slides)
}

fn merge_slide(old: &Slide, new: &Slide, plan: &PreservationPlan) -> Slide {
    let Some(decision) = plan.for_slide(&old.id) else {
        return old.clone();
    };
    if decision.strategy == PreservationStrategy::PreserveCompletely {
        return old.clone();
    }

    let preserved = decision.preserved_fields();
    let improved = decision.improved_fields();

    let mut content = old.content.clone();
    for field in ContentField::ALL {
        if preserved.contains(&field) {
            continue;
        }
        if improved.contains(&field) || new.content.has_field(field) {
            content.copy_field_from(field, &new.content);
        }
    }
    for (key, value) in &new.content.extra {
        content.extra.insert(key.clone(), value.clone());
    }

    let layout = if new.layout.family() == old.layout.family() {
        new.layout
    } else {
        old.layout
    };

    Slide {
        id: old.id.clone(),
        slide_type: old.slide_type,
        layout,
        content,
    }
}
