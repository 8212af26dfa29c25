//! Per-slide change log of a regeneration.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{IssueId, SlideId};
use crate::domain::presentation::{ContentField, Document, Slide};
use crate::domain::scoring::Issue;

/// Kind of change made to a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Content,
    Structure,
    Data,
    Framework,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Content => "content",
            ChangeType::Structure => "structure",
            ChangeType::Data => "data",
            ChangeType::Framework => "framework",
        }
    }
}

/// What changed on one slide and which issues it addressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub slide_id: SlideId,
    pub change_type: ChangeType,
    pub fields: Vec<ContentField>,
    pub description: String,
    pub addressed_issues: Vec<IssueId>,
}

/// Compares `before` and `after` slide by slide.
///
/// Issues count as addressed when they are actionable and affect a changed
/// slide. Slides present in only one document are ignored.
pub fn diff_documents(before: &Document, after: &Document, issues: &[Issue]) -> Vec<ChangeRecord> {
    before
        .slides
        .iter()
        .filter_map(|old| {
            let new = after.slide(&old.id)?;
            diff_slide(old, new, issues)
        })
        .collect()
}

fn diff_slide(old: &Slide, new: &Slide, issues: &[Issue]) -> Option<ChangeRecord> {
    let fields: Vec<ContentField> = ContentField::ALL
        .iter()
        .copied()
        .filter(|f| !old.content.field_eq(&new.content, *f))
        .collect();
    let layout_changed = old.layout != new.layout;
    if fields.is_empty() && !layout_changed && old.content.extra == new.content.extra {
        return None;
    }

    let addressed: Vec<&Issue> = issues
        .iter()
        .filter(|i| i.is_actionable() && i.affects(&old.id))
        .collect();

    let change_type = if addressed.iter().any(|i| i.framework_related) {
        ChangeType::Framework
    } else if layout_changed {
        ChangeType::Structure
    } else if fields
        .iter()
        .any(|f| matches!(f, ContentField::Metrics | ContentField::Diagram))
    {
        ChangeType::Data
    } else {
        ChangeType::Content
    };

    let mut description = if fields.is_empty() {
        String::from("updated layout details")
    } else {
        let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
        format!("rewrote {}", names.join(", "))
    };
    if layout_changed {
        description.push_str(&format!(
            "; layout {} -> {}",
            old.layout.as_str(),
            new.layout.as_str()
        ));
    }

    Some(ChangeRecord {
        slide_id: old.id.clone(),
        change_type,
        fields,
        description,
        addressed_issues: addressed.iter().map(|i| i.id.clone()).collect(),
    })
}
