//! Slide entity, slide types and layouts.

use serde::{Deserialize, Serialize};

use super::content::{ContentField, SlideContent};
use crate::domain::foundation::SlideId;

/// Narrative role of a slide. Immutable once the slide exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideType {
    Title,
    Agenda,
    Situation,
    Problem,
    Solution,
    Benefits,
    Evidence,
    Comparison,
    Timeline,
    Team,
    Financials,
    CallToAction,
    Summary,
    Appendix,
    #[serde(other)]
    Other,
}

impl SlideType {
    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideType::Title => "title",
            SlideType::Agenda => "agenda",
            SlideType::Situation => "situation",
            SlideType::Problem => "problem",
            SlideType::Solution => "solution",
            SlideType::Benefits => "benefits",
            SlideType::Evidence => "evidence",
            SlideType::Comparison => "comparison",
            SlideType::Timeline => "timeline",
            SlideType::Team => "team",
            SlideType::Financials => "financials",
            SlideType::CallToAction => "call_to_action",
            SlideType::Summary => "summary",
            SlideType::Appendix => "appendix",
            SlideType::Other => "other",
        }
    }
}

/// Coarse grouping of layouts; a broad regeneration may switch layout only
/// within the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutFamily {
    Title,
    Text,
    Visual,
    Data,
    Freeform,
}

/// Visual arrangement of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideLayout {
    Title,
    Bullets,
    TwoColumn,
    Metrics,
    Diagram,
    Callout,
    Timeline,
    #[serde(other)]
    Freeform,
}

impl SlideLayout {
    pub fn family(&self) -> LayoutFamily {
        match self {
            SlideLayout::Title => LayoutFamily::Title,
            SlideLayout::Bullets | SlideLayout::TwoColumn | SlideLayout::Callout => {
                LayoutFamily::Text
            }
            SlideLayout::Diagram | SlideLayout::Timeline => LayoutFamily::Visual,
            SlideLayout::Metrics => LayoutFamily::Data,
            SlideLayout::Freeform => LayoutFamily::Freeform,
        }
    }

    /// Fields a slide with this layout must fill to render properly.
    pub fn required_fields(&self) -> &'static [ContentField] {
        match self {
            SlideLayout::Title => &[ContentField::Title],
            SlideLayout::Bullets => &[ContentField::Title, ContentField::Bullets],
            SlideLayout::TwoColumn => &[ContentField::Title, ContentField::Sections],
            SlideLayout::Metrics => &[ContentField::Title, ContentField::Metrics],
            SlideLayout::Diagram => &[ContentField::Title, ContentField::Diagram],
            SlideLayout::Callout => &[ContentField::Callout],
            SlideLayout::Timeline => &[ContentField::Title, ContentField::Sections],
            SlideLayout::Freeform => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlideLayout::Title => "title",
            SlideLayout::Bullets => "bullets",
            SlideLayout::TwoColumn => "two_column",
            SlideLayout::Metrics => "metrics",
            SlideLayout::Diagram => "diagram",
            SlideLayout::Callout => "callout",
            SlideLayout::Timeline => "timeline",
            SlideLayout::Freeform => "freeform",
        }
    }
}

/// One slide of a document.
///
/// `id` and `slide_type` never change across refinement rounds; the merge
/// step always takes them from the prior document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    #[serde(rename = "type")]
    pub slide_type: SlideType,
    pub layout: SlideLayout,
    #[serde(default)]
    pub content: SlideContent,
}

impl Slide {
    pub fn new(id: SlideId, slide_type: SlideType, layout: SlideLayout, content: SlideContent) -> Self {
        Self {
            id,
            slide_type,
            layout,
            content,
        }
    }

    /// Required fields of the layout that the content leaves empty.
    pub fn missing_required_fields(&self) -> Vec<ContentField> {
        self.layout
            .required_fields()
            .iter()
            .copied()
            .filter(|field| !self.content.has_field(*field))
            .collect()
    }

    /// The slide headline, if any.
    pub fn headline(&self) -> Option<&str> {
        self.content.title.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(layout: SlideLayout, content: SlideContent) -> Slide {
        Slide::new(SlideId::new("s1").unwrap(), SlideType::Problem, layout, content)
    }

    #[test]
    fn missing_required_fields_follows_layout_checklist() {
        let s = slide(SlideLayout::Metrics, SlideContent::titled("KPIs"));
        assert_eq!(s.missing_required_fields(), vec![ContentField::Metrics]);

        let s = slide(SlideLayout::Freeform, SlideContent::default());
        assert!(s.missing_required_fields().is_empty());
    }

    #[test]
    fn layout_families_group_text_layouts() {
        assert_eq!(SlideLayout::Bullets.family(), SlideLayout::TwoColumn.family());
        assert_ne!(SlideLayout::Bullets.family(), SlideLayout::Metrics.family());
    }

    #[test]
    fn slide_type_serializes_under_type_key() {
        let s = slide(SlideLayout::Title, SlideContent::titled("Hello"));
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "problem");
        assert_eq!(json["layout"], "title");
    }

    #[test]
    fn unknown_slide_type_and_layout_fall_back() {
        let json = r#"{"id":"x","type":"mystery","layout":"hexagon"}"#;
        let s: Slide = serde_json::from_str(json).unwrap();
        assert_eq!(s.slide_type, SlideType::Other);
        assert_eq!(s.layout, SlideLayout::Freeform);
    }
}
