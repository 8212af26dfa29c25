//! Document aggregate - an ordered sequence of slides.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::slide::{Slide, SlideType};
use crate::domain::foundation::{DocumentId, SlideId, ValidationError};

/// Intended audience of a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Executive,
    Investor,
    Technical,
    Customer,
    Internal,
    #[default]
    #[serde(other)]
    General,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Executive => "executive",
            Audience::Investor => "investor",
            Audience::Technical => "technical",
            Audience::Customer => "customer",
            Audience::Internal => "internal",
            Audience::General => "general",
        }
    }
}

/// Tone the deck should strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Formal,
    Conversational,
    Persuasive,
    Inspirational,
    #[default]
    #[serde(other)]
    Neutral,
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_slide_count: Option<usize>,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    1
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            audience: Audience::default(),
            tone: Tone::default(),
            target_slide_count: None,
            version: default_version(),
        }
    }
}

/// A multi-slide presentation.
///
/// Documents are values: every refinement round produces a new one via
/// [`Document::with_slides`], the previous value stays intact for rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    pub slides: Vec<Slide>,
}

impl Document {
    pub fn new(title: impl Into<String>, slides: Vec<Slide>) -> Self {
        Self {
            id: DocumentId::new(),
            title: title.into(),
            subtitle: None,
            metadata: DocumentMetadata::default(),
            slides,
        }
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Produces the next version of this document with new slides.
    pub fn with_slides(&self, slides: Vec<Slide>) -> Self {
        let mut next = self.clone();
        next.slides = slides;
        next.metadata.version = self.metadata.version.saturating_add(1);
        next
    }

    /// Returns true when both documents carry the same title and slides.
    ///
    /// Ignores the version counter, so a regeneration that changed nothing
    /// compares equal to its input.
    pub fn same_content(&self, other: &Document) -> bool {
        self.title == other.title && self.subtitle == other.subtitle && self.slides == other.slides
    }

    pub fn slide(&self, id: &SlideId) -> Option<&Slide> {
        self.slides.iter().find(|s| &s.id == id)
    }

    pub fn slide_ids(&self) -> Vec<&SlideId> {
        self.slides.iter().map(|s| &s.id).collect()
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn has_slide_type(&self, slide_type: SlideType) -> bool {
        self.slides.iter().any(|s| s.slide_type == slide_type)
    }

    /// Lower-cased visible text of the whole deck, used for keyword matching.
    pub fn searchable_text(&self) -> String {
        let mut text = self.title.to_lowercase();
        if let Some(subtitle) = &self.subtitle {
            text.push(' ');
            text.push_str(&subtitle.to_lowercase());
        }
        for slide in &self.slides {
            for part in slide.content.visible_text() {
                text.push(' ');
                text.push_str(&part.to_lowercase());
            }
        }
        text
    }

    /// Checks structural well-formedness: at least one slide, unique ids.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.slides.is_empty() {
            return Err(ValidationError::empty_field("slides"));
        }
        let mut seen = HashSet::new();
        for slide in &self.slides {
            if !seen.insert(&slide.id) {
                return Err(ValidationError::duplicate("slide_id", slide.id.as_str()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::presentation::{SlideContent, SlideLayout};

    fn slide(id: &str, slide_type: SlideType) -> Slide {
        Slide::new(
            SlideId::new(id).unwrap(),
            slide_type,
            SlideLayout::Bullets,
            SlideContent::titled(format!("Slide {}", id)).with_bullets(["Point"]),
        )
    }

    #[test]
    fn with_slides_bumps_version_and_keeps_original() {
        let doc = Document::new("Deck", vec![slide("a", SlideType::Title)]);
        let next = doc.with_slides(vec![slide("a", SlideType::Title), slide("b", SlideType::Problem)]);

        assert_eq!(doc.slide_count(), 1);
        assert_eq!(next.slide_count(), 2);
        assert_eq!(next.metadata.version, doc.metadata.version + 1);
        assert_eq!(next.id, doc.id);
    }

    #[test]
    fn same_content_ignores_version() {
        let doc = Document::new("Deck", vec![slide("a", SlideType::Title)]);
        let next = doc.with_slides(doc.slides.clone());
        assert_ne!(doc, next);
        assert!(doc.same_content(&next));
    }

    #[test]
    fn validate_rejects_empty_and_duplicates() {
        let empty = Document::new("Deck", vec![]);
        assert!(empty.validate().is_err());

        let dup = Document::new("Deck", vec![slide("a", SlideType::Title), slide("a", SlideType::Problem)]);
        assert!(matches!(dup.validate(), Err(ValidationError::Duplicate { .. })));

        let ok = Document::new("Deck", vec![slide("a", SlideType::Title), slide("b", SlideType::Problem)]);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn searchable_text_is_lowercase() {
        let doc = Document::new("Quarterly REVIEW", vec![slide("a", SlideType::Title)]);
        let text = doc.searchable_text();
        assert!(text.contains("quarterly review"));
        assert!(text.contains("point"));
    }

    #[test]
    fn metadata_defaults_when_missing() {
        let json = r#"{"id":"550e8400-e29b-41d4-a716-446655440000","title":"T","slides":[]}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.metadata.version, 1);
        assert_eq!(doc.metadata.audience, Audience::General);
    }
}
