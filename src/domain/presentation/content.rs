//! Slide content payload.
//!
//! Content is an open record: well-known fields are typed, anything else the
//! generation service sends lands in `extra` and is carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named field of [`SlideContent`], the unit of preservation and merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentField {
    Title,
    Subtitle,
    Bullets,
    Sections,
    Metrics,
    Callout,
    Diagram,
    SpeakerNotes,
}

impl ContentField {
    /// Every field, in merge order.
    pub const ALL: [ContentField; 8] = [
        ContentField::Title,
        ContentField::Subtitle,
        ContentField::Bullets,
        ContentField::Sections,
        ContentField::Metrics,
        ContentField::Callout,
        ContentField::Diagram,
        ContentField::SpeakerNotes,
    ];

    /// Fields treated as "strong" elements worth keeping when a slide is
    /// only lightly flagged.
    pub const STRONG: [ContentField; 3] = [
        ContentField::Metrics,
        ContentField::Sections,
        ContentField::SpeakerNotes,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentField::Title => "title",
            ContentField::Subtitle => "subtitle",
            ContentField::Bullets => "bullets",
            ContentField::Sections => "sections",
            ContentField::Metrics => "metrics",
            ContentField::Callout => "callout",
            ContentField::Diagram => "diagram",
            ContentField::SpeakerNotes => "speaker_notes",
        }
    }
}

/// A titled group of bullets (used by two-column and timeline layouts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub heading: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

/// A quantified data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            context: None,
        }
    }
}

/// A simple diagram description (flow, hierarchy, cycle, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub kind: String,
    #[serde(default)]
    pub nodes: Vec<String>,
}

/// Content payload of a single slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bullets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<ContentSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<Diagram>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_notes: Option<String>,
    /// Unknown fields, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SlideContent {
    /// Creates content with just a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bullets = bullets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn with_section(mut self, heading: impl Into<String>, bullets: Vec<String>) -> Self {
        self.sections.push(ContentSection {
            heading: heading.into(),
            bullets,
        });
        self
    }

    pub fn with_callout(mut self, callout: impl Into<String>) -> Self {
        self.callout = Some(callout.into());
        self
    }

    pub fn with_speaker_notes(mut self, notes: impl Into<String>) -> Self {
        self.speaker_notes = Some(notes.into());
        self
    }

    /// Returns true if the field carries a non-empty value.
    pub fn has_field(&self, field: ContentField) -> bool {
        fn filled(s: &Option<String>) -> bool {
            s.as_deref().is_some_and(|v| !v.trim().is_empty())
        }

        match field {
            ContentField::Title => filled(&self.title),
            ContentField::Subtitle => filled(&self.subtitle),
            ContentField::Bullets => !self.bullets.is_empty(),
            ContentField::Sections => !self.sections.is_empty(),
            ContentField::Metrics => !self.metrics.is_empty(),
            ContentField::Callout => filled(&self.callout),
            ContentField::Diagram => self.diagram.is_some(),
            ContentField::SpeakerNotes => filled(&self.speaker_notes),
        }
    }

    /// Overwrites one field with the value from `source`.
    pub fn copy_field_from(&mut self, field: ContentField, source: &SlideContent) {
        match field {
            ContentField::Title => self.title = source.title.clone(),
            ContentField::Subtitle => self.subtitle = source.subtitle.clone(),
            ContentField::Bullets => self.bullets = source.bullets.clone(),
            ContentField::Sections => self.sections = source.sections.clone(),
            ContentField::Metrics => self.metrics = source.metrics.clone(),
            ContentField::Callout => self.callout = source.callout.clone(),
            ContentField::Diagram => self.diagram = source.diagram.clone(),
            ContentField::SpeakerNotes => self.speaker_notes = source.speaker_notes.clone(),
        }
    }

    /// Returns true if the field has the same value in both payloads.
    pub fn field_eq(&self, other: &SlideContent, field: ContentField) -> bool {
        match field {
            ContentField::Title => self.title == other.title,
            ContentField::Subtitle => self.subtitle == other.subtitle,
            ContentField::Bullets => self.bullets == other.bullets,
            ContentField::Sections => self.sections == other.sections,
            ContentField::Metrics => self.metrics == other.metrics,
            ContentField::Callout => self.callout == other.callout,
            ContentField::Diagram => self.diagram == other.diagram,
            ContentField::SpeakerNotes => self.speaker_notes == other.speaker_notes,
        }
    }

    /// All visible text on the slide (speaker notes excluded).
    pub fn visible_text(&self) -> Vec<&str> {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.title.as_deref());
        parts.extend(self.subtitle.as_deref());
        parts.extend(self.bullets.iter().map(String::as_str));
        for section in &self.sections {
            parts.push(&section.heading);
            parts.extend(section.bullets.iter().map(String::as_str));
        }
        for metric in &self.metrics {
            parts.push(&metric.label);
            parts.push(&metric.value);
            parts.extend(metric.context.as_deref());
        }
        parts.extend(self.callout.as_deref());
        if let Some(diagram) = &self.diagram {
            parts.extend(diagram.nodes.iter().map(String::as_str));
        }
        parts
    }

    /// Every bullet on the slide, including section bullets.
    pub fn all_bullets(&self) -> impl Iterator<Item = &str> {
        self.bullets
            .iter()
            .chain(self.sections.iter().flat_map(|s| s.bullets.iter()))
            .map(String::as_str)
    }
}
