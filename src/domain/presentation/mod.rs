//! Presentation model - documents, slides and slide content.

mod content;
mod document;
mod slide;

pub use content::{ContentField, ContentSection, Diagram, Metric, SlideContent};
pub use document::{Audience, Document, DocumentMetadata, Tone};
pub use slide::{LayoutFamily, Slide, SlideLayout, SlideType};
