//! Content profile - the facts both rule-based passes read.
//!
//! Extracted once per document so the scoring pass and the issue pass work
//! from the same view of the content.

use std::collections::HashMap;

use crate::domain::foundation::SlideId;
use crate::domain::presentation::{ContentField, Document, SlideType};

/// Bullets longer than this many words count as wordy.
pub const LONG_BULLET_WORDS: usize = 20;

/// Slides with more bullets than this are overloaded.
pub const MAX_BULLETS_PER_SLIDE: usize = 6;

/// Headlines inside this word range read well.
pub const HEADLINE_WORDS: (usize, usize) = (3, 12);

pub(crate) const JARGON: &[&str] = &[
    "synergy",
    "leverage",
    "paradigm",
    "best-of-breed",
    "holistic",
    "bandwidth",
    "api",
    "microservice",
    "kubernetes",
    "latency",
    "throughput",
    "orchestration",
    "idempotent",
];

pub(crate) const OUTCOME_WORDS: &[&str] = &[
    "increase", "reduce", "save", "grow", "revenue", "roi", "cost", "profit", "efficien",
    "margin", "faster",
];

pub(crate) const VALUE_WORDS: &[&str] = &[
    "value", "benefit", "because", "so that", "which means", "enables", "helps",
];

pub(crate) const NEXT_STEP_WORDS: &[&str] = &[
    "next step", "approve", "contact", "decision", "get started", "pilot", "schedule", "sign",
];

/// Per-slide facts.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideProfile {
    pub id: SlideId,
    pub slide_type: SlideType,
    pub headline_words: usize,
    pub bullet_count: usize,
    pub long_bullets: usize,
    pub numeric_points: usize,
    pub jargon_hits: usize,
    pub missing_fields: Vec<ContentField>,
    pub is_empty: bool,
}

/// Document-wide facts.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentProfile {
    pub slides: Vec<SlideProfile>,
    pub outcome_hits: usize,
    pub value_hits: usize,
    pub next_step_hits: usize,
    pub has_cta_slide: bool,
    /// Headline text to the slides using it, for headlines used more than once.
    pub duplicate_headlines: Vec<(String, Vec<SlideId>)>,
}

impl ContentProfile {
    pub fn extract(document: &Document) -> Self {
        let slides: Vec<SlideProfile> = document
            .slides
            .iter()
            .map(|slide| {
                let content = &slide.content;
                let text = content.visible_text().join(" ").to_lowercase();
                let bullets: Vec<&str> = content.all_bullets().collect();
                SlideProfile {
                    id: slide.id.clone(),
                    slide_type: slide.slide_type,
                    headline_words: slide.headline().map(word_count).unwrap_or(0),
                    bullet_count: bullets.len(),
                    long_bullets: bullets.iter().filter(|b| word_count(b) > LONG_BULLET_WORDS).count(),
                    numeric_points: content.metrics.len()
                        + bullets.iter().filter(|b| has_number(b)).count(),
                    jargon_hits: count_hits(&text, JARGON),
                    missing_fields: slide.missing_required_fields(),
                    is_empty: text.trim().is_empty(),
                }
            })
            .collect();

        let text = document.searchable_text();
        let has_cta_slide = document
            .slides
            .iter()
            .any(|s| s.slide_type == SlideType::CallToAction && !s.content.visible_text().is_empty());

        Self {
            slides,
            outcome_hits: count_hits(&text, OUTCOME_WORDS),
            value_hits: count_hits(&text, VALUE_WORDS),
            next_step_hits: count_hits(&text, NEXT_STEP_WORDS),
            has_cta_slide,
            duplicate_headlines: duplicate_headlines(document),
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn total_bullets(&self) -> usize {
        self.slides.iter().map(|s| s.bullet_count).sum()
    }

    pub fn total_long_bullets(&self) -> usize {
        self.slides.iter().map(|s| s.long_bullets).sum()
    }

    pub fn total_numeric_points(&self) -> usize {
        self.slides.iter().map(|s| s.numeric_points).sum()
    }

    pub fn total_jargon(&self) -> usize {
        self.slides.iter().map(|s| s.jargon_hits).sum()
    }

    pub fn average_bullets(&self) -> f64 {
        if self.slides.is_empty() {
            return 0.0;
        }
        self.total_bullets() as f64 / self.slides.len() as f64
    }

    /// Slides whose headline falls inside [`HEADLINE_WORDS`].
    pub fn good_headlines(&self) -> usize {
        let (min, max) = HEADLINE_WORDS;
        self.slides
            .iter()
            .filter(|s| (min..=max).contains(&s.headline_words))
            .count()
    }
}

pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn has_number(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit()) || text.contains('%') || text.contains('$')
}

/// Number of distinct keywords present in `text`.
pub(crate) fn count_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| contains_word(text, k)).count()
}

/// Word-boundary aware for single words, substring for phrases and stems.
fn contains_word(text: &str, keyword: &str) -> bool {
    if keyword.contains(' ') || keyword.len() > 6 {
        return text.contains(keyword);
    }
    text.split(|c: char| !c.is_alphanumeric() && c != '-')
        .any(|word| word == keyword || (keyword.len() > 3 && word.starts_with(keyword)))
}

fn duplicate_headlines(document: &Document) -> Vec<(String, Vec<SlideId>)> {
    let mut by_headline: HashMap<String, Vec<SlideId>> = HashMap::new();
    let mut order = Vec::new();
    for slide in &document.slides {
        let Some(headline) = slide.headline() else {
            continue;
        };
        let key = headline.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        let entry = by_headline.entry(key.clone()).or_default();
        if entry.is_empty() {
            order.push(key);
        }
        entry.push(slide.id.clone());
    }
    order
        .into_iter()
        .filter_map(|key| {
            let ids = by_headline.remove(&key)?;
            (ids.len() > 1).then_some((key, ids))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::presentation::{Metric, Slide, SlideContent, SlideLayout};

    fn slide(id: &str, slide_type: SlideType, content: SlideContent) -> Slide {
        Slide::new(SlideId::new(id).unwrap(), slide_type, SlideLayout::Bullets, content)
    }

    #[test]
    fn extracts_slide_facts() {
        let doc = Document::new(
            "Deck",
            vec![slide(
                "s1",
                SlideType::Evidence,
                SlideContent::titled("Revenue grew across every region")
                    .with_bullets(["Costs reduced 40% year over year", "Leverage synergy across teams"])
                    .with_metric(Metric::new("ARR", "$12M")),
            )],
        );
        let profile = ContentProfile::extract(&doc);
        let s = &profile.slides[0];
        assert_eq!(s.headline_words, 5);
        assert_eq!(s.bullet_count, 2);
        assert_eq!(s.numeric_points, 2);
        assert_eq!(s.jargon_hits, 2);
        assert!(s.missing_fields.is_empty());
        assert!(profile.outcome_hits >= 2);
    }

    #[test]
    fn keyword_matching_respects_word_boundaries() {
        // "api" must not match inside "capital"
        assert_eq!(count_hits("raising capital", &["api"]), 0);
        assert_eq!(count_hits("a public api", &["api"]), 1);
        assert_eq!(count_hits("increased margins", &["increase"]), 1);
    }

    #[test]
    fn detects_duplicate_headlines() {
        let doc = Document::new(
            "Deck",
            vec![
                slide("s1", SlideType::Problem, SlideContent::titled("Why now")),
                slide("s2", SlideType::Solution, SlideContent::titled("How")),
                slide("s3", SlideType::Benefits, SlideContent::titled("why now ")),
            ],
        );
        let profile = ContentProfile::extract(&doc);
        assert_eq!(profile.duplicate_headlines.len(), 1);
        assert_eq!(profile.duplicate_headlines[0].1.len(), 2);
    }

    #[test]
    fn cta_slide_requires_content() {
        let doc = Document::new(
            "Deck",
            vec![slide("s1", SlideType::CallToAction, SlideContent::default())],
        );
        let profile = ContentProfile::extract(&doc);
        assert!(!profile.has_cta_slide);
        assert!(profile.slides[0].is_empty);
    }
}
