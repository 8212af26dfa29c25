//! Sanitization of untrusted service output.

use thiserror::Error;

/// Maximum accepted response length (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Maximum length of a single string field after parsing (10KB).
pub const MAX_FIELD_LENGTH: usize = 10_000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanitizationError {
    #[error("Response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },
}

const INJECTION_MARKERS: &[&str] = &[
    "```system",
    "```assistant",
    "[INST]",
    "[/INST]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|im_start|>",
    "<|im_end|>",
    "<<SYS>>",
    "<</SYS>>",
];

/// Cleans raw service output before it is parsed.
///
/// Applied to every generation and scoring response.
#[derive(Debug, Clone)]
pub struct ContentSanitizer {
    max_length: usize,
    additional_markers: Vec<String>,
}

impl Default for ContentSanitizer {
    fn default() -> Self {
        Self {
            max_length: MAX_RESPONSE_LENGTH,
            additional_markers: Vec::new(),
        }
    }
}

impl ContentSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_additional_markers(mut self, markers: Vec<String>) -> Self {
        self.additional_markers = markers;
        self
    }

    /// Rejects oversized input, strips control characters (newlines and
    /// tabs survive) and known prompt-injection markers.
    pub fn sanitize(&self, response: &str) -> Result<String, SanitizationError> {
        if response.len() > self.max_length {
            return Err(SanitizationError::TooLong {
                max: self.max_length,
                actual: response.len(),
            });
        }

        let mut cleaned: String = response
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
            .collect();

        for marker in INJECTION_MARKERS {
            cleaned = cleaned.replace(marker, "");
        }
        for marker in &self.additional_markers {
            cleaned = cleaned.replace(marker.as_str(), "");
        }
        Ok(cleaned)
    }

    /// Sanitizes every string inside a parsed value: HTML tags removed,
    /// overlong strings cut at [`MAX_FIELD_LENGTH`].
    pub fn sanitize_value(&self, value: serde_json::Value) -> serde_json::Value {
        use serde_json::Value;
        match value {
            Value::String(s) => Value::String(clean_field(&s)),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.sanitize_value(v)).collect())
            }
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, self.sanitize_value(v)))
                    .collect(),
            ),
            other => other,
        }
    }
}

fn clean_field(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    if result.len() > MAX_FIELD_LENGTH {
        let mut cut = MAX_FIELD_LENGTH;
        while !result.is_char_boundary(cut) {
            cut -= 1;
        }
        result.truncate(cut);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_control_characters_but_keeps_newlines() {
        let sanitizer = ContentSanitizer::new();
        let out = sanitizer.sanitize("a\u{0007}b\nc\td").unwrap();
        assert_eq!(out, "ab\nc\td");
    }

    #[test]
    fn strips_injection_markers() {
        let sanitizer = ContentSanitizer::new().with_additional_markers(vec!["<<EVIL>>".into()]);
        let out = sanitizer.sanitize("<|im_start|>{\"a\":1}<<EVIL>>").unwrap();
        assert_eq!(out, "{\"a\":1}");
    }

    #[test]
    fn rejects_oversized_responses() {
        let sanitizer = ContentSanitizer::new().with_max_length(4);
        assert_eq!(
            sanitizer.sanitize("12345"),
            Err(SanitizationError::TooLong { max: 4, actual: 5 })
        );
    }

    #[test]
    fn sanitize_value_cleans_nested_strings() {
        let sanitizer = ContentSanitizer::new();
        let value = json!({"slides": [{"title": "<b>Bold</b> claim", "n": 3}]});
        let out = sanitizer.sanitize_value(value);
        assert_eq!(out["slides"][0]["title"], "Bold claim");
        assert_eq!(out["slides"][0]["n"], 3);
    }

    #[test]
    fn comparison_signs_survive_outside_tags() {
        let sanitizer = ContentSanitizer::new();
        let out = sanitizer.sanitize_value(json!("growth > 20%"));
        assert_eq!(out, json!("growth > 20%"));
    }
}
