//! Structured response parsing.
//!
//! Pipeline: sanitize, direct parse, then each [`RepairStrategy`] in order
//! with a parse attempt after every rewrite. A parsed value is then checked
//! against a [`ResponseSchema`]: required fields must be present, optional
//! fields missing from the payload are backfilled with neutral defaults.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use super::repair::{default_strategies, RepairStrategy};
use super::sanitizer::{ContentSanitizer, SanitizationError};

/// Parsing gave up. Carried as a value; never a panic.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseFailure {
    #[error("Sanitization failed: {0}")]
    Sanitization(#[from] SanitizationError),

    #[error("Unparseable response after {attempts} attempts: {last_error}")]
    Unparseable { attempts: usize, last_error: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),
}

impl ParseFailure {
    /// Malformed payloads are treated as transient: the service may well
    /// answer correctly when asked again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ParseFailure::Sanitization(_))
    }
}

/// Default for an optional field, at the top level or inside every element
/// of an array field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefault {
    pub within: Option<&'static str>,
    pub field: &'static str,
    pub value: Value,
}

/// Expected shape of a response object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseSchema {
    pub required: Vec<&'static str>,
    pub defaults: Vec<FieldDefault>,
}

impl ResponseSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, field: &'static str) -> Self {
        self.required.push(field);
        self
    }

    pub fn default_value(mut self, field: &'static str, value: Value) -> Self {
        self.defaults.push(FieldDefault {
            within: None,
            field,
            value,
        });
        self
    }

    pub fn default_in_each(mut self, array: &'static str, field: &'static str, value: Value) -> Self {
        self.defaults.push(FieldDefault {
            within: Some(array),
            field,
            value,
        });
        self
    }
}

/// A successfully parsed response with the repairs it needed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub value: Value,
    pub repairs: Vec<&'static str>,
}

impl ParsedResponse {
    pub fn was_repaired(&self) -> bool {
        !self.repairs.is_empty()
    }

    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ParseFailure> {
        serde_json::from_value(self.value).map_err(|e| ParseFailure::SchemaViolation(e.to_string()))
    }
}

/// Parses untrusted service output into JSON.
pub struct StructuredResponseParser {
    sanitizer: ContentSanitizer,
    strategies: Vec<Box<dyn RepairStrategy>>,
}

impl Default for StructuredResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuredResponseParser {
    pub fn new() -> Self {
        Self {
            sanitizer: ContentSanitizer::new(),
            strategies: default_strategies(),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: ContentSanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Replaces the repair pipeline.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn RepairStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Sanitizes and parses `raw`, applying repairs as needed.
    pub fn parse(&self, raw: &str) -> Result<ParsedResponse, ParseFailure> {
        let sanitized = self.sanitizer.sanitize(raw)?;

        let mut attempts = 1;
        let mut last_error = match serde_json::from_str::<Value>(sanitized.trim()) {
            Ok(value) => return Ok(self.finish(value, Vec::new())),
            Err(e) => e.to_string(),
        };

        let mut candidate = sanitized;
        let mut repairs = Vec::new();
        for strategy in &self.strategies {
            let Some(repaired) = strategy.repair(&candidate) else {
                continue;
            };
            attempts += 1;
            tracing::debug!(strategy = strategy.name(), "applied response repair");
            repairs.push(strategy.name());
            match serde_json::from_str::<Value>(repaired.trim()) {
                Ok(value) => return Ok(self.finish(value, repairs)),
                Err(e) => last_error = e.to_string(),
            }
            candidate = repaired;
        }

        Err(ParseFailure::Unparseable {
            attempts,
            last_error,
        })
    }

    /// Parses and validates against `schema`, backfilling defaults.
    pub fn parse_with_schema(
        &self,
        raw: &str,
        schema: &ResponseSchema,
    ) -> Result<ParsedResponse, ParseFailure> {
        let mut parsed = self.parse(raw)?;
        let Value::Object(map) = &mut parsed.value else {
            return Err(ParseFailure::SchemaViolation("expected a JSON object".to_string()));
        };

        for field in &schema.required {
            if map.get(*field).map_or(true, Value::is_null) {
                return Err(ParseFailure::MissingField((*field).to_string()));
            }
        }

        let mut backfilled = false;
        for default in &schema.defaults {
            backfilled |= apply_default(map, default);
        }
        if backfilled {
            tracing::debug!(strategy = "backfill", "filled optional fields with defaults");
            parsed.repairs.push("backfill");
        }
        Ok(parsed)
    }

    fn finish(&self, value: Value, repairs: Vec<&'static str>) -> ParsedResponse {
        ParsedResponse {
            value: self.sanitizer.sanitize_value(value),
            repairs,
        }
    }
}

fn apply_default(map: &mut Map<String, Value>, default: &FieldDefault) -> bool {
    fn fill(object: &mut Map<String, Value>, field: &str, value: &Value) -> bool {
        if object.get(field).map_or(true, Value::is_null) {
            object.insert(field.to_string(), value.clone());
            true
        } else {
            false
        }
    }

    match default.within {
        None => fill(map, default.field, &default.value),
        Some(array) => {
            let Some(Value::Array(items)) = map.get_mut(array) else {
                return false;
            };
            let mut changed = false;
            for item in items.iter_mut() {
                if let Value::Object(object) = item {
                    changed |= fill(object, default.field, &default.value);
                }
            }
            changed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser() -> StructuredResponseParser {
        StructuredResponseParser::new()
    }

    #[test]
    fn clean_json_needs_no_repair() {
        let parsed = parser().parse(r#"{"score": 80}"#).unwrap();
        assert_eq!(parsed.value, json!({"score": 80}));
        assert!(!parsed.was_repaired());
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let parsed = parser()
            .parse("Here is the result:\n```json\n{\"score\": 80}\n```")
            .unwrap();
        assert_eq!(parsed.value["score"], 80);
        assert_eq!(parsed.repairs, vec!["strip_fencing"]);
    }

    #[test]
    fn truncated_payload_is_recovered() {
        let raw = r#"{"issues": [{"type": "clarity"}, {"type": "flow"}, {"type""#;
        let parsed = parser().parse(raw).unwrap();
        assert_eq!(parsed.value["issues"].as_array().unwrap().len(), 2);
        assert!(parsed.repairs.contains(&"truncate_incomplete"));
    }

    #[test]
    fn missing_separator_between_members_is_repaired() {
        let raw = "{\"dimension_scores\": {\"clarity\": 90\n\"business_impact\": 60}}";
        let parsed = parser().parse(raw).unwrap();
        assert_eq!(parsed.value["dimension_scores"]["clarity"], 90);
        assert_eq!(parsed.value["dimension_scores"]["business_impact"], 60);
        assert_eq!(parsed.repairs, vec!["insert_missing_separators"]);
    }

    #[test]
    fn trailing_comma_is_repaired_without_losing_members() {
        let raw = r#"{"issues": [{"type": "clarity"}, {"type": "flow"},]}"#;
        let parsed = parser().parse(raw).unwrap();
        assert_eq!(parsed.value["issues"].as_array().unwrap().len(), 2);
        assert_eq!(parsed.repairs, vec!["insert_missing_separators"]);
    }

    #[test]
    fn hopeless_input_is_a_failure_value() {
        let err = parser().parse("I cannot help with that.").unwrap_err();
        assert!(matches!(err, ParseFailure::Unparseable { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn oversized_input_is_not_retryable() {
        let parser = parser().with_sanitizer(ContentSanitizer::new().with_max_length(3));
        let err = parser.parse("{\"a\": 1}").unwrap_err();
        assert!(matches!(err, ParseFailure::Sanitization(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn schema_rejects_missing_required_fields() {
        let schema = ResponseSchema::new().require("scores");
        let err = parser().parse_with_schema(r#"{"issues": []}"#, &schema).unwrap_err();
        assert_eq!(err, ParseFailure::MissingField("scores".to_string()));
    }

    #[test]
    fn schema_backfills_optional_fields() {
        let schema = ResponseSchema::new()
            .require("issues")
            .default_in_each("issues", "confidence", json!(50))
            .default_value("summary", json!(""));
        let raw = r#"{"issues": [{"type": "flow"}, {"type": "clarity", "confidence": 90}]}"#;
        let parsed = parser().parse_with_schema(raw, &schema).unwrap();
        assert_eq!(parsed.value["issues"][0]["confidence"], 50);
        assert_eq!(parsed.value["issues"][1]["confidence"], 90);
        assert_eq!(parsed.value["summary"], "");
        assert_eq!(parsed.repairs, vec!["backfill"]);
    }

    #[test]
    fn arrays_are_not_objects() {
        let err = parser()
            .parse_with_schema("[1, 2]", &ResponseSchema::new())
            .unwrap_err();
        assert!(matches!(err, ParseFailure::SchemaViolation(_)));
    }

    #[test]
    fn custom_pipeline_can_disable_repairs() {
        let parser = parser().with_strategies(Vec::new());
        assert!(parser.strategy_names().is_empty());
        assert!(parser.parse("```json\n{}\n```").is_err());
    }
}
