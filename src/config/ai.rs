//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::ai::AnthropicConfig;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Anthropic API key for the primary provider
    pub anthropic_api_key: Option<Secret<String>>,

    /// Optional second key used by the failover provider
    pub fallback_api_key: Option<Secret<String>>,

    /// Model for the content-generation service
    #[serde(default = "default_model")]
    pub generation_model: String,

    /// Model for the content-scoring service
    #[serde(default = "default_model")]
    pub scoring_model: String,

    /// Model used with the fallback key; defaults to the primary model
    pub fallback_model: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Transport-level retries inside the provider
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_anthropic(&self) -> bool {
        self.anthropic_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Provider settings for `model` with the primary key.
    pub fn primary(&self, model: &str) -> Option<AnthropicConfig> {
        let key = self.anthropic_api_key.clone()?;
        Some(self.provider_config(key, model))
    }

    /// Provider settings for the fallback key, if one is set.
    pub fn fallback(&self, model: &str) -> Option<AnthropicConfig> {
        let key = self.fallback_api_key.clone()?;
        let model = self.fallback_model.as_deref().unwrap_or(model);
        Some(self.provider_config(key, model))
    }

    fn provider_config(&self, key: Secret<String>, model: &str) -> AnthropicConfig {
        AnthropicConfig::from_secret(key)
            .with_model(model)
            .with_base_url(&self.base_url)
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries)
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_anthropic() {
            return Err(ValidationError::MissingRequired("ANTHROPIC_API_KEY"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("ai.timeout_secs"));
        }
        if self.generation_model.trim().is_empty() || self.scoring_model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI model name"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            fallback_api_key: None,
            generation_model: default_model(),
            scoring_model: default_model(),
            fallback_model: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    1
}
