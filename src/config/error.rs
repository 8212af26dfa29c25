//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid timeout: {0} must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("Invalid dimension weights: {0}")]
    InvalidWeights(String),

    #[error("Target score must be within 0-100, got {0}")]
    InvalidTarget(f64),

    #[error("max_rounds must be at least 1")]
    InvalidRounds,

    #[error("Invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Unknown framework: {0}")]
    UnknownFramework(String),

    #[error("Invalid framework catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid curriculum: {0}")]
    InvalidCurriculum(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
