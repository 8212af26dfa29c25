//! Errors of the refine-presentation handler.

use thiserror::Error;

use crate::config::ValidationError as ConfigValidationError;
use crate::domain::foundation::ValidationError;
use crate::ports::AIError;

/// Fatal problems detected before any remote call is made.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigValidationError),

    #[error("Invalid input document: {0}")]
    InvalidDocument(#[from] ValidationError),

    #[error("Provider could not be built: {0}")]
    Provider(#[from] AIError),
}

/// Why a refinement session could not produce a result.
///
/// Remote failures never surface here: they are absorbed by retries,
/// rule-based fallbacks and failed round records.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RefinePresentationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Session state violated: {0}")]
    Session(#[from] ValidationError),
}
