use thiserror::Error;

use super::integrity::IntegrityViolation;
use crate::domain::structured::ParseFailure;

/// Why a regeneration attempt produced no usable document.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegenerationError {
    #[error("Structural violation: {0}")]
    Integrity(#[from] IntegrityViolation),

    #[error("Unusable generation response: {0}")]
    Parse(#[from] ParseFailure),

    #[error("Generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Generation service error: {message}")]
    Provider { message: String, retryable: bool },
}

impl RegenerationError {
    /// Whether another attempt within the same round is allowed. Timeouts
    /// fail the round.
    pub fn is_retryable(&self) -> bool {
        match self {
            RegenerationError::Integrity(_) => true,
            RegenerationError::Parse(failure) => failure.is_retryable(),
            RegenerationError::Timeout { .. } => false,
            RegenerationError::Provider { retryable, .. } => *retryable,
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, RegenerationError::Integrity(_))
    }
}
