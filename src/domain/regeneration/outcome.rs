use super::changes::ChangeRecord;
use super::error::RegenerationError;
use crate::domain::presentation::Document;

/// Result of one regeneration call.
///
/// On failure `document` is the caller's document, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RegenerationOutcome {
    pub success: bool,
    pub document: Document,
    pub changes: Vec<ChangeRecord>,
    pub error: Option<RegenerationError>,
    /// Generation calls made; zero when the call was skipped.
    pub attempts: u32,
}

impl RegenerationOutcome {
    pub fn succeeded(document: Document, changes: Vec<ChangeRecord>, attempts: u32) -> Self {
        Self {
            success: true,
            document,
            changes,
            error: None,
            attempts,
        }
    }

    /// Nothing to regenerate; the input comes back as is.
    pub fn skipped(document: Document) -> Self {
        Self {
            success: true,
            document,
            changes: Vec::new(),
            error: None,
            attempts: 0,
        }
    }

    pub fn failed(prior: Document, error: RegenerationError, attempts: u32) -> Self {
        Self {
            success: false,
            document: prior,
            changes: Vec::new(),
            error: Some(error),
            attempts,
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.success && self.attempts == 0
    }
}
