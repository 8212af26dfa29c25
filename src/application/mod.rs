//! Application layer - Handlers and the services behind the ports.
//!
//! Handlers drive the refinement loop; services adapt the AI provider to the
//! scoring, framework and regeneration ports.

pub mod handlers;
pub mod services;

pub use handlers::{
    CancellationToken, ConfigurationError, RefinePresentationCommand, RefinePresentationError,
    RefinePresentationHandler,
};
pub use services::{ContentRegenerator, FrameworkAnalyzer, ValidationAgent};
