//! Application handlers.
//!
//! Command handlers that orchestrate domain operations through ports.

pub mod refine_presentation;

pub use refine_presentation::{
    CancellationToken, ConfigurationError, RefinePresentationCommand, RefinePresentationError,
    RefinePresentationHandler,
};
