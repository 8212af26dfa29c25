//! Refinement session handler, its cancellation token and errors.

mod cancellation;
mod error;
mod handler;

pub use cancellation::CancellationToken;
pub use error::{ConfigurationError, RefinePresentationError};
pub use handler::{RefinePresentationCommand, RefinePresentationHandler};
