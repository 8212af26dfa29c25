//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the refinement loop and the outside world. Adapters implement these ports.
//!
//! ## Remote Services
//!
//! - `AIProvider` - Language model completions (generation and scoring services)
//!
//! ## Loop Collaborators
//!
//! - `DocumentScorer` - Scores a document (validation agent)
//! - `FrameworkRecommender` - Recommends a narrative framework
//! - `DocumentRegenerator` - Regenerates weak parts of a document
//! - `ProgressPublisher` - Pushes progress snapshots to observers

mod ai_provider;
mod document_regenerator;
mod document_scorer;
mod framework_recommender;
mod progress_publisher;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, RequestPurpose, TokenUsage,
};
pub use document_regenerator::{DocumentRegenerator, RegenerationRequest};
pub use document_scorer::{DocumentScorer, ScoringRequest};
pub use framework_recommender::FrameworkRecommender;
pub use progress_publisher::{NoopProgressPublisher, ProgressPublisher};
