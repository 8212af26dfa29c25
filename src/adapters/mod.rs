//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the refinement loop to external systems:
//! - `ai` - Language model providers (Anthropic, failover, mock)
//! - `progress` - Progress channels (watch, tracing)

pub mod ai;
pub mod progress;
