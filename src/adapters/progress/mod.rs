//! Progress publisher adapters.
//!
//! - `WatchProgressPublisher` - Latest-value channel with subscribe/unsubscribe
//! - `TracingProgressPublisher` - Log lines via `tracing`

mod tracing_publisher;
mod watch_publisher;

pub use tracing_publisher::TracingProgressPublisher;
pub use watch_publisher::{ProgressSubscription, WatchProgressPublisher};
