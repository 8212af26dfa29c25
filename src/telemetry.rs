//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `config.level` when set. Output is JSON lines when
/// `config.json` is true, human-readable otherwise. Later calls are no-ops,
/// and an already-installed subscriber (e.g. from a test harness) is left
/// in place.
pub fn init_tracing(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("pitch_refiner={}", config.level.to_lowercase())));

        let (json, text) = if config.json {
            (Some(fmt::layer().json().with_current_span(true)), None)
        } else {
            (None, Some(fmt::layer().with_target(true)))
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(json)
            .with(text)
            .try_init();
    });
}
