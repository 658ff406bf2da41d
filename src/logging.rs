//! # Structured Logging Module
//!
//! Environment-filtered structured logging for tracing task pipelines
//! across their asynchronous step reports.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize the tracing subscriber once for the process.
///
/// Honors `RUST_LOG` for filtering; defaults to `info` for this crate.
/// Safe to call from multiple entry points; a subscriber installed by the
/// embedding application wins.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("host_orchestration=info"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(filter),
        );

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }
    });
}
