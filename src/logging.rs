//! # Structured Logging Module
//!
//! Console-oriented structured logging for the batch maintenance job. The
//! job logs at every point of state change (update, delete) and every point
//! of skip (warn/error), so operators can reconstruct a run from its output.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable consulted for the log filter, e.g.
/// `EVENTSWEEP_LOG=debug` to see every rendered store statement.
pub const LOG_ENV_VAR: &str = "EVENTSWEEP_LOG";

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging. Safe to call more than once; only the
/// first call installs the subscriber.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(filter),
        );

        // Use try_init to avoid panic if a global subscriber already exists
        // (test harnesses install their own).
        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        }
    });
}
