//! Structured logging using **tracing**.
//!
//! Events go to stderr as JSON so stdout carries nothing but the report.

use tracing::{error, warn};

/// Initializes the global tracing subscriber.
///
/// Call once at startup. Filtering follows `RUST_LOG`
/// (e.g. `RUST_LOG=useprune_core=debug`); without it warnings and errors are shown.
pub fn init_structured_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Logs a warning event.
pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

/// Logs an error event.
pub fn log_error(message: &str) {
    error!(detail = %message);
}
