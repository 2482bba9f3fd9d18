//! Logging setup for applications embedding the client
//!
//! The client itself only emits `tracing` events and never installs a
//! subscriber. Applications that do not bring their own subscriber can use
//! this module, particularly TUI front ends that must keep stderr/stdout
//! clean while connected.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy)]
pub enum LoggingMode {
    /// No output, for TUI applications
    Silent,
    /// Compact stderr output for development
    Development,
    /// Verbose diagnostics with source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize logging with the specified mode
///
/// Call this before connecting; the connect handshake already produces log
/// output.
///
/// # Environment Variables
///
/// - `MPD_LOG_LEVEL`: Override log level (error, warn, info, debug, trace)
/// - `MPD_LOG_TARGET`: Filter by target (e.g., "mpd_client::idle")
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter("info");

            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(filter);

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter("debug");

            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter);

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize logging from the `MPD_LOG_MODE` environment variable
///
/// - "development" -> [`LoggingMode::Development`]
/// - "debug" -> [`LoggingMode::Debug`]
/// - anything else -> [`LoggingMode::Silent`]
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("MPD_LOG_MODE").as_deref() {
        Ok("development") => LoggingMode::Development,
        Ok("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    };

    init_logging(mode)
}

/// `MPD_LOG_LEVEL` first, then `RUST_LOG`, then the mode's default, with
/// an optional target restriction from `MPD_LOG_TARGET`.
fn create_env_filter(default_level: &str) -> EnvFilter {
    let level = std::env::var("MPD_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    match std::env::var("MPD_LOG_TARGET") {
        Ok(target) => EnvFilter::new(format!("{target}={level}")),
        Err(_) => EnvFilter::new(level),
    }
}

/// Check if a subscriber has already been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

/// Equivalent to `init_logging(LoggingMode::Silent)`, kept explicit for
/// TUI call sites
pub fn init_silent() -> Result<(), LoggingError> {
    init_logging(LoggingMode::Silent)
}
