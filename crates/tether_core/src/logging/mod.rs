//! Logging infrastructure for the spot-tether pipeline.
//!
//! This module provides:
//! - Per-session loggers with file + UI callback dual output
//! - Compact mode with progress filtering
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use tether_core::logging::{SessionLogger, LogConfig};
//!
//! // Create a session logger
//! let logger = SessionLogger::new(
//!     "cells_01",
//!     "/path/to/logs",
//!     LogConfig::default(),
//!     None,
//! ).unwrap();
//!
//! // Log messages at various levels
//! logger.info("Starting session");
//! logger.phase("SelectNuclei");
//! logger.progress(50);
//! logger.success("Session completed");
//! ```

mod session_logger;
mod types;

pub use session_logger::{SessionLogger, SessionLoggerBuilder};
pub use types::{LogConfig, LogLevel, MessagePrefix, UiLogCallback};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(level_to_filter_str(LogLevel::Debug), "debug");
        assert_eq!(level_to_filter_str(LogLevel::Info), "info");
    }
}
