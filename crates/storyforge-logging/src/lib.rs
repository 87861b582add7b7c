//! # storyforge-logging
//!
//! Logging for storyforge story sessions.
//!
//! ## Key Types
//!
//! - [`Logger`] - Structured event logging to the console and an optional file
//! - [`LogEvent`] - Session events (saves, diffs, restores, resets)
//! - [`LogFormat`] - Console formats (Pretty, JSON, Compact)
//!
//! Library internals use `tracing` directly; [`init_tracing`] installs the
//! subscriber once at startup.

mod events;

pub use events::{LogEvent, LogFormat, Logger, SaveTrigger};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the application
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }
}
