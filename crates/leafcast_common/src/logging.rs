//! Logging utilities for Leafcast.
//!
//! All crates log through `tracing`; this module installs the subscriber that
//! renders those events.

use leafcast_config::AppConfig;
use std::str::FromStr;
use tracing::{info, warn, Level};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO level.
///
/// # Examples
///
/// ```
/// use leafcast_common::logging;
///
/// // Initialize with default log level (INFO)
/// logging::init();
///
/// // A second initialization is ignored
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// The level applies to every `leafcast*` target; `RUST_LOG` directives are
/// honoured for everything else. If a global subscriber is already installed
/// this is a no-op.
///
/// # Arguments
///
/// * `level` - The minimum log level to display.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    match format!("leafcast={}", level).parse::<Directive>() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Invalid log directive for level {}: {}", level, e),
    }

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize the tracing subscriber from the `[logging]` configuration section.
///
/// An unknown level name falls back to INFO.
pub fn init_from_config(config: &AppConfig) {
    let configured = config
        .logging
        .as_ref()
        .map(|logging| logging.level.as_str())
        .unwrap_or("info");

    match parse_level(configured) {
        Some(level) => init_with_level(level),
        None => {
            init_with_level(Level::INFO);
            warn!("Unknown log level '{}', using INFO", configured);
        }
    }
}

fn parse_level(level: &str) -> Option<Level> {
    Level::from_str(level.trim()).ok()
}
