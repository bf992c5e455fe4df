// src/logging.rs

//! Logging setup for `ticktask` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. the `level` argument (if provided by the host)
//! 2. `TICKTASK_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that host stdout stays free for the
//! application itself.

use anyhow::Result;
use tracing_subscriber::fmt;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup; embedding hosts that already install their
/// own subscriber should skip this entirely.
pub fn init_logging(level: Option<tracing::Level>) -> Result<()> {
    let level = resolve_level(level);

    // Send logs to stderr; keep stdout free for the host.
    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Resolve the effective log level: explicit argument first, then the
/// `TICKTASK_LOG` environment variable, then `info`.
pub fn resolve_level(explicit: Option<tracing::Level>) -> tracing::Level {
    match explicit {
        Some(lvl) => lvl,
        None => std::env::var("TICKTASK_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
