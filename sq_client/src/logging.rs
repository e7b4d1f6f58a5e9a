//! Structured logging configuration.
//!
//! Log output goes to stderr in line mode. While the TUI owns the terminal
//! it goes to a file instead, so it never tears the screen.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf, sync::Mutex};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Where log records are written.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Default filter when `RUST_LOG` is unset.
pub fn default_filter(target: &LogTarget) -> &'static str {
    match target {
        LogTarget::Stderr => "warn,sq_client=info",
        LogTarget::File(_) => "info,hyper=warn,reqwest=warn",
    }
}

/// Initialize logging
///
/// Features:
/// - Configurable log levels via RUST_LOG env var
/// - Records from the `log` facade (used by `study_quest`) are captured
/// - File output without ANSI colors for the TUI
pub fn init(target: LogTarget) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(&target)));

    match target {
        LogTarget::Stderr => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize logging")?;
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize logging")?;
        }
    }

    tracing::debug!("Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters() {
        assert_eq!(default_filter(&LogTarget::Stderr), "warn,sq_client=info");
        assert!(default_filter(&LogTarget::File(PathBuf::from("x.log"))).starts_with("info"));
    }
}
