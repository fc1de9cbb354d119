//! Tracing subscriber setup
//!
//! The configured level is the baseline, `-v`/`-q` shift it and `RUST_LOG`
//! replaces it entirely.

use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use st_core::config::LogConfig;

/// Filter directive for the given settings, ignoring `RUST_LOG`
pub fn filter_directive(log: &LogConfig, verbose: u8, quiet: bool) -> String {
    match (quiet, verbose) {
        (true, _) => "error".to_string(),
        (false, 0) => {
            let level = log.level.trim();
            if level.is_empty() {
                "info".to_string()
            } else {
                level.to_ascii_lowercase()
            }
        }
        (false, 1) => "debug".to_string(),
        (false, _) => "trace".to_string(),
    }
}

/// Install the global subscriber, writing to stderr or to `log.to`
pub fn init_logging(log: &LogConfig, verbose: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| filter_directive(log, verbose, quiet)),
    );
    let registry = tracing_subscriber::registry().with(filter);

    match log.file() {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .try_init()
                .context("Failed to initialize logging")?;
        }
        None => {
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .context("Failed to initialize logging")?;
        }
    }

    Ok(())
}
