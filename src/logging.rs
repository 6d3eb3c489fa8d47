// src/logging.rs

//! `tracing` subscriber setup.
//!
//! The filter is chosen in this order:
//! 1. `--log-level` (applies to assetpipe; dependencies stay at `warn`)
//! 2. `ASSETPIPE_LOG`, as full `EnvFilter` directives
//!    (e.g. `debug` or `assetpipe=trace,axum=debug`)
//! 3. `info` for assetpipe, `warn` for everything else
//!
//! Output goes to stderr; stdout belongs to `--list`, `--dry-run` and the
//! external tools.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "ASSETPIPE_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => crate_filter(level.as_str()),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| crate_filter("info")),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

/// `level` for this crate, `warn` for the server and watcher stacks.
fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("warn,assetpipe={level}"))
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
