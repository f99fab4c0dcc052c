use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::config::LOG_ENV;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogTarget {
    Stderr,
    File,
}

/// Install the global subscriber. The TUI owns the terminal, so it logs to a file.
pub(crate) fn init(target: LogTarget, log_path: &Path) -> Result<()> {
    let default_level = match target {
        LogTarget::Stderr => "warn",
        LogTarget::File => "info",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
                .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
        }
    }
    .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))
}
