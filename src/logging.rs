//! Logging setup for scrollchat.
//!
//! Diagnostics go through `tracing`; the server writes them to stdout and
//! to the configured log file.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Level for the configured string, falling back to `info` on junk.
fn level_for(level: &str) -> Level {
    level.parse().unwrap_or(Level::INFO)
}

/// Filter from the configured level, overridable through `RUST_LOG`.
fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level_for(level).into())
}

/// Open the log file, creating its parent directory if needed.
fn open_log_file(path: &str) -> Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(File::create(path)?)
}

/// Install the global subscriber, writing to stdout and the log file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let file = Arc::new(open_log_file(&config.file)?);

    tracing_subscriber::fmt()
        .with_env_filter(filter_for(&config.level))
        .with_writer(std::io::stdout.and(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Console-only setup, used when the log file cannot be opened.
pub fn init_console_only(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .init();
}
