/// Log setup for the terminal front-end.
///
/// The terminal is in raw mode while playing, so records go to
/// `codemaster.log` in the data directory instead of stderr.
/// `RUST_LOG` wins over the configured level.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

pub const LOG_FILE: &str = "codemaster.log";

pub fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns the log file path.
pub fn init(dir: &Path, level: &str) -> Result<PathBuf, AppError> {
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| AppError::Config(format!("logging already initialized: {e}")))?;
    Ok(path)
}
