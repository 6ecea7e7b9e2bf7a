//! File logging
//!
//! The terminal UI owns stdout, so diagnostics go to `swapboard.log` in the
//! cache directory. The file is truncated on every start.
//!
//! FILTER: `SWAPBOARD_LOG` takes an `EnvFilter` directive, default `info`.

use crate::config;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "swapboard.log";
const FILTER_ENV: &str = "SWAPBOARD_LOG";

/// Where the log file is written
pub fn log_path() -> PathBuf {
    config::cache_dir().join(LOG_FILE)
}

/// Install the global subscriber. Returns the log path when logging is active.
///
/// Failing to open the file leaves logging disabled rather than aborting.
pub fn init() -> Option<PathBuf> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Start fresh each run
        .open(&path)
        .ok()?;

    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(path)
}

/// Write a separator line for readability
pub fn separator(label: &str) {
    tracing::info!("========== {} ==========", label);
}
