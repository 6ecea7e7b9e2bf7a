//! Application configuration
//!
//! Read from `config.json` in the platform config directory, then
//! overridden by environment variables. Missing fields take defaults.

use crate::error::{Result, SwapboardError};
use etcetera::base_strategy::{choose_base_strategy, BaseStrategy};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const APP_DIR: &str = "swapboard";

/// Bounds for the unread-count polling interval
pub const MIN_POLL_SECS: u64 = 30;
pub const MAX_POLL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// REST API root, e.g. `http://localhost:5000/api`
    pub api_base_url: String,
    /// Web frontend root, used to build links to item pages
    pub web_base_url: String,
    /// Items per page
    pub page_size: u32,
    /// Page buttons shown in the pager
    pub max_visible_pages: u32,
    /// Per-request deadline
    pub request_timeout_secs: u64,
    /// Unread-count refresh interval
    pub unread_poll_secs: u64,
    /// Queries kept in the local search history
    pub history_limit: usize,
    /// Bearer token sent with every request
    pub auth_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            web_base_url: "http://localhost:5173".to_string(),
            page_size: 12,
            max_visible_pages: 5,
            request_timeout_secs: 10,
            unread_poll_secs: MIN_POLL_SECS,
            history_limit: 10,
            auth_token: None,
        }
    }
}

impl AppConfig {
    /// Load from the default location and apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "loading config");
                serde_json::from_str(&text).map_err(|e| {
                    SwapboardError::Config(format!("{}: {}", path.display(), e))
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                AppConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(url) = var("SWAPBOARD_API_URL") {
            self.api_base_url = url;
        }
        if let Some(url) = var("SWAPBOARD_WEB_URL") {
            self.web_base_url = url;
        }
        if let Some(token) = var("SWAPBOARD_TOKEN") {
            self.auth_token = Some(token);
        }
    }

    fn validate(&mut self) -> Result<()> {
        if self.page_size == 0 {
            return Err(SwapboardError::Config("page_size must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(SwapboardError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(SwapboardError::Config(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            )));
        }

        let clamped = self.unread_poll_secs.clamp(MIN_POLL_SECS, MAX_POLL_SECS);
        if clamped != self.unread_poll_secs {
            warn!(
                requested = self.unread_poll_secs,
                used = clamped,
                "unread_poll_secs out of range"
            );
            self.unread_poll_secs = clamped;
        }
        self.max_visible_pages = self.max_visible_pages.max(1);
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.unread_poll_secs)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// `$SWAPBOARD_CONFIG_DIR`, else the platform config dir
pub fn config_dir() -> PathBuf {
    if let Some(dir) = var("SWAPBOARD_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match choose_base_strategy() {
        Ok(strategy) => strategy.config_dir().join(APP_DIR),
        Err(_) => PathBuf::from("."),
    }
}

/// `$SWAPBOARD_DATA_DIR`, else the platform data dir
pub fn data_dir() -> PathBuf {
    if let Some(dir) = var("SWAPBOARD_DATA_DIR") {
        return PathBuf::from(dir);
    }
    match choose_base_strategy() {
        Ok(strategy) => strategy.data_dir().join(APP_DIR),
        Err(_) => PathBuf::from("."),
    }
}

/// Platform cache dir; holds the log file
pub fn cache_dir() -> PathBuf {
    match choose_base_strategy() {
        Ok(strategy) => strategy.cache_dir().join(APP_DIR),
        Err(_) => PathBuf::from("."),
    }
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.json")
}

pub fn store_file() -> PathBuf {
    data_dir().join("store.json")
}
