//! Settings module for the console client.
//!
//! Settings come from an optional TOML file, then environment variables override individual
//! keys. A missing file is not an error: every setting has a default, so a fresh checkout talks
//! to a local API out of the box. The API base URL is fixed for the lifetime of the process.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};

/// Environment variable naming the settings file.
pub const CONFIG_PATH_VAR: &str = "SHOP_CONSOLE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "shop-console.toml";

const API_URL_VAR: &str = "SHOP_API_URL";
const SESSION_PATH_VAR: &str = "SHOP_SESSION_PATH";
const REQUEST_TIMEOUT_VAR: &str = "SHOP_REQUEST_TIMEOUT_SECS";

/// Console settings. Every key is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the shop API, without a trailing slash.
    pub api_url: String,
    /// File that persists the session between runs.
    pub session_path: PathBuf,
    /// Per-request timeout; a request that runs out counts as a connection failure.
    pub request_timeout_secs: u64,
    /// How long a toast stays visible.
    pub toast_timeout_secs: u64,
    /// How long an inline form message stays visible.
    pub message_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            session_path: PathBuf::from("data/session.json"),
            request_timeout_secs: 30,
            toast_timeout_secs: 5,
            message_timeout_secs: 4,
        }
    }
}

impl Settings {
    /// [`Settings::request_timeout_secs`] as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// [`Settings::toast_timeout_secs`] as a `Duration`.
    #[must_use]
    pub const fn toast_timeout(&self) -> Duration {
        Duration::from_secs(self.toast_timeout_secs)
    }

    /// [`Settings::message_timeout_secs`] as a `Duration`.
    #[must_use]
    pub const fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout_secs)
    }

    /// Applies overrides from `lookup` (normally the process environment).
    ///
    /// # Errors
    /// Returns [`Error::Config`] if an override cannot be parsed or the resulting URL is empty.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_VAR) {
            self.api_url = url;
        }
        if let Some(path) = lookup(SESSION_PATH_VAR) {
            self.session_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(REQUEST_TIMEOUT_VAR) {
            self.request_timeout_secs = raw.trim().parse().map_err(|_| Error::Config {
                message: format!("{REQUEST_TIMEOUT_VAR} must be a whole number of seconds, got '{raw}'"),
            })?;
        }
        self.normalize()
    }

    fn normalize(mut self) -> Result<Self> {
        let trimmed = self.api_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(Error::Config {
                message: "api_url cannot be empty".to_string(),
            });
        }
        self.api_url = trimmed.to_string();
        Ok(self)
    }
}

/// Loads settings from `path`, or from `SHOP_CONSOLE_CONFIG` / `shop-console.toml` when `None`.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed, or if an environment
/// override is invalid.
pub fn load_settings_from(path: Option<&Path>) -> Result<Settings> {
    let path = path.map_or_else(
        || {
            std::env::var(CONFIG_PATH_VAR)
                .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
        },
        Path::to_path_buf,
    );

    let base = if path.exists() {
        debug!("Loading settings from {:?}", path);
        let contents = fs::read_to_string(&path).map_err(|e| Error::Config {
            message: format!("Failed to read settings file {path:?}: {e}"),
        })?;
        toml::from_str::<Settings>(&contents).map_err(|e| Error::Config {
            message: format!("Failed to parse TOML from settings file {path:?}: {e}"),
        })?
    } else {
        debug!("No settings file at {:?}, using defaults", path);
        Settings::default()
    };

    let settings = base.apply_overrides(|key| std::env::var(key).ok())?;
    info!(api_url = %settings.api_url, "Settings loaded");
    Ok(settings)
}
