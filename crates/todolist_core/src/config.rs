//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve store, logging and remote settings from defaults and
//!   `TODOLIST_*` environment variables.
//!
//! # Invariants
//! - `log_dir` is always absolute, as required by `init_logging`.
//! - Unset or empty variables fall back to defaults; malformed values are
//!   reported, never silently ignored.

use crate::logging::default_log_level;
use crate::sync::remote::{DEFAULT_REMOTE_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_HOME: &str = "TODOLIST_HOME";
pub const ENV_DB_PATH: &str = "TODOLIST_DB";
pub const ENV_LOG_DIR: &str = "TODOLIST_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "TODOLIST_LOG_LEVEL";
pub const ENV_REMOTE_URL: &str = "TODOLIST_REMOTE_URL";
pub const ENV_TIMEOUT_SECS: &str = "TODOLIST_TIMEOUT_SECS";

const HOME_DIR_NAME: &str = ".todolist";
const DB_FILE_NAME: &str = "todolist.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub remote_base_url: String,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Defaults rooted at `home`: `<home>/todolist.sqlite3` and `<home>/logs`.
    pub fn with_home(home: &Path) -> Self {
        Self {
            db_path: home.join(DB_FILE_NAME),
            log_dir: home.join(LOG_DIR_NAME),
            log_level: default_log_level().to_string(),
            remote_base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let home = get(ENV_HOME)
            .map(PathBuf::from)
            .unwrap_or_else(default_home);
        let home = absolutize(home);
        let mut config = Self::with_home(&home);

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            config.log_dir = absolutize(PathBuf::from(dir));
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level.trim().to_string();
        }
        if let Some(url) = get(ENV_REMOTE_URL) {
            config.remote_base_url = url.trim().to_string();
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn default_home() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(HOME_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(HOME_DIR_NAME))
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&path))
        .unwrap_or(path)
}
