//! Runtime configuration for storage and logging.
//!
//! # Responsibility
//! - Collect database location, connection pragmas and logging settings.
//! - Load them from environment variables or a serialized document.
//!
//! # Invariants
//! - `validate()` passes before any connection is opened from a config.
//! - A missing `db_path` means a private in-memory database.

use crate::db::{open_db_with, ConnectionOptions, DbResult, DbTarget};
use crate::logging::default_log_level;
use rusqlite::Connection;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "REVIEW_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "REVIEW_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "REVIEW_LOG_DIR";
pub const ENV_BUSY_TIMEOUT_MS: &str = "REVIEW_BUSY_TIMEOUT_MS";
pub const ENV_FOREIGN_KEYS: &str = "REVIEW_FOREIGN_KEYS";

const SUPPORTED_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedLevel(String),
    RelativeLogDir(PathBuf),
    ZeroBusyTimeout,
    InvalidEnv { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(path) => write!(
                f,
                "log_dir must be an absolute path, got `{}`",
                path.display()
            ),
            Self::ZeroBusyTimeout => write!(f, "busy_timeout_ms must be greater than zero"),
            Self::InvalidEnv { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {}

/// Core settings shared by the library and the CLI probe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite file; `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling logs; `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
    pub busy_timeout_ms: u64,
    pub foreign_keys: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let options = ConnectionOptions::default();
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            busy_timeout_ms: u64::try_from(options.busy_timeout.as_millis()).unwrap_or(5_000),
            foreign_keys: options.foreign_keys,
        }
    }
}

impl CoreConfig {
    /// Builds a config from `REVIEW_*` environment variables over defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup over defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = non_empty(lookup(ENV_DB_PATH)) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = non_empty(lookup(ENV_LOG_LEVEL)) {
            config.log_level = level;
        }
        if let Some(dir) = non_empty(lookup(ENV_LOG_DIR)) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = non_empty(lookup(ENV_BUSY_TIMEOUT_MS)) {
            config.busy_timeout_ms = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_BUSY_TIMEOUT_MS,
                value: value.clone(),
            })?;
        }
        if let Some(value) = non_empty(lookup(ENV_FOREIGN_KEYS)) {
            config.foreign_keys = parse_flag(&value).ok_or(ConfigError::InvalidEnv {
                key: ENV_FOREIGN_KEYS,
                value: value.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.log_level.trim().to_ascii_lowercase();
        if !SUPPORTED_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::UnsupportedLevel(self.log_level.clone()));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::ZeroBusyTimeout);
        }
        Ok(())
    }

    pub fn db_target(&self) -> DbTarget {
        match &self.db_path {
            Some(path) => DbTarget::File(path.clone()),
            None => DbTarget::Memory,
        }
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            foreign_keys: self.foreign_keys,
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }

    /// Opens the configured database.
    pub fn open_connection(&self) -> DbResult<Connection> {
        open_db_with(&self.db_target(), self.connection_options())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
