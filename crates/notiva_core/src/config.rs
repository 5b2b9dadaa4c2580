//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database path, log directory, log level and save debounce.
//! - Fall back to temp-dir defaults when variables are unset or blank.
//!
//! # Invariants
//! - Resolution never touches the file system.
//! - Invalid values are reported, never silently replaced.

use crate::logging::default_log_level;
use crate::service::persistence::SAVE_DEBOUNCE;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "NOTIVA_DB_PATH";
pub const ENV_LOG_DIR: &str = "NOTIVA_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "NOTIVA_LOG_LEVEL";
pub const ENV_SAVE_DEBOUNCE_MS: &str = "NOTIVA_SAVE_DEBOUNCE_MS";

const DEFAULT_DB_FILE_NAME: &str = "notiva.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "notiva-logs";

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                message,
            } => write!(f, "invalid `{key}` value `{value}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotivaConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub save_debounce: Duration,
}

impl Default for NotivaConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            db_path: temp.join(DEFAULT_DB_FILE_NAME),
            log_dir: temp.join(DEFAULT_LOG_DIR_NAME),
            log_level: default_log_level().to_string(),
            save_debounce: SAVE_DEBOUNCE,
        }
    }
}

impl NotivaConfig {
    /// Resolves settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_DIR,
                    value: dir.display().to_string(),
                    message: "must be an absolute path".to_string(),
                });
            }
            config.log_dir = dir;
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(raw) = read(ENV_SAVE_DEBOUNCE_MS) {
            let millis = raw.parse::<u64>().map_err(|err| ConfigError::InvalidValue {
                key: ENV_SAVE_DEBOUNCE_MS,
                value: raw.clone(),
                message: err.to_string(),
            })?;
            config.save_debounce = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, NotivaConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_SAVE_DEBOUNCE_MS};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn blank_environment_uses_defaults() {
        let config = NotivaConfig::from_lookup(lookup(&[(ENV_DB_PATH, "  ")])).unwrap();
        assert_eq!(config, NotivaConfig::default());
        assert_eq!(config.save_debounce, Duration::from_millis(300));
    }

    #[test]
    fn overrides_are_applied() {
        let config = NotivaConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/data/notes.sqlite3"),
            (ENV_SAVE_DEBOUNCE_MS, "50"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/notes.sqlite3"));
        assert_eq!(config.save_debounce, Duration::from_millis(50));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = NotivaConfig::from_lookup(lookup(&[(ENV_SAVE_DEBOUNCE_MS, "soon")]))
            .expect_err("non-numeric debounce must fail");
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_SAVE_DEBOUNCE_MS));

        let err = NotivaConfig::from_lookup(lookup(&[(ENV_LOG_DIR, "logs")]))
            .expect_err("relative log dir must fail");
        assert!(err.to_string().contains("absolute"));
    }
}
