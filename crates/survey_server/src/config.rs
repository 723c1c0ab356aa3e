//! Environment-driven server configuration.
//!
//! # Invariants
//! - Every setting has a default except the log directory, which is optional.
//! - Invalid values fail fast at startup instead of being replaced silently.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use survey_core::default_log_level;

pub const DB_PATH_VAR: &str = "SURVEY_DB_PATH";
pub const BIND_ADDR_VAR: &str = "SURVEY_BIND_ADDR";
pub const LOG_LEVEL_VAR: &str = "SURVEY_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "SURVEY_LOG_DIR";

const DEFAULT_DB_PATH: &str = "survey.sqlite3";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBindAddr { value: String, reason: String },
    EmptyValue(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBindAddr { value, reason } => {
                write!(f, "invalid {BIND_ADDR_VAR} `{value}`: {reason}")
            }
            Self::EmptyValue(name) => write!(f, "{name} must not be empty when set"),
        }
    }
}

impl Error for ConfigError {}

/// Runtime settings for the survey server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Absolute directory for rolling log files; stderr when `None`.
    pub log_dir: Option<String>,
}

impl ServerConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns the raw value of a key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(key) {
                Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key)),
                Some(value) => Ok(Some(value.trim().to_string())),
                None => Ok(None),
            }
        };

        let db_path = read(DB_PATH_VAR)?.unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let bind_text = read(BIND_ADDR_VAR)?.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_text
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::InvalidBindAddr {
                value: bind_text.clone(),
                reason: err.to_string(),
            })?;
        let log_level = read(LOG_LEVEL_VAR)?.unwrap_or_else(|| default_log_level().to_string());
        let log_dir = read(LOG_DIR_VAR)?;

        Ok(Self {
            db_path: PathBuf::from(db_path),
            bind_addr,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig, BIND_ADDR_VAR, DB_PATH_VAR, LOG_DIR_VAR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("survey.sqlite3"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, survey_core::default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            (DB_PATH_VAR, "/var/lib/survey/data.db"),
            (BIND_ADDR_VAR, "0.0.0.0:9000"),
            (LOG_DIR_VAR, " /var/log/survey "),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/survey/data.db"));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/survey"));
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let err = config_from(&[(BIND_ADDR_VAR, "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { value, .. } if value == "localhost"));
    }

    #[test]
    fn blank_values_are_rejected() {
        let err = config_from(&[(DB_PATH_VAR, "  ")]).unwrap_err();
        assert_eq!(err, ConfigError::EmptyValue(DB_PATH_VAR));
    }
}
