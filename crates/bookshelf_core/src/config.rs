//! Process configuration loaded from the environment.
//!
//! Variables use the `BOOKSHELF_` prefix (`BOOKSHELF_DB_PATH`,
//! `BOOKSHELF_LOG_LEVEL`, `BOOKSHELF_LOG_DIR`). A `.env` file in the working
//! directory is loaded first when present.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "BOOKSHELF_";

const DEFAULT_DB_FILE_NAME: &str = "bookshelf.sqlite3";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// SQLite database file shared by every store.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// One of `trace|debug|info|warn|error`.
    #[serde(default = "default_level")]
    pub log_level: String,

    /// Absolute directory for rolling log files; file logging is off when
    /// unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE_NAME)
}

fn default_level() -> String {
    default_log_level().to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_level(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Builds configuration from explicit `(name, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path must not be empty".to_string()));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn missing_variables_fall_back_to_defaults() {
        let config = AppConfig::from_vars(vars(&[("UNRELATED", "x")])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let config = AppConfig::from_vars(vars(&[
            ("BOOKSHELF_DB_PATH", "/var/lib/bookshelf/data.sqlite3"),
            ("BOOKSHELF_LOG_LEVEL", "warn"),
            ("BOOKSHELF_LOG_DIR", "/var/log/bookshelf"),
        ]))
        .unwrap();
        assert_eq!(
            config.db_path,
            PathBuf::from("/var/lib/bookshelf/data.sqlite3")
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/bookshelf")));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = AppConfig::from_vars(vars(&[("BOOKSHELF_LOG_DIR", "logs")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("absolute")));
    }
}
