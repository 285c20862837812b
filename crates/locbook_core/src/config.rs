//! Runtime configuration for hosting layers.
//!
//! Values come from `LOCBOOK_*` environment variables, then explicit
//! overrides applied by the host (for example CLI flags).

use crate::logging::{default_log_level, normalize_level, LoggingError};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "LOCBOOK_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "LOCBOOK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "LOCBOOK_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "locbook.sqlite3";

/// Resolved configuration for opening the store and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = read(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(LOG_LEVEL_ENV) {
            config.log_level = normalize_level(&level)?;
        }
        config.log_dir = read(LOG_DIR_ENV).map(PathBuf::from);

        Ok(config)
    }

    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn with_log_level(mut self, level: &str) -> Result<Self, LoggingError> {
        self.log_level = normalize_level(level)?;
        Ok(self)
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }
}
