//! Runtime configuration for embedding binaries.
//!
//! # Responsibility
//! - Resolve database location and logging settings from the environment.
//!
//! # Invariants
//! - Missing variables fall back to an in-memory database and no file logging.
//! - Blank values are treated as missing.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, init_logging};
use rusqlite::Connection;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "LIBRARY_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "LIBRARY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LIBRARY_LOG_DIR";

/// Resolved library runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Database file; `None` selects a private in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute log directory; `None` leaves file logging off.
    pub log_dir: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl LibraryConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, keyed by the `LIBRARY_*` names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging stays off.
    pub fn init_logging(&self) -> Result<bool, String> {
        let Some(log_dir) = self.log_dir.as_ref() else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log_dir is not valid UTF-8: {}", log_dir.display()))?;
        init_logging(&self.log_level, log_dir)?;
        Ok(true)
    }

    /// Opens the configured database with migrations applied.
    pub fn open_db(&self) -> DbResult<Connection> {
        match self.db_path.as_ref() {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LibraryConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = LibraryConfig::from_lookup(|_| None);
        assert_eq!(config, LibraryConfig::default());
        assert_eq!(config.log_level, default_log_level());
        assert!(config.db_path.is_none());
    }

    #[test]
    fn variables_override_defaults_and_blank_values_are_ignored() {
        let config = LibraryConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, " /tmp/library.sqlite3 "),
            (ENV_LOG_LEVEL, "warn"),
            (ENV_LOG_DIR, "   "),
        ]));

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/library.sqlite3")));
        assert_eq!(config.log_level, "warn");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn logging_stays_off_without_directory() {
        let config = LibraryConfig::default();
        assert_eq!(config.init_logging(), Ok(false));
    }

    #[test]
    fn default_config_opens_in_memory_database() {
        let conn = LibraryConfig::default().open_db().unwrap();
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, crate::db::migrations::latest_version());
    }
}
