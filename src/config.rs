//! Application Configuration
//!
//! Defaults, an optional JSON file, and `COST_TRACKER_*` environment
//! overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_DB: &str = "COST_TRACKER_DB";
pub const ENV_LOG_DIR: &str = "COST_TRACKER_LOG_DIR";
pub const ENV_LIVE_SYNC: &str = "COST_TRACKER_LIVE_SYNC";
pub const ENV_RESTORE_TIMEOUT_MS: &str = "COST_TRACKER_RESTORE_TIMEOUT_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{key} must be {expected}, got {value:?}")]
    InvalidEnv {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file of the local backend; `:memory:` keeps nothing on disk
    pub database_path: PathBuf,
    /// Rolling log files are written here when set
    pub log_dir: Option<PathBuf>,
    pub session_restore_timeout_ms: u64,
    /// Feed both lists from push subscriptions while signed in
    pub live_sync: bool,
    pub password_hash_cost: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("cost_tracker.db"),
            log_dir: None,
            session_restore_timeout_ms: 5000,
            live_sync: false,
            password_hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AppConfig {
    /// In-memory database, no log files
    pub fn in_memory() -> Self {
        Self {
            database_path: PathBuf::from(":memory:"),
            ..Default::default()
        }
    }

    /// Read a JSON file; missing keys take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults with the process environment applied
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `COST_TRACKER_*` values returned by `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(path) = lookup(ENV_DB) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            self.log_dir = (!dir.trim().is_empty()).then(|| PathBuf::from(dir));
        }
        if let Some(value) = lookup(ENV_LIVE_SYNC) {
            self.live_sync = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: ENV_LIVE_SYNC,
                        expected: "a boolean",
                        value,
                    })
                }
            };
        }
        if let Some(value) = lookup(ENV_RESTORE_TIMEOUT_MS) {
            self.session_restore_timeout_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_RESTORE_TIMEOUT_MS,
                expected: "a number of milliseconds",
                value: value.clone(),
            })?;
        }
        Ok(())
    }

    pub fn session_restore_timeout(&self) -> Duration {
        Duration::from_millis(self.session_restore_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.database_path, PathBuf::from("cost_tracker.db"));
        assert_eq!(config.session_restore_timeout(), Duration::from_secs(5));
        assert!(!config.live_sync);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "live_sync": true, "session_restore_timeout_ms": 250 }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();

        assert!(config.live_sync);
        assert_eq!(config.session_restore_timeout_ms, 250);
        assert_eq!(config.database_path, PathBuf::from("cost_tracker.db"));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                (ENV_DB, ":memory:"),
                (ENV_LOG_DIR, "/tmp/costs"),
                (ENV_LIVE_SYNC, "yes"),
                (ENV_RESTORE_TIMEOUT_MS, "1500"),
            ]))
            .unwrap();

        assert_eq!(config.database_path, PathBuf::from(":memory:"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/costs")));
        assert!(config.live_sync);
        assert_eq!(config.session_restore_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = AppConfig::default();
        let err = config.apply_overrides(env(&[(ENV_LIVE_SYNC, "maybe")])).unwrap_err();
        assert_eq!(err.to_string(), "COST_TRACKER_LIVE_SYNC must be a boolean, got \"maybe\"");
    }
}
