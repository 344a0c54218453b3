//! Configuration loading and management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub sessions: SessionConfig,
}

/// Storage-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".primo/primo.db")
}

/// Session registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl(),
        }
    }
}

fn default_session_ttl() -> i64 {
    86_400 // 24 hours
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default location, then apply environment
    /// overrides, falling back to defaults throughout.
    pub fn load_or_default() -> Self {
        let mut config = Self::load(".primo/config.yaml").unwrap_or_default();

        if let Ok(db_path) = std::env::var("PRIMO_DB_PATH") {
            config.storage.db_path = PathBuf::from(db_path);
        }

        if let Ok(ttl) = std::env::var("PRIMO_SESSION_TTL") {
            if let Ok(ttl) = ttl.parse() {
                config.sessions.ttl_seconds = ttl;
            }
        }

        config
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.storage.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.sessions.ttl_seconds, 86_400);
        assert_eq!(config.storage.db_path, PathBuf::from(".primo/primo.db"));
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: Config = serde_yaml::from_str("sessions:\n  ttl_seconds: 60\n").unwrap();
        assert_eq!(config.sessions.ttl_seconds, 60);
        assert_eq!(config.storage.db_path, PathBuf::from(".primo/primo.db"));
    }
}
