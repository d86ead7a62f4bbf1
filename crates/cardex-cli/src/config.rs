//! CLI configuration
//!
//! Optional `cardex.toml`: an explicit `--config` path must load cleanly,
//! while a missing file at the default location just means defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Default data directory for the catalog database.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cardex")
}

/// Default config file location.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cardex")
        .join("cardex.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the API server binds to.
    pub listen_addr: String,
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Synergy knowledge file; built-in data when absent.
    pub knowledge_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3001".to_string(),
            db_path: default_data_dir().join("cardex.db"),
            knowledge_path: None,
        }
    }
}

impl Config {
    /// Load the config. An explicit path that fails to read or parse is an
    /// error; the default path falls back to `Config::default()` when the
    /// file does not exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (config_file_path(), false),
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listen_addr, "127.0.0.1:3001");
        assert!(config.knowledge_path.is_none());
        assert!(config.db_path.ends_with("cardex.db"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cardex.toml");
        std::fs::write(&path, "listen_addr = \"0.0.0.0:8080\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.db_path, default_data_dir().join("cardex.db"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cardex.toml");
        std::fs::write(&path, "listen_addr = [not toml").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
