//! Configuration loading.
//!
//! Layers, lowest precedence first: built-in defaults, the user config file
//! (`~/.config/blocksmith/config.toml` or an explicit `--config` path), and
//! `BLOCKSMITH_*` environment variables (`__` separates nested keys, e.g.
//! `BLOCKSMITH_LOGGING__LEVEL=debug`).

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Logging section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: text, json
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BlocksmithConfig {
    /// Workspace directory for source checkouts; default `~/.blocksmith`.
    #[serde(default)]
    pub workspace: Option<PathBuf>,
    /// Default block source repository.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn user_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| {
        dirs.config_dir()
            .join("blocksmith")
            .join("config.toml")
    })
}

impl BlocksmithConfig {
    /// Load configuration, optionally from an explicit file path.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        match config_file {
            Some(path) => {
                builder = builder.add_source(File::from(path.to_path_buf()));
            }
            None => {
                if let Some(path) = user_config_path() {
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }

        builder
            .add_source(Environment::with_prefix("BLOCKSMITH").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_without_any_sources() {
        let config = BlocksmithConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
        assert!(config.source.is_none());
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "source = \"https://example.com/blocks.git\"\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = BlocksmithConfig::load(Some(&path)).unwrap();
        assert_eq!(
            config.source.as_deref(),
            Some("https://example.com/blocks.git")
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(BlocksmithConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
