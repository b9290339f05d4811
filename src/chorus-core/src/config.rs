//! Process-level settings read from `config.toml`.
//!
//! Missing sections and keys fall back to their defaults, so an empty or
//! absent file is a valid configuration.

use crate::paths::{AppDirs, DirsError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub config_version: u32,
    pub logging: LoggingConfig,
    pub provider: ProviderSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            logging: LoggingConfig::default(),
            provider: ProviderSettings::default(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `info,tidal_provider=debug`.
    pub filter: String,
    /// Rotated log files kept in the log directory.
    pub retain_files: usize,
    /// Mirror log lines to stdout (with ANSI colours).
    pub stdout: bool,
    /// Prefix of the daily rolling log files.
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            retain_files: 7,
            stdout: true,
            file_name: "chorus.log".into(),
        }
    }
}

/// `[provider]`: tuning shared by every provider instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Sessions expiring within this many minutes are refreshed before use.
    pub refresh_margin_minutes: u32,
    /// Per-kind search limit applied when the caller asks for 0.
    pub search_limit: u32,
    /// Similar-track limit applied when the caller asks for 0.
    pub similar_tracks_limit: u32,
    pub top_tracks_limit: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            refresh_margin_minutes: 30,
            search_limit: 5,
            similar_tracks_limit: 25,
            top_tracks_limit: 10,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Directories(#[from] DirsError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported config_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("logging.file_name must not be empty")]
    EmptyLogFileName,
    #[error("logging.filter must not be empty")]
    EmptyLogFilter,
    #[error("{field} must be greater than zero")]
    ZeroSetting { field: &'static str },
}

impl Config {
    /// Reads `config.toml` from the config directory, creating the app
    /// directories first. A missing file yields the defaults.
    pub fn load(dirs: &AppDirs) -> Result<Self, ConfigError> {
        dirs.ensure_exists()?;
        let path = dirs.config_file();
        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&path, &contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config_version != CONFIG_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.config_version,
                expected: CONFIG_VERSION,
            });
        }
        if self.logging.file_name.trim().is_empty() {
            return Err(ValidationError::EmptyLogFileName);
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ValidationError::EmptyLogFilter);
        }
        let provider = &self.provider;
        for (field, value) in [
            ("provider.refresh_margin_minutes", provider.refresh_margin_minutes),
            ("provider.search_limit", provider.search_limit),
            ("provider.similar_tracks_limit", provider.similar_tracks_limit),
            ("provider.top_tracks_limit", provider.top_tracks_limit),
        ] {
            if value == 0 {
                return Err(ValidationError::ZeroSetting { field });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let root = tempfile::tempdir().unwrap();
        let dirs = AppDirs::rooted_at(root.path());

        let config = Config::load(&dirs).unwrap();
        assert_eq!(config, Config::default());
        assert!(dirs.config_dir().is_dir());
        assert_eq!(config.provider.refresh_margin_minutes, 30);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let root = tempfile::tempdir().unwrap();
        let dirs = AppDirs::rooted_at(root.path());
        dirs.ensure_exists().unwrap();
        fs::write(
            dirs.config_file(),
            "[logging]\nfilter = \"debug\"\n\n[provider]\nsearch_limit = 12\n",
        )
        .unwrap();

        let config = Config::load(&dirs).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert!(config.logging.stdout);
        assert_eq!(config.provider.search_limit, 12);
        assert_eq!(config.provider.similar_tracks_limit, 25);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("config.toml");
        fs::write(&path, "[provider]\ntop_tracks_limit = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::ZeroSetting {
                field: "provider.top_tracks_limit"
            })
        ));
    }

    #[test]
    fn newer_versions_are_rejected() {
        let config = Config {
            config_version: CONFIG_VERSION + 1,
            ..Config::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::UnsupportedVersion {
                found: CONFIG_VERSION + 1,
                expected: CONFIG_VERSION,
            })
        );
    }

    #[test]
    fn blank_log_settings_are_rejected() {
        let mut config = Config::default();
        config.logging.file_name = "  ".into();
        assert_eq!(config.validate(), Err(ValidationError::EmptyLogFileName));

        let mut config = Config::default();
        config.logging.filter.clear();
        assert_eq!(config.validate(), Err(ValidationError::EmptyLogFilter));
    }
}
