use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Why the config file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// `<config dir>/cardbook/config.toml`, or `./cardbook/config.toml`
    /// when the platform has no config directory.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cardbook")
            .join("config.toml")
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Parse and validate `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the client cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api = &self.api;
        require(
            api.base_url.starts_with("http://") || api.base_url.starts_with("https://"),
            || format!("api.base_url '{}' must start with http:// or https://", api.base_url),
        )?;
        require(api.prefix.is_empty() || api.prefix.starts_with('/'), || {
            format!("api.prefix '{}' must start with '/'", api.prefix)
        })?;
        require(api.timeout_seconds > 0, || {
            "api.timeout_seconds must be greater than zero".into()
        })?;
        require(self.records.page_size > 0, || {
            "records.page_size must be greater than zero".into()
        })?;
        require(self.throttle.max_entries > 0, || {
            "throttle.max_entries must be greater than zero".into()
        })
    }
}

fn require(ok: bool, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::ValidationError { message: message() })
    }
}
