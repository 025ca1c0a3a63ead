//! Application configuration module
//!
//! Provides configuration types for the application. A configuration can be
//! assembled with [`AppConfigBuilder`] or read from a TOML file:
//!
//! ```toml
//! server_url = "http://192.168.1.21:3000"
//! request_timeout_secs = 15
//! data_dir = "/var/lib/projet"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::shared::error::SharedError;

/// Default timeout applied to every outbound request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server URL
    pub server_url: Option<String>,
    /// Per-request timeout for the REST client
    pub request_timeout: Duration,
    /// Directory that holds the durable preferences database
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            data_dir: None,
        }
    }
}

/// On-disk representation of [`AppConfig`]
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    server_url: Option<String>,
    request_timeout_secs: Option<u64>,
    data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// Parse a TOML document into a validated configuration
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents).map_err(SharedError::from)?;

        let mut builder = Self::builder();
        if let Some(url) = file.server_url {
            builder = builder.server_url(url);
        }
        if let Some(secs) = file.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(dir) = file.data_dir {
            builder = builder.data_dir(dir);
        }
        builder.build()
    }

    /// Read and parse a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    request_timeout: Option<Duration>,
    data_dir: Option<PathBuf>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.server_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the directory for local storage
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            server_url: self.server_url,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            data_dir: self.data_dir,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request timeout must be greater than zero")]
    InvalidTimeout,
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] SharedError),
}
