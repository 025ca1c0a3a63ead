use std::path::PathBuf;
use std::time::Duration;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Folder created under the platform data directory
const APP_DIR_NAME: &str = "projet";

/// File name of the preferences database inside the data directory
const PREFERENCES_FILE: &str = "preferences.db";

/// Client configuration wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Config {
    /// Wrap an already-validated [`AppConfig`]
    pub fn new(app: AppConfig) -> Self {
        Self { app }
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self::new(builder.build()?))
    }

    /// Defaults, overridden by `CLIENT_API_URL` and `CLIENT_DATA_DIR`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(AppConfig::builder())
    }

    /// Apply environment overrides on top of a partially filled builder
    pub fn from_env_with(mut builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var("CLIENT_API_URL") {
            builder = builder.server_url(url);
        }
        if let Ok(dir) = std::env::var("CLIENT_DATA_DIR") {
            builder = builder.data_dir(dir);
        }
        Self::with_builder(builder)
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.server_url(), path)
        } else {
            format!("{}/{}", self.server_url(), path)
        }
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        self.app.request_timeout
    }

    /// Directory holding local state, falling back to the platform data dir
    pub fn data_dir(&self) -> PathBuf {
        self.app.data_dir.clone().unwrap_or_else(|| {
            let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
            path.push(APP_DIR_NAME);
            path
        })
    }

    /// Path of the SQLite file backing the token store
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir().join(PREFERENCES_FILE)
    }
}
