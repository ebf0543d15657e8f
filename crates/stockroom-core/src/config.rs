//! Application configuration management.
//!
//! This module handles loading and saving the console configuration,
//! which includes the API base URL, the credential backend and the last
//! used username.
//!
//! Configuration is stored at `~/.config/stockroom/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::api::transport::DEFAULT_TIMEOUT_SECS;
use crate::api::DEFAULT_LOW_STOCK_THRESHOLD;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "stockroom";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Environment variable overriding the configured API base URL
pub const API_URL_ENV: &str = "STOCKROOM_API_URL";

/// Where the session credential is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub credential_backend: CredentialBackend,
    pub request_timeout_secs: u64,
    pub low_stock_threshold: u32,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credential_backend: CredentialBackend::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            last_username: None,
        }
    }
}

impl Config {
    /// Load the user config, applying environment overrides.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn with_api_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Directory-safe name for the API origin, e.g. `localhost_8080`.
    /// Sessions are scoped per origin.
    pub fn origin_slug(&self) -> String {
        match Url::parse(&self.api_base_url) {
            Ok(url) => {
                let host = url.host_str().unwrap_or("local");
                match url.port_or_known_default() {
                    Some(port) => format!("{}_{}", host, port),
                    None => host.to_string(),
                }
            }
            Err(_) => self
                .api_base_url
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect(),
        }
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Per-origin directory holding the session file
    pub fn session_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join(self.origin_slug()))
    }

    pub fn keyring_service(&self) -> String {
        format!("{}-{}", APP_NAME, self.origin_slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.low_stock_threshold, 10);
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"credential_backend":"keyring","last_username":"admin"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.credential_backend, CredentialBackend::Keyring);
        assert_eq!(config.last_username.as_deref(), Some("admin"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_save_round_trip_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            last_username: Some("user".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_api_url_override() {
        let config = Config::default().with_api_url_override(Some("https://stock.example/api".into()));
        assert_eq!(config.api_base_url, "https://stock.example/api");

        let config = Config::default().with_api_url_override(Some("  ".into()));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_origin_slug() {
        assert_eq!(Config::default().origin_slug(), "localhost_8080");

        let config = Config::default().with_api_url_override(Some("https://stock.example/api".into()));
        assert_eq!(config.origin_slug(), "stock.example_443");
        assert_eq!(config.keyring_service(), "stockroom-stock.example_443");
    }
}
