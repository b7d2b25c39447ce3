//! Application configuration module
//!
//! Configuration is assembled in three layers:
//!
//! 1. Built-in defaults ([`AppConfig::default`])
//! 2. An optional TOML file named by `ECOTRAVEL_CONFIG`
//! 3. Environment overrides (`ECOTRAVEL_ORIGIN_URL`, `ECOTRAVEL_SYNC_ENDPOINT`,
//!    `ECOTRAVEL_LISTEN_ADDR`, `ECOTRAVEL_DB_PATH`, `ECOTRAVEL_CACHE_VERSION`)
//!
//! # Usage
//!
//! ```rust
//! use ecotravel::shared::config::AppConfig;
//!
//! let config = AppConfig::builder()
//!     .origin_url("http://127.0.0.1:3000")
//!     .cache_version("v2")
//!     .build()
//!     .unwrap();
//! assert_eq!(config.cache_version, "v2");
//! ```

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default upstream origin the gateway intercepts requests for
pub const DEFAULT_ORIGIN_URL: &str = "http://127.0.0.1:3000";
/// Default remote endpoint receiving synced entries
pub const DEFAULT_SYNC_ENDPOINT: &str = "http://127.0.0.1:3000/api/entries";
/// Default gateway listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
/// Default cache partition version suffix
pub const DEFAULT_CACHE_VERSION: &str = "v1";
/// Tag registered with the background-sync facility
pub const DEFAULT_SYNC_TAG: &str = "sync-entries";
/// Page served to navigations that fail while offline
pub const DEFAULT_OFFLINE_PAGE: &str = "/offline.html";
/// Path prefix of API requests
pub const DEFAULT_API_PREFIX: &str = "/api/";
/// Listing route answered with `[]` when nothing else is available
pub const DEFAULT_LISTING_ROUTE: &str = "/api/entries";
/// Prefix of the gateway's own control routes
pub const DEFAULT_CONTROL_PREFIX: &str = "/__ecotravel";
/// Application shell pre-cached on install
pub const DEFAULT_STATIC_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/static/js/bundle.js",
    "/static/css/main.css",
    "/offline.html",
    "/manifest.json",
];
/// Path extensions treated as images
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "gif", "webp", "svg"];

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin whose requests are intercepted
    pub origin_url: String,
    /// Remote endpoint receiving `POST`ed entries
    pub sync_endpoint: String,
    /// Gateway listen address
    pub listen_addr: String,
    /// SQLite file holding pending entries; platform data dir when unset
    pub database_path: Option<PathBuf>,
    /// Version suffix of every cache partition name
    pub cache_version: String,
    /// Background-sync registration tag
    pub sync_tag: String,
    /// Application-shell assets
    pub static_assets: Vec<String>,
    pub offline_page: String,
    pub api_prefix: String,
    pub listing_route: String,
    pub image_extensions: Vec<String>,
    pub control_prefix: String,
    /// Network timeout for every outgoing request
    pub request_timeout_secs: u64,
    /// Delete an entry as soon as its immediate push succeeds
    pub delete_after_immediate_push: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin_url: DEFAULT_ORIGIN_URL.to_string(),
            sync_endpoint: DEFAULT_SYNC_ENDPOINT.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            database_path: None,
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            sync_tag: DEFAULT_SYNC_TAG.to_string(),
            static_assets: DEFAULT_STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
            offline_page: DEFAULT_OFFLINE_PAGE.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            listing_route: DEFAULT_LISTING_ROUTE.to_string(),
            image_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            control_prefix: DEFAULT_CONTROL_PREFIX.to_string(),
            request_timeout_secs: 10,
            delete_after_immediate_push: false,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load defaults, then the `ECOTRAVEL_CONFIG` file, then the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("ECOTRAVEL_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        tracing::info!(
            "[Config] origin={} sync_endpoint={} cache_version={}",
            config.origin_url,
            config.sync_endpoint,
            config.cache_version
        );
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Apply `ECOTRAVEL_*` overrides read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("ECOTRAVEL_ORIGIN_URL") {
            self.origin_url = value;
        }
        if let Some(value) = lookup("ECOTRAVEL_SYNC_ENDPOINT") {
            self.sync_endpoint = value;
        }
        if let Some(value) = lookup("ECOTRAVEL_LISTEN_ADDR") {
            self.listen_addr = value;
        }
        if let Some(value) = lookup("ECOTRAVEL_DB_PATH") {
            self.database_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("ECOTRAVEL_CACHE_VERSION") {
            self.cache_version = value;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.origin()?;
        self.sync_url()?;
        if self.cache_version.trim().is_empty() {
            return Err(ConfigError::MissingValue("cache_version"));
        }
        if self.sync_tag.trim().is_empty() {
            return Err(ConfigError::MissingValue("sync_tag"));
        }
        if let Some(asset) = self.static_assets.iter().find(|asset| !asset.starts_with('/')) {
            return Err(ConfigError::InvalidValue {
                field: "static_assets",
                message: format!("'{}' must start with '/'", asset),
            });
        }
        if !self.offline_page.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "offline_page",
                message: format!("'{}' must start with '/'", self.offline_page),
            });
        }
        if !self.control_prefix.starts_with('/') || self.control_prefix.len() < 2 {
            return Err(ConfigError::InvalidValue {
                field: "control_prefix",
                message: format!("'{}' must be a non-root path", self.control_prefix),
            });
        }
        Ok(())
    }

    /// Parsed origin URL
    pub fn origin(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin_url).map_err(|_| ConfigError::InvalidUrl(self.origin_url.clone()))
    }

    /// Parsed sync endpoint URL
    pub fn sync_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.sync_endpoint).map_err(|_| ConfigError::InvalidUrl(self.sync_endpoint.clone()))
    }

    /// Resolved database location
    ///
    /// Falls back to the platform data directory, or the temp directory when
    /// the platform has none.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("ecotravel");
        path.push("activities.db");
        path
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the intercepted origin
    pub fn origin_url(mut self, url: impl Into<String>) -> Self {
        self.config.origin_url = url.into();
        self
    }

    /// Set the remote sync endpoint
    pub fn sync_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.sync_endpoint = url.into();
        self
    }

    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = Some(path.into());
        self
    }

    pub fn cache_version(mut self, version: impl Into<String>) -> Self {
        self.config.cache_version = version.into();
        self
    }

    pub fn sync_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.sync_tag = tag.into();
        self
    }

    pub fn static_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.static_assets = assets.into_iter().map(Into::into).collect();
        self
    }

    pub fn delete_after_immediate_push(mut self, enabled: bool) -> Self {
        self.config.delete_after_immediate_push = enabled;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.static_assets.len(), 6);
        assert_eq!(config.sync_tag, "sync-entries");
    }

    #[test]
    fn test_builder_rejects_bad_origin() {
        let result = AppConfig::builder().origin_url("not a url").build();
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_builder_rejects_relative_asset() {
        let result = AppConfig::builder().static_assets(["index.html"]).build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { field: "static_assets", .. })));
    }

    #[test]
    fn test_toml_keeps_defaults_for_missing_keys() {
        let config = AppConfig::from_toml_str(
            r#"
            cache_version = "v7"
            origin_url = "https://eco.example"
            "#,
        )
        .unwrap();
        assert_eq!(config.cache_version, "v7");
        assert_eq!(config.origin_url, "https://eco.example");
        assert_eq!(config.offline_page, DEFAULT_OFFLINE_PAGE);
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let vars: HashMap<&str, &str> = [
            ("ECOTRAVEL_SYNC_ENDPOINT", "https://api.example/entries"),
            ("ECOTRAVEL_DB_PATH", "/tmp/eco.db"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.sync_endpoint, "https://api.example/entries");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/eco.db"));
    }

    #[test]
    #[serial]
    fn test_load_reads_environment() {
        std::env::remove_var("ECOTRAVEL_CONFIG");
        std::env::set_var("ECOTRAVEL_CACHE_VERSION", "v9");
        let config = AppConfig::load().unwrap();
        std::env::remove_var("ECOTRAVEL_CACHE_VERSION");
        assert_eq!(config.cache_version, "v9");
    }

    #[test]
    fn test_default_database_path_is_namespaced() {
        let path = AppConfig::default().database_path();
        assert!(path.ends_with("ecotravel/activities.db"));
    }
}
