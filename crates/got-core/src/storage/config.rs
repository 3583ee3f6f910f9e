//! Configuration management
//!
//! Transport and paging settings stored in a TOML file.
//! Priority: CLI argument > GOT_API_URL environment variable > config.toml > defaults

use super::Result;
use crate::api::client::{ClientSettings, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use crate::error::{ConfigError, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const BASE_URL_ENV: &str = "GOT_API_URL";
pub const MAX_PAGE_SIZE: u32 = 50;
const DEFAULT_TIMEOUT_SECS: u64 = 40;
const DEFAULT_PROBE_ADDRESS: &str = "1.1.1.1:53";
const DEFAULT_PROBE_INTERVAL_SECS: u64 = 5;

/// Application configuration
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// API root, e.g. https://www.anapioficeandfire.com/api/
    pub base_url: Option<String>,
    pub page_size: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    /// host:port the connectivity probe connects to
    pub connectivity_probe: Option<String>,
    pub probe_interval_secs: Option<u64>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            log::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
                message: format!("Failed to parse config file: {}", e),
            })?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|e| StorageError::ConfigParseError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or(StorageError::ConfigDirNotFound)?;

        Ok(home_dir.join(".config").join("got").join("config.toml"))
    }

    /// Base URL with fallback to environment variable, then the public API
    pub fn get_base_url(&self) -> String {
        self.resolve_base_url(None)
    }

    /// Effective base URL: `cli_url` > `GOT_API_URL` > file > default.
    pub fn resolve_base_url(&self, cli_url: Option<&str>) -> String {
        cli_url
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| std::env::var(BASE_URL_ENV).ok().filter(|s| !s.is_empty()))
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn set_base_url(&mut self, url: String) {
        self.base_url = Some(url);
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn connectivity_probe(&self) -> String {
        self.connectivity_probe
            .clone()
            .unwrap_or_else(|| DEFAULT_PROBE_ADDRESS.to_string())
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(
            self.probe_interval_secs
                .unwrap_or(DEFAULT_PROBE_INTERVAL_SECS)
                .max(1),
        )
    }

    /// Transport settings, with `cli_url` taking priority over every other
    /// base URL source.
    pub fn client_settings(&self, cli_url: Option<&str>) -> ClientSettings {
        ClientSettings {
            base_url: self.resolve_base_url(cli_url),
            connect_timeout: self.connect_timeout(),
            request_timeout: self.request_timeout(),
        }
    }

    /// Checks every value that has been set.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.validate_with(None)
    }

    /// Like [`Config::validate`], for a run where `cli_url` overrides the
    /// base URL. The stored `base_url` is checked on its own as well, since
    /// an override can hide a broken file value.
    pub fn validate_with(&self, cli_url: Option<&str>) -> std::result::Result<(), ConfigError> {
        if let Some(stored) = &self.base_url {
            check_base_url(stored)?;
        }
        check_base_url(&self.resolve_base_url(cli_url))?;

        let page_size = self.page_size();
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(invalid(
                "page_size",
                &page_size.to_string(),
                &format!("page_size must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }

        for (field, value) in [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ] {
            if value == Some(0) {
                return Err(invalid(field, "0", &format!("{} must be at least 1", field)));
            }
        }

        Ok(())
    }
}

fn check_base_url(base_url: &str) -> std::result::Result<(), ConfigError> {
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(invalid(
            "base_url",
            base_url,
            "base_url must start with http:// or https://",
        ));
    }
    Ok(())
}

/// Serializes tests that touch `GOT_API_URL`.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
