//! Configuration service for `config show` and `config set`

use crate::AppError;
use crate::error::{CliError, ConfigError};
use crate::storage::config::Config;
use std::path::PathBuf;

/// Keys accepted by [`ConfigService::set_value`].
pub const CONFIG_KEYS: &[&str] = &[
    "base_url",
    "page_size",
    "connect_timeout_secs",
    "request_timeout_secs",
    "connectivity_probe",
    "probe_interval_secs",
];

pub struct ConfigService {
    config: Config,
}

impl ConfigService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Effective values, defaults and environment applied, in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("base_url", self.config.get_base_url()),
            ("page_size", self.config.page_size().to_string()),
            (
                "connect_timeout_secs",
                self.config.connect_timeout().as_secs().to_string(),
            ),
            (
                "request_timeout_secs",
                self.config.request_timeout().as_secs().to_string(),
            ),
            ("connectivity_probe", self.config.connectivity_probe()),
            (
                "probe_interval_secs",
                self.config.probe_interval().as_secs().to_string(),
            ),
        ]
    }

    /// Parses and stores one value. The config is left untouched when the
    /// result fails validation.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let mut updated = self.config.clone();
        match key {
            "base_url" => updated.set_base_url(value.to_string()),
            "page_size" => updated.page_size = Some(parse_number(key, value)?),
            "connect_timeout_secs" => {
                updated.connect_timeout_secs = Some(parse_number(key, value)?)
            }
            "request_timeout_secs" => {
                updated.request_timeout_secs = Some(parse_number(key, value)?)
            }
            "connectivity_probe" => updated.connectivity_probe = Some(value.to_string()),
            "probe_interval_secs" => updated.probe_interval_secs = Some(parse_number(key, value)?),
            _ => {
                return Err(CliError::InvalidArguments(format!(
                    "Unknown config key '{}'. Valid keys: {}",
                    key,
                    CONFIG_KEYS.join(", ")
                ))
                .into());
            }
        }

        updated.validate()?;
        self.config = updated;
        Ok(())
    }

    pub fn save_config(&self, path: Option<PathBuf>) -> Result<(), AppError> {
        self.config.save(path).map_err(|e| e.into())
    }
}

fn parse_number<N: std::str::FromStr>(field: &str, value: &str) -> Result<N, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: format!("{} must be a positive whole number", field),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn service() -> ConfigService {
        ConfigService::new(Config {
            base_url: Some("http://example.test/api/".to_string()),
            ..Config::default()
        })
    }

    #[test]
    fn test_set_page_size() {
        let mut service = service();
        service.set_value("page_size", "10").expect("valid page size");
        assert_eq!(service.config().page_size, Some(10));
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut service = service();

        let err = service.set_value("page_size", "ten").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = service.set_value("page_size", "500").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(service.config().page_size, None);

        let err = service.set_value("colour", "blue").unwrap_err();
        assert!(matches!(err, AppError::Cli(CliError::InvalidArguments(_))));
    }

    #[test]
    fn test_set_base_url_rejected_while_env_override_is_valid() {
        use crate::storage::config::{BASE_URL_ENV, ENV_LOCK};

        let mut service = service();
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            std::env::set_var(BASE_URL_ENV, "http://env.test/api/");
        }
        let result = service.set_value("base_url", "not-a-url");
        unsafe {
            std::env::remove_var(BASE_URL_ENV);
        }

        assert!(matches!(result, Err(AppError::Config(_))));
        assert_eq!(
            service.config().base_url,
            Some("http://example.test/api/".to_string())
        );
    }

    #[test]
    fn test_entries_show_defaults() {
        let entries = service().entries();
        assert_eq!(entries.len(), CONFIG_KEYS.len());
        assert!(entries.contains(&("page_size", "20".to_string())));
        assert!(entries.contains(&("connectivity_probe", "1.1.1.1:53".to_string())));
    }

    #[test]
    fn test_save_config() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.toml");

        let mut service = service();
        service.set_value("probe_interval_secs", "9").expect("valid interval");
        service.save_config(Some(path.clone())).expect("save config");

        let loaded = Config::load(Some(path)).expect("load config");
        assert_eq!(loaded.probe_interval_secs, Some(9));
    }
}
