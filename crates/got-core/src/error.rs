use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("CallError: {0}")]
    Call(#[from] CallError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Fetch failed: {message}")]
    FetchFailed { message: String },
}

/// Errors raised while setting up the transport. Failures of an actual fetch
/// never show up here, they are reported as [`crate::networking::RequestStatus`].
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("Failed to build request for {endpoint}: {message}")]
    RequestBuild { endpoint: String, message: String },
    #[error("Failed to create HTTP client: {message}")]
    ClientInit { message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Synchronous operation not allowed")]
    SynchronousExecution,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(CliError::FetchFailed { .. }) => ErrorSeverity::High,
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Api(_) => ErrorSeverity::High,
            AppError::Call(_) => ErrorSeverity::Critical,
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Api(ApiError::InvalidBaseUrl { .. }) => Some(
                "'got config set base_url <url>' or set GOT_API_URL to an http(s) URL".to_string(),
            ),
            AppError::Config(ConfigError::InvalidValue { reason, .. }) => Some(reason.clone()),
            AppError::Storage(StorageError::ConfigParseError { .. }) => {
                Some("Fix or remove ~/.config/got/config.toml".to_string())
            }
            AppError::Cli(CliError::FetchFailed { .. }) => {
                Some("Check your internet connection with 'got status' and try again".to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_error_display() {
        assert_eq!(
            format!("{}", CallError::SynchronousExecution),
            "Synchronous operation not allowed"
        );
    }

    #[test]
    fn test_api_error_display() {
        let api_err = ApiError::InvalidBaseUrl {
            url: "nope".to_string(),
            message: "relative URL without a base".to_string(),
        };
        assert_eq!(
            format!("{}", api_err),
            "Invalid base URL 'nope': relative URL without a base"
        );
    }

    #[test]
    fn test_app_error_display_wraps_source() {
        let app_err = AppError::Cli(CliError::InvalidArguments("bad page".to_string()));
        assert_eq!(format!("{}", app_err), "CliError: Invalid arguments: bad page");

        let app_err = AppError::from(CallError::SynchronousExecution);
        assert!(matches!(
            app_err,
            AppError::Call(CallError::SynchronousExecution)
        ));
    }

    #[test]
    fn test_severity_and_hints() {
        let app_err = AppError::Cli(CliError::FetchFailed {
            message: "No internet connection".to_string(),
        });
        assert_eq!(app_err.severity(), ErrorSeverity::High);
        assert!(app_err.troubleshooting_hint().is_some());

        let app_err = AppError::Config(ConfigError::InvalidValue {
            field: "page_size".to_string(),
            value: "0".to_string(),
            reason: "page_size must be between 1 and 50".to_string(),
        });
        assert_eq!(
            app_err.troubleshooting_hint(),
            Some("page_size must be between 1 and 50".to_string())
        );

        let app_err = AppError::Storage(StorageError::ConfigDirNotFound);
        assert_eq!(app_err.severity(), ErrorSeverity::Medium);
        assert!(app_err.troubleshooting_hint().is_none());
    }
}
