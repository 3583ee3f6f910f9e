//! Outcome of a remote call.
//!
//! Every call made through [`crate::networking::call::AdaptedCall`] ends in
//! exactly one of these variants. Transport errors and HTTP status codes are
//! folded in here, so callers only ever `match`.

/// Request status carrying the response data.
///
/// `T` is the success payload, `E` the decoded error body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestStatus<T, E> {
    /// A fetch is in flight
    Loading,
    /// 2xx with a decoded body
    Success { status_code: u16, data: T },
    /// Non-success status below 500. `error_message` is `None` when the error
    /// body was missing or could not be decoded.
    ApiError {
        status_code: u16,
        error_message: Option<E>,
    },
    /// Reserved for a cache layer; nothing in this crate produces it.
    Cached { data: T },
    /// The device has a network path but the endpoint could not be reached
    ServerUnreachable,
    /// HTTP status >= 500
    ServerError,
    /// The success body did not decode into `T`
    ParseError,
    /// No network path at the time of failure
    NetworkError,
    UnknownError,
}

impl<T, E> RequestStatus<T, E> {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestStatus::Success { .. })
    }

    /// True for every variant that reports a failed fetch.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            RequestStatus::Loading | RequestStatus::Success { .. } | RequestStatus::Cached { .. }
        )
    }

    /// Payload of `Success` or `Cached`.
    pub fn data(&self) -> Option<&T> {
        match self {
            RequestStatus::Success { data, .. } | RequestStatus::Cached { data } => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            RequestStatus::Success { data, .. } | RequestStatus::Cached { data } => Some(data),
            _ => None,
        }
    }

    /// HTTP status code, for the variants that carry one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RequestStatus::Success { status_code, .. }
            | RequestStatus::ApiError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Transforms the success payload, keeping every other variant as is.
    pub fn map<U, F>(self, f: F) -> RequestStatus<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            RequestStatus::Loading => RequestStatus::Loading,
            RequestStatus::Success { status_code, data } => RequestStatus::Success {
                status_code,
                data: f(data),
            },
            RequestStatus::ApiError {
                status_code,
                error_message,
            } => RequestStatus::ApiError {
                status_code,
                error_message,
            },
            RequestStatus::Cached { data } => RequestStatus::Cached { data: f(data) },
            RequestStatus::ServerUnreachable => RequestStatus::ServerUnreachable,
            RequestStatus::ServerError => RequestStatus::ServerError,
            RequestStatus::ParseError => RequestStatus::ParseError,
            RequestStatus::NetworkError => RequestStatus::NetworkError,
            RequestStatus::UnknownError => RequestStatus::UnknownError,
        }
    }

    /// Short name of the variant, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            RequestStatus::Loading => "loading",
            RequestStatus::Success { .. } => "success",
            RequestStatus::ApiError { .. } => "api_error",
            RequestStatus::Cached { .. } => "cached",
            RequestStatus::ServerUnreachable => "server_unreachable",
            RequestStatus::ServerError => "server_error",
            RequestStatus::ParseError => "parse_error",
            RequestStatus::NetworkError => "network_error",
            RequestStatus::UnknownError => "unknown_error",
        }
    }
}

impl<T, E: std::fmt::Display> RequestStatus<T, E> {
    /// User-facing message for the failure variants. `None` for
    /// `Loading`, `Success` and `Cached`, which callers display themselves.
    pub fn user_message(&self) -> Option<String> {
        match self {
            RequestStatus::Loading
            | RequestStatus::Success { .. }
            | RequestStatus::Cached { .. } => None,
            RequestStatus::ApiError {
                status_code,
                error_message: Some(message),
            } => Some(format!("Request failed ({}): {}", status_code, message)),
            RequestStatus::ApiError { status_code, .. } => {
                Some(format!("Request failed with status {}", status_code))
            }
            RequestStatus::ServerUnreachable => {
                Some("The server could not be reached, please try again later".to_string())
            }
            RequestStatus::ServerError => {
                Some("The server ran into a problem, please try again later".to_string())
            }
            RequestStatus::ParseError => {
                Some("The server sent a response that could not be read".to_string())
            }
            RequestStatus::NetworkError => {
                Some("No internet connection, check your network and try again".to_string())
            }
            RequestStatus::UnknownError => Some("Something went wrong".to_string()),
        }
    }
}
