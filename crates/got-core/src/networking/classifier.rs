//! Turns a finished HTTP exchange, or a failed one, into a [`RequestStatus`].
//!
//! | input                                  | status              |
//! |----------------------------------------|---------------------|
//! | 2xx with a body                        | `Success`           |
//! | status >= 500                          | `ServerError`       |
//! | any other status                       | `ApiError`          |
//! | I/O failure, network reachable         | `ServerUnreachable` |
//! | I/O failure, network not reachable     | `NetworkError`      |
//! | body decode failure                    | `ParseError`        |
//! | anything else                          | `UnknownError`      |

use std::error::Error as StdError;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::connectivity::ConnectivityMonitor;
use super::request_status::RequestStatus;

/// A completed exchange, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse<T> {
    pub status: u16,
    /// Decoded success body; `None` for non-2xx responses and empty bodies
    pub body: Option<T>,
    /// Raw error body of a non-2xx response
    pub error_body: Option<Vec<u8>>,
}

impl<T> RawResponse<T> {
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a call did not produce a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Connect, read, write or timeout failure
    #[error("I/O failure: {0}")]
    Io(String),
    #[error("Failed to decode response body: {0}")]
    Decode(String),
    #[error("Transport failure: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportFailure {
    fn from(error: reqwest::Error) -> Self {
        let message = error_chain(&error);
        if error.is_builder() {
            TransportFailure::Other(message)
        } else if error.is_decode() {
            TransportFailure::Decode(message)
        } else if error.is_timeout()
            || error.is_connect()
            || error.is_request()
            || error.is_body()
            || error.is_redirect()
        {
            TransportFailure::Io(message)
        } else {
            TransportFailure::Other(message)
        }
    }
}

impl From<serde_json::Error> for TransportFailure {
    fn from(error: serde_json::Error) -> Self {
        if error.is_io() {
            TransportFailure::Io(error.to_string())
        } else {
            TransportFailure::Decode(error.to_string())
        }
    }
}

/// Flattens an error and its sources into one line.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[derive(Error, Debug)]
#[error("Failed to decode error body: {0}")]
pub struct ErrorBodyError(pub String);

/// Decodes the body of a non-2xx response into `E`.
pub trait ErrorBodyDecoder<E>: Send + Sync {
    fn decode(&self, body: &[u8]) -> Result<E, ErrorBodyError>;
}

impl<E, F> ErrorBodyDecoder<E> for F
where
    F: Fn(&[u8]) -> Result<E, ErrorBodyError> + Send + Sync,
{
    fn decode(&self, body: &[u8]) -> Result<E, ErrorBodyError> {
        self(body)
    }
}

/// Error bodies as text. A JSON string literal is unquoted, anything else is
/// taken verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextErrorDecoder;

impl ErrorBodyDecoder<String> for TextErrorDecoder {
    fn decode(&self, body: &[u8]) -> Result<String, ErrorBodyError> {
        if let Ok(text) = serde_json::from_slice::<String>(body) {
            return Ok(text);
        }
        String::from_utf8(body.to_vec()).map_err(|e| ErrorBodyError(e.to_string()))
    }
}

/// Structured JSON error bodies.
pub struct JsonErrorDecoder<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> JsonErrorDecoder<E> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for JsonErrorDecoder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DeserializeOwned> ErrorBodyDecoder<E> for JsonErrorDecoder<E> {
    fn decode(&self, body: &[u8]) -> Result<E, ErrorBodyError> {
        serde_json::from_slice(body).map_err(|e| ErrorBodyError(e.to_string()))
    }
}

/// Classifies a completed response. Never yields `Loading` or `Cached`.
pub fn classify_response<T, E>(
    response: RawResponse<T>,
    decoder: &dyn ErrorBodyDecoder<E>,
) -> RequestStatus<T, E> {
    let status_code = response.status;
    let successful = response.is_successful();

    match response.body {
        Some(data) if successful => RequestStatus::Success { status_code, data },
        _ if status_code >= 500 => RequestStatus::ServerError,
        _ => RequestStatus::ApiError {
            status_code,
            error_message: decode_error_body(response.error_body.as_deref(), decoder),
        },
    }
}

/// A broken error body never escalates; it just means "no message".
fn decode_error_body<E>(body: Option<&[u8]>, decoder: &dyn ErrorBodyDecoder<E>) -> Option<E> {
    let body = body?;
    match decoder.decode(body) {
        Ok(message) => Some(message),
        Err(e) => {
            log::debug!("Ignoring undecodable error body: {}", e);
            None
        }
    }
}

/// Classifies a call that failed before a response was available.
///
/// Without a monitor the network is treated as unreachable.
pub fn classify_failure<T, E>(
    failure: &TransportFailure,
    connectivity: Option<&ConnectivityMonitor>,
) -> RequestStatus<T, E> {
    log::warn!("Request failed: {}", failure);

    match failure {
        TransportFailure::Io(_) => {
            if connectivity.is_some_and(ConnectivityMonitor::is_connected) {
                RequestStatus::ServerUnreachable
            } else {
                RequestStatus::NetworkError
            }
        }
        TransportFailure::Decode(_) => RequestStatus::ParseError,
        TransportFailure::Other(_) => RequestStatus::UnknownError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networking::connectivity::ManualNetwork;
    use std::sync::Arc;

    type Status = RequestStatus<Vec<u32>, String>;

    fn response(
        status: u16,
        body: Option<Vec<u32>>,
        error_body: Option<&str>,
    ) -> RawResponse<Vec<u32>> {
        RawResponse {
            status,
            body,
            error_body: error_body.map(|b| b.as_bytes().to_vec()),
        }
    }

    #[test]
    fn test_success_requires_2xx_and_body() {
        for status in [200, 201, 204, 299] {
            let status_result: Status =
                classify_response(response(status, Some(vec![1]), None), &TextErrorDecoder);
            assert_eq!(
                status_result,
                RequestStatus::Success {
                    status_code: status,
                    data: vec![1]
                }
            );
        }

        let no_body: Status = classify_response(response(204, None, None), &TextErrorDecoder);
        assert_eq!(
            no_body,
            RequestStatus::ApiError {
                status_code: 204,
                error_message: None
            }
        );
    }

    #[test]
    fn test_5xx_is_server_error_regardless_of_body() {
        for status in [500, 502, 503, 599] {
            let result: Status =
                classify_response(response(status, None, Some("boom")), &TextErrorDecoder);
            assert_eq!(result, RequestStatus::ServerError);
        }
    }

    #[test]
    fn test_4xx_is_api_error_with_message() {
        let result: Status =
            classify_response(response(404, None, Some("not found")), &TextErrorDecoder);
        assert_eq!(
            result,
            RequestStatus::ApiError {
                status_code: 404,
                error_message: Some("not found".to_string())
            }
        );

        let result: Status =
            classify_response(response(400, None, Some("\"bad page\"")), &TextErrorDecoder);
        assert_eq!(
            result,
            RequestStatus::ApiError {
                status_code: 400,
                error_message: Some("bad page".to_string())
            }
        );

        let result: Status = classify_response(response(304, None, None), &TextErrorDecoder);
        assert_eq!(result.status_code(), Some(304));
    }

    #[test]
    fn test_undecodable_error_body_is_swallowed() {
        let raw = RawResponse::<Vec<u32>> {
            status: 422,
            body: None,
            error_body: Some(vec![0xff, 0xfe, 0xfd]),
        };
        let result: Status = classify_response(raw, &TextErrorDecoder);
        assert_eq!(
            result,
            RequestStatus::ApiError {
                status_code: 422,
                error_message: None
            }
        );
    }

    #[test]
    fn test_json_and_closure_decoders() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Problem {
            detail: String,
        }

        let raw = response(409, None, Some(r#"{"detail":"conflict"}"#));
        let result: RequestStatus<Vec<u32>, Problem> =
            classify_response(raw, &JsonErrorDecoder::new());
        assert_eq!(
            result,
            RequestStatus::ApiError {
                status_code: 409,
                error_message: Some(Problem {
                    detail: "conflict".to_string()
                })
            }
        );

        let raw = response(401, None, Some("{not json"));
        let result: RequestStatus<Vec<u32>, Problem> =
            classify_response(raw, &JsonErrorDecoder::new());
        assert_eq!(
            result,
            RequestStatus::ApiError {
                status_code: 401,
                error_message: None
            }
        );

        let length = |body: &[u8]| -> Result<usize, ErrorBodyError> { Ok(body.len()) };
        let result: RequestStatus<Vec<u32>, usize> =
            classify_response(response(418, None, Some("teapot")), &length);
        assert_eq!(
            result,
            RequestStatus::ApiError {
                status_code: 418,
                error_message: Some(6)
            }
        );
    }

    #[test]
    fn test_io_failure_depends_on_connectivity() {
        let failure = TransportFailure::Io("connection refused".to_string());

        let online = ConnectivityMonitor::new(Arc::new(ManualNetwork::connected()));
        let result: Status = classify_failure(&failure, Some(&online));
        assert_eq!(result, RequestStatus::ServerUnreachable);

        let offline = ConnectivityMonitor::new(Arc::new(ManualNetwork::disconnected()));
        let result: Status = classify_failure(&failure, Some(&offline));
        assert_eq!(result, RequestStatus::NetworkError);

        let result: Status = classify_failure(&failure, None);
        assert_eq!(result, RequestStatus::NetworkError);
    }

    #[test]
    fn test_decode_and_other_failures() {
        let result: Status =
            classify_failure(&TransportFailure::Decode("expected array".to_string()), None);
        assert_eq!(result, RequestStatus::ParseError);

        let result: Status =
            classify_failure(&TransportFailure::Other("already executed".to_string()), None);
        assert_eq!(result, RequestStatus::UnknownError);
    }

    #[test]
    fn test_serde_error_maps_to_decode() {
        let error = serde_json::from_str::<Vec<u32>>("{\"oops\":1}").expect_err("must fail");
        assert!(matches!(
            TransportFailure::from(error),
            TransportFailure::Decode(_)
        ));
    }
}
