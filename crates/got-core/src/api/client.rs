use crate::api::models::{House, Page};
use crate::error::ApiError;
use crate::networking::{
    AdaptedCall, CallAdapter, ConnectivityMonitor, HttpCall, TextErrorDecoder,
};
use reqwest::{Client, Method, Url, redirect};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.anapioficeandfire.com/api/";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const HOUSES_ENDPOINT: &str = "houses";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 40;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 40;
const MAX_REDIRECTS: usize = 10;
const USER_AGENT: &str = concat!("got/", env!("CARGO_PKG_VERSION"));

/// Call returned by every endpoint: JSON body into `T`, error body as text.
pub type ApiCall<T> = AdaptedCall<HttpCall<T>, String>;

/// Transport settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Bound on the whole exchange, from connect to the last body byte
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Client for the Ice and Fire API.
///
/// Endpoints don't send anything themselves; they hand out calls that the
/// caller enqueues, and every call resolves to a
/// [`crate::networking::RequestStatus`].
#[derive(Clone)]
pub struct IceAndFireClient {
    client: Client,
    base_url: Url,
    adapter: CallAdapter<String>,
}

impl IceAndFireClient {
    pub fn new(
        settings: &ClientSettings,
        connectivity: Option<ConnectivityMonitor>,
    ) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&settings.base_url)?;

        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::ClientInit {
                message: e.to_string(),
            })?;

        Ok(IceAndFireClient {
            client,
            base_url,
            adapter: CallAdapter::new(Arc::new(TextErrorDecoder), connectivity),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn connectivity(&self) -> Option<&ConnectivityMonitor> {
        self.adapter.connectivity()
    }

    /// `GET {base}/{path}?{query}` as an adapted call.
    pub fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<ApiCall<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::RequestBuild {
                endpoint: path.to_string(),
                message: e.to_string(),
            })?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(self
            .adapter
            .adapt(HttpCall::new(self.client.clone(), Method::GET, url)))
    }

    /// One page of houses. Pages start at 1.
    pub fn houses(&self, page: u32, page_size: u32) -> Result<ApiCall<Page<House>>, ApiError> {
        self.get(
            HOUSES_ENDPOINT,
            &[("page", page.to_string()), ("pageSize", page_size.to_string())],
        )
    }
}

/// Parses the base URL and makes sure relative endpoints resolve below it.
fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let invalid = |message: String| ApiError::InvalidBaseUrl {
        url: base_url.to_string(),
        message,
    };

    let mut url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("URL must start with http:// or https://".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networking::Call;

    fn settings(base_url: &str) -> ClientSettings {
        ClientSettings {
            base_url: base_url.to_string(),
            ..ClientSettings::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = IceAndFireClient::new(&ClientSettings::default(), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = IceAndFireClient::new(&settings("http://example.test/api"), None)
            .expect("client creation failed");
        assert_eq!(client.base_url().as_str(), "http://example.test/api/");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        for url in ["", "example.test/api", "ftp://example.test/api"] {
            let result = IceAndFireClient::new(&settings(url), None);
            assert!(
                matches!(result, Err(ApiError::InvalidBaseUrl { .. })),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_houses_url_has_paging_query() {
        let client = IceAndFireClient::new(&settings("http://example.test/api/"), None)
            .expect("client creation failed");
        let call = client.houses(3, 20).expect("call creation failed");

        assert_eq!(
            call.delegate().url().as_str(),
            "http://example.test/api/houses?page=3&pageSize=20"
        );
        assert_eq!(
            call.describe(),
            "GET http://example.test/api/houses?page=3&pageSize=20"
        );
        assert!(!call.is_executed());
    }

    #[test]
    fn test_get_without_query() {
        let client = IceAndFireClient::new(&settings("http://example.test/api"), None)
            .expect("client creation failed");
        let call = client
            .get::<serde_json::Value>("characters/583", &[])
            .expect("call creation failed");
        assert_eq!(
            call.delegate().url().as_str(),
            "http://example.test/api/characters/583"
        );
    }
}
