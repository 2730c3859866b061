//! Blocking HTTP client for JSON APIs.
//!
//! Provides a thin wrapper around reqwest with:
//! - Configurable timeouts
//! - User-agent management
//! - Status code checking (any 4xx/5xx becomes `HttpStatus`)
//! - JSON decoding with error context

use crate::config::NetworkConfig;
use crate::{OrphanageError, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client shared by the FASJSON and Pagure clients.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_timeout(NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a new HTTP client with a custom default timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| OrphanageError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self { client })
    }

    /// GET a URL and decode the JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .map_err(|e| OrphanageError::Network {
                message: format!("GET {} failed: {}", url, e),
                source: Some(e),
            })?;

        let response = Self::check_response_status(response, url)?;

        let body = response.text().map_err(|e| OrphanageError::Network {
            message: format!("Failed to read response from {}: {}", url, e),
            source: Some(e),
        })?;

        serde_json::from_str(&body).map_err(|e| OrphanageError::Json {
            message: format!("Failed to decode JSON from {}: {}", url, e),
            source: Some(e),
        })
    }

    fn check_response_status(response: Response, url: &str) -> Result<Response> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(OrphanageError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

/// Join a base URL, a fixed path such as `"v1/users"`, and caller-supplied
/// names. Each name is percent-encoded as a single path segment.
pub fn join_url(base: &str, fixed: &str, names: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for part in fixed.split('/').filter(|p| !p.is_empty()) {
        url.push('/');
        url.push_str(part);
    }
    for name in names {
        url.push('/');
        url.push_str(&urlencoding::encode(name));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: u32,
    }

    #[test]
    fn test_join_url_escapes_names() {
        assert_eq!(
            join_url("https://fasjson.example/", "v1/users", &["alice"]),
            "https://fasjson.example/v1/users/alice"
        );
        assert_eq!(
            join_url("https://fasjson.example", "v1/groups", &["a b/c", "members"]),
            "https://fasjson.example/v1/groups/a%20b%2Fc/members"
        );
    }

    #[test]
    fn test_client_with_timeout() {
        assert!(HttpClient::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_get_json_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/thing")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"value": 7}"#)
            .create();

        let client = HttpClient::new().unwrap();
        let payload: Payload = client.get_json(&format!("{}/thing", server.url())).unwrap();
        assert_eq!(payload.value, 7);
        mock.assert();
    }

    #[test]
    fn test_get_json_status_error() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/missing").with_status(404).create();

        let client = HttpClient::new().unwrap();
        let url = format!("{}/missing", server.url());
        let err = client.get_json::<Payload>(&url).unwrap_err();
        match err {
            OrphanageError::HttpStatus { status, url: got } => {
                assert_eq!(status, 404);
                assert_eq!(got, url);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_get_json_decode_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/garbage")
            .with_status(200)
            .with_body("not json")
            .create();

        let client = HttpClient::new().unwrap();
        let err = client
            .get_json::<Payload>(&format!("{}/garbage", server.url()))
            .unwrap_err();
        assert!(matches!(err, OrphanageError::Json { .. }));
    }
}
