//! FASJSON API client.

use super::IdentitySource;
use crate::config::NetworkConfig;
use crate::error::{OrphanageError, RemoteKind, Result};
use crate::network::{join_url, HttpClient};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A FASJSON user record. Only the fields this crate reads are modelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub human_name: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
}

/// A group member as returned by the members endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub username: String,
    #[serde(default)]
    pub uri: Option<String>,
}

/// FASJSON wraps every payload in `{"result": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

/// FASJSON REST client.
pub struct FasjsonClient {
    http: Arc<HttpClient>,
    base_url: String,
}

impl FasjsonClient {
    /// Create a client for the public Fedora FASJSON instance.
    pub fn new() -> Result<Self> {
        Self::with_base_url(NetworkConfig::FASJSON_URL)
    }

    /// Create a client for a specific FASJSON deployment.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_http(Arc::new(HttpClient::new()?), base_url))
    }

    /// Create a client that shares an existing HTTP client.
    pub fn with_http(http: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        kind: RemoteKind,
        name: &str,
    ) -> Result<T> {
        match self.http.get_json::<Envelope<T>>(url) {
            Ok(envelope) => Ok(envelope.result),
            Err(OrphanageError::HttpStatus { status: 404, .. }) => Err(OrphanageError::NotFound {
                kind,
                name: name.to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}

impl IdentitySource for FasjsonClient {
    fn get_user(&self, username: &str) -> Result<User> {
        let url = join_url(&self.base_url, "v1/users", &[username]);
        self.fetch(&url, RemoteKind::User, username)
    }

    fn get_members(&self, group: &str) -> Result<Vec<Member>> {
        let mut url = join_url(&self.base_url, "v1/groups", &[group]);
        url.push_str("/members");
        self.fetch(&url, RemoteKind::Group, group)
    }
}
