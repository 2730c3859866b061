//! Error types for Orphanage.
//!
//! A cache miss is not an error: store lookups return `Option` and only
//! genuine failures end up here.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Orphanage library.
#[derive(Debug, Error)]
pub enum OrphanageError {
    // Remote service errors
    #[error("{kind} not found: {name}")]
    NotFound { kind: RemoteKind, name: String },

    #[error("HTTP {status} for url: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("User {username} has no email address on file")]
    NoEmail { username: String },

    #[error("Failed to resolve email for {username} after {resolved} successful lookups")]
    EmailLookup {
        username: String,
        resolved: usize,
        #[source]
        source: Box<OrphanageError>,
    },

    #[error("Failed to get member list of {group}: {source}")]
    GroupLookup {
        group: String,
        #[source]
        source: Box<OrphanageError>,
    },

    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// What kind of remote object a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    User,
    Group,
}

impl std::fmt::Display for RemoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteKind::User => write!(f, "user"),
            RemoteKind::Group => write!(f, "group"),
        }
    }
}

/// Result type alias for Orphanage operations.
pub type Result<T> = std::result::Result<T, OrphanageError>;

impl From<std::io::Error> for OrphanageError {
    fn from(err: std::io::Error) -> Self {
        OrphanageError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for OrphanageError {
    fn from(err: serde_json::Error) -> Self {
        OrphanageError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for OrphanageError {
    fn from(err: rusqlite::Error) -> Self {
        OrphanageError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for OrphanageError {
    fn from(err: reqwest::Error) -> Self {
        OrphanageError::Network {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<figment::Error> for OrphanageError {
    fn from(err: figment::Error) -> Self {
        OrphanageError::Config {
            message: err.to_string(),
        }
    }
}

impl OrphanageError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        OrphanageError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// True when the remote identity source reported that the user or group
    /// does not exist.
    ///
    /// Looks through `EmailLookup` and `GroupLookup` so batch callers can
    /// apply the same policy.
    pub fn is_not_found(&self) -> bool {
        match self {
            OrphanageError::NotFound { .. } => true,
            OrphanageError::EmailLookup { source, .. }
            | OrphanageError::GroupLookup { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// True for failures of the transport itself (connection, status, body).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            OrphanageError::HttpStatus { .. }
                | OrphanageError::Network { .. }
                | OrphanageError::Json { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrphanageError::NotFound {
            kind: RemoteKind::Group,
            name: "sig-go".into(),
        };
        assert_eq!(err.to_string(), "group not found: sig-go");

        let err = OrphanageError::HttpStatus {
            status: 503,
            url: "https://fasjson.example/v1/users/alice/".into(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 503 for url: https://fasjson.example/v1/users/alice/"
        );
    }

    #[test]
    fn test_not_found_through_batch_context() {
        let err = OrphanageError::EmailLookup {
            username: "ghost".into(),
            resolved: 2,
            source: Box::new(OrphanageError::NotFound {
                kind: RemoteKind::User,
                name: "ghost".into(),
            }),
        };
        assert!(err.is_not_found());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_not_found_through_group_context() {
        let err = OrphanageError::GroupLookup {
            group: "ghost-sig".into(),
            source: Box::new(OrphanageError::NotFound {
                kind: RemoteKind::Group,
                name: "ghost-sig".into(),
            }),
        };
        assert!(err.is_not_found());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_transport_classification() {
        assert!(OrphanageError::HttpStatus {
            status: 500,
            url: String::new()
        }
        .is_transport());
        assert!(!OrphanageError::Config {
            message: "bad".into()
        }
        .is_transport());
    }
}
