//! Read-through email cache over FASJSON.
//!
//! Every lookup goes store first, remote second:
//! 1. Fresh row in the store → return it
//! 2. Missing or stale → fetch from the identity source, write back, return
//! 3. Remote failure → propagate (no stale fallback, no retry)

use super::sqlite::SqliteIdentityStore;
use super::traits::{IdentityStore, SweepStats};
use crate::error::{OrphanageError, Result};
use crate::identity::{FasjsonClient, IdentitySource};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// username → email, ordered by username.
pub type EmailMap = BTreeMap<String, String>;

/// A batch lookup that stopped at its first failure.
///
/// `resolved` holds everything looked up before `username` failed so callers
/// can report progress, but it is never a complete answer.
#[derive(Debug, Error)]
#[error("Failed to resolve email for {username}: {source}")]
pub struct EmailBatchError {
    pub username: String,
    pub resolved: EmailMap,
    #[source]
    pub source: OrphanageError,
}

impl From<EmailBatchError> for OrphanageError {
    fn from(err: EmailBatchError) -> Self {
        OrphanageError::EmailLookup {
            username: err.username,
            resolved: err.resolved.len(),
            source: Box::new(err.source),
        }
    }
}

/// Caches username → email and group → members lookups.
pub struct EmailCacheClient {
    store: Arc<dyn IdentityStore>,
    source: Arc<dyn IdentitySource>,
}

impl EmailCacheClient {
    pub fn new(store: Arc<dyn IdentityStore>, source: Arc<dyn IdentitySource>) -> Self {
        Self { store, source }
    }

    /// Open the SQLite cache at `db_path` in front of the given source.
    pub fn open(
        db_path: impl AsRef<Path>,
        ttl: Duration,
        source: Arc<dyn IdentitySource>,
    ) -> Result<Self> {
        let store = SqliteIdentityStore::new(db_path, ttl)?;
        Ok(Self::new(Arc::new(store), source))
    }

    /// Open the SQLite cache in front of the public FASJSON instance.
    pub fn open_default(db_path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        Self::open(db_path, ttl, Arc::new(FasjsonClient::new()?))
    }

    pub fn store(&self) -> &dyn IdentityStore {
        self.store.as_ref()
    }

    pub fn ttl(&self) -> Duration {
        self.store.ttl()
    }

    /// Delete cache entries older than the TTL.
    pub fn clean(&self) -> Result<SweepStats> {
        self.store.sweep(self.store.ttl())
    }

    /// Get the email address for a user.
    ///
    /// Users with several addresses on file are cached with the first one
    /// FASJSON returns; the others are discarded.
    pub fn get_user_email(&self, username: &str) -> Result<String> {
        if let Some(email) = self.store.query_user(username)? {
            debug!("Email cache hit for {}", username);
            return Ok(email);
        }

        debug!("Email cache miss for {}", username);
        let user = self.source.get_user(username)?;
        let email = user
            .emails
            .into_iter()
            .next()
            .ok_or_else(|| OrphanageError::NoEmail {
                username: username.to_string(),
            })?;

        self.store.upsert_user(username, &email)?;
        Ok(email)
    }

    /// Get the member usernames of a group.
    pub fn get_members(&self, group: &str) -> Result<Vec<String>> {
        if let Some(members) = self.store.query_group_members(group)? {
            debug!("Group cache hit for {} ({} members)", group, members.len());
            return Ok(members);
        }

        debug!("Group cache miss for {}", group);
        // Same shape a later hit returns: sorted, no duplicates.
        let members: Vec<String> = self
            .source
            .get_members(group)?
            .into_iter()
            .map(|m| m.username)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        self.store.replace_group_members(group, &members)?;
        Ok(members)
    }

    /// Resolve emails for several users, one at a time.
    ///
    /// Stops at the first failure.
    pub fn get_emails_for_users<I, S>(
        &self,
        usernames: I,
    ) -> std::result::Result<EmailMap, EmailBatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = EmailMap::new();
        for username in usernames {
            let username = username.as_ref();
            if resolved.contains_key(username) {
                continue;
            }
            match self.get_user_email(username) {
                Ok(email) => {
                    resolved.insert(username.to_string(), email);
                }
                Err(source) => {
                    return Err(EmailBatchError {
                        username: username.to_string(),
                        resolved,
                        source,
                    })
                }
            }
        }
        Ok(resolved)
    }

    /// Resolve emails for every member of a group.
    pub fn get_member_emails(&self, group: &str) -> Result<EmailMap> {
        let members = self
            .get_members(group)
            .map_err(|e| OrphanageError::GroupLookup {
                group: group.to_string(),
                source: Box::new(e),
            })?;
        Ok(self.get_emails_for_users(&members)?)
    }

    /// Expand usernames and `@group` references into one username → email
    /// map.
    ///
    /// Users named directly and through one or more groups are looked up
    /// once.
    pub fn get_all_emails<S: AsRef<str>>(&self, references: &[S]) -> Result<EmailMap> {
        let mut usernames = BTreeSet::new();
        for reference in references {
            let reference = reference.as_ref();
            match reference.strip_prefix('@') {
                Some(group) => usernames.extend(self.get_members(group)?),
                None => {
                    usernames.insert(reference.to_string());
                }
            }
        }

        if usernames.is_empty() {
            return Ok(EmailMap::new());
        }
        Ok(self.get_emails_for_users(&usernames)?)
    }
}

/// Sorted, deduplicated snapshot of the addresses in an [`EmailMap`].
pub fn sorted_emails(emails: &EmailMap) -> Vec<String> {
    emails
        .values()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
