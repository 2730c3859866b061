//! Identity store trait and types.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for cache behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Time-to-live shared by cached users and group markers.
    pub ttl: Duration,
}

impl CacheConfig {
    /// Default time-to-live for cache entries (1 day).
    pub const DEFAULT_TTL_SECS: u64 = 86_400;

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(CacheConfig::DEFAULT_TTL_SECS),
        }
    }
}

/// Rows removed by a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepStats {
    pub users: usize,
    pub groups: usize,
}

/// Row counts across the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub users: usize,
    pub groups: usize,
    pub memberships: usize,
}

/// Durable storage for username → email and group → member mappings.
///
/// Freshness is judged against the store's configured TTL. A lookup that
/// finds nothing fresh returns `Ok(None)`; `Err` is reserved for real
/// failures. All operations are synchronous to match rusqlite's API.
pub trait IdentityStore: Send + Sync {
    /// TTL used by the freshness checks of this store.
    fn ttl(&self) -> Duration;

    /// Get the cached email for a user, if present and fresh.
    fn query_user(&self, username: &str) -> Result<Option<String>>;

    /// Insert or replace a user's email, stamped with the current time.
    fn upsert_user(&self, username: &str, email: &str) -> Result<()>;

    /// Get the members of a group.
    ///
    /// Returns `None` when the group's marker is absent or stale, even if
    /// leftover membership rows exist.
    fn query_group_members(&self, group: &str) -> Result<Option<Vec<String>>>;

    /// Atomically replace a group's membership and refresh its marker.
    fn replace_group_members(&self, group: &str, members: &[String]) -> Result<()>;

    /// Delete users and groups with `cached_at + ttl <= now`.
    ///
    /// Membership rows of deleted groups are removed with them.
    fn sweep(&self, ttl: Duration) -> Result<SweepStats>;

    /// Count the rows currently stored, fresh or not.
    fn stats(&self) -> Result<StoreStats>;
}
