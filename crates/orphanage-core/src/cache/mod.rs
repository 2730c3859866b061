//! Durable identity cache.
//!
//! Stores FASJSON lookups in a single SQLite database:
//! - username → email
//! - group freshness markers
//! - group → member edges, owned by their marker
//!
//! [`EmailCacheClient`] layers read-through access over an [`IdentityStore`]
//! and an [`IdentitySource`](crate::identity::IdentitySource).

mod client;
mod sqlite;
mod traits;

pub use client::{sorted_emails, EmailBatchError, EmailCacheClient, EmailMap};
pub use sqlite::SqliteIdentityStore;
pub use traits::{CacheConfig, IdentityStore, StoreStats, SweepStats};
