//! Orphanage Core - identity cache and group tooling for the orphaned
//! packages process.
//!
//! The heart of the crate is [`EmailCacheClient`], a SQLite-backed,
//! TTL-bounded read-through cache in front of FASJSON that resolves
//! usernames and `@group` references to email addresses.
//!
//! # Example
//!
//! ```rust,ignore
//! use orphanage_core::{OrphanageApi, Settings};
//!
//! fn main() -> orphanage_core::Result<()> {
//!     let api = OrphanageApi::new(Settings::load(None)?)?;
//!
//!     let emails = api.cache().get_all_emails(&["alice", "@packager"])?;
//!     println!("Resolved {} addresses", emails.len());
//!
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod network;
pub mod pagure;
pub mod settings;

// Re-export commonly used types
pub use actions::{MissingGroupPolicy, RogueReport};
pub use cache::{
    sorted_emails, CacheConfig, EmailBatchError, EmailCacheClient, EmailMap, IdentityStore,
    SqliteIdentityStore, StoreStats, SweepStats,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{OrphanageError, RemoteKind, Result};
pub use identity::{FasjsonClient, IdentitySource};
pub use pagure::{Contributors, GroupCatalog, MaintainerDirectory, PagureClient};
pub use settings::Settings;

use network::HttpClient;
use std::sync::Arc;

/// Main entry point wiring settings to the cache and remote clients.
///
/// FASJSON and Pagure share one HTTP client.
pub struct OrphanageApi {
    settings: Settings,
    cache: EmailCacheClient,
    pagure: PagureClient,
}

impl OrphanageApi {
    /// Open the cache database and build the remote clients.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let http = Arc::new(HttpClient::new()?);
        let fasjson = FasjsonClient::with_http(http.clone(), settings.fasjson.url.clone());
        let cache = EmailCacheClient::open(&settings.fasjson.db, settings.ttl(), Arc::new(fasjson))?;
        let pagure = PagureClient::with_http(http, settings.pagure.url.clone());

        Ok(Self {
            settings,
            cache,
            pagure,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &EmailCacheClient {
        &self.cache
    }

    pub fn pagure(&self) -> &PagureClient {
        &self.pagure
    }

    /// Report Pagure group members outside the packager group.
    ///
    /// `on_missing` overrides the configured policy when given.
    pub fn rogue_packagers(&self, on_missing: Option<MissingGroupPolicy>) -> Result<RogueReport> {
        let policy = on_missing.unwrap_or(self.settings.groups.on_missing);
        actions::rogue_packagers(&self.cache, &self.pagure, policy)
    }

    /// Resolve the maintainers of `prefix`+project for each project to emails.
    pub fn maintainer_emails<S: AsRef<str>>(
        &self,
        projects: &[S],
        prefix: &str,
        include_groups: bool,
    ) -> Result<EmailMap> {
        actions::maintainer_emails(&self.cache, &self.pagure, projects, prefix, include_groups)
    }
}
