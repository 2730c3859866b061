//! Centralized constants for Orphanage.

use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const ENV_PREFIX: &'static str = "ORPHANAGE_";
    pub const CONFIG_FILE_NAME: &'static str = "orphanage.toml";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const USER_AGENT: &'static str = concat!("orphanage/", env!("CARGO_PKG_VERSION"));
    pub const FASJSON_URL: &'static str = "https://fasjson.fedoraproject.org";
    pub const PAGURE_URL: &'static str = "https://src.fedoraproject.org";
    /// Pagure's maximum page size; the groups listing is not paginated further.
    pub const PAGURE_PER_PAGE: u32 = 100;
}

/// Shared directory and path configurations.
pub struct PathsConfig;

impl PathsConfig {
    pub const CACHE_DIR_NAME: &'static str = "orphanage";
    pub const FASJSON_DB_FILENAME: &'static str = "fasjson.db";
}

/// Group names with special meaning to the packaging process.
pub struct GroupsConfig;

impl GroupsConfig {
    pub const PACKAGER_GROUP: &'static str = "packager";
}
