//! User configuration loading.
//!
//! Precedence (lowest to highest):
//! 1. Programmatic defaults
//! 2. TOML file (`--config`, or `<config dir>/orphanage.toml` if present)
//! 3. Environment variables (`ORPHANAGE_` prefix, `__` separates sections)
//!
//! Command-line overrides are applied by the binary after loading.

use crate::actions::MissingGroupPolicy;
use crate::cache::CacheConfig;
use crate::config::{AppConfig, NetworkConfig, PathsConfig};
use crate::error::{OrphanageError, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FasjsonSettings {
    /// Base URL of the FASJSON API.
    pub url: String,
    /// Cache TTL in seconds.
    pub ttl_secs: u64,
    /// Path to the SQLite cache database.
    pub db: PathBuf,
}

impl Default for FasjsonSettings {
    fn default() -> Self {
        Self {
            url: NetworkConfig::FASJSON_URL.to_string(),
            ttl_secs: CacheConfig::DEFAULT_TTL_SECS,
            db: Settings::default_db_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagureSettings {
    pub url: String,
}

impl Default for PagureSettings {
    fn default() -> Self {
        Self {
            url: NetworkConfig::PAGURE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSettings {
    /// What to do when a group listed by Pagure does not exist in FASJSON.
    pub on_missing: MissingGroupPolicy,
}

/// Complete user configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fasjson: FasjsonSettings,
    pub pagure: PagureSettings,
    pub groups: GroupSettings,
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit `path` must exist. Without one, the default config file is
    /// used only if it is present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings: Settings = Self::figment(path)?.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Build the layered figment without extracting it.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(OrphanageError::Config {
                        message: format!("Config file {} does not exist", path.display()),
                    });
                }
                debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(default) = Self::default_config_path().filter(|p| p.is_file()) {
                    debug!("Loading config from {}", default.display());
                    figment = figment.merge(Toml::file(default));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(AppConfig::ENV_PREFIX).split("__")))
    }

    /// `<config dir>/orphanage.toml`, e.g. `~/.config/orphanage.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(AppConfig::CONFIG_FILE_NAME))
    }

    /// `<cache dir>/orphanage/fasjson.db`, falling back to the working
    /// directory when no cache dir is known.
    pub fn default_db_path() -> PathBuf {
        dirs::cache_dir()
            .map(|d| d.join(PathsConfig::CACHE_DIR_NAME))
            .unwrap_or_default()
            .join(PathsConfig::FASJSON_DB_FILENAME)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.fasjson.ttl_secs)
    }

    /// Validate settings after loading or overriding.
    pub fn validate(&self) -> Result<()> {
        if self.fasjson.ttl_secs == 0 {
            return Err(OrphanageError::Config {
                message: "fasjson.ttl_secs must be greater than zero".to_string(),
            });
        }

        if self.fasjson.db.as_os_str().is_empty() {
            return Err(OrphanageError::Config {
                message: "fasjson.db cannot be empty".to_string(),
            });
        }

        for (field, value) in [("fasjson.url", &self.fasjson.url), ("pagure.url", &self.pagure.url)] {
            url::Url::parse(value).map_err(|e| OrphanageError::Config {
                message: format!("Invalid {} {:?}: {}", field, value, e),
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.fasjson.ttl_secs, 86_400);
        assert_eq!(settings.fasjson.url, "https://fasjson.fedoraproject.org");
        assert!(settings.fasjson.db.ends_with("fasjson.db"));
        assert_eq!(settings.groups.on_missing, MissingGroupPolicy::Skip);
        settings.validate().expect("Default settings should be valid");
    }

    #[test]
    fn test_file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                [fasjson]
                ttl_secs = 120
                db = "/tmp/custom.db"

                [groups]
                on_missing = "fail"
                "#,
            )?;
            jail.set_env("ORPHANAGE_FASJSON__TTL_SECS", "60");

            let settings =
                Settings::load(Some(Path::new("custom.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(settings.fasjson.ttl_secs, 60);
            assert_eq!(settings.fasjson.db, PathBuf::from("/tmp/custom.db"));
            assert_eq!(settings.groups.on_missing, MissingGroupPolicy::Fail);
            assert_eq!(settings.pagure.url, NetworkConfig::PAGURE_URL);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let err = Settings::load(Some(Path::new("nope.toml"))).unwrap_err();
            assert!(matches!(err, OrphanageError::Config { .. }));
            Ok(())
        });
    }

    #[test]
    fn test_zero_ttl_rejected() {
        Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", dir);
            jail.set_env("ORPHANAGE_FASJSON__TTL_SECS", "0");
            let err = Settings::load(None).unwrap_err();
            assert!(err.to_string().contains("ttl_secs"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut settings = Settings::default();
        settings.pagure.url = "not a url".to_string();
        assert!(settings.validate().is_err());
    }
}
