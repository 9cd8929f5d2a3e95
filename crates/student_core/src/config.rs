//! Connection parameters for the student store.
//!
//! # Responsibility
//! - Build one explicit `StoreConfig` value at startup.
//! - Layer an optional TOML file, then `STUDENTDB_*` environment variables,
//!   over fixed demo defaults.
//!
//! # Invariants
//! - No process-wide configuration state; callers pass the value to
//!   `SqliteStudentStore::open`.
//! - The password never appears in `Debug` output or logs.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

/// Config file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "studentdb.toml";
/// Prefix for environment overrides, e.g. `STUDENTDB_URL`.
pub const ENV_PREFIX: &str = "STUDENTDB";

const DEFAULT_URL: &str = "studentdb.sqlite3";
const DEFAULT_USERNAME: &str = "student";
const DEFAULT_DRIVER: &str = "sqlite";
const SUPPORTED_DRIVERS: &[&str] = &["sqlite", "sqlite3"];
const MEMORY_URLS: &[&str] = &[":memory:", "sqlite::memory:"];
const SQLITE_URL_SCHEME: &str = "sqlite://";

/// Where the SQLite connection should point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    Memory,
    File(PathBuf),
}

/// Errors raised while assembling configuration sources.
#[derive(Debug)]
pub enum ConfigLoadError {
    Source(config::ConfigError),
}

impl Display for ConfigLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "failed to load store configuration: {err}"),
        }
    }
}

impl Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
        }
    }
}

impl From<config::ConfigError> for ConfigLoadError {
    fn from(value: config::ConfigError) -> Self {
        Self::Source(value)
    }
}

/// Connection URL, credentials and driver identifier.
///
/// The defaults exist for local demo use only.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub driver: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawStoreConfig {
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    driver: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            driver: DEFAULT_DRIVER.to_string(),
        }
    }
}

impl Debug for StoreConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("driver", &self.driver)
            .finish()
    }
}

impl StoreConfig {
    /// Config pointing at a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            url: MEMORY_URLS[0].to_string(),
            ..Self::default()
        }
    }

    /// Loads configuration from `path` (or `studentdb.toml`) and the
    /// `STUDENTDB_*` environment.
    ///
    /// A missing `studentdb.toml` is not an error, but an explicit `path`
    /// must exist. Absent keys fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    /// Same as [`StoreConfig::load`] with a caller-chosen environment prefix.
    pub fn load_with_env_prefix(
        path: Option<&Path>,
        env_prefix: &str,
    ) -> Result<Self, ConfigLoadError> {
        let file_path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);

        let settings = Config::builder()
            .add_source(File::from(file_path).required(path.is_some()))
            .add_source(Environment::with_prefix(env_prefix))
            .build()?;
        let raw = settings.try_deserialize::<RawStoreConfig>()?;

        let defaults = Self::default();
        Ok(Self {
            url: raw.url.unwrap_or(defaults.url),
            username: raw.username.unwrap_or(defaults.username),
            password: raw.password.unwrap_or(defaults.password),
            driver: raw.driver.unwrap_or(defaults.driver),
        })
    }

    /// Returns whether `driver` names a backend this crate can open.
    pub fn is_supported_driver(&self) -> bool {
        let driver = self.driver.trim().to_ascii_lowercase();
        SUPPORTED_DRIVERS.contains(&driver.as_str())
    }

    /// Resolves `url` into an in-memory or file target.
    pub fn target(&self) -> ConnectionTarget {
        let url = self.url.trim();
        if MEMORY_URLS.contains(&url) {
            return ConnectionTarget::Memory;
        }
        let path = url.strip_prefix(SQLITE_URL_SCHEME).unwrap_or(url);
        ConnectionTarget::File(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionTarget, StoreConfig};
    use std::path::PathBuf;

    fn with_url(url: &str) -> StoreConfig {
        StoreConfig {
            url: url.to_string(),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn memory_urls_resolve_to_memory_target() {
        assert_eq!(with_url(":memory:").target(), ConnectionTarget::Memory);
        assert_eq!(with_url("sqlite::memory:").target(), ConnectionTarget::Memory);
        assert_eq!(StoreConfig::in_memory().target(), ConnectionTarget::Memory);
    }

    #[test]
    fn file_urls_strip_sqlite_scheme() {
        assert_eq!(
            with_url("sqlite:///tmp/students.db").target(),
            ConnectionTarget::File(PathBuf::from("/tmp/students.db"))
        );
        assert_eq!(
            with_url("data/students.db").target(),
            ConnectionTarget::File(PathBuf::from("data/students.db"))
        );
    }

    #[test]
    fn driver_check_is_case_insensitive() {
        let mut config = StoreConfig::default();
        assert!(config.is_supported_driver());
        config.driver = " SQLite3 ".to_string();
        assert!(config.is_supported_driver());
        config.driver = "com.mysql.cj.jdbc.Driver".to_string();
        assert!(!config.is_supported_driver());
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = StoreConfig {
            password: "hunter2".to_string(),
            ..StoreConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
