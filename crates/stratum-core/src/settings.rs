//! Settings for the stratum engine.
//!
//! This module provides the [`Settings`] struct holding engine configuration,
//! TOML loading, and a globally-accessible, lazily-initialized instance.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{StratumError, StratumResult};

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// The database engine (currently only `"sqlite"`).
    pub engine: String,
    /// The database name (file path for SQLite, `":memory:"` for in-memory).
    pub name: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            engine: "sqlite".to_string(),
            name: "db.sqlite3".to_string(),
        }
    }
}

/// The complete set of engine settings.
///
/// Use [`SETTINGS`] to access the global instance, or construct one directly
/// for tests and embedded use.
///
/// # Examples
///
/// ```
/// use stratum_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.migrations_dir.to_str(), Some("migrations"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs, verbose diagnostics).
    pub debug: bool,
    /// The tracing filter directive (e.g. `"info"`, `"stratum=debug"`).
    pub log_level: String,
    /// Labels of the installed applications, in load order.
    pub installed_apps: Vec<String>,
    /// The directory containing per-app migration subdirectories.
    pub migrations_dir: PathBuf,
    /// Database connection configuration.
    pub database: DatabaseSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            installed_apps: Vec::new(),
            migrations_dir: PathBuf::from("migrations"),
            database: DatabaseSettings::default(),
        }
    }
}

impl Settings {
    /// Parses settings from a TOML string.
    pub fn from_toml_str(content: &str) -> StratumResult<Self> {
        toml::from_str(content)
            .map_err(|e| StratumError::ConfigurationError(format!("Invalid settings TOML: {e}")))
    }

    /// Loads settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> StratumResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            StratumError::ConfigurationError(format!(
                "Cannot read settings file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml_str(&content)
    }
}

/// The global settings instance.
///
/// Initialized on first access with defaults, or explicitly via
/// [`init_settings`] before any other engine call.
pub static SETTINGS: GlobalSettings = GlobalSettings::new();

/// Lazily-initialized global [`Settings`] holder.
pub struct GlobalSettings {
    inner: OnceLock<Settings>,
}

impl GlobalSettings {
    const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Returns the global settings, initializing with defaults if needed.
    pub fn get(&self) -> &Settings {
        self.inner.get_or_init(Settings::default)
    }

    /// Installs the given settings as the global instance.
    ///
    /// Returns an error if settings were already initialized.
    pub fn init(&self, settings: Settings) -> StratumResult<()> {
        self.inner.set(settings).map_err(|_| {
            StratumError::ImproperlyConfigured(
                "Settings have already been initialized".to_string(),
            )
        })
    }
}

/// Installs `settings` as the process-global instance.
pub fn init_settings(settings: Settings) -> StratumResult<()> {
    SETTINGS.init(settings)
}
