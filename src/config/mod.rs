//! Configuration management.
//!
//! Configuration comes from an optional TOML file and is then overridden by
//! `LITESTORE_*` environment variables:
//!
//! ```toml
//! database = "sqlite://./data/app.db#users"
//! base_dir = "/srv/app"
//! list_binding = "bound"
//!
//! [connection]
//! busy_timeout_ms = 5000
//! wal = true
//! ```

use crate::models::ListBinding;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default `busy_timeout` in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Main configuration for a record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Connection descriptor (`[sqlite://]path[#table]`).
    pub database: Option<String>,
    /// Directory relative database paths are resolved against.
    pub base_dir: PathBuf,
    /// How `OneOf` lists reach the database.
    pub list_binding: ListBinding,
    /// Per-connection settings.
    pub connection: ConnectionSettings,
}

/// Per-connection `SQLite` settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// How long to wait on a locked database before failing.
    pub busy_timeout_ms: u64,
    /// Whether to switch file databases to WAL journaling.
    pub wal: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            wal: true,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Connection descriptor.
    pub database: Option<String>,
    /// Base directory.
    pub base_dir: Option<String>,
    /// List binding mode.
    pub list_binding: Option<ListBinding>,
    /// Connection section.
    pub connection: Option<ConfigFileConnection>,
}

/// Connection section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileConnection {
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: Option<u64>,
    /// WAL journaling.
    pub wal: Option<bool>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: None,
            base_dir: PathBuf::from("."),
            list_binding: ListBinding::default(),
            connection: ConnectionSettings::default(),
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not valid configuration.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/litestore/` on macOS)
    /// 2. XDG config dir (`~/.config/litestore/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join("litestore").join("config.toml");
        if platform_config.exists() {
            match Self::load_from_file(&platform_config) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %platform_config.display(), error = %e, "ignoring unreadable config"),
            }
        }

        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("litestore")
            .join("config.toml");
        if xdg_config.exists() {
            match Self::load_from_file(&xdg_config) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %xdg_config.display(), error = %e, "ignoring unreadable config"),
            }
        }

        Self::default()
    }

    /// Applies `LITESTORE_*` environment overrides.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `LITESTORE_DATABASE` | `database` |
    /// | `LITESTORE_BASE_DIR` | `base_dir` |
    /// | `LITESTORE_LIST_BINDING` | `list_binding` (`bound` / `inline`) |
    /// | `LITESTORE_BUSY_TIMEOUT_MS` | `connection.busy_timeout_ms` |
    /// | `LITESTORE_WAL` | `connection.wal` |
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(database) = lookup("LITESTORE_DATABASE").filter(|v| !v.trim().is_empty()) {
            self.database = Some(database);
        }
        if let Some(base_dir) = lookup("LITESTORE_BASE_DIR").filter(|v| !v.trim().is_empty()) {
            self.base_dir = PathBuf::from(base_dir);
        }
        if let Some(raw) = lookup("LITESTORE_LIST_BINDING") {
            match ListBinding::parse(&raw) {
                Some(binding) => self.list_binding = binding,
                None => tracing::warn!(value = %raw, "ignoring invalid LITESTORE_LIST_BINDING"),
            }
        }
        if let Some(raw) = lookup("LITESTORE_BUSY_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.connection.busy_timeout_ms = ms,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid LITESTORE_BUSY_TIMEOUT_MS"),
            }
        }
        if let Some(raw) = lookup("LITESTORE_WAL") {
            match parse_bool(&raw) {
                Some(wal) => self.connection.wal = wal,
                None => tracing::warn!(value = %raw, "ignoring invalid LITESTORE_WAL"),
            }
        }
        self
    }

    /// Converts a `ConfigFile` to `StoreConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        config.database = file.database;
        if let Some(base_dir) = file.base_dir {
            config.base_dir = PathBuf::from(base_dir);
        }
        if let Some(list_binding) = file.list_binding {
            config.list_binding = list_binding;
        }
        if let Some(connection) = file.connection {
            if let Some(ms) = connection.busy_timeout_ms {
                config.connection.busy_timeout_ms = ms;
            }
            if let Some(wal) = connection.wal {
                config.connection.wal = wal;
            }
        }

        config
    }

    /// Sets the connection descriptor.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Sets the base directory.
    #[must_use]
    pub fn with_base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_dir = path.into();
        self
    }

    /// Sets the list binding mode.
    #[must_use]
    pub const fn with_list_binding(mut self, list_binding: ListBinding) -> Self {
        self.list_binding = list_binding;
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
