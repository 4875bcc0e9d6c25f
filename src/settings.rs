//! User settings backed by a TOML file.
//!
//! Settings are read once at start-up and queried per `(section, key)` with a
//! typed default, so a missing file, a missing key or a value of the wrong type
//! all fall back to the built-in value.
//!
//! ```toml
//! [input]
//! repeat_first_ms = 400
//!
//! [game_widget]
//! width = 180
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use crate::error::SettingsError;

/// Directory name used under the user's config directory.
pub const APP_DIR: &str = "couch-ui";

/// File name of the settings file.
pub const FILE_NAME: &str = "config.toml";

/// Parsed settings file.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    table: toml::Table,
    path: Option<PathBuf>,
}

impl Settings {
    /// Empty settings: every query returns its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from TOML text.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        Ok(Self {
            table: text.parse::<toml::Table>()?,
            path: None,
        })
    }

    /// Load settings from `path`. A missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no settings file at {}, using defaults", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut settings = Self::parse(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded settings from {}", path.display());
        settings.path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Load from `explicit` if given, else from [`default_path`](Self::default_path).
    pub fn discover(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load(&path),
            None => {
                info!("no config directory found, using default settings");
                Ok(Self::new())
            }
        }
    }

    /// `$XDG_CONFIG_HOME/couch-ui/config.toml`, else
    /// `$HOME/.config/couch-ui/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        let base = env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
        Some(base.join(APP_DIR).join(FILE_NAME))
    }

    /// The file these settings came from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether `section` exists.
    pub fn has_section(&self, section: &str) -> bool {
        self.table.get(section).is_some_and(toml::Value::is_table)
    }

    /// Typed lookup of `key` in `[section]`.
    ///
    /// Returns `default` when the key is missing or its value does not
    /// deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, section: &str, key: &str, default: T) -> T {
        let Some(value) = self.table.get(section).and_then(|s| s.get(key)) else {
            return default;
        };
        let parsed: Result<T, _> = value.clone().try_into();
        match parsed {
            Ok(v) => v,
            Err(e) => {
                warn!("ignoring [{section}] {key}: {e}");
                default
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
