//! Configuration for shici.
//!
//! Read from `<home>/config.toml`. Every field has a default, so a missing
//! file or an empty one yields a working config that reads the data layout
//! from the current directory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::query::{DEFAULT_POPULAR_LIMIT, default_categories};
use crate::store::{DEFAULT_DICTIONARY_LOCATOR, DEFAULT_INDEX_LOCATOR};

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "SHICI_HOME";

/// Environment variable overriding `data_location`.
pub const DATA_ENV: &str = "SHICI_DATA";

// ============================================================================
// Default Functions
// ============================================================================

fn default_data_location() -> String {
    ".".to_string()
}

fn default_index_locator() -> String {
    DEFAULT_INDEX_LOCATOR.to_string()
}

fn default_dictionary_locator() -> String {
    DEFAULT_DICTIONARY_LOCATOR.to_string()
}

fn default_history_file() -> String {
    "history.json".to_string()
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_popular_limit() -> usize {
    DEFAULT_POPULAR_LIMIT
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL (`http://`, `https://`) or directory holding the data layout.
    #[serde(default = "default_data_location")]
    pub data_location: String,
    #[serde(default = "default_index_locator")]
    pub index_locator: String,
    #[serde(default = "default_dictionary_locator")]
    pub dictionary_locator: String,
    /// History slot, relative to the home directory unless absolute.
    #[serde(default = "default_history_file")]
    pub history_file: String,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_popular_limit")]
    pub popular_limit: usize,
    /// Per-request deadline for HTTP fetches. Unset means no deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_seconds: Option<u64>,
    /// Category id -> dynasty value.
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_location: default_data_location(),
            index_locator: default_index_locator(),
            dictionary_locator: default_dictionary_locator(),
            history_file: default_history_file(),
            history_capacity: default_history_capacity(),
            popular_limit: default_popular_limit(),
            fetch_timeout_seconds: None,
            categories: default_categories(),
        }
    }
}

impl Config {
    /// Parse a TOML config string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(Error::config("history_capacity must be at least 1"));
        }
        Ok(())
    }

    /// Load `<home>/config.toml`, or defaults if it doesn't exist.
    pub fn load(home: &Path) -> Result<Self> {
        let path = home.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }

    /// Apply environment overrides (`SHICI_DATA`).
    pub fn apply_env(&mut self) {
        if let Ok(data) = std::env::var(DATA_ENV)
            && !data.is_empty()
        {
            self.data_location = data;
        }
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_seconds.map(Duration::from_secs)
    }

    /// Resolve the history slot path against `home`.
    pub fn history_path(&self, home: &Path) -> PathBuf {
        let file = Path::new(&self.history_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            home.join(file)
        }
    }
}

/// Resolve the shici home directory.
///
/// Precedence:
/// 1. `home_override` (from the --home CLI flag)
/// 2. `SHICI_HOME` environment variable
/// 3. `~/.shici`
pub fn resolve_home(home_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = home_override {
        return Ok(path);
    }
    if let Ok(home) = std::env::var(HOME_ENV)
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }
    let home = dirs_next::home_dir().ok_or_else(|| Error::config("home directory not found"))?;
    Ok(home.join(".shici"))
}
