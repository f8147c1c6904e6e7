//! Configuration management for the chore tracker.
//!
//! Settings live in `<data dir>/config.yaml`. Every field has a default, so a
//! partial file (or no file at all) is valid.

use crate::error::Result;
use crate::paths::{self, CONFIG_FILENAME, DATABASE_FILENAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for the command-backed suggestion provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Program to run.
    pub command: String,
    /// Arguments placed before the rendered prompt, which is always last.
    pub args: Vec<String>,
    /// Seconds to wait for a reply before giving up.
    pub timeout_secs: u64,
    /// Most items to accept from each list in one reply.
    pub max_items: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            command: "claude".to_string(),
            args: vec!["--print".to_string(), "-p".to_string()],
            timeout_secs: 120,
            max_items: 5,
        }
    }
}

impl SuggestionConfig {
    /// The reply timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Chore tracker configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChoresConfig {
    /// Database file. Defaults to `chores.sqlite3` in the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Log level used when `CHORES_LOG` is not set.
    pub log_level: String,

    /// Suggestion provider settings.
    pub suggestions: SuggestionConfig,
}

impl Default for ChoresConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "warn".to_string(),
            suggestions: SuggestionConfig::default(),
        }
    }
}

impl ChoresConfig {
    /// Load config from the data directory, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        match paths::data_dir() {
            Some(dir) => Ok(Self::load_from(&dir)?.unwrap_or_default()),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific directory, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(dir: &Path) -> Result<Option<Self>> {
        let config_path = Self::config_path(dir);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(Some(config))
    }

    /// Save config into a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, dir: &Path) -> Result<()> {
        let config_path = Self::config_path(dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config file path for a directory.
    #[must_use]
    pub fn config_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILENAME)
    }

    /// Resolve the database path, relative to `dir` when configured relatively.
    #[must_use]
    pub fn database_path_in(&self, dir: &Path) -> PathBuf {
        match &self.database_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => dir.join(path),
            None => dir.join(DATABASE_FILENAME),
        }
    }
}

/// Write a default config into `dir` unless one already exists.
///
/// Returns the config now in effect and whether the file was created.
///
/// # Errors
///
/// Returns an error if an existing file cannot be parsed or a new one cannot
/// be written.
pub fn ensure_config(dir: &Path) -> Result<(ChoresConfig, bool)> {
    if let Some(existing) = ChoresConfig::load_from(dir)? {
        return Ok((existing, false));
    }

    let config = ChoresConfig::default();
    config.save_to(dir)?;
    tracing::info!(path = %ChoresConfig::config_path(dir).display(), "wrote default config");
    Ok((config, true))
}
