//! Configuration for kvdriver
//!
//! Centralized configuration with sensible defaults. Deserializable so a
//! host database can embed it in its own configuration file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{KvError, Result};

/// Capacity used when none is configured (1 GiB)
pub const DEFAULT_CAPACITY: u64 = 1024 * 1024 * 1024;

/// Main configuration for a kvdriver store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the engine's data file
    /// Internal structure:
    ///   {path}/
    ///     └── data.redb        (engine file, one table)
    pub path: PathBuf,

    /// Maximum bytes of keys and values the table may hold.
    /// Zero means "unset" and resolves to [`DEFAULT_CAPACITY`] on open.
    pub capacity: u64,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// When committed writes reach stable storage
    pub sync: SyncMode,

    // -------------------------------------------------------------------------
    // Engine Tuning
    // -------------------------------------------------------------------------
    /// Page cache size in bytes; engine default when unset
    pub cache_size: Option<usize>,
}

/// Commit durability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Commits are persisted eventually (fast, may lose the most recent
    /// commits on power loss, never corrupts)
    Async,

    /// Every commit is fsynced before returning
    Sync,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./kvdriver_data"),
            capacity: DEFAULT_CAPACITY,
            sync: SyncMode::Async,
            cache_size: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config and resolve unset values.
    ///
    /// An empty path, or a path naming something other than a directory,
    /// is rejected. A zero capacity becomes [`DEFAULT_CAPACITY`].
    pub fn validate(mut self) -> Result<Self> {
        if self.path.as_os_str().is_empty() {
            return Err(KvError::Config("storage path is empty".to_string()));
        }

        if self.path.exists() && !self.path.is_dir() {
            return Err(KvError::Config(format!(
                "storage path {} exists and is not a directory",
                self.path.display()
            )));
        }

        if self.capacity == 0 {
            self.capacity = DEFAULT_CAPACITY;
        }

        Ok(self)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the storage directory
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the capacity (in bytes)
    pub fn capacity(mut self, bytes: u64) -> Self {
        self.config.capacity = bytes;
        self
    }

    /// Set the commit durability
    pub fn sync(mut self, mode: SyncMode) -> Self {
        self.config.sync = mode;
        self
    }

    /// Set the engine page cache size (in bytes)
    pub fn cache_size(mut self, bytes: usize) -> Self {
        self.config.cache_size = Some(bytes);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
