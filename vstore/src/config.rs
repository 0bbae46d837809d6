//! Store configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::RecordLayout;

/// Default number of archived revisions kept per key.
pub const DEFAULT_HISTORY_DEPTH: usize = 5;

/// Largest accepted history depth.
pub const MAX_HISTORY_DEPTH: usize = 1024;

/// Default suffix of metadata objects.
pub const DEFAULT_META_SUFFIX: &str = ".meta";

/// Default bound on waiting for a key lock, in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 1000;

/// Default number of lock shards.
pub const DEFAULT_LOCK_SHARDS: usize = 16;

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("history-depth must be between 1 and {max}, got {got}", max = MAX_HISTORY_DEPTH)]
    InvalidHistoryDepth { got: usize },

    #[error("lock-shards must be at least 1, got {0}")]
    InvalidLockShards(usize),

    #[error("meta-suffix must start with '.' and have at least one more character, got {0:?}")]
    InvalidMetaSuffix(String),

    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings fixed for the lifetime of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Archived revisions kept per key (`H`).
    pub history_depth: usize,
    /// Suffix appended to a key to name its metadata object.
    pub meta_suffix: String,
    /// Whether records carry a last-write timestamp.
    pub timestamp: bool,
    /// Bound on waiting for a key lock before the operation fails.
    pub lock_timeout_ms: u64,
    /// Number of lock shards keys are spread over.
    pub lock_shards: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            meta_suffix: DEFAULT_META_SUFFIX.to_string(),
            timestamp: true,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            lock_shards: DEFAULT_LOCK_SHARDS,
        }
    }
}

impl StoreConfig {
    /// Builder: set history_depth.
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth;
        self
    }

    /// Builder: set meta_suffix.
    pub fn with_meta_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.meta_suffix = suffix.into();
        self
    }

    /// Builder: set timestamp.
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builder: set lock_timeout_ms.
    pub fn with_lock_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Builder: set lock_shards.
    pub fn with_lock_shards(mut self, shards: usize) -> Self {
        self.lock_shards = shards;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_depth == 0 || self.history_depth > MAX_HISTORY_DEPTH {
            return Err(ConfigError::InvalidHistoryDepth {
                got: self.history_depth,
            });
        }
        if self.lock_shards == 0 {
            return Err(ConfigError::InvalidLockShards(self.lock_shards));
        }
        if !self.meta_suffix.starts_with('.') || self.meta_suffix.len() < 2 {
            return Err(ConfigError::InvalidMetaSuffix(self.meta_suffix.clone()));
        }
        // ".v7" style suffixes would collide with archived revisions
        if vstore_fs::parse_version_name(&format!("k{}", self.meta_suffix)).is_some() {
            return Err(ConfigError::InvalidMetaSuffix(self.meta_suffix.clone()));
        }
        // metadata must not land on another object's staging file
        if self.meta_suffix.ends_with(vstore_fs::TEMP_SUFFIX) {
            return Err(ConfigError::InvalidMetaSuffix(self.meta_suffix.clone()));
        }
        Ok(())
    }

    pub fn layout(&self) -> RecordLayout {
        RecordLayout::new(self.history_depth, self.timestamp)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
