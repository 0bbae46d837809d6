//! Read-only view of a store for callers that only observe keys.

use vstore_clock::Clock;
use vstore_fs::ByteStore;

use crate::engine::{VersionInfo, VersionStore};
use crate::logger::Logger;

/// Borrowed read-only projections over a `VersionStore`.
pub struct Query<'a, S, C, L> {
    engine: &'a VersionStore<S, C, L>,
}

impl<'a, S: ByteStore, C: Clock, L: Logger> Query<'a, S, C, L> {
    pub fn new(engine: &'a VersionStore<S, C, L>) -> Self {
        Self { engine }
    }

    /// The current version of `key`, or `None` when it has no content.
    pub fn info(&self, key: &str) -> Option<VersionInfo> {
        self.engine
            .load_existing(key)
            .map(|(_guard, decoded)| self.engine.current_info(&decoded.record))
    }

    /// Current version first, then archived versions newest-first.
    pub fn versions(&self, key: &str) -> Vec<VersionInfo> {
        self.engine.list_versions(key)
    }

    /// Whether `key` moved past the version the caller last saw.
    pub fn is_stale(&self, key: &str, last_known_version: u32) -> bool {
        self.engine.has_changed(key, last_known_version)
    }
}
