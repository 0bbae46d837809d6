//! Version rotation engine.
//!
//! Every write to a key runs the rotation:
//! 1. Load the key's record (default when absent or corrupt)
//! 2. Copy the current content to `key.v<current_version>` and register that
//!    version in the history, evicting the oldest archived revision first
//!    when the history is full. Failure here is logged, never fatal.
//! 3. Write the new content under the key
//! 4. Bump the version, recompute size/checksum/timestamp, persist the record.
//!    Failure here is logged; the write still counts as done.
//!
//! All public operations hold the key's lock for their whole duration.
//! Helpers suffixed `_locked` (and the private helpers below them) assume
//! the lock is already held and never take it.

use serde::Serialize;
use vstore_clock::{Clock, SystemClock};
use vstore_fs::{meta_name, validate_key, version_name, ByteStore, FsError};

use crate::checksum::checksum;
use crate::config::{ConfigError, StoreConfig};
use crate::error::{VersionError, VersionResult};
use crate::locks::{KeyGuard, KeyLocks};
use crate::logger::{Logger, TracingLogger};
use crate::query::Query;
use crate::record::{self, Decoded, MetaStatus, RecordLayout, VersionRecord};

/// One entry of a version listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: u32,
    pub size: usize,
    pub is_current: bool,
    /// Last-write time; only known for the current version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u32>,
}

/// What a successful write did besides replacing the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Version number the new content was given.
    pub version: u32,
    /// Previous version, if it was archived.
    pub archived: Option<u32>,
    /// Archived versions evicted to make room.
    pub evicted: Vec<u32>,
    /// Whether the updated record reached the byte store.
    pub metadata_saved: bool,
}

/// Objects removed by an erase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EraseOutcome {
    pub content_removed: bool,
    pub archives_removed: u32,
    pub metadata_removed: bool,
}

/// Current content checked against its record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub version: u32,
    pub meta_status: MetaStatus,
    pub expected_size: u32,
    pub actual_size: usize,
    pub expected_checksum: u32,
    pub actual_checksum: u32,
}

impl IntegrityReport {
    /// The record was readable and both size and checksum match.
    pub fn is_intact(&self) -> bool {
        matches!(
            self.meta_status,
            MetaStatus::Valid | MetaStatus::Resized { .. }
        ) && self.expected_size as usize == self.actual_size
            && self.expected_checksum == self.actual_checksum
    }
}

/// Versioned key-value store over a byte store.
pub struct VersionStore<S, C = SystemClock, L = TracingLogger> {
    store: S,
    clock: C,
    logger: L,
    config: StoreConfig,
    layout: RecordLayout,
    locks: KeyLocks,
}

impl<S: ByteStore> VersionStore<S> {
    /// Store using the system clock and `tracing` output.
    pub fn open(store: S, config: StoreConfig) -> Result<Self, ConfigError> {
        Self::new(store, SystemClock, TracingLogger, config)
    }
}

impl<S: ByteStore, C: Clock, L: Logger> VersionStore<S, C, L> {
    pub fn new(store: S, clock: C, logger: L, config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            layout: config.layout(),
            locks: KeyLocks::new(config.lock_shards, config.lock_timeout()),
            store,
            clock,
            logger,
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read-only projections over this store.
    pub fn query(&self) -> Query<'_, S, C, L> {
        Query::new(self)
    }

    // ===========================================
    // Mutations
    // ===========================================

    /// Write `data` as the new current version of `key`.
    ///
    /// Fails only when the content itself could not be stored; archival and
    /// metadata persistence are best-effort and reported in the outcome.
    pub fn write(&self, key: &str, data: &[u8]) -> VersionResult<WriteOutcome> {
        self.check_key(key)?;
        let _guard = self.lock(key)?;
        self.write_locked(key, data)
    }

    /// Make archived `version` current again.
    ///
    /// The content is written through the normal write path, so it gets a
    /// new version number and the version it replaces is archived.
    pub fn restore(&self, key: &str, version: u32) -> VersionResult<WriteOutcome> {
        self.check_key(key)?;
        if version == 0 {
            return Err(VersionError::InvalidVersion);
        }
        let _guard = self.lock(key)?;

        let name = version_name(key, version);
        let data = self.store.read_all(&name).map_err(|e| {
            self.logger.error(&format!(
                "cannot restore {} to version {}: {}",
                key, version, e
            ));
            self.missing_or(key, version, e)
        })?;

        let outcome = self.write_locked(key, &data)?;
        self.logger.info(&format!(
            "restored {} to version {} as version {}",
            key, version, outcome.version
        ));
        Ok(outcome)
    }

    /// Evict the oldest archived revisions until at most `history_depth`
    /// remain. Returns the number evicted.
    ///
    /// Records written under a different depth are rewritten in the current
    /// layout.
    pub fn cleanup(&self, key: &str) -> u32 {
        if self.check_key(key).is_err() {
            return 0;
        }
        let Ok(_guard) = self.lock(key) else {
            return 0;
        };

        let Decoded { mut record, status } = self.load_record(key);
        if matches!(status, MetaStatus::Absent | MetaStatus::Corrupt) {
            return 0;
        }

        let evicted = self.evict_down_to(key, &mut record, self.config.history_depth);
        let resized = matches!(status, MetaStatus::Resized { .. });
        if !evicted.is_empty() || resized {
            if let Err(e) = self.save_record(key, &record) {
                self.logger
                    .warn(&format!("failed to save metadata for {} after cleanup: {}", key, e));
            }
        }
        if !evicted.is_empty() {
            self.logger.info(&format!(
                "cleaned up {} old versions of {}: {:?}",
                evicted.len(),
                key,
                evicted
            ));
        }
        evicted.len() as u32
    }

    /// Delete `key`: its content, every archived revision in its history,
    /// and its metadata.
    pub fn erase(&self, key: &str) -> VersionResult<EraseOutcome> {
        self.check_key(key)?;
        let _guard = self.lock(key)?;

        let Decoded { mut record, .. } = self.load_record(key);

        let content_removed = match self.store.remove(key) {
            Ok(()) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                self.logger.error(&format!("failed to delete {}: {}", key, e));
                return Err(VersionError::from_store(e));
            }
        };

        let archives_removed = self.evict_down_to(key, &mut record, 0).len() as u32;

        let meta = self.meta_name(key);
        let metadata_removed = match self.store.remove(&meta) {
            Ok(()) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                self.logger
                    .warn(&format!("failed to delete metadata {}: {}", meta, e));
                false
            }
        };

        if !content_removed && archives_removed == 0 && !metadata_removed {
            return Err(VersionError::MissingKey {
                key: key.to_string(),
            });
        }

        self.logger.info(&format!(
            "erased {} ({} archived versions)",
            key, archives_removed
        ));
        Ok(EraseOutcome {
            content_removed,
            archives_removed,
            metadata_removed,
        })
    }

    // ===========================================
    // Reads
    // ===========================================

    /// Fill `buf` from `version` of `key`; 0 reads the current content.
    ///
    /// The object must hold at least `buf.len()` bytes.
    pub fn read(&self, key: &str, version: u32, buf: &mut [u8]) -> VersionResult<()> {
        self.check_key(key)?;
        let _guard = self.lock(key)?;

        let name = self.object_name(key, version);
        let data = self
            .store
            .read(&name, buf.len())
            .map_err(|e| self.read_failed(key, version, e))?;
        buf.copy_from_slice(&data);

        self.logger.debug(&format!(
            "read {} bytes from {} version {}",
            buf.len(),
            key,
            version
        ));
        Ok(())
    }

    /// Whole content of `version` of `key`; 0 reads the current content.
    pub fn read_version(&self, key: &str, version: u32) -> VersionResult<Vec<u8>> {
        self.check_key(key)?;
        let _guard = self.lock(key)?;

        let name = self.object_name(key, version);
        self.store
            .read_all(&name)
            .map_err(|e| self.read_failed(key, version, e))
    }

    /// Current version first, then retained archived versions newest-first.
    ///
    /// Archived versions whose content is gone are left out.
    pub fn list_versions(&self, key: &str) -> Vec<VersionInfo> {
        let Some((_guard, decoded)) = self.load_existing(key) else {
            return Vec::new();
        };
        let record = decoded.record;

        let mut versions = vec![self.current_info(&record)];
        for version in record.history.sorted_desc() {
            match self.store.size(&version_name(key, version)) {
                Ok(size) => versions.push(VersionInfo {
                    version,
                    size,
                    is_current: false,
                    timestamp: None,
                }),
                Err(e) if e.is_not_found() => {
                    self.logger
                        .debug(&format!("version {} of {} already evicted", version, key));
                }
                Err(e) => {
                    self.logger.warn(&format!(
                        "cannot stat version {} of {}: {}",
                        version, key, e
                    ));
                }
            }
        }
        versions
    }

    /// Current version number; 0 when the key has no content, the store is
    /// unmounted, or the lock could not be taken.
    pub fn current_version(&self, key: &str) -> u32 {
        self.load_existing(key)
            .map(|(_guard, decoded)| decoded.record.current_version)
            .unwrap_or(0)
    }

    /// Whether the key moved past `last_known_version`.
    ///
    /// Strictly greater: a caller ahead of the store sees no change.
    pub fn has_changed(&self, key: &str, last_known_version: u32) -> bool {
        self.current_version(key) > last_known_version
    }

    /// How the key's record loads: absent, valid, resized or corrupt.
    ///
    /// Other operations treat corrupt metadata exactly like absent
    /// metadata; this is the only place the two are told apart.
    pub fn metadata_status(&self, key: &str) -> VersionResult<MetaStatus> {
        self.check_key(key)?;
        let _guard = self.lock(key)?;
        Ok(self.load_record(key).status)
    }

    /// Recompute size and checksum of the current content and compare them
    /// with the record.
    pub fn verify(&self, key: &str) -> VersionResult<IntegrityReport> {
        self.check_key(key)?;
        let _guard = self.lock(key)?;

        let data = self
            .store
            .read_all(key)
            .map_err(|e| self.missing_or(key, 0, e))?;
        let Decoded { record, status } = self.load_record(key);

        let report = IntegrityReport {
            version: record.current_version,
            meta_status: status,
            expected_size: record.file_size,
            actual_size: data.len(),
            expected_checksum: record.checksum,
            actual_checksum: checksum(&data),
        };
        if !report.is_intact() {
            self.logger.warn(&format!(
                "integrity check failed for {}: {:?}",
                key, report
            ));
        }
        Ok(report)
    }

    // ===========================================
    // Lock-held internals
    // ===========================================

    /// Load the record of a key whose content exists, holding its lock.
    pub(crate) fn load_existing(&self, key: &str) -> Option<(KeyGuard<'_>, Decoded)> {
        self.check_key(key).ok()?;
        let guard = self.lock(key).ok()?;
        if !self.store.exists(key) {
            return None;
        }
        let decoded = self.load_record(key);
        Some((guard, decoded))
    }

    pub(crate) fn current_info(&self, record: &VersionRecord) -> VersionInfo {
        VersionInfo {
            version: record.current_version,
            size: record.file_size as usize,
            is_current: true,
            timestamp: self.layout.timestamp.then_some(record.timestamp),
        }
    }

    fn write_locked(&self, key: &str, data: &[u8]) -> VersionResult<WriteOutcome> {
        let file_size =
            u32::try_from(data.len()).map_err(|_| VersionError::TooLarge { len: data.len() })?;

        let Decoded { mut record, .. } = self.load_record(key);
        let next_version =
            record
                .current_version
                .checked_add(1)
                .ok_or_else(|| VersionError::VersionExhausted {
                    key: key.to_string(),
                })?;

        let mut outcome = WriteOutcome {
            version: next_version,
            archived: None,
            evicted: Vec::new(),
            metadata_saved: false,
        };

        if self.store.exists(key) {
            match self.archive_current(key, &mut record) {
                Ok(Some(evicted)) => {
                    outcome.archived = Some(record.current_version);
                    outcome.evicted = evicted;
                }
                Ok(None) => {}
                Err(e) => self.logger.warn(&format!(
                    "failed to archive version {} of {}: {}; writing anyway",
                    record.current_version, key, e
                )),
            }
        }

        if let Err(e) = self.store.write(key, data) {
            self.logger.error(&format!("failed to write {}: {}", key, e));
            return Err(VersionError::from_store(e));
        }

        record.current_version = next_version;
        record.file_size = file_size;
        record.checksum = checksum(data);
        record.timestamp = if self.layout.timestamp {
            self.clock.now_epoch_secs()
        } else {
            0
        };

        outcome.metadata_saved = match self.save_record(key, &record) {
            Ok(()) => true,
            Err(e) => {
                self.logger
                    .warn(&format!("failed to save metadata for {}: {}", key, e));
                false
            }
        };

        self.logger.debug(&format!(
            "wrote {} version {} ({} bytes, crc 0x{:08x})",
            key, record.current_version, file_size, record.checksum
        ));
        Ok(outcome)
    }

    /// Copy the current content to its archived name and register it.
    ///
    /// Returns the versions evicted to make room, or `None` when the content
    /// predates versioning and has no number to archive under.
    fn archive_current(
        &self,
        key: &str,
        record: &mut VersionRecord,
    ) -> VersionResult<Option<Vec<u32>>> {
        if record.is_fresh() {
            self.logger.warn(&format!(
                "{} has content but no version record; replacing it without archiving",
                key
            ));
            return Ok(None);
        }

        let version = record.current_version;
        let data = self.store.read_all(key).map_err(VersionError::from_store)?;
        self.store
            .write(&version_name(key, version), &data)
            .map_err(VersionError::from_store)?;

        let mut evicted = Vec::new();
        if !record.history.contains(version) {
            let room = record.history.capacity().saturating_sub(1);
            evicted = self.evict_down_to(key, record, room);
            record.history.push(version);
        }

        self.logger
            .debug(&format!("archived version {} of {}", version, key));
        Ok(Some(evicted))
    }

    /// Evict oldest-first until the history holds at most `limit` entries.
    ///
    /// An archived object that is already gone counts as evicted. One that
    /// cannot be deleted is still dropped from the history and logged.
    fn evict_down_to(&self, key: &str, record: &mut VersionRecord, limit: usize) -> Vec<u32> {
        let mut evicted = Vec::new();
        while record.history.len() > limit {
            let Some((index, version)) = record.history.oldest() else {
                break;
            };
            let name = version_name(key, version);
            match self.store.remove(&name) {
                Ok(()) => self
                    .logger
                    .debug(&format!("deleted old version {} of {}", version, key)),
                Err(e) if e.is_not_found() => self
                    .logger
                    .debug(&format!("version {} of {} was already gone", version, key)),
                Err(e) => self.logger.warn(&format!(
                    "failed to delete {}: {}; dropping it from history",
                    name, e
                )),
            }
            record.history.remove_at(index);
            evicted.push(version);
        }
        evicted
    }

    fn load_record(&self, key: &str) -> Decoded {
        let name = self.meta_name(key);
        if !self.store.exists(&name) {
            return Decoded {
                record: VersionRecord::new(self.layout.history_depth),
                status: MetaStatus::Absent,
            };
        }

        let buf = match self.store.read_all(&name) {
            Ok(buf) => buf,
            Err(e) => {
                self.logger.warn(&format!(
                    "failed to read metadata for {}, using defaults: {}",
                    key, e
                ));
                return Decoded {
                    record: VersionRecord::new(self.layout.history_depth),
                    status: MetaStatus::Corrupt,
                };
            }
        };

        let decoded = record::decode(&buf, &self.layout);
        if decoded.status != MetaStatus::Corrupt {
            return decoded;
        }
        if let Some(resized) = record::decode_resized(&buf, &self.layout) {
            self.logger.info(&format!(
                "metadata for {} was written with a different history depth ({:?})",
                key, resized.status
            ));
            return resized;
        }
        self.logger.warn(&format!(
            "metadata for {} is corrupt ({} bytes), using defaults",
            key,
            buf.len()
        ));
        decoded
    }

    fn save_record(&self, key: &str, record: &VersionRecord) -> Result<(), FsError> {
        let buf = record::encode(record, &self.layout);
        self.store.write(&self.meta_name(key), &buf)
    }

    // ===========================================
    // Helpers
    // ===========================================

    fn check_key(&self, key: &str) -> VersionResult<()> {
        if !self.store.is_mounted() {
            self.logger.error("store not mounted");
            return Err(VersionError::NotMounted);
        }
        validate_key(key, &self.config.meta_suffix).map_err(VersionError::from_store)
    }

    fn lock(&self, key: &str) -> VersionResult<KeyGuard<'_>> {
        self.locks.acquire(key).ok_or_else(|| {
            self.logger.warn(&format!(
                "timed out waiting {} ms for the lock on {}",
                self.config.lock_timeout_ms, key
            ));
            VersionError::LockTimeout {
                key: key.to_string(),
                waited_ms: self.config.lock_timeout_ms,
            }
        })
    }

    fn meta_name(&self, key: &str) -> String {
        meta_name(key, &self.config.meta_suffix)
    }

    fn object_name(&self, key: &str, version: u32) -> String {
        if version == 0 {
            key.to_string()
        } else {
            version_name(key, version)
        }
    }

    fn read_failed(&self, key: &str, version: u32, err: FsError) -> VersionError {
        self.logger.warn(&format!(
            "failed to read {} version {}: {}",
            key, version, err
        ));
        match err {
            FsError::ShortRead {
                expected, actual, ..
            } => VersionError::ShortRead {
                key: key.to_string(),
                version,
                expected,
                actual,
            },
            other => self.missing_or(key, version, other),
        }
    }

    fn missing_or(&self, key: &str, version: u32, err: FsError) -> VersionError {
        if !err.is_not_found() {
            return VersionError::from_store(err);
        }
        if version == 0 {
            VersionError::MissingKey {
                key: key.to_string(),
            }
        } else {
            VersionError::MissingVersion {
                key: key.to_string(),
                version,
            }
        }
    }
}
