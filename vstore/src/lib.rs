//! Versioned key-value file store.
//!
//! Every write to a key archives the previous content as a numbered
//! revision, keeping up to `history_depth` revisions and evicting the oldest
//! first. Per-key metadata (current version, size, CRC-32, optional
//! timestamp and retained history) lives in a fixed-size binary record next
//! to the content.
//!
//! This crate provides:
//! - `VersionStore`: the rotation engine (write, read, restore, list, cleanup, erase, verify)
//! - `Query`: read-only projections (`info`, `versions`, `is_stale`)
//! - `record`: the metadata record codec
//! - `StoreConfig`: history depth, metadata suffix, timestamp layout, locking
//! - `Logger`: injectable diagnostics, forwarded to `tracing` in production

pub mod checksum;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod locks;
pub mod logger;
pub mod query;
pub mod record;

pub use checksum::checksum;
pub use config::{ConfigError, StoreConfig, DEFAULT_HISTORY_DEPTH, DEFAULT_META_SUFFIX};
pub use engine::{EraseOutcome, IntegrityReport, VersionInfo, VersionStore, WriteOutcome};
pub use error::{VersionError, VersionResult};
pub use history::History;
pub use logger::{Level, LogEntry, Logger, MockLogger, NullLogger, TracingLogger};
pub use query::Query;
pub use record::{MetaStatus, RecordLayout, VersionRecord};

pub use vstore_clock::{Clock, FixedClock, SteppingClock, SystemClock};
pub use vstore_fs::{ByteStore, DirByteStore, FsError, MockByteStore};
