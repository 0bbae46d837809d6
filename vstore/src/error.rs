//! Errors surfaced by the rotation engine.

use thiserror::Error;
use vstore_fs::FsError;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("store not mounted")]
    NotMounted,

    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("version 0 names the current content and cannot be restored")]
    InvalidVersion,

    #[error("{key} has no content")]
    MissingKey { key: String },

    #[error("{key} has no version {version}")]
    MissingVersion { key: String, version: u32 },

    #[error("short read on {key} version {version}: wanted {expected} bytes, found {actual}")]
    ShortRead {
        key: String,
        version: u32,
        expected: usize,
        actual: usize,
    },

    #[error("timed out after {waited_ms} ms waiting for the lock on {key}")]
    LockTimeout { key: String, waited_ms: u64 },

    #[error("{key} has exhausted its version counter")]
    VersionExhausted { key: String },

    #[error("content of {len} bytes does not fit the 32-bit size field")]
    TooLarge { len: usize },

    #[error("byte store error: {0}")]
    Store(#[from] FsError),
}

impl VersionError {
    /// Lift a byte store error, keeping the store-independent variants
    /// (mount state, key validity) distinct from I/O failures.
    pub(crate) fn from_store(err: FsError) -> Self {
        match err {
            FsError::NotMounted => VersionError::NotMounted,
            FsError::InvalidKey { key, reason } => VersionError::InvalidKey { key, reason },
            other => VersionError::Store(other),
        }
    }
}

/// Result alias for engine operations.
pub type VersionResult<T> = Result<T, VersionError>;
