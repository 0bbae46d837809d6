//! Exit codes for the vstore CLI.
//!
//! Following Unix conventions for exit codes.

use vstore::VersionError;

use crate::commands::CommandError;

/// Exit code constants.
pub mod codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Invalid arguments or key.
    pub const INVALID_ARGS: i32 = 1;
    /// IO error.
    pub const IO_ERROR: i32 = 2;
    /// Config file unreadable or invalid.
    pub const CONFIG_ERROR: i32 = 3;
    /// Key or version does not exist.
    pub const NOT_FOUND: i32 = 4;
    /// Store root is not a directory.
    pub const NOT_MOUNTED: i32 = 5;
    /// Key lock could not be taken in time.
    pub const LOCK_TIMEOUT: i32 = 6;
    /// Current content does not match its metadata.
    pub const INTEGRITY_ERROR: i32 = 7;
    /// Version counter exhausted.
    pub const EXHAUSTED: i32 = 8;
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) => codes::INVALID_ARGS,
        CommandError::Config(_) => codes::CONFIG_ERROR,
        CommandError::Version(e) => version_exit_code(e),
        CommandError::Filesystem(_) => codes::IO_ERROR,
        CommandError::ReadInput { .. } => codes::IO_ERROR,
        CommandError::WriteOutput { .. } => codes::IO_ERROR,
        CommandError::Output(_) => codes::IO_ERROR,
        CommandError::Json(_) => codes::IO_ERROR,
        CommandError::IntegrityMismatch { .. } => codes::INTEGRITY_ERROR,
    }
}

fn version_exit_code(error: &VersionError) -> i32 {
    match error {
        VersionError::NotMounted => codes::NOT_MOUNTED,
        VersionError::InvalidKey { .. }
        | VersionError::InvalidVersion
        | VersionError::TooLarge { .. } => codes::INVALID_ARGS,
        VersionError::MissingKey { .. } | VersionError::MissingVersion { .. } => codes::NOT_FOUND,
        VersionError::LockTimeout { .. } => codes::LOCK_TIMEOUT,
        VersionError::VersionExhausted { .. } => codes::EXHAUSTED,
        VersionError::ShortRead { .. } | VersionError::Store(_) => codes::IO_ERROR,
    }
}
