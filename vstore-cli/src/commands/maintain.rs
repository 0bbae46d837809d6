//! Cleanup, erase and verify commands.

use vstore::{ByteStore, Clock, EraseOutcome, IntegrityReport, Logger, VersionStore};

use crate::cli::KeyArgs;

use super::CommandResult;

/// Execute the cleanup command. Returns the number of versions evicted.
pub fn execute_cleanup<S, C, L>(args: &KeyArgs, store: &VersionStore<S, C, L>) -> u32
where
    S: ByteStore,
    C: Clock,
    L: Logger,
{
    store.cleanup(&args.key)
}

/// Execute the erase command.
pub fn execute_erase<S, C, L>(
    args: &KeyArgs,
    store: &VersionStore<S, C, L>,
) -> CommandResult<EraseOutcome>
where
    S: ByteStore,
    C: Clock,
    L: Logger,
{
    Ok(store.erase(&args.key)?)
}

/// Execute the verify command.
pub fn execute_verify<S, C, L>(
    args: &KeyArgs,
    store: &VersionStore<S, C, L>,
) -> CommandResult<IntegrityReport>
where
    S: ByteStore,
    C: Clock,
    L: Logger,
{
    Ok(store.verify(&args.key)?)
}

/// Human-readable verify result.
pub fn describe(key: &str, report: &IntegrityReport) -> String {
    let verdict = if report.is_intact() { "OK" } else { "MISMATCH" };
    format!(
        "{} version {}: {}\n  size: expected {}, actual {}\n  crc32: expected 0x{:08x}, actual 0x{:08x}\n  metadata: {:?}",
        key,
        report.version,
        verdict,
        report.expected_size,
        report.actual_size,
        report.expected_checksum,
        report.actual_checksum,
        report.meta_status
    )
}
