//! Write and restore commands.

use vstore::{ByteStore, Clock, Logger, VersionStore, WriteOutcome};

use crate::cli::{RestoreArgs, WriteArgs};

use super::{CommandError, CommandResult};

/// Execute the write command.
pub fn execute_write<S, C, L>(
    args: &WriteArgs,
    store: &VersionStore<S, C, L>,
) -> CommandResult<WriteOutcome>
where
    S: ByteStore,
    C: Clock,
    L: Logger,
{
    let data = load_content(args)?;
    Ok(store.write(&args.key, &data)?)
}

/// Execute the restore command.
pub fn execute_restore<S, C, L>(
    args: &RestoreArgs,
    store: &VersionStore<S, C, L>,
) -> CommandResult<WriteOutcome>
where
    S: ByteStore,
    C: Clock,
    L: Logger,
{
    Ok(store.restore(&args.key, args.version)?)
}

fn load_content(args: &WriteArgs) -> CommandResult<Vec<u8>> {
    match (&args.file, &args.data) {
        (Some(path), _) => std::fs::read(path).map_err(|source| CommandError::ReadInput {
            path: path.display().to_string(),
            source,
        }),
        (None, Some(data)) => Ok(data.as_bytes().to_vec()),
        // clap's source group makes one of the two mandatory
        (None, None) => Ok(Vec::new()),
    }
}

/// One-line summary of a write.
pub fn describe(key: &str, outcome: &WriteOutcome) -> String {
    let mut line = format!("wrote {} version {}", key, outcome.version);
    if let Some(archived) = outcome.archived {
        line.push_str(&format!(", archived version {}", archived));
    }
    if !outcome.evicted.is_empty() {
        line.push_str(&format!(", evicted {:?}", outcome.evicted));
    }
    if !outcome.metadata_saved {
        line.push_str(" (metadata not saved)");
    }
    line
}
