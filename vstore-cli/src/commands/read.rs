//! Read command.

use std::path::PathBuf;

use vstore::{ByteStore, Clock, Logger, VersionStore};

use crate::cli::ReadArgs;

use super::{CommandError, CommandResult};

/// Where the read content went.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutput {
    /// Content to print.
    Data(Vec<u8>),
    /// Content saved to `--out`.
    Saved { path: PathBuf, len: usize },
}

/// Execute the read command.
pub fn execute_read<S, C, L>(
    args: &ReadArgs,
    store: &VersionStore<S, C, L>,
) -> CommandResult<ReadOutput>
where
    S: ByteStore,
    C: Clock,
    L: Logger,
{
    let data = store.read_version(&args.key, args.version)?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, &data).map_err(|source| CommandError::WriteOutput {
                path: path.display().to_string(),
                source,
            })?;
            Ok(ReadOutput::Saved {
                path: path.clone(),
                len: data.len(),
            })
        }
        None => Ok(ReadOutput::Data(data)),
    }
}
