//! Command orchestration for CLI subcommands.
//!
//! Provides execute functions for:
//! - `write`, `restore` - create a new version
//! - `read` - fetch current or archived content
//! - `list`, `info`, `changed` - inspect versions
//! - `cleanup`, `erase`, `verify` - maintenance

pub mod inspect;
pub mod maintain;
pub mod read;
pub mod write;

pub use inspect::{execute_changed, execute_info, execute_list, format_timestamp, VersionView};
pub use maintain::{execute_cleanup, execute_erase, execute_verify};
pub use read::{execute_read, ReadOutput};
pub use write::{execute_restore, execute_write};

use std::io::Write;

use thiserror::Error;
use vstore::{ByteStore, Clock, ConfigError, FsError, Logger, VersionError, VersionStore};

use crate::cli::{CliError, Command};

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Version(#[from] VersionError),

    #[error("filesystem error: {0}")]
    Filesystem(#[from] FsError),

    #[error("failed to read {path}: {source}")]
    ReadInput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteOutput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{key} failed its integrity check")]
    IntegrityMismatch { key: String },
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;

/// Run `command` against `store`, printing its report to `out`.
pub fn execute<S, C, L, W>(
    command: &Command,
    store: &VersionStore<S, C, L>,
    out: &mut W,
) -> CommandResult<()>
where
    S: ByteStore,
    C: Clock,
    L: Logger,
    W: Write,
{
    match command {
        Command::Write(args) => {
            let outcome = execute_write(args, store)?;
            writeln!(out, "{}", write::describe(&args.key, &outcome))?;
        }
        Command::Restore(args) => {
            let outcome = execute_restore(args, store)?;
            writeln!(
                out,
                "restored {} version {} as version {}",
                args.key, args.version, outcome.version
            )?;
        }
        Command::Read(args) => match execute_read(args, store)? {
            ReadOutput::Data(data) => out.write_all(&data)?,
            ReadOutput::Saved { path, len } => {
                writeln!(out, "wrote {} bytes to {}", len, path.display())?
            }
        },
        Command::List(args) => out.write_all(execute_list(args, store)?.as_bytes())?,
        Command::Info(args) => out.write_all(execute_info(args, store)?.as_bytes())?,
        Command::Changed(args) => {
            let changed = execute_changed(args, store);
            writeln!(out, "{}", if changed { "changed" } else { "unchanged" })?;
        }
        Command::Cleanup(args) => {
            let evicted = execute_cleanup(args, store);
            writeln!(out, "evicted {} old versions of {}", evicted, args.key)?;
        }
        Command::Erase(args) => {
            let outcome = execute_erase(args, store)?;
            writeln!(
                out,
                "erased {} ({} archived versions)",
                args.key, outcome.archives_removed
            )?;
        }
        Command::Verify(args) => {
            let report = execute_verify(args, store)?;
            writeln!(out, "{}", maintain::describe(&args.key, &report))?;
            if !report.is_intact() {
                return Err(CommandError::IntegrityMismatch {
                    key: args.key.clone(),
                });
            }
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::store;
    use super::*;
    use crate::cli::parse_from;

    fn run(args: &[&str], store: &test_support::TestStore) -> (CommandResult<()>, String) {
        let mut argv = vec!["vstore", "--root", "/unused"];
        argv.extend_from_slice(args);
        let cli = parse_from(argv).expect("parse");
        let mut out = Vec::new();
        let result = execute(&cli.command, store, &mut out);
        (result, String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn test_write_then_read() {
        let (store, _) = store();

        let (result, output) = run(&["write", "cfg", "--data", "hello"], &store);
        result.expect("write");
        assert_eq!(output, "wrote cfg version 1\n");

        let (result, output) = run(&["read", "cfg"], &store);
        result.expect("read");
        assert_eq!(output, "hello");
    }

    #[test]
    fn test_restore_output() {
        let (store, _) = store();
        run(&["write", "cfg", "--data", "a"], &store).0.expect("write");
        run(&["write", "cfg", "--data", "b"], &store).0.expect("write");

        let (result, output) = run(&["restore", "cfg", "1"], &store);

        result.expect("restore");
        assert_eq!(output, "restored cfg version 1 as version 3\n");
    }

    #[test]
    fn test_changed_output() {
        let (store, _) = store();
        run(&["write", "cfg", "--data", "a"], &store).0.expect("write");

        assert_eq!(run(&["changed", "cfg", "0"], &store).1, "changed\n");
        assert_eq!(run(&["changed", "cfg", "1"], &store).1, "unchanged\n");
    }

    #[test]
    fn test_cleanup_and_erase_output() {
        let (store, _) = store();
        for data in ["a", "b", "c"] {
            run(&["write", "cfg", "--data", data], &store).0.expect("write");
        }

        assert_eq!(
            run(&["cleanup", "cfg"], &store).1,
            "evicted 0 old versions of cfg\n"
        );
        assert_eq!(
            run(&["erase", "cfg"], &store).1,
            "erased cfg (2 archived versions)\n"
        );
    }

    #[test]
    fn test_verify_mismatch_is_error() {
        let (store, fs) = store();
        run(&["write", "cfg", "--data", "payload"], &store).0.expect("write");
        fs.add_object("cfg", b"tampered".to_vec());

        let (result, output) = run(&["verify", "cfg"], &store);

        assert!(matches!(result, Err(CommandError::IntegrityMismatch { .. })));
        assert!(output.contains("MISMATCH"));
    }

    #[test]
    fn test_missing_key_propagates() {
        let (store, _) = store();
        let (result, _) = run(&["read", "nothing"], &store);
        assert!(matches!(
            result,
            Err(CommandError::Version(VersionError::MissingKey { .. }))
        ));
    }
}
