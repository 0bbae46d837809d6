//! CLI argument parsing for vstore.
//!
//! One binary operates on a store rooted at `--root`, with a subcommand per
//! engine operation.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use thiserror::Error;
use vstore::config::MAX_HISTORY_DEPTH;
use vstore::{ConfigError, StoreConfig};

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("history-depth must be between 1 and {max}, got {0}", max = MAX_HISTORY_DEPTH)]
    InvalidHistoryDepth(usize),

    #[error("version must be at least 1 for restore, got {0}")]
    InvalidRestoreVersion(u32),

    #[error("key must not be empty")]
    EmptyKey,
}

/// vstore - versioned key-value file store.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "vstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the store's objects.
    #[arg(long)]
    pub root: PathBuf,

    /// JSON config file (history_depth, meta_suffix, timestamp, ...).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the number of archived versions kept per key.
    #[arg(long)]
    pub history_depth: Option<usize>,

    /// Override how long to wait for a key lock, in milliseconds.
    #[arg(long)]
    pub lock_timeout_ms: Option<u64>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Write new content, archiving the previous version.
    Write(WriteArgs),
    /// Print the current or an archived version.
    Read(ReadArgs),
    /// Make an archived version current again.
    Restore(RestoreArgs),
    /// List the current and archived versions.
    List(ViewArgs),
    /// Show the current version.
    Info(ViewArgs),
    /// Report whether a key moved past a known version.
    Changed(ChangedArgs),
    /// Evict archived versions beyond the history depth.
    Cleanup(KeyArgs),
    /// Delete a key with all its versions and metadata.
    Erase(KeyArgs),
    /// Check the current content against its recorded size and checksum.
    Verify(KeyArgs),
}

/// Arguments for the write command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "data"])))]
pub struct WriteArgs {
    pub key: String,

    /// Read the new content from this file.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Use this string as the new content.
    #[arg(long)]
    pub data: Option<String>,
}

/// Arguments for the read command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct ReadArgs {
    pub key: String,

    /// Version to read; 0 is the current content.
    #[arg(long, default_value_t = 0)]
    pub version: u32,

    /// Write the content to this file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the restore command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct RestoreArgs {
    pub key: String,

    /// Archived version to restore.
    pub version: u32,
}

/// Arguments for the list and info commands.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct ViewArgs {
    pub key: String,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the changed command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct ChangedArgs {
    pub key: String,

    /// Version the caller last saw.
    pub last_known: u32,
}

/// Arguments for commands that only take a key.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct KeyArgs {
    pub key: String,
}

impl Command {
    /// Key the command operates on.
    pub fn key(&self) -> &str {
        match self {
            Command::Write(args) => &args.key,
            Command::Read(args) => &args.key,
            Command::Restore(args) => &args.key,
            Command::List(args) | Command::Info(args) => &args.key,
            Command::Changed(args) => &args.key,
            Command::Cleanup(args) | Command::Erase(args) | Command::Verify(args) => &args.key,
        }
    }

    /// Whether the command creates objects, so the root may be created.
    pub fn creates_objects(&self) -> bool {
        matches!(self, Command::Write(_) | Command::Restore(_))
    }
}

impl Cli {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if let Some(depth) = self.history_depth {
            if depth == 0 || depth > MAX_HISTORY_DEPTH {
                return Err(CliError::InvalidHistoryDepth(depth));
            }
        }
        if self.command.key().is_empty() {
            return Err(CliError::EmptyKey);
        }
        if let Command::Restore(args) = &self.command {
            if args.version == 0 {
                return Err(CliError::InvalidRestoreVersion(args.version));
            }
        }
        Ok(())
    }

    /// Config file (or defaults) with command-line overrides applied.
    pub fn store_config(&self) -> Result<StoreConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => StoreConfig::load(path)?,
            None => StoreConfig::default(),
        };
        if let Some(depth) = self.history_depth {
            config = config.with_history_depth(depth);
        }
        if let Some(timeout_ms) = self.lock_timeout_ms {
            config = config.with_lock_timeout_ms(timeout_ms);
        }
        config.validate()?;
        Ok(config)
    }

    /// Default `tracing` filter for the verbosity level.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Parse CLI arguments from an iterator (for testing).
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
