//! vstore command-line interface.
//!
//! This crate provides argument parsing, command execution against a
//! directory-backed store, and exit code mapping for the `vstore` binary.

pub mod cli;
pub mod commands;
pub mod exit;

pub use cli::{
    parse_from, ChangedArgs, Cli, CliError, Command, KeyArgs, ReadArgs, RestoreArgs, ViewArgs,
    WriteArgs,
};
pub use commands::{execute, CommandError, CommandResult};
