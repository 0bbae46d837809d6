//! vstore CLI binary.
//!
//! Entry point for the `vstore` command-line tool.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vstore::{DirByteStore, VersionStore};
use vstore_cli::exit::{codes, exit_code};
use vstore_cli::{execute, Cli, CommandResult};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::from(codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

fn run(cli: &Cli) -> CommandResult<()> {
    cli.validate()?;
    let config = cli.store_config()?;

    let fs = DirByteStore::new(&cli.root);
    if cli.command.creates_objects() {
        fs.mount()?;
    }
    let store = VersionStore::open(fs, config)?;
    tracing::debug!(root = %cli.root.display(), "opened store");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &store, &mut out)
}
