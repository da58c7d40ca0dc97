// ============================================================================
// mediareport-cli/src/main.rs
// ============================================================================
//
// MEDIAREPORT CLI: Main Entry Point
//
// Parses the command line, installs console or file logging, then hands
// over to the command implementation. Any error is printed once and turned
// into exit code 1.

use anyhow::Context;
use clap::Parser;
use log::{debug, error};
use mediareport_cli::logging::{init_console_logging, init_file_logging};
use mediareport_cli::terminal::print_error;
use mediareport_cli::{Cli, Commands, run_export, run_extract, run_formats};
use std::process;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.log_dir {
        Some(log_dir) => {
            let log_file = init_file_logging(log_dir, cli.verbose).context("Logging setup failed")?;
            eprintln!("Logging to {}", log_file.display());
        }
        None => init_console_logging(cli.verbose),
    }
    debug!("mediareport {}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Export(args) => run_export(args),
        Commands::Extract(args) => run_extract(args),
        Commands::Formats => run_formats(),
    };

    if let Err(e) = result {
        error!("{e}");
        print_error(&format!("Error: {e}"));
        process::exit(1);
    }
    Ok(())
}
