//! RA-DNS-Check: RIPE Atlas DNS measurement comparison
//!
//! Entry point for the ra-dns-check application.

use ra_dns_check::config::{Cli, Command, ValidatedConfig, write_default_config};
use ra_dns_check::time::{Clock, SystemClock};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod app;
mod run;

use app::{apply_color, exit_code, print_config_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match &cli.command {
        Some(Command::Init { output }) => return handle_init(output),
        Some(Command::Timestamps { files }) => return handle_timestamps(files),
        None => {}
    }

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli, SystemClock.unix_now()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    // Setup logging and run
    setup_tracing(config.verbose);
    apply_color(config.color);
    tracing::info!("{config}");

    run_application(&config)
}

/// Handles the `init` subcommand.
fn handle_init(output: &Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Handles the `timestamps` subcommand.
fn handle_timestamps(files: &[PathBuf]) -> ExitCode {
    match run::timestamp_lines(files) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::from_code(e.exit_code())
        }
    }
}

/// Runs the comparison with the given configuration.
///
/// Excluded from coverage - requires async runtime and network access.
#[cfg(not(tarpaulin_include))]
fn run_application(config: &ValidatedConfig) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    match runtime.block_on(run::execute(config)) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            exit_code::from_code(e.exit_code())
        }
    }
}
