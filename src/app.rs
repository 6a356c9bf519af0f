//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, color control and
//! error hints that support the main entry point.

use ra_dns_check::config::{ColorMode, ConfigError};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid args, unknown columns, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - fetch failure, unreadable results, no common probes.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }

    /// No data in a requested window (exit code 3).
    pub fn no_data() -> ExitCode {
        ExitCode::from(3)
    }

    /// Maps a numeric code from the run layer.
    pub fn from_code(code: u8) -> ExitCode {
        match code {
            0 => SUCCESS,
            1 => CONFIG_ERROR,
            3 => no_data(),
            _ => runtime_error(),
        }
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::MissingSource { .. } | ConfigError::TooManySources { .. } => {
            eprintln!("\nUsage: ra-dns-check [OPTIONS] <FILE_OR_MSM_ID> [FILE_OR_MSM_ID]");
        }
        ConfigError::TomlParse(_) | ConfigError::FileRead { .. } => {
            eprintln!("\nRun 'ra-dns-check init' to generate a configuration template.");
        }
        ConfigError::InvalidDatetime { .. } => {
            eprintln!("\nUse Unix seconds or e.g. 2024-01-31_12:00 (UTC).");
        }
        _ => {}
    }
}

/// Sets up the tracing subscriber for logging.
///
/// Logs go to stderr so stdout carries only the report.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Applies the color decision to the terminal styling crate.
pub fn apply_color(mode: ColorMode) {
    match mode {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }
}
