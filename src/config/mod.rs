//! Configuration layer for RA-DNS-Check.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Date-time parsing for target moments ([`parse_target`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments**
//! 2. **TOML config file** - `--config`, or `~/.ra-dns-check.toml` when it exists
//! 3. **Built-in defaults**
//!
//! `--columns` on the command line **replaces** the TOML column list entirely.
//!
//! # Boolean Flag Semantics
//!
//! Boolean flags (`--all-probes`, `--no-header`, ...) use OR semantics: set in
//! either source means set. Color is the exception, since `--no-color` must be
//! able to switch off a `color = true` in the file.
//!
//! # Sources and moments
//!
//! One source with two date-times compares that source with itself at two
//! moments. One source with at most one date-time is a snapshot. Two sources
//! pair with `--datetime1` and `--datetime2` respectively.

mod cli;
mod datetime;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use datetime::{parse_layout, parse_target};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ColorMode, ComparisonPlan, Side, ValidatedConfig, write_default_config};
