//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::report::ReportError;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No data source was given.
    #[error("Missing data source. {hint}")]
    MissingSource {
        /// Hint for how to provide the value
        hint: &'static str,
    },

    /// More data sources than a comparison can use.
    #[error("Expected one or two data sources, got {count}")]
    TooManySources {
        /// Number of positional arguments given
        count: usize,
    },

    /// A positional argument is neither a file nor a measurement id.
    #[error("'{value}' is neither a readable results file nor a measurement id")]
    InvalidSource {
        /// The argument as given
        value: String,
    },

    /// A date-time argument could not be understood or is out of range.
    #[error("Invalid date-time for {field} '{value}': {reason}")]
    InvalidDatetime {
        /// Name of the field
        field: &'static str,
        /// The value as given
        value: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Unknown report column.
    #[error(transparent)]
    Column(#[from] ReportError),

    /// Invalid URL provided.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The invalid URL string
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid duration value (zero or too large).
    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid threshold value (negative or not finite).
    #[error("Invalid threshold for {field}: {value}")]
    InvalidThreshold {
        /// Name of the field
        field: &'static str,
        /// The rejected value
        value: f64,
    },

    /// The POP delimiter is not exactly one character.
    #[error("Invalid split_char '{0}': expected exactly one character")]
    InvalidSplitChar(String),

    /// Invalid retry configuration.
    #[error("Invalid retry configuration: {0}")]
    InvalidRetry(String),
}

/// Well-known field names used in error messages.
pub mod field {
    /// First target moment.
    pub const DATETIME1: &str = "datetime1";
    /// Second target moment.
    pub const DATETIME2: &str = "datetime2";
    /// Epoch floor for results.
    pub const OLDEST_RESULT: &str = "oldest_result_datetime";
    /// Latency difference threshold.
    pub const LATENCY_DIFF: &str = "latency_diff";
    /// Slow response threshold.
    pub const SLOW: &str = "slow";
}

impl ConfigError {
    /// Creates an `InvalidDatetime` error.
    #[must_use]
    pub fn datetime(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDatetime {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
