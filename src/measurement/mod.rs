//! Measurement layer: raw Atlas results and time-window selection.
//!
//! This module provides:
//! - Raw per-probe records and their rounds ([`RawResult`], [`Round`], [`ResultSet`])
//! - Atlas JSON parsing ([`parse_results`], [`parse_records`])
//! - Data source resolution and file loading ([`DataSource`], [`load_file`])
//! - Round selection for a target moment ([`select_round`])

mod parse;
mod record;
mod source;
mod window;

use std::path::PathBuf;

use thiserror::Error;

pub use parse::{ParsedResults, decode_abuf, parse_records, parse_results};
pub use record::{ProbeId, RawResponseTime, RawResult, ResultSet, Round};
pub use source::{DataSource, load_file};
pub use window::{SelectedRound, WindowError, WindowPolicy, select_round};

/// Error type for loading result sets.
#[derive(Debug, Error)]
pub enum ResultsError {
    /// Failed to read a result file.
    #[error("Failed to read results file '{}': {source}", path.display())]
    FileRead {
        /// Path to the result file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The document is not a JSON array of results.
    #[error("Invalid results document: {0}")]
    Json(#[from] serde_json::Error),
}
