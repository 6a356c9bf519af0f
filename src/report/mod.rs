//! Report rendering: terminal table and metrics exposition.
//!
//! This module provides:
//! - The closed set of table columns ([`Column`])
//! - Table output with colors, emphasis marks and a summary footer ([`render_table`])
//! - Per-set and per-comparison statistics ([`SetStatistics`], [`ComparisonSummary`])
//! - Metrics exposition for scrapers ([`render_scrape`], [`parse_metric_line`])

mod column;
mod scrape;
mod summary;
mod table;





use serde::Deserialize;
use thiserror::Error;

pub use column::{Column, parse_columns};
pub use scrape::{MetricSample, parse_metric_line, render_scrape};
pub use summary::{ComparisonSummary, SetStatistics};
pub use table::{TableOptions, format_time, render_table};

use crate::compare::DeltaRow;
use crate::time::UnixTime;

/// Text shown where a value is missing.
pub const PLACEHOLDER: &str = "N/A";

/// Text shown for unknown probe metadata.
pub const UNKNOWN: &str = "unknown";

/// Errors raised while preparing a report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// A configured column name is not recognised.
    #[error("Unknown report column '{name}' (expected one of: {expected})")]
    UnknownColumn {
        /// The offending name
        name: String,
        /// Comma-separated list of valid names
        expected: String,
    },
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Human-oriented table.
    #[default]
    Table,
    /// Metrics exposition lines.
    Scrape,
}

impl std::fmt::Display for ReportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Scrape => write!(f, "scrape"),
        }
    }
}

/// The round picked from one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    /// Short name used in column headers.
    pub label: String,
    /// Where the data came from (measurement id or file).
    pub source: String,
    /// Start of the selected round.
    pub round_start: UnixTime,
    /// The round is older than the staleness threshold.
    pub stale: bool,
    /// Statistics over the selected round.
    pub stats: SetStatistics,
}

/// Everything a renderer needs.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    /// Set A's window.
    pub a: &'a WindowInfo,
    /// Set B's window, absent for snapshots.
    pub b: Option<&'a WindowInfo>,
    /// Compared rows in ascending probe id order.
    pub rows: &'a [DeltaRow],
    /// Latency threshold the rows were computed with, for the footer.
    pub latency_threshold_ms: f64,
}

/// Formats an optional number, or the placeholder.
pub(crate) fn format_ms(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v:.2}"))
}
