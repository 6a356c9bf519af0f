//! Where result sets come from: local files or Atlas measurement ids.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::ResultsError;
use super::parse::parse_results;
use super::record::ResultSet;

static MEASUREMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,12}$").expect("measurement id pattern is valid"));

/// One positional data-source argument, resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A JSON file of Atlas results saved to disk.
    File(PathBuf),
    /// A RIPE Atlas measurement id to query over the API.
    Measurement(u64),
}

impl DataSource {
    /// Resolves an argument: an existing file wins, otherwise a numeric
    /// measurement id. Returns `None` for anything else.
    #[must_use]
    pub fn classify(arg: &str) -> Option<Self> {
        let path = Path::new(arg);
        if path.is_file() {
            return Some(Self::File(path.to_path_buf()));
        }
        if MEASUREMENT_ID.is_match(arg) {
            return arg.parse().ok().map(Self::Measurement);
        }
        None
    }

    /// Returns true for measurement ids.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Measurement(_))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Measurement(id) => write!(f, "{id}"),
        }
    }
}

/// Loads a saved Atlas result file and groups it into rounds.
///
/// The set is labelled with the measurement id found in the records, or
/// the file name when the records carry none.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array.
pub fn load_file(path: &Path, round_interval: Duration) -> Result<ResultSet, ResultsError> {
    let content = std::fs::read_to_string(path).map_err(|e| ResultsError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let parsed = parse_results(&content)?;
    let label = parsed.measurement_id.map_or_else(
        || {
            path.file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
        },
        |id| id.to_string(),
    );

    tracing::debug!(
        "Loaded {} result(s) from {} ({} malformed)",
        parsed.results.len(),
        path.display(),
        parsed.malformed
    );

    Ok(ResultSet::bucketed(label, parsed.results, round_interval).with_malformed(parsed.malformed))
}
