//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;
use crate::report::ReportMode;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Output configuration section
    #[serde(default)]
    pub report: ReportSection,

    /// Threshold configuration section
    #[serde(default)]
    pub thresholds: ThresholdsSection,

    /// DNS response payload handling
    #[serde(default)]
    pub response: ResponseSection,

    /// Probe and round selection
    #[serde(default)]
    pub selection: SelectionSection,

    /// Probe metadata cache
    #[serde(default)]
    pub probes: ProbesSection,

    /// RIPE Atlas API access
    #[serde(default)]
    pub atlas: AtlasSection,
}

/// Output configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReportSection {
    /// Columns to report, in order
    pub columns: Option<Vec<String>>,

    /// Colorize output (default: true, only when writing to a terminal)
    pub color: Option<bool>,

    /// Append emphasis characters
    #[serde(default)]
    pub emphasis_chars: bool,

    /// Omit the table header
    #[serde(default)]
    pub no_header: bool,

    /// Print only the summary
    #[serde(default)]
    pub do_not_list_probes: bool,

    /// List only slow probes
    #[serde(default)]
    pub list_slow_probes_only: bool,

    /// Print per-set statistics
    #[serde(default)]
    pub summary_stats: bool,

    /// "table" or "scrape"
    pub mode: Option<ReportMode>,
}

/// Threshold configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdsSection {
    /// Significant latency difference in ms
    pub latency_diff: Option<f64>,

    /// Slow response time in ms
    pub slow: Option<f64>,

    /// Staleness threshold in seconds
    pub scrape_staleness_seconds: Option<u64>,
}

/// DNS response payload section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseSection {
    /// Payload delimiter
    pub split_char: Option<String>,

    /// Zero-based index of the POP segment
    pub item_occurrence: Option<usize>,
}

/// Probe and round selection section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionSection {
    /// Report probes present in either set
    #[serde(default)]
    pub all_probes: bool,

    /// Probe id denylist file
    pub exclusion_list_file: Option<String>,

    /// Round width in seconds
    pub round_interval: Option<u64>,

    /// Earliest acceptable result moment
    pub oldest_result_datetime: Option<String>,
}

/// Probe metadata cache section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbesSection {
    /// Cache file path
    pub cache_file: Option<String>,

    /// Maximum cache age in seconds
    pub max_age: Option<u64>,

    /// Probe archive feed URL
    pub feed_url: Option<String>,

    /// Fetch probes missing from the cache one by one
    pub fetch_missing: Option<bool>,
}

/// RIPE Atlas API section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtlasSection {
    /// API base URL
    pub api_url: Option<String>,

    /// Retry policy for API requests
    #[serde(default)]
    pub retry: RetrySection,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Maximum number of attempts
    pub max_attempts: Option<u32>,

    /// Initial retry delay in seconds
    pub initial_delay: Option<u64>,

    /// Maximum retry delay in seconds
    pub max_delay: Option<u64>,

    /// Backoff multiplier
    pub multiplier: Option<f64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# ra-dns-check configuration file
# Looked up at ~/.ra-dns-check.toml unless --config is given.
# Command-line flags override everything here.

[report]
# Columns to report, in order. Valid names:
# probe_id, asn, country_code, ip_address, rt_a, rt_b, rt_diff, dns_response
# columns = ["probe_id", "asn", "country_code", "ip_address", "rt_a", "rt_b", "rt_diff", "dns_response"]

# Colorize output when writing to a terminal (default: true)
# color = true

# Append '*' to slow or significant values and '!' to POP changes
# emphasis_chars = false

# no_header = false
# do_not_list_probes = false
# list_slow_probes_only = false

# Print per-set statistics (response counts, rt min/avg/max/stddev)
# summary_stats = false

# "table" or "scrape"
# mode = "table"

[thresholds]
# Latency difference in ms that counts as significant (default: 5)
# latency_diff = 5.0

# Response time in ms at or above which a probe is slow (default: 50)
# slow = 50.0

# Age in seconds beyond which a selected round is flagged stale (default: 600)
# scrape_staleness_seconds = 600

[response]
# The POP is the item_occurrence-th segment of the TXT answer split on split_char.
# "resolver1.POP7.example.net" with the defaults gives "POP7".
# split_char = "."
# item_occurrence = 1

[selection]
# Report probes present in either set, not just both
# all_probes = false

# File of probe ids to leave out, one per line, '#' starts a comment
# exclusion_list_file = "~/.ra-dns-check.exclude"

# Width of a measurement round in seconds (default: 300)
# round_interval = 300

# No result can be older than this (UTC)
# oldest_result_datetime = "2010-01-01_0000"

[probes]
# cache_file = "~/.ra-dns-check.probes.json"

# Refresh the cache from the probe archive when older than this many seconds
# max_age = 86400

# feed_url = "https://ftp.ripe.net/ripe/atlas/probes/archive/meta-latest"

# Look up probes missing from the cache one at a time
# fetch_missing = true

[atlas]
# api_url = "https://atlas.ripe.net/api/v2/"

[atlas.retry]
# max_attempts = 3
# initial_delay = 2
# max_delay = 30
# multiplier = 2.0
"#
    .to_string()
}
