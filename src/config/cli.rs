//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// RA-DNS-Check: compare RIPE Atlas DNS measurement results
///
/// Reports per-probe response times, latency differences and POP changes
/// between two measurements, or two moments of one measurement.
#[derive(Debug, Parser)]
#[command(name = "ra-dns-check")]
#[command(version, about, long_about = None, args_conflicts_with_subcommands = true)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// One or two local result files or RIPE Atlas measurement ids
    #[arg(value_name = "FILE_OR_MSM_ID")]
    pub sources: Vec<String>,

    /// Target moment for the first set (UTC), e.g. 2024-01-31_12:00 or Unix seconds
    #[arg(long = "datetime1", visible_alias = "dt1")]
    pub datetime1: Option<String>,

    /// Target moment for the second set (UTC)
    #[arg(long = "datetime2", visible_alias = "dt2")]
    pub datetime2: Option<String>,

    /// Show probes present in either set, not just those present in both
    #[arg(short = 'a', long = "all-probes", alias = "all_probes")]
    pub all_probes: bool,

    /// Always colorize output
    #[arg(short = 'c', long, alias = "colour")]
    pub color: bool,

    /// Never colorize output
    #[arg(short = 'C', long = "no-color", aliases = ["no_color", "no-colour"])]
    pub no_color: bool,

    /// Append '*' to slow or significantly changed values and '!' to POP changes
    #[arg(short = 'e', long = "emphasis-chars", alias = "emphasis_chars")]
    pub emphasis_chars: bool,

    /// Do not print the header above the probe list
    #[arg(short = 'H', long = "no-header", alias = "no_header")]
    pub no_header: bool,

    /// Zero-based index of the payload segment that names the POP
    #[arg(short = 'i', long = "item-occurrence", alias = "item_occurence_to_return")]
    pub item_occurrence: Option<usize>,

    /// Latency difference (ms) that counts as significant
    #[arg(short = 'l', long = "latency-diff-threshold", alias = "latency_diff_threshold")]
    pub latency_diff_threshold: Option<f64>,

    /// Do not list per-probe results, only the summary
    #[arg(short = 'P', long = "do-not-list-probes", alias = "donotlistprobes")]
    pub do_not_list_probes: bool,

    /// List only probes with a slow response
    #[arg(short = 's', long = "list-slow-probes-only", alias = "list_slow_probes_only")]
    pub list_slow_probes_only: bool,

    /// Response time (ms) at or above which a probe is slow
    #[arg(short = 'S', long = "slow-threshold", alias = "slow_threshold")]
    pub slow_threshold: Option<f64>,

    /// Delimiter the DNS response payload is split on
    #[arg(short = 't', long = "split-char", alias = "split_char")]
    pub split_char: Option<String>,

    /// Print per-set summary statistics
    #[arg(short = 'u', long = "summary-stats", alias = "summarystats")]
    pub summary_stats: bool,

    /// Columns to report, comma separated (e.g. probe_id,rt_a,rt_b,rt_diff)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// File of probe ids to leave out, one per line
    #[arg(short = 'x', long = "exclusion-list")]
    pub exclusion_list: Option<PathBuf>,

    /// Emit metrics lines for a periodic scraper instead of a table
    #[arg(long)]
    pub scrape: bool,

    /// Age in seconds beyond which a selected round is flagged stale
    #[arg(long = "scrape-staleness")]
    pub scrape_staleness: Option<u64>,

    /// Width of a measurement round in seconds
    #[arg(long = "round-interval")]
    pub round_interval: Option<u64>,

    /// Path to configuration file (default: ~/.ra-dns-check.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the probe metadata cache file
    #[arg(long = "probe-cache")]
    pub probe_cache: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for ra-dns-check
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "ra-dns-check.toml")]
        output: PathBuf,
    },
    /// Print the timestamp of every result in local result files
    Timestamps {
        /// Result files to read
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
