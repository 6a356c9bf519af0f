//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::atlas::{DEFAULT_API_URL, RetryPolicy};
use crate::compare::{PopExtractor, Thresholds};
use crate::measurement::{DataSource, WindowPolicy};
use crate::probes::{DEFAULT_FEED_URL, ProbeCacheSettings};
use crate::report::{Column, ReportMode, TableOptions, parse_columns};
use crate::time::UnixTime;

use super::cli::Cli;
use super::datetime::{parse_layout, parse_target};
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// How the table decides whether to emit color codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Colorize when stdout is a terminal.
    Auto,
    /// Always colorize.
    Always,
    /// Never colorize.
    Never,
}

/// One side of a comparison: where the data comes from and which moment to pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    /// File or measurement id.
    pub source: DataSource,
    /// Target moment; `None` means "latest".
    pub target: Option<UnixTime>,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(t) => write!(f, "{}@{t}", self.source),
            None => write!(f, "{}@latest", self.source),
        }
    }
}

/// What to compare: set A and, unless this is a snapshot, set B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonPlan {
    /// First set.
    pub a: Side,
    /// Second set, absent for a snapshot.
    pub b: Option<Side>,
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Sets to compare
    pub plan: ComparisonPlan,

    /// Table or scrape output
    pub mode: ReportMode,

    /// Table layout and filters
    pub table: TableOptions,

    /// Color decision for table output
    pub color: ColorMode,

    /// Significance and slowness thresholds
    pub thresholds: Thresholds,

    /// POP extraction from response payloads
    pub pop: PopExtractor,

    /// Report probes present in either set
    pub all_probes: bool,

    /// Probe id denylist file
    pub exclusion_list: Option<PathBuf>,

    /// Width of a measurement round
    pub round_interval: Duration,

    /// Epoch floor and staleness for round selection
    pub window: WindowPolicy,

    /// Probe metadata cache file
    pub probe_cache: PathBuf,

    /// Probe cache refresh settings
    pub probe_settings: ProbeCacheSettings,

    /// RIPE Atlas API base URL
    pub api_url: Url,

    /// Retry policy for API requests
    pub retry_policy: RetryPolicy,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self
            .plan
            .b
            .as_ref()
            .map_or_else(|| "none".to_string(), ToString::to_string);
        let columns: Vec<&str> = self.table.columns.iter().map(|c| c.name()).collect();

        write!(
            f,
            "Config {{ a: {}, b: {b}, mode: {}, columns: [{}], latency_diff: {}ms, slow: {}ms, \
             split: '{}'[{}], all_probes: {}, round_interval: {}s, staleness: {}s, \
             probe_cache: {}, api: {}, retry: {}x/{}s }}",
            self.plan.a,
            self.mode,
            columns.join(","),
            self.thresholds.latency_diff_ms,
            self.thresholds.slow_ms,
            self.pop.delimiter,
            self.pop.index,
            self.all_probes,
            self.round_interval.as_secs(),
            self.window.staleness.as_secs(),
            self.probe_cache.display(),
            self.api_url,
            self.retry_policy.max_attempts,
            self.retry_policy.initial_delay.as_secs(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values. `now` bounds
    /// the accepted target moments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No data source is given, or more than two
    /// - A source is neither a file nor a measurement id
    /// - A date-time cannot be parsed or lies outside the valid range
    /// - A column name is unknown
    /// - A threshold, duration, URL or retry setting is invalid
    pub fn from_raw(
        cli: &Cli,
        toml: Option<&TomlConfig>,
        now: UnixTime,
    ) -> Result<Self, ConfigError> {
        let window = Self::resolve_window(cli, toml)?;
        let plan = Self::resolve_plan(cli, window.floor, now)?;

        let mode = if cli.scrape {
            ReportMode::Scrape
        } else {
            toml.and_then(|t| t.report.mode).unwrap_or_default()
        };

        let color = Self::resolve_color(cli, toml);
        let table = Self::build_table(cli, toml, color)?;
        let thresholds = Self::resolve_thresholds(cli, toml)?;
        let pop = Self::resolve_pop(cli, toml)?;

        let all_probes = cli.all_probes || toml.is_some_and(|t| t.selection.all_probes);
        let exclusion_list = cli.exclusion_list.clone().or_else(|| {
            toml.and_then(|t| t.selection.exclusion_list_file.as_deref())
                .map(expand_tilde)
        });

        let round_interval = Self::resolve_round_interval(cli, toml)?;
        let (probe_cache, probe_settings) = Self::resolve_probes(cli, toml)?;

        let api_url_str = toml
            .and_then(|t| t.atlas.api_url.as_deref())
            .unwrap_or(DEFAULT_API_URL);
        let api_url = parse_url(api_url_str)?;

        let retry_policy = Self::build_retry_policy(toml)?;

        Ok(Self {
            plan,
            mode,
            table,
            color,
            thresholds,
            pop,
            all_probes,
            exclusion_list,
            round_interval,
            window,
            probe_cache,
            probe_settings,
            api_url,
            retry_policy,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and the config file.
    ///
    /// An explicit `--config` file must exist; the default
    /// `~/.ra-dns-check.toml` is used only when present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli, now: UnixTime) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            match defaults::config_path() {
                Some(path) if path.is_file() => {
                    tracing::debug!("Using config file {}", path.display());
                    Some(TomlConfig::load(&path)?)
                }
                _ => None,
            }
        };

        Self::from_raw(cli, toml.as_ref(), now)
    }

    fn resolve_plan(
        cli: &Cli,
        floor: UnixTime,
        now: UnixTime,
    ) -> Result<ComparisonPlan, ConfigError> {
        let sources = cli
            .sources
            .iter()
            .map(|arg| {
                DataSource::classify(arg).ok_or_else(|| ConfigError::InvalidSource {
                    value: arg.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let dt1 = cli
            .datetime1
            .as_deref()
            .map(|v| parse_target(field::DATETIME1, v, floor, now))
            .transpose()?;
        let dt2 = cli
            .datetime2
            .as_deref()
            .map(|v| parse_target(field::DATETIME2, v, floor, now))
            .transpose()?;

        match sources.as_slice() {
            [] => Err(ConfigError::MissingSource {
                hint: "Give one or two result files or measurement ids",
            }),
            [only] => {
                let a = Side {
                    source: only.clone(),
                    target: dt1.or(dt2),
                };
                let b = match (dt1, dt2) {
                    (Some(_), Some(_)) => Some(Side {
                        source: only.clone(),
                        target: dt2,
                    }),
                    _ => None,
                };
                Ok(ComparisonPlan { a, b })
            }
            [first, second] => Ok(ComparisonPlan {
                a: Side {
                    source: first.clone(),
                    target: dt1,
                },
                b: Some(Side {
                    source: second.clone(),
                    target: dt2,
                }),
            }),
            more => Err(ConfigError::TooManySources { count: more.len() }),
        }
    }

    fn resolve_color(cli: &Cli, toml: Option<&TomlConfig>) -> ColorMode {
        if cli.no_color {
            ColorMode::Never
        } else if cli.color {
            ColorMode::Always
        } else if toml.and_then(|t| t.report.color) == Some(false) {
            ColorMode::Never
        } else {
            ColorMode::Auto
        }
    }

    fn build_table(
        cli: &Cli,
        toml: Option<&TomlConfig>,
        color: ColorMode,
    ) -> Result<TableOptions, ConfigError> {
        let report = toml.map(|t| &t.report);

        // CLI columns replace TOML columns entirely
        let columns = if cli.columns.is_empty() {
            match report.and_then(|r| r.columns.as_deref()) {
                Some(names) => parse_columns(names)?,
                None => Column::ALL.to_vec(),
            }
        } else {
            parse_columns(&cli.columns)?
        };

        Ok(TableOptions {
            columns,
            color: color != ColorMode::Never,
            emphasis: cli.emphasis_chars || report.is_some_and(|r| r.emphasis_chars),
            no_header: cli.no_header || report.is_some_and(|r| r.no_header),
            do_not_list_probes: cli.do_not_list_probes
                || report.is_some_and(|r| r.do_not_list_probes),
            slow_only: cli.list_slow_probes_only
                || report.is_some_and(|r| r.list_slow_probes_only),
            summary_stats: cli.summary_stats || report.is_some_and(|r| r.summary_stats),
        })
    }

    fn resolve_thresholds(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Thresholds, ConfigError> {
        let section = toml.map(|t| &t.thresholds);

        let latency_diff_ms = cli
            .latency_diff_threshold
            .or_else(|| section.and_then(|s| s.latency_diff))
            .unwrap_or(defaults::LATENCY_DIFF_THRESHOLD_MS);
        let slow_ms = cli
            .slow_threshold
            .or_else(|| section.and_then(|s| s.slow))
            .unwrap_or(defaults::SLOW_THRESHOLD_MS);

        for (name, value) in [(field::LATENCY_DIFF, latency_diff_ms), (field::SLOW, slow_ms)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { field: name, value });
            }
        }

        Ok(Thresholds {
            latency_diff_ms,
            slow_ms,
        })
    }

    fn resolve_pop(cli: &Cli, toml: Option<&TomlConfig>) -> Result<PopExtractor, ConfigError> {
        let section = toml.map(|t| &t.response);

        let delimiter = match cli
            .split_char
            .as_deref()
            .or_else(|| section.and_then(|s| s.split_char.as_deref()))
        {
            Some(text) => single_char(text)?,
            None => defaults::SPLIT_CHAR,
        };
        let index = cli
            .item_occurrence
            .or_else(|| section.and_then(|s| s.item_occurrence))
            .unwrap_or(defaults::ITEM_OCCURRENCE);

        Ok(PopExtractor::new(delimiter, index))
    }

    fn resolve_window(cli: &Cli, toml: Option<&TomlConfig>) -> Result<WindowPolicy, ConfigError> {
        let floor = match toml.and_then(|t| t.selection.oldest_result_datetime.as_deref()) {
            Some(text) => text
                .trim()
                .parse::<UnixTime>()
                .ok()
                .or_else(|| parse_layout(text))
                .ok_or_else(|| {
                    ConfigError::datetime(field::OLDEST_RESULT, text, "unrecognised layout")
                })?,
            None => defaults::OLDEST_RESULT_UNIX,
        };

        let staleness = cli
            .scrape_staleness
            .or_else(|| toml.and_then(|t| t.thresholds.scrape_staleness_seconds))
            .map_or_else(defaults::scrape_staleness, Duration::from_secs);

        Ok(WindowPolicy { floor, staleness })
    }

    fn resolve_round_interval(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Duration, ConfigError> {
        let seconds = cli
            .round_interval
            .or_else(|| toml.and_then(|t| t.selection.round_interval))
            .unwrap_or(defaults::ROUND_INTERVAL_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "round_interval",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn resolve_probes(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<(PathBuf, ProbeCacheSettings), ConfigError> {
        let section = toml.map(|t| &t.probes);

        let path = cli.probe_cache.clone().unwrap_or_else(|| {
            section
                .and_then(|s| s.cache_file.as_deref())
                .map_or_else(defaults::probe_cache_path, expand_tilde)
        });

        let max_age = section
            .and_then(|s| s.max_age)
            .map_or_else(defaults::probe_cache_max_age, Duration::from_secs);
        let feed_url = parse_url(
            section
                .and_then(|s| s.feed_url.as_deref())
                .unwrap_or(DEFAULT_FEED_URL),
        )?;
        let fetch_missing = section
            .and_then(|s| s.fetch_missing)
            .unwrap_or(defaults::FETCH_MISSING_PROBES);

        Ok((
            path,
            ProbeCacheSettings {
                max_age,
                feed_url,
                fetch_missing,
            },
        ))
    }

    fn build_retry_policy(toml: Option<&TomlConfig>) -> Result<RetryPolicy, ConfigError> {
        let retry = toml.map(|t| &t.atlas.retry);

        let max_attempts = retry
            .and_then(|r| r.max_attempts)
            .unwrap_or(defaults::RETRY_MAX_ATTEMPTS);
        let initial_delay_secs = retry
            .and_then(|r| r.initial_delay)
            .unwrap_or(defaults::RETRY_INITIAL_DELAY_SECS);
        let max_delay_secs = retry
            .and_then(|r| r.max_delay)
            .unwrap_or(defaults::RETRY_MAX_DELAY_SECS);
        let multiplier = retry
            .and_then(|r| r.multiplier)
            .unwrap_or(defaults::RETRY_MULTIPLIER);

        if max_attempts == 0 {
            return Err(ConfigError::InvalidRetry(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if initial_delay_secs == 0 {
            return Err(ConfigError::InvalidRetry(
                "initial_delay must be greater than 0".to_string(),
            ));
        }

        if multiplier <= 0.0 || !multiplier.is_finite() {
            return Err(ConfigError::InvalidRetry(
                "multiplier must be a positive finite number".to_string(),
            ));
        }

        if max_delay_secs < initial_delay_secs {
            return Err(ConfigError::InvalidRetry(format!(
                "max_delay ({max_delay_secs}s) must be >= initial_delay ({initial_delay_secs}s)"
            )));
        }

        Ok(RetryPolicy {
            max_attempts,
            initial_delay: Duration::from_secs(initial_delay_secs),
            max_delay: Duration::from_secs(max_delay_secs),
            multiplier,
        })
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn parse_url(s: &str) -> Result<Url, ConfigError> {
    Url::parse(s).map_err(|e| ConfigError::InvalidUrl {
        url: s.to_string(),
        reason: e.to_string(),
    })
}

fn single_char(s: &str) -> Result<char, ConfigError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::InvalidSplitChar(s.to_string())),
    }
}

/// Expands a leading `~/` to the home directory.
pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
