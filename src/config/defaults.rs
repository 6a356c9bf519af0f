//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::path::PathBuf;
use std::time::Duration;

/// Latency difference (ms) at which a per-probe change counts as significant.
pub const LATENCY_DIFF_THRESHOLD_MS: f64 = 5.0;

/// Response time (ms) at or above which a probe is considered slow.
pub const SLOW_THRESHOLD_MS: f64 = 50.0;

/// Delimiter the DNS response payload is split on.
pub const SPLIT_CHAR: char = '.';

/// Zero-based index of the payload segment naming the POP.
pub const ITEM_OCCURRENCE: usize = 1;

/// Age in seconds beyond which a selected round is flagged stale.
pub const SCRAPE_STALENESS_SECS: u64 = 600;

/// Width of a measurement round in seconds.
pub const ROUND_INTERVAL_SECS: u64 = 300;

/// No Atlas result can predate this moment (2010-01-01 00:00:00 UTC).
pub const OLDEST_RESULT_UNIX: i64 = 1_262_304_000;

/// Maximum probe cache age in seconds before a refresh.
pub const PROBE_CACHE_MAX_AGE_SECS: u64 = 86_400;

/// Whether probes missing from the cache are fetched one by one.
pub const FETCH_MISSING_PROBES: bool = true;

/// Default maximum number of retry attempts.
pub const RETRY_MAX_ATTEMPTS: u32 = 3;

/// Default initial retry delay in seconds.
pub const RETRY_INITIAL_DELAY_SECS: u64 = 2;

/// Default maximum retry delay in seconds.
pub const RETRY_MAX_DELAY_SECS: u64 = 30;

/// Default retry backoff multiplier.
pub const RETRY_MULTIPLIER: f64 = 2.0;

/// Config file name looked up in the home directory.
pub const CONFIG_FILE_NAME: &str = ".ra-dns-check.toml";

/// Probe cache file name looked up in the home directory.
pub const PROBE_CACHE_FILE_NAME: &str = ".ra-dns-check.probes.json";

/// Default round width as Duration.
#[must_use]
pub const fn round_interval() -> Duration {
    Duration::from_secs(ROUND_INTERVAL_SECS)
}

/// Default staleness threshold as Duration.
#[must_use]
pub const fn scrape_staleness() -> Duration {
    Duration::from_secs(SCRAPE_STALENESS_SECS)
}

/// Default probe cache max age as Duration.
#[must_use]
pub const fn probe_cache_max_age() -> Duration {
    Duration::from_secs(PROBE_CACHE_MAX_AGE_SECS)
}

/// `~/.ra-dns-check.toml`, if a home directory exists.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

/// `~/.ra-dns-check.probes.json`, falling back to the working directory.
#[must_use]
pub fn probe_cache_path() -> PathBuf {
    dirs::home_dir().map_or_else(
        || PathBuf::from(PROBE_CACHE_FILE_NAME),
        |home| home.join(PROBE_CACHE_FILE_NAME),
    )
}
