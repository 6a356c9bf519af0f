//! Preparing probe metadata before a comparison runs.

use std::time::Duration;

use url::Url;

use super::{FileProbeCache, LoadResult, ProbeDirectory};
use crate::atlas::{AtlasApi, HttpClient};
use crate::measurement::ProbeId;
use crate::time::{Clock, Sleeper};

/// Default URL of the RIPE probe archive.
pub const DEFAULT_FEED_URL: &str = "https://ftp.ripe.net/ripe/atlas/probes/archive/meta-latest";

/// How the probe cache is kept fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCacheSettings {
    /// Refresh from the archive when the cache file is older than this.
    pub max_age: Duration,
    /// Probe archive location.
    pub feed_url: Url,
    /// Look up probes still unknown after a refresh one by one.
    pub fetch_missing: bool,
}

/// Loads, refreshes and backfills the probe cache.
///
/// Every network or filesystem failure here is logged and tolerated: the
/// worst outcome is probes rendered as `unknown`.
#[derive(Debug)]
pub struct ProbeMetadataService<C> {
    cache: FileProbeCache,
    settings: ProbeCacheSettings,
    clock: C,
}

impl<C: Clock> ProbeMetadataService<C> {
    /// Creates a service for the given cache file.
    #[must_use]
    pub const fn new(cache: FileProbeCache, settings: ProbeCacheSettings, clock: C) -> Self {
        Self {
            cache,
            settings,
            clock,
        }
    }

    /// Returns the cache file location.
    #[must_use]
    pub const fn cache(&self) -> &FileProbeCache {
        &self.cache
    }

    /// Returns metadata covering as many of `needed` as possible.
    ///
    /// A stale or missing cache is refreshed from the archive and merged
    /// over the old contents. Probes still missing are fetched individually
    /// when enabled. Any new data is written back atomically.
    pub async fn prepare<H: HttpClient, S: Sleeper>(
        &self,
        api: &AtlasApi<H, S>,
        needed: impl IntoIterator<Item = ProbeId>,
    ) -> ProbeDirectory {
        let mut directory = match self.cache.load() {
            LoadResult::Corrupted { reason } => {
                tracing::warn!(
                    "Ignoring unreadable probe cache {}: {reason}",
                    self.cache.path().display()
                );
                ProbeDirectory::new()
            }
            other => other.into_directory(),
        };
        let mut refreshed = false;
        let mut backfilled = false;

        if self.cache.is_stale(&self.clock, self.settings.max_age) {
            tracing::info!(
                "Refreshing probe cache from {}",
                self.settings.feed_url
            );
            match api.fetch_probe_archive(&self.settings.feed_url).await {
                Ok(fresh) => {
                    tracing::debug!("Probe archive lists {} probe(s)", fresh.len());
                    directory.merge(fresh);
                    refreshed = true;
                }
                Err(e) => tracing::warn!("Probe cache refresh failed, using cached data: {e}"),
            }
        }

        if self.settings.fetch_missing {
            for id in directory.missing(needed) {
                match api.fetch_probe(id).await {
                    Ok(meta) => {
                        directory.insert(id, meta);
                        backfilled = true;
                    }
                    Err(e) => tracing::warn!("No metadata for probe {id}: {e}"),
                }
            }
        }

        // only an archive merge resets the refresh clock
        let saved = if refreshed {
            Some(self.cache.save(&directory).await)
        } else if backfilled {
            Some(self.cache.save_keeping_age(&directory).await)
        } else {
            None
        };
        match saved {
            Some(Ok(())) => tracing::debug!(
                "Saved {} probe(s) to {}",
                directory.len(),
                self.cache.path().display()
            ),
            Some(Err(e)) => tracing::warn!("{e}"),
            None => {}
        }

        directory
    }
}
