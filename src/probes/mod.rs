//! Probe metadata: ASN, country and address per RIPE Atlas probe.
//!
//! This module provides:
//! - The metadata record ([`ProbeMeta`]) and an in-memory directory ([`ProbeDirectory`])
//! - The read-only lookup the comparison engine uses ([`ProbeLookup`])
//! - The on-disk cache with atomic replacement ([`FileProbeCache`])
//! - Parsing of the RIPE probe archive feed ([`parse_archive`])
//! - Staleness-driven refresh and per-probe backfill ([`ProbeMetadataService`])

mod feed;
mod file;
mod service;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use feed::{FeedError, parse_archive, parse_probe};
pub use file::FileProbeCache;
pub use service::{DEFAULT_FEED_URL, ProbeCacheSettings, ProbeMetadataService};

use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::measurement::ProbeId;

/// Metadata about one probe, as published by RIPE Atlas.
///
/// Field names follow the Atlas probe API so archive entries and API
/// responses deserialize directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeMeta {
    /// IPv4 origin ASN.
    #[serde(default)]
    pub asn_v4: Option<u32>,
    /// IPv6 origin ASN.
    #[serde(default)]
    pub asn_v6: Option<u32>,
    /// ISO 3166 country code.
    #[serde(default)]
    pub country_code: Option<String>,
    /// Public IPv4 address.
    #[serde(default)]
    pub address_v4: Option<String>,
    /// Public IPv6 address.
    #[serde(default)]
    pub address_v6: Option<String>,
}

impl ProbeMeta {
    /// Returns the probe's ASN, preferring IPv4.
    #[must_use]
    pub const fn asn(&self) -> Option<u32> {
        match self.asn_v4 {
            Some(asn) => Some(asn),
            None => self.asn_v6,
        }
    }

    /// Returns the probe's country code.
    #[must_use]
    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    /// Returns the probe's address, preferring IPv4.
    #[must_use]
    pub fn ip_address(&self) -> Option<&str> {
        self.address_v4.as_deref().or(self.address_v6.as_deref())
    }
}

/// Read-only probe metadata lookup.
///
/// The comparison engine only ever reads through this trait; refreshing
/// the underlying store happens before a comparison starts.
pub trait ProbeLookup {
    /// Returns metadata for a probe, or `None` if it is unknown.
    fn probe(&self, id: ProbeId) -> Option<&ProbeMeta>;
}

/// In-memory probe metadata keyed by probe id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbeDirectory {
    probes: BTreeMap<ProbeId, ProbeMeta>,
}

impl ProbeDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one probe's metadata.
    pub fn insert(&mut self, id: ProbeId, meta: ProbeMeta) {
        self.probes.insert(id, meta);
    }

    /// Copies every entry of `other` over this directory.
    pub fn merge(&mut self, other: Self) {
        self.probes.extend(other.probes);
    }

    /// Returns the ids from `ids` that have no entry.
    #[must_use]
    pub fn missing(&self, ids: impl IntoIterator<Item = ProbeId>) -> Vec<ProbeId> {
        ids.into_iter()
            .filter(|id| !self.probes.contains_key(id))
            .collect()
    }

    /// Returns the number of probes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// Returns true if the directory holds no probes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

impl ProbeLookup for ProbeDirectory {
    fn probe(&self, id: ProbeId) -> Option<&ProbeMeta> {
        self.probes.get(&id)
    }
}

impl FromIterator<(ProbeId, ProbeMeta)> for ProbeDirectory {
    fn from_iter<I: IntoIterator<Item = (ProbeId, ProbeMeta)>>(iter: I) -> Self {
        Self {
            probes: iter.into_iter().collect(),
        }
    }
}

/// Result of loading the probe cache from disk.
///
/// Read failures are modelled as variants instead of errors so a damaged
/// cache degrades to "unknown" metadata rather than aborting a report.
#[derive(Debug, Clone)]
pub enum LoadResult {
    /// Successfully loaded cached metadata.
    Loaded(ProbeDirectory),

    /// No cache file exists yet.
    NotFound,

    /// The cache file exists but could not be parsed.
    Corrupted {
        /// Reason for corruption (for logging).
        reason: String,
    },
}

impl LoadResult {
    /// Returns the loaded directory, or an empty one for `NotFound`/`Corrupted`.
    #[must_use]
    pub fn into_directory(self) -> ProbeDirectory {
        match self {
            Self::Loaded(directory) => directory,
            Self::NotFound | Self::Corrupted { .. } => ProbeDirectory::new(),
        }
    }

    /// Returns `true` if the cache was successfully loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Errors that can occur while writing the probe cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to write the cache file.
    #[error("Failed to write probe cache: {0}")]
    Write(#[source] io::Error),

    /// Failed to serialize the cache to JSON.
    #[error("Failed to serialize probe cache: {0}")]
    Serialize(#[source] serde_json::Error),
}
