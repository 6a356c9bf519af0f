//! Raw result → normalized sample.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::measurement::{ProbeId, RawResponseTime, RawResult};
use crate::time::UnixTime;

/// A raw record that cannot be normalized at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    /// The record does not name the probe that produced it.
    #[error("result at {timestamp} has no probe id")]
    MissingProbeId {
        /// Timestamp of the offending record
        timestamp: UnixTime,
    },
}

/// Extracts the POP code from a DNS response payload.
///
/// The payload is split on `delimiter` and the element at 0-based `index`
/// is returned. Every delimiter occurrence counts, so
/// `"resolver1.POP7.abc.def.net"` with `.` and index 1 yields `POP7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopExtractor {
    /// Character separating the payload elements.
    pub delimiter: char,
    /// Which element carries the POP code.
    pub index: usize,
}

impl Default for PopExtractor {
    fn default() -> Self {
        Self {
            delimiter: '.',
            index: 1,
        }
    }
}

impl PopExtractor {
    /// Creates an extractor.
    #[must_use]
    pub const fn new(delimiter: char, index: usize) -> Self {
        Self { delimiter, index }
    }

    /// Returns the POP code, or `None` when the payload is absent or has
    /// too few elements.
    #[must_use]
    pub fn extract(&self, payload: Option<&str>) -> Option<String> {
        payload?
            .split(self.delimiter)
            .nth(self.index)
            .map(str::to_string)
    }
}

/// One probe's response, reduced to what the comparison needs.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSample {
    /// The probe that produced the sample.
    pub probe_id: ProbeId,
    /// Response time in milliseconds; `None` for timeouts, errors and gaps.
    pub rt_ms: Option<f64>,
    /// POP code parsed from the response payload.
    pub pop: Option<String>,
}

impl NormalizedSample {
    /// Normalizes one raw record.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord`] if the record carries no probe id.
    pub fn normalize(raw: &RawResult, extractor: &PopExtractor) -> Result<Self, MalformedRecord> {
        let probe_id = raw.probe_id.ok_or(MalformedRecord::MissingProbeId {
            timestamp: raw.timestamp,
        })?;

        let rt_ms = match raw.response_time {
            RawResponseTime::Millis(ms) => Some(ms),
            RawResponseTime::Timeout | RawResponseTime::Error(_) | RawResponseTime::Missing => {
                None
            }
        };

        Ok(Self {
            probe_id,
            rt_ms,
            pop: extractor.extract(raw.payload.as_deref()),
        })
    }
}

/// Normalized samples of one round, keyed by probe id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    samples: BTreeMap<ProbeId, NormalizedSample>,
    malformed: usize,
}

impl SampleSet {
    /// Normalizes a batch of raw records.
    ///
    /// Malformed records are logged and skipped. When a probe reports more
    /// than once, the last record with a response time wins; a later
    /// timeout only fills the slot when no earlier answer exists.
    pub fn from_results<'a>(
        results: impl IntoIterator<Item = &'a RawResult>,
        extractor: &PopExtractor,
    ) -> Self {
        let mut set = Self::default();
        for raw in results {
            match NormalizedSample::normalize(raw, extractor) {
                Ok(sample) => set.keep(sample),
                Err(e) => {
                    tracing::warn!("Skipping malformed record: {e}");
                    set.malformed += 1;
                }
            }
        }
        set
    }

    fn keep(&mut self, sample: NormalizedSample) {
        match self.samples.get(&sample.probe_id) {
            Some(existing) if existing.rt_ms.is_some() && sample.rt_ms.is_none() => {}
            _ => {
                self.samples.insert(sample.probe_id, sample);
            }
        }
    }

    /// Builds a set from already-normalized samples.
    #[must_use]
    pub fn from_samples(samples: impl IntoIterator<Item = NormalizedSample>) -> Self {
        Self {
            samples: samples.into_iter().map(|s| (s.probe_id, s)).collect(),
            malformed: 0,
        }
    }

    /// Returns the sample for a probe.
    #[must_use]
    pub fn get(&self, id: ProbeId) -> Option<&NormalizedSample> {
        self.samples.get(&id)
    }

    /// Returns true if the probe has a sample.
    #[must_use]
    pub fn contains(&self, id: ProbeId) -> bool {
        self.samples.contains_key(&id)
    }

    /// Iterates probe ids in ascending order.
    pub fn probe_ids(&self) -> impl Iterator<Item = ProbeId> + '_ {
        self.samples.keys().copied()
    }

    /// Iterates samples in ascending probe id order.
    pub fn samples(&self) -> impl Iterator<Item = &NormalizedSample> {
        self.samples.values()
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns how many records were skipped as malformed.
    #[must_use]
    pub const fn malformed(&self) -> usize {
        self.malformed
    }
}
