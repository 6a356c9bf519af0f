//! Raw measurement records and their grouping into rounds.

use std::time::Duration;

use crate::time::{UnixTime, duration_secs};

/// RIPE Atlas probe identifier.
pub type ProbeId = u32;

/// Response time as reported by one probe, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponseTime {
    /// A measured round-trip time in milliseconds.
    Millis(f64),
    /// The probe reported a timeout.
    Timeout,
    /// The probe reported some other error (socket, resolver, ...).
    Error(String),
    /// The record carried no response time at all.
    Missing,
}

/// One measurement result for one probe at one moment.
///
/// Produced by a result source; never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult {
    /// When the probe created the result (Unix seconds).
    pub timestamp: UnixTime,
    /// The probe that produced the result, if the record named one.
    pub probe_id: Option<ProbeId>,
    /// The measured response time, or why there is none.
    pub response_time: RawResponseTime,
    /// Text of the first DNS answer, if any.
    pub payload: Option<String>,
}

impl RawResult {
    /// Creates a result with a measured response time.
    #[must_use]
    pub fn new(
        timestamp: UnixTime,
        probe_id: ProbeId,
        rt_ms: f64,
        payload: Option<&str>,
    ) -> Self {
        Self {
            timestamp,
            probe_id: Some(probe_id),
            response_time: RawResponseTime::Millis(rt_ms),
            payload: payload.map(str::to_string),
        }
    }

    /// Creates a result for a probe that reported a timeout.
    #[must_use]
    pub const fn timeout(timestamp: UnixTime, probe_id: ProbeId) -> Self {
        Self {
            timestamp,
            probe_id: Some(probe_id),
            response_time: RawResponseTime::Timeout,
            payload: None,
        }
    }
}

/// One discrete batch of per-probe results within a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    /// Start of the round (Unix seconds).
    pub start: UnixTime,
    /// Results in the round, ordered by timestamp.
    pub results: Vec<RawResult>,
}

impl Round {
    /// Creates a round, ordering its results by timestamp.
    #[must_use]
    pub fn new(start: UnixTime, mut results: Vec<RawResult>) -> Self {
        results.sort_by_key(|r| r.timestamp);
        Self { start, results }
    }

    /// Returns the number of results in the round.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if the round holds no results.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// A labelled sequence of measurement rounds, ordered by start time.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    label: String,
    rounds: Vec<Round>,
    malformed: usize,
}

impl ResultSet {
    /// Creates a result set from already-formed rounds.
    #[must_use]
    pub fn from_rounds(label: impl Into<String>, mut rounds: Vec<Round>) -> Self {
        rounds.sort_by_key(|r| r.start);
        Self {
            label: label.into(),
            rounds,
            malformed: 0,
        }
    }

    /// Records how many source records were dropped while parsing.
    #[must_use]
    pub fn with_malformed(mut self, malformed: usize) -> Self {
        self.malformed = malformed;
        self
    }

    /// Groups results into epoch-aligned rounds of `interval` length.
    ///
    /// A result with timestamp `t` lands in the round starting at
    /// `t - t.rem_euclid(interval)`. A zero interval puts every result in
    /// a single round.
    #[must_use]
    pub fn bucketed(label: impl Into<String>, results: Vec<RawResult>, interval: Duration) -> Self {
        let width = duration_secs(interval);
        if width <= 0 {
            return Self::single_round(label, results);
        }

        let mut buckets: std::collections::BTreeMap<UnixTime, Vec<RawResult>> =
            std::collections::BTreeMap::new();
        for result in results {
            let start = result.timestamp - result.timestamp.rem_euclid(width);
            buckets.entry(start).or_default().push(result);
        }

        let rounds = buckets
            .into_iter()
            .map(|(start, results)| Round::new(start, results))
            .collect();
        Self::from_rounds(label, rounds)
    }

    /// Puts every result in one round that starts at the oldest timestamp.
    ///
    /// Used for "latest" snapshots, where each probe reports once.
    #[must_use]
    pub fn single_round(label: impl Into<String>, results: Vec<RawResult>) -> Self {
        let oldest = results.iter().map(|r| r.timestamp).min();
        let rounds = match oldest {
            Some(start) => vec![Round::new(start, results)],
            None => Vec::new(),
        };
        Self::from_rounds(label, rounds)
    }

    /// Returns the label (measurement id or file name).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the rounds, oldest first.
    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Returns how many source records were dropped while parsing.
    #[must_use]
    pub const fn malformed(&self) -> usize {
        self.malformed
    }

    /// Returns the total number of results across all rounds.
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.rounds.iter().map(Round::len).sum()
    }
}
