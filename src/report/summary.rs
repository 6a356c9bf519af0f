//! Summary statistics for the report footer.

use statrs::statistics::{Data, Median, Statistics};

use crate::compare::{DeltaRow, Presence};
use crate::measurement::{RawResponseTime, Round};
use crate::time::UnixTime;

/// Counts and latency-diff statistics over all compared rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonSummary {
    /// Probes present only in set A.
    pub only_a: usize,
    /// Probes present only in set B.
    pub only_b: usize,
    /// Probes present in both sets.
    pub both: usize,
    /// Rows flagged significant.
    pub significant: usize,
    /// Rows whose POP code changed.
    pub pop_changed: usize,
    /// Number of rows with a latency diff.
    pub diffs: usize,
    /// Mean latency diff, if any diffs exist.
    pub mean_diff: Option<f64>,
    /// Median latency diff, if any diffs exist.
    pub median_diff: Option<f64>,
}

impl ComparisonSummary {
    /// Summarizes the compared rows.
    #[must_use]
    pub fn from_rows(rows: &[DeltaRow]) -> Self {
        let mut summary = Self::default();
        let mut diffs = Vec::new();

        for row in rows {
            match row.presence() {
                Presence::OnlyA => summary.only_a += 1,
                Presence::OnlyB => summary.only_b += 1,
                Presence::Both => summary.both += 1,
            }
            if row.significant {
                summary.significant += 1;
            }
            if row.pop_changed {
                summary.pop_changed += 1;
            }
            if let Some(diff) = row.latency_diff {
                diffs.push(diff);
            }
        }

        summary.diffs = diffs.len();
        if !diffs.is_empty() {
            summary.mean_diff = Some(diffs.iter().mean());
            summary.median_diff = Some(Data::new(diffs).median());
        }
        summary
    }
}

/// Statistics over one selected round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetStatistics {
    /// Results in the round.
    pub total: usize,
    /// Results without a response time.
    pub errors: usize,
    /// Records dropped while parsing or normalizing.
    pub malformed: usize,
    /// Responses at or above the slow threshold.
    pub slow: usize,
    /// Oldest result timestamp.
    pub earliest: Option<UnixTime>,
    /// Newest result timestamp.
    pub latest: Option<UnixTime>,
    /// Fastest response time.
    pub rt_min: Option<f64>,
    /// Mean response time.
    pub rt_mean: Option<f64>,
    /// Slowest response time.
    pub rt_max: Option<f64>,
    /// Population standard deviation of response times.
    pub rt_stddev: Option<f64>,
}

impl SetStatistics {
    /// Computes statistics for a round.
    #[must_use]
    pub fn from_round(round: &Round, malformed: usize, slow_ms: f64) -> Self {
        let times: Vec<f64> = round
            .results
            .iter()
            .filter_map(|r| match r.response_time {
                RawResponseTime::Millis(ms) => Some(ms),
                _ => None,
            })
            .collect();

        let mut stats = Self {
            total: round.len(),
            errors: round.len() - times.len(),
            malformed,
            slow: times.iter().filter(|&&ms| ms >= slow_ms).count(),
            earliest: round.results.iter().map(|r| r.timestamp).min(),
            latest: round.results.iter().map(|r| r.timestamp).max(),
            ..Self::default()
        };

        if !times.is_empty() {
            stats.rt_min = Some(times.iter().copied().fold(f64::INFINITY, f64::min));
            stats.rt_max = Some(times.iter().copied().fold(f64::NEG_INFINITY, f64::max));
            stats.rt_mean = Some(times.iter().mean());
            stats.rt_stddev = Some(times.iter().population_std_dev());
        }
        stats
    }
}
