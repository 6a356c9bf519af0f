//! Per-probe latency and POP deltas.

use super::align::{AlignedRow, Presence};

/// Limits that decide which rows stand out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum |A − B| in milliseconds for a latency change to count.
    pub latency_diff_ms: f64,
    /// Response times at or above this are slow.
    pub slow_ms: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            latency_diff_ms: 5.0,
            slow_ms: 50.0,
        }
    }
}

/// An aligned row annotated with its deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRow {
    /// The aligned probe.
    pub row: AlignedRow,
    /// A.rt − B.rt in milliseconds, if both sides have a response time.
    pub latency_diff: Option<f64>,
    /// Both POP codes are known and differ.
    pub pop_changed: bool,
    /// The latency diff meets the threshold, or the POP changed.
    pub significant: bool,
    /// Set A's response time is slow.
    pub slow_a: bool,
    /// Set B's response time is slow.
    pub slow_b: bool,
}

impl DeltaRow {
    /// Computes the deltas for one aligned row.
    #[must_use]
    pub fn compute(row: AlignedRow, thresholds: &Thresholds) -> Self {
        let rt_a = row.a.as_ref().and_then(|s| s.rt_ms);
        let rt_b = row.b.as_ref().and_then(|s| s.rt_ms);

        let latency_diff = match (rt_a, rt_b) {
            (Some(a), Some(b)) => Some(a - b),
            _ => None,
        };

        let pop_changed = match (
            row.a.as_ref().and_then(|s| s.pop.as_deref()),
            row.b.as_ref().and_then(|s| s.pop.as_deref()),
        ) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        };

        let significant =
            latency_diff.is_some_and(|d| d.abs() >= thresholds.latency_diff_ms) || pop_changed;

        let is_slow = |rt: Option<f64>| rt.is_some_and(|ms| ms >= thresholds.slow_ms);

        Self {
            slow_a: is_slow(rt_a),
            slow_b: is_slow(rt_b),
            row,
            latency_diff,
            pop_changed,
            significant,
        }
    }

    /// Returns the probe id.
    #[must_use]
    pub const fn probe_id(&self) -> crate::measurement::ProbeId {
        self.row.probe_id
    }

    /// Returns set A's response time.
    #[must_use]
    pub fn rt_a(&self) -> Option<f64> {
        self.row.a.as_ref().and_then(|s| s.rt_ms)
    }

    /// Returns set B's response time.
    #[must_use]
    pub fn rt_b(&self) -> Option<f64> {
        self.row.b.as_ref().and_then(|s| s.rt_ms)
    }

    /// Returns set A's POP code.
    #[must_use]
    pub fn pop_a(&self) -> Option<&str> {
        self.row.a.as_ref().and_then(|s| s.pop.as_deref())
    }

    /// Returns set B's POP code.
    #[must_use]
    pub fn pop_b(&self) -> Option<&str> {
        self.row.b.as_ref().and_then(|s| s.pop.as_deref())
    }

    /// Returns true if either side is slow.
    #[must_use]
    pub const fn is_slow(&self) -> bool {
        self.slow_a || self.slow_b
    }

    /// Returns which sets the probe appears in.
    #[must_use]
    pub const fn presence(&self) -> Presence {
        self.row.presence()
    }
}

/// Computes deltas for every row, preserving order.
#[must_use]
pub fn compute_all(rows: Vec<AlignedRow>, thresholds: &Thresholds) -> Vec<DeltaRow> {
    rows.into_iter()
        .map(|row| DeltaRow::compute(row, thresholds))
        .collect()
}
