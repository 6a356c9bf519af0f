//! Time-window selection over a result set.

use std::time::Duration;

use thiserror::Error;

use super::record::{ResultSet, Round};
use crate::time::{Clock, UnixTime, duration_secs};

/// Limits applied when picking a round for a target moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    /// Rounds starting before this moment are never eligible.
    pub floor: UnixTime,
    /// A selected round older than `target - staleness` is flagged stale.
    pub staleness: Duration,
}

/// Error raised when no round qualifies for a target moment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    /// No eligible round starts at or before the target.
    #[error("No data for '{label}' at or before {target}{}", oldest_hint(.oldest))]
    NoDataForWindow {
        /// Label of the result set that was searched.
        label: String,
        /// The requested moment (Unix seconds).
        target: UnixTime,
        /// Start of the oldest eligible round, if any exist.
        oldest: Option<UnixTime>,
    },
}

#[allow(clippy::ref_option)]
fn oldest_hint(oldest: &Option<UnixTime>) -> String {
    oldest.map_or_else(
        || " (result set is empty)".to_string(),
        |t| format!(" (oldest round starts at {t})"),
    )
}

/// The round chosen for one side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedRound<'a> {
    /// The chosen round.
    pub round: &'a Round,
    /// The moment the round was chosen for.
    pub target: UnixTime,
    /// True if the round is older than the staleness threshold allows.
    pub stale: bool,
}

impl SelectedRound<'_> {
    /// Returns how far the round start lies before the target, in seconds.
    #[must_use]
    pub const fn age(&self) -> UnixTime {
        self.target - self.round.start
    }
}

/// Picks the most recent round that starts at or before `target`.
///
/// A missing target means "now" according to `clock`.
///
/// # Errors
///
/// Returns [`WindowError::NoDataForWindow`] if the target predates the
/// policy floor, or no eligible round starts at or before it.
pub fn select_round<'a>(
    set: &'a ResultSet,
    target: Option<UnixTime>,
    policy: &WindowPolicy,
    clock: &impl Clock,
) -> Result<SelectedRound<'a>, WindowError> {
    let target = target.unwrap_or_else(|| clock.unix_now());

    let eligible = || set.rounds().iter().filter(|r| r.start >= policy.floor);
    let no_data = || WindowError::NoDataForWindow {
        label: set.label().to_string(),
        target,
        oldest: eligible().map(|r| r.start).next(),
    };

    if target < policy.floor {
        return Err(no_data());
    }

    // Rounds are ordered by start, so the last qualifying one is the latest.
    let round = eligible()
        .take_while(|r| r.start <= target)
        .last()
        .ok_or_else(no_data)?;

    let selected = SelectedRound {
        round,
        target,
        stale: target - round.start > duration_secs(policy.staleness),
    };

    if selected.stale {
        tracing::info!(
            "Round for '{}' starts {}s before {}, older than the {}s staleness threshold",
            set.label(),
            selected.age(),
            target,
            policy.staleness.as_secs()
        );
    } else {
        tracing::debug!(
            "Selected round starting at {} for '{}' ({} results)",
            round.start,
            set.label(),
            round.len()
        );
    }

    Ok(selected)
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
