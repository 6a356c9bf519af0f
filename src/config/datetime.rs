//! Parsing of user-supplied target moments.
//!
//! Accepts Unix seconds or one of a handful of compact UTC layouts such as
//! `20240131_1200` or `2024-01-31-12:00`.

use chrono::NaiveDateTime;

use super::ConfigError;
use crate::time::UnixTime;

const FORMATS: [&str; 9] = [
    "%Y%m%d%H%M",
    "%Y%m%d_%H%M",
    "%Y%m%d_%H:%M",
    "%Y%m%d %H%M",
    "%Y%m%d %H:%M",
    "%Y-%m-%d_%H%M",
    "%Y-%m-%d_%H:%M",
    "%Y-%m-%d-%H%M",
    "%Y-%m-%d-%H:%M",
];

/// Parses one of the accepted layouts as UTC, without any range check.
#[must_use]
pub fn parse_layout(value: &str) -> Option<UnixTime> {
    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        .map(|dt| dt.and_utc().timestamp())
}

/// Resolves a target moment that must lie in `[floor, now)`.
///
/// Plain digits are read as Unix seconds first; a digit string that is out
/// of range that way (e.g. `202401311200`) is retried as a layout.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidDatetime`] if nothing matches or the
/// moment is outside the range.
pub fn parse_target(
    field: &'static str,
    value: &str,
    floor: UnixTime,
    now: UnixTime,
) -> Result<UnixTime, ConfigError> {
    let in_range = |t: &UnixTime| (floor..now).contains(t);

    if let Ok(unix) = value.trim().parse::<UnixTime>() {
        if in_range(&unix) {
            return Ok(unix);
        }
    }

    let Some(parsed) = parse_layout(value) else {
        return Err(ConfigError::datetime(
            field,
            value,
            "expected Unix seconds or a layout like YYYY-MM-DD_HH:MM",
        ));
    };

    if in_range(&parsed) {
        Ok(parsed)
    } else {
        Err(ConfigError::datetime(
            field,
            value,
            format!("must be between {floor} and {now} (Unix seconds)"),
        ))
    }
}
