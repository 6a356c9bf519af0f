//! Tests for time-window selection.

use std::time::Duration;

use super::*;
use crate::measurement::record::RawResult;
use crate::time::mock::MockClock;

const FLOOR: UnixTime = 1_262_304_000; // 2010-01-01T00:00:00Z

fn policy(staleness_secs: u64) -> WindowPolicy {
    WindowPolicy {
        floor: FLOOR,
        staleness: Duration::from_secs(staleness_secs),
    }
}

fn round(start: UnixTime) -> Round {
    Round::new(start, vec![RawResult::new(start + 5, 1, 10.0, None)])
}

fn set(starts: &[UnixTime]) -> ResultSet {
    ResultSet::from_rounds("12016241", starts.iter().copied().map(round).collect())
}

mod selection {
    use super::*;

    #[test]
    fn picks_latest_round_at_or_before_target() {
        let set = set(&[1_600_000_000, 1_600_000_300, 1_600_000_600]);
        let clock = MockClock::new(0);

        let selected = select_round(&set, Some(1_600_000_450), &policy(3600), &clock).unwrap();
        assert_eq!(selected.round.start, 1_600_000_300);
        assert_eq!(selected.target, 1_600_000_450);
        assert_eq!(selected.age(), 150);
    }

    #[test]
    fn round_starting_exactly_at_target_is_eligible() {
        let set = set(&[1_600_000_000, 1_600_000_300]);
        let clock = MockClock::new(0);

        let selected = select_round(&set, Some(1_600_000_300), &policy(3600), &clock).unwrap();
        assert_eq!(selected.round.start, 1_600_000_300);
    }

    #[test]
    fn missing_target_uses_clock() {
        let set = set(&[1_600_000_000, 1_600_000_300, 1_600_000_600]);
        let clock = MockClock::new(1_600_000_500);

        let selected = select_round(&set, None, &policy(3600), &clock).unwrap();
        assert_eq!(selected.round.start, 1_600_000_300);
        assert_eq!(selected.target, 1_600_000_500);
    }

    #[test]
    fn unordered_input_rounds_are_handled() {
        let set = ResultSet::from_rounds(
            "x",
            vec![round(1_600_000_600), round(1_600_000_000), round(1_600_000_300)],
        );
        let clock = MockClock::new(0);

        let selected = select_round(&set, Some(1_600_000_599), &policy(3600), &clock).unwrap();
        assert_eq!(selected.round.start, 1_600_000_300);
    }
}

mod no_data {
    use super::*;

    #[test]
    fn target_before_oldest_round_fails() {
        let set = set(&[1_600_000_000, 1_600_000_300]);
        let clock = MockClock::new(0);

        let err = select_round(&set, Some(1_599_999_999), &policy(3600), &clock).unwrap_err();
        assert_eq!(
            err,
            WindowError::NoDataForWindow {
                label: "12016241".to_string(),
                target: 1_599_999_999,
                oldest: Some(1_600_000_000),
            }
        );
        assert!(err.to_string().contains("oldest round starts at 1600000000"));
    }

    #[test]
    fn empty_set_fails() {
        let set = set(&[]);
        let clock = MockClock::new(1_600_000_000);

        let err = select_round(&set, None, &policy(3600), &clock).unwrap_err();
        assert!(err.to_string().contains("result set is empty"));
    }

    #[test]
    fn target_before_floor_fails() {
        let set = set(&[FLOOR - 600, FLOOR + 600]);
        let clock = MockClock::new(0);

        let result = select_round(&set, Some(FLOOR - 1), &policy(3600), &clock);
        assert!(matches!(result, Err(WindowError::NoDataForWindow { .. })));
    }

    #[test]
    fn rounds_before_floor_are_ignored() {
        let set = set(&[FLOOR - 600, FLOOR + 600]);
        let clock = MockClock::new(0);

        let result = select_round(&set, Some(FLOOR + 10), &policy(3600), &clock);
        assert!(matches!(
            result,
            Err(WindowError::NoDataForWindow {
                oldest: Some(start),
                ..
            }) if start == FLOOR + 600
        ));
    }
}

mod staleness {
    use super::*;

    #[test]
    fn recent_round_is_not_stale() {
        let set = set(&[1_600_000_000]);
        let clock = MockClock::new(0);

        let selected = select_round(&set, Some(1_600_000_100), &policy(300), &clock).unwrap();
        assert!(!selected.stale);
    }

    #[test]
    fn age_equal_to_threshold_is_not_stale() {
        let set = set(&[1_600_000_000]);
        let clock = MockClock::new(0);

        let selected = select_round(&set, Some(1_600_000_300), &policy(300), &clock).unwrap();
        assert!(!selected.stale);
    }

    #[test]
    fn old_round_is_returned_but_flagged() {
        let set = set(&[1_600_000_000]);
        let clock = MockClock::new(0);

        let selected = select_round(&set, Some(1_600_010_000), &policy(300), &clock).unwrap();
        assert_eq!(selected.round.start, 1_600_000_000);
        assert!(selected.stale);
    }
}
