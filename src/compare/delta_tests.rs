//! Tests for delta computation and the comparison pipeline.

use super::align::{AlignOptions, AlignedRow};
use super::delta::{DeltaRow, Thresholds, compute_all};
use super::normalize::{NormalizedSample, SampleSet};
use super::{CompareError, compare};
use crate::measurement::ProbeId;
use crate::probes::ProbeDirectory;

fn sample(probe_id: ProbeId, rt: Option<f64>, pop: Option<&str>) -> NormalizedSample {
    NormalizedSample {
        probe_id,
        rt_ms: rt,
        pop: pop.map(str::to_string),
    }
}

fn row(a: Option<NormalizedSample>, b: Option<NormalizedSample>) -> AlignedRow {
    let probe_id = a.as_ref().or(b.as_ref()).map_or(0, |s| s.probe_id);
    AlignedRow {
        probe_id,
        a,
        b,
        meta: None,
    }
}

fn thresholds(latency: f64, slow: f64) -> Thresholds {
    Thresholds {
        latency_diff_ms: latency,
        slow_ms: slow,
    }
}

mod latency {
    use super::*;

    #[test]
    fn pop_change_and_latency_drop_are_significant() {
        let delta = DeltaRow::compute(
            row(
                Some(sample(100, Some(20.0), Some("AAA"))),
                Some(sample(100, Some(45.0), Some("BBB"))),
            ),
            &thresholds(5.0, 50.0),
        );

        assert_eq!(delta.latency_diff, Some(-25.0));
        assert!(delta.pop_changed);
        assert!(delta.significant);
    }

    #[test]
    fn diff_below_threshold_is_not_significant() {
        let delta = DeltaRow::compute(
            row(
                Some(sample(1, Some(10.0), Some("X"))),
                Some(sample(1, Some(14.0), Some("X"))),
            ),
            &thresholds(5.0, 50.0),
        );

        assert_eq!(delta.latency_diff, Some(-4.0));
        assert!(!delta.significant);
    }

    #[test]
    fn diff_equal_to_threshold_is_significant() {
        let delta = DeltaRow::compute(
            row(
                Some(sample(1, Some(15.0), None)),
                Some(sample(1, Some(10.0), None)),
            ),
            &thresholds(5.0, 50.0),
        );

        assert_eq!(delta.latency_diff, Some(5.0));
        assert!(delta.significant);
    }

    #[test]
    fn null_rt_on_either_side_gives_null_diff() {
        let cases = [
            row(Some(sample(1, None, None)), Some(sample(1, Some(3.0), None))),
            row(Some(sample(1, Some(3.0), None)), Some(sample(1, None, None))),
            row(Some(sample(1, Some(3.0), None)), None),
            row(None, Some(sample(1, Some(3.0), None))),
        ];

        for case in cases {
            let delta = DeltaRow::compute(case, &thresholds(0.0, 50.0));
            assert_eq!(delta.latency_diff, None);
            assert!(!delta.significant);
        }
    }
}

mod pop {
    use super::*;

    #[test]
    fn missing_pop_is_never_a_change() {
        let delta = DeltaRow::compute(
            row(
                Some(sample(1, Some(10.0), None)),
                Some(sample(1, Some(10.0), Some("AMS"))),
            ),
            &thresholds(5.0, 50.0),
        );

        assert!(!delta.pop_changed);
        assert!(!delta.significant);
    }

    #[test]
    fn pop_change_alone_is_significant() {
        let delta = DeltaRow::compute(
            row(
                Some(sample(1, Some(10.0), Some("AMS"))),
                Some(sample(1, Some(10.0), Some("FRA"))),
            ),
            &thresholds(5.0, 50.0),
        );

        assert_eq!(delta.latency_diff, Some(0.0));
        assert!(delta.pop_changed);
        assert!(delta.significant);
    }
}

mod slow {
    use super::*;

    #[test]
    fn each_side_classified_independently() {
        let delta = DeltaRow::compute(
            row(
                Some(sample(1, Some(50.0), None)),
                Some(sample(1, Some(49.9), None)),
            ),
            &thresholds(5.0, 50.0),
        );

        assert!(delta.slow_a);
        assert!(!delta.slow_b);
        assert!(delta.is_slow());
        assert!(!delta.significant);
    }

    #[test]
    fn missing_rt_is_not_slow() {
        let delta = DeltaRow::compute(row(Some(sample(1, None, None)), None), &thresholds(5.0, 0.0));
        assert!(!delta.slow_a);
        assert!(!delta.slow_b);
    }
}

mod pipeline {
    use super::*;

    fn set(samples: Vec<NormalizedSample>) -> SampleSet {
        SampleSet::from_samples(samples)
    }

    #[test]
    fn compute_all_preserves_order() {
        let rows = vec![
            row(Some(sample(1, Some(1.0), None)), None),
            row(Some(sample(2, Some(2.0), None)), None),
        ];
        let deltas = compute_all(rows, &Thresholds::default());
        assert_eq!(
            deltas.iter().map(DeltaRow::probe_id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn disjoint_sets_are_an_error_without_all_probes() {
        let a = set(vec![sample(1, Some(1.0), None)]);
        let b = set(vec![sample(2, Some(1.0), None)]);

        let result = compare(
            &a,
            Some(&b),
            &AlignOptions::default(),
            &Thresholds::default(),
            &ProbeDirectory::new(),
        );
        assert!(matches!(
            result,
            Err(CompareError::NoCommonProbes {
                a_count: 1,
                b_count: 1
            })
        ));
    }

    #[test]
    fn disjoint_sets_are_listed_with_all_probes() {
        let a = set(vec![sample(1, Some(1.0), None)]);
        let b = set(vec![sample(2, Some(1.0), None)]);
        let options = AlignOptions {
            all_probes: true,
            ..AlignOptions::default()
        };

        let deltas = compare(
            &a,
            Some(&b),
            &options,
            &Thresholds::default(),
            &ProbeDirectory::new(),
        )
        .unwrap();
        assert_eq!(deltas.len(), 2);
    }

    #[test]
    fn snapshot_has_no_diffs() {
        let a = set(vec![
            sample(5, Some(60.0), Some("X")),
            sample(3, Some(1.0), Some("Y")),
        ]);

        let deltas = compare(
            &a,
            None,
            &AlignOptions::default(),
            &Thresholds::default(),
            &ProbeDirectory::new(),
        )
        .unwrap();
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].probe_id(), 3);
        assert!(deltas.iter().all(|d| d.latency_diff.is_none()));
        assert!(deltas[1].slow_a);
    }
}
