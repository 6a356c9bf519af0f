//! Tests for probe alignment and exclusion lists.

use std::collections::BTreeSet;

use super::align::{AlignOptions, AlignedRow, ExclusionList, Presence, align};
use super::normalize::{NormalizedSample, SampleSet};
use crate::measurement::ProbeId;
use crate::probes::{ProbeDirectory, ProbeMeta};

fn sample(probe_id: ProbeId, rt: f64) -> NormalizedSample {
    NormalizedSample {
        probe_id,
        rt_ms: Some(rt),
        pop: None,
    }
}

fn set(ids: &[ProbeId]) -> SampleSet {
    SampleSet::from_samples(ids.iter().map(|&id| sample(id, f64::from(id))))
}

fn ids(rows: &[AlignedRow]) -> Vec<ProbeId> {
    rows.iter().map(|r| r.probe_id).collect()
}

fn options(all_probes: bool, excluded: &[ProbeId]) -> AlignOptions {
    AlignOptions {
        all_probes,
        exclusions: excluded.iter().copied().collect(),
    }
}

mod joining {
    use super::*;

    #[test]
    fn union_when_all_probes() {
        let a = set(&[3, 1, 5]);
        let b = set(&[2, 3, 9]);

        let rows = align(&a, Some(&b), &options(true, &[]), &ProbeDirectory::new());
        assert_eq!(ids(&rows), vec![1, 2, 3, 5, 9]);
    }

    #[test]
    fn intersection_by_default() {
        let a = set(&[3, 1, 5]);
        let b = set(&[2, 3, 5]);

        let rows = align(&a, Some(&b), &options(false, &[]), &ProbeDirectory::new());
        assert_eq!(ids(&rows), vec![3, 5]);
        assert!(rows.iter().all(|r| r.presence() == Presence::Both));
    }

    #[test]
    fn only_a_probe_dropped_without_all_probes() {
        let a = set(&[100, 200]);
        let b = set(&[200]);

        let rows = align(&a, Some(&b), &options(false, &[]), &ProbeDirectory::new());
        assert_eq!(ids(&rows), vec![200]);
    }

    #[test]
    fn union_rows_carry_the_side_that_exists() {
        let a = set(&[1, 2]);
        let b = set(&[2, 3]);

        let rows = align(&a, Some(&b), &options(true, &[]), &ProbeDirectory::new());
        let presence: Vec<_> = rows.iter().map(AlignedRow::presence).collect();
        assert_eq!(
            presence,
            vec![Presence::OnlyA, Presence::Both, Presence::OnlyB]
        );
        assert!(rows[0].b.is_none());
        assert!(rows[2].a.is_none());
        assert_eq!(rows[1].a.as_ref().unwrap().rt_ms, Some(2.0));
    }

    #[test]
    fn snapshot_lists_every_probe_of_a() {
        let a = set(&[4, 2]);

        let rows = align(&a, None, &options(false, &[]), &ProbeDirectory::new());
        assert_eq!(ids(&rows), vec![2, 4]);
        assert!(rows.iter().all(|r| r.b.is_none()));
    }

    #[test]
    fn union_and_intersection_properties_hold() {
        let a_ids: Vec<ProbeId> = (0..60).filter(|n| n % 2 == 0).collect();
        let b_ids: Vec<ProbeId> = (0..60).filter(|n| n % 3 == 0).collect();
        let excluded = [6, 7, 8];
        let a = set(&a_ids);
        let b = set(&b_ids);
        let a_ids: BTreeSet<_> = a_ids.into_iter().collect();
        let b_ids: BTreeSet<_> = b_ids.into_iter().collect();
        let excluded_set: BTreeSet<_> = excluded.into_iter().collect();

        let union = align(&a, Some(&b), &options(true, &excluded), &ProbeDirectory::new());
        let expected: Vec<_> = a_ids
            .union(&b_ids)
            .filter(|id| !excluded_set.contains(id))
            .copied()
            .collect();
        assert_eq!(ids(&union), expected);

        let intersection = align(&a, Some(&b), &options(false, &excluded), &ProbeDirectory::new());
        let expected: Vec<_> = a_ids
            .intersection(&b_ids)
            .filter(|id| !excluded_set.contains(id))
            .copied()
            .collect();
        assert_eq!(ids(&intersection), expected);

        for rows in [&union, &intersection] {
            assert!(rows.windows(2).all(|w| w[0].probe_id < w[1].probe_id));
        }
    }
}

mod exclusions {
    use super::*;

    #[test]
    fn excluded_probes_removed_after_join() {
        let a = set(&[1, 2, 3]);
        let b = set(&[1, 2, 3]);

        let rows = align(&a, Some(&b), &options(false, &[2]), &ProbeDirectory::new());
        assert_eq!(ids(&rows), vec![1, 3]);
    }

    #[test]
    fn parse_ignores_comments_and_blank_lines() {
        let list = ExclusionList::parse(
            "# flaky probes\n\
             1001\n\
             \n\
             1002   # behind a broken NAT\n\
             not-a-probe\n\
             1003 extra words\n",
        );

        assert_eq!(list.len(), 3);
        assert!(list.contains(1001));
        assert!(list.contains(1002));
        assert!(list.contains(1003));
        assert!(!list.contains(1004));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exclude.txt");
        std::fs::write(&path, "42\n43\n").unwrap();

        let list = ExclusionList::load(&path).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn load_missing_file_fails() {
        let result = ExclusionList::load(std::path::Path::new("/no/such/exclusions"));
        assert!(result.is_err());
    }
}

mod metadata {
    use super::*;

    #[test]
    fn rows_carry_known_metadata() {
        let mut probes = ProbeDirectory::new();
        probes.insert(
            1,
            ProbeMeta {
                asn_v4: Some(3333),
                country_code: Some("NL".to_string()),
                ..ProbeMeta::default()
            },
        );
        let a = set(&[1, 2]);

        let rows = align(&a, None, &options(false, &[]), &probes);
        assert_eq!(rows[0].meta.as_ref().and_then(ProbeMeta::asn), Some(3333));
        assert!(rows[1].meta.is_none());
    }
}
