//! Joining two sample sets by probe id.

use std::collections::BTreeSet;
use std::path::Path;

use super::CompareError;
use super::normalize::{NormalizedSample, SampleSet};
use crate::measurement::ProbeId;
use crate::probes::{ProbeLookup, ProbeMeta};

/// Probe ids to leave out of every report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    ids: BTreeSet<ProbeId>,
}

impl ExclusionList {
    /// Parses an exclusion list: one probe id per line.
    ///
    /// Text after `#` is a comment. Blank lines are ignored, as are lines
    /// that do not start with a probe id (logged at warn).
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut ids = BTreeSet::new();
        for (lineno, line) in content.lines().enumerate() {
            let entry = line.split('#').next().unwrap_or_default().trim();
            if entry.is_empty() {
                continue;
            }
            let first = entry.split_whitespace().next().unwrap_or(entry);
            match first.parse::<ProbeId>() {
                Ok(id) => {
                    ids.insert(id);
                }
                Err(_) => {
                    tracing::warn!("Ignoring exclusion list line {}: {line:?}", lineno + 1);
                }
            }
        }
        Self { ids }
    }

    /// Reads and parses an exclusion list file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, CompareError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CompareError::ExclusionListRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self::parse(&content))
    }

    /// Returns true if the probe is excluded.
    #[must_use]
    pub fn contains(&self, id: ProbeId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns the number of excluded probes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing is excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<ProbeId> for ExclusionList {
    fn from_iter<I: IntoIterator<Item = ProbeId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// How two sample sets are joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignOptions {
    /// Keep probes seen in only one set (union instead of intersection).
    pub all_probes: bool,
    /// Probes removed after joining.
    pub exclusions: ExclusionList,
}

/// Which sets a probe appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Set A only.
    OnlyA,
    /// Set B only.
    OnlyB,
    /// Both sets.
    Both,
}

/// One probe and whatever each set knows about it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    /// The probe.
    pub probe_id: ProbeId,
    /// Sample from set A.
    pub a: Option<NormalizedSample>,
    /// Sample from set B.
    pub b: Option<NormalizedSample>,
    /// Probe metadata, if known.
    pub meta: Option<ProbeMeta>,
}

impl AlignedRow {
    /// Returns which sets the probe appears in.
    ///
    /// Rows are only built with at least one side present, so a row with
    /// neither side reports `OnlyA`.
    #[must_use]
    pub const fn presence(&self) -> Presence {
        match (&self.a, &self.b) {
            (Some(_), Some(_)) => Presence::Both,
            (None, Some(_)) => Presence::OnlyB,
            _ => Presence::OnlyA,
        }
    }
}

/// Joins set A with set B by probe id.
///
/// With `all_probes` the output covers the union of both sets, otherwise
/// only probes present in both. When `b` is `None` (a single snapshot)
/// every probe of `a` is kept. Excluded probes are dropped afterwards.
/// Rows come out in ascending probe id order.
pub fn align(
    a: &SampleSet,
    b: Option<&SampleSet>,
    options: &AlignOptions,
    probes: &impl ProbeLookup,
) -> Vec<AlignedRow> {
    let ids: BTreeSet<ProbeId> = match b {
        None => a.probe_ids().collect(),
        Some(b) if options.all_probes => a.probe_ids().chain(b.probe_ids()).collect(),
        Some(b) => a.probe_ids().filter(|id| b.contains(*id)).collect(),
    };

    ids.into_iter()
        .filter(|id| !options.exclusions.contains(*id))
        .map(|id| AlignedRow {
            probe_id: id,
            a: a.get(id).cloned(),
            b: b.and_then(|b| b.get(id)).cloned(),
            meta: probes.probe(id).cloned(),
        })
        .collect()
}
