//! Comparison engine: normalization, alignment and deltas.
//!
//! This module provides:
//! - POP extraction and record normalization ([`PopExtractor`], [`SampleSet`])
//! - Probe-id alignment of two sets ([`align`], [`AlignOptions`], [`ExclusionList`])
//! - Latency and POP deltas ([`DeltaRow`], [`Thresholds`])
//! - The whole pipeline in one call ([`compare`])
//!
//! Everything here is synchronous and pure apart from logging; probe
//! metadata is read through [`ProbeLookup`] and never modified.

mod align;
mod delta;
mod normalize;


#[cfg(test)]
#[path = "align_tests.rs"]
mod align_tests;

#[cfg(test)]
#[path = "delta_tests.rs"]
mod delta_tests;

use std::path::PathBuf;

use thiserror::Error;

pub use align::{AlignOptions, AlignedRow, ExclusionList, Presence, align};
pub use delta::{DeltaRow, Thresholds, compute_all};
pub use normalize::{MalformedRecord, NormalizedSample, PopExtractor, SampleSet};

use crate::probes::ProbeLookup;

/// Errors from the comparison stage.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The exclusion list file could not be read.
    #[error("Failed to read exclusion list '{}': {source}", path.display())]
    ExclusionListRead {
        /// Path to the exclusion list
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Both sets have data but no probe in common.
    #[error(
        "The two result sets have no probes in common ({a_count} vs {b_count} probes); \
         use --all-probes to list them anyway"
    )]
    NoCommonProbes {
        /// Probes in set A
        a_count: usize,
        /// Probes in set B
        b_count: usize,
    },
}

/// Aligns two sample sets and computes their deltas.
///
/// # Errors
///
/// Returns [`CompareError::NoCommonProbes`] when both sets hold probes,
/// none of them shared, and `all_probes` is off.
pub fn compare(
    a: &SampleSet,
    b: Option<&SampleSet>,
    options: &AlignOptions,
    thresholds: &Thresholds,
    probes: &impl ProbeLookup,
) -> Result<Vec<DeltaRow>, CompareError> {
    if let Some(b) = b {
        let disjoint = !a.is_empty() && !b.is_empty() && !a.probe_ids().any(|id| b.contains(id));
        if disjoint && !options.all_probes {
            return Err(CompareError::NoCommonProbes {
                a_count: a.len(),
                b_count: b.len(),
            });
        }
    }

    let rows = align(a, b, options, probes);
    tracing::debug!(
        "Aligned {} probe(s) ({} in A, {} in B)",
        rows.len(),
        a.len(),
        b.map_or(0, SampleSet::len)
    );
    Ok(compute_all(rows, thresholds))
}
