//! Decoding the RIPE probe archive and single-probe API records.

use std::io::Read;

use bzip2::read::BzDecoder;
use serde::Deserialize;
use thiserror::Error;

use super::{ProbeDirectory, ProbeMeta};
use crate::measurement::ProbeId;

const BZIP2_MAGIC: &[u8] = b"BZh";

/// Error decoding probe data.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The archive looked bzip2-compressed but did not decompress.
    #[error("Failed to decompress probe archive: {0}")]
    Decompress(#[source] std::io::Error),

    /// The document is not the expected JSON shape.
    #[error("Invalid probe JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct ArchiveDocument {
    objects: Vec<ProbeEntry>,
}

#[derive(Deserialize)]
struct ProbeEntry {
    id: ProbeId,
    #[serde(flatten)]
    meta: ProbeMeta,
}

/// Parses the probe archive (`{"objects": [...]}`), bzip2-compressed or plain.
///
/// Entries are keyed by their `id`; fields the cache does not keep are
/// ignored.
///
/// # Errors
///
/// Returns an error if decompression fails or the JSON does not match.
pub fn parse_archive(bytes: &[u8]) -> Result<ProbeDirectory, FeedError> {
    let document: ArchiveDocument = if bytes.starts_with(BZIP2_MAGIC) {
        let mut json = Vec::new();
        BzDecoder::new(bytes)
            .read_to_end(&mut json)
            .map_err(FeedError::Decompress)?;
        serde_json::from_slice(&json)?
    } else {
        serde_json::from_slice(bytes)?
    };

    Ok(document
        .objects
        .into_iter()
        .map(|entry| (entry.id, entry.meta))
        .collect())
}

/// Parses one probe record as returned by `/api/v2/probes/{id}/`.
///
/// # Errors
///
/// Returns an error if the body is not a probe object.
pub fn parse_probe(bytes: &[u8]) -> Result<(ProbeId, ProbeMeta), FeedError> {
    let entry: ProbeEntry = serde_json::from_slice(bytes)?;
    Ok((entry.id, entry.meta))
}
