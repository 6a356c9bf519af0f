//! RIPE Atlas DNS result parsing.
//!
//! Turns the JSON documents returned by the Atlas results API (or saved
//! to disk from it) into [`RawResult`] records. Parsing is per record: a
//! record that does not fit the expected shape is counted and skipped
//! instead of failing the whole document.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hickory_proto::op::Message;
use hickory_proto::rr::RData;
use serde::Deserialize;

use super::record::{ProbeId, RawResponseTime, RawResult};
use super::ResultsError;
use crate::time::UnixTime;

/// Results parsed from one Atlas JSON document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResults {
    /// Successfully parsed records, in document order.
    pub results: Vec<RawResult>,
    /// Number of records that could not be interpreted at all.
    pub malformed: usize,
    /// Measurement id found in the records, if any.
    pub measurement_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AtlasRecord {
    prb_id: Option<ProbeId>,
    timestamp: Option<UnixTime>,
    msm_id: Option<u64>,
    #[serde(flatten)]
    response: AtlasResponse,
    #[serde(default)]
    resultset: Vec<AtlasResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct AtlasResponse {
    result: Option<AtlasDnsResult>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AtlasDnsResult {
    rt: Option<f64>,
    abuf: Option<String>,
    #[serde(default)]
    answers: Vec<AtlasAnswer>,
}

#[derive(Debug, Deserialize)]
struct AtlasAnswer {
    #[serde(rename = "RDATA", default)]
    rdata: Vec<String>,
}

/// Parses a JSON array of Atlas DNS results.
///
/// # Errors
///
/// Returns [`ResultsError::Json`] if the document is not a JSON array.
/// Individual malformed records are skipped and counted.
pub fn parse_results(content: &str) -> Result<ParsedResults, ResultsError> {
    let records: Vec<serde_json::Value> = serde_json::from_str(content)?;
    Ok(parse_records(records))
}

/// Parses already-decoded JSON values as Atlas DNS results.
#[must_use]
pub fn parse_records(records: Vec<serde_json::Value>) -> ParsedResults {
    let mut parsed = ParsedResults::default();

    for (index, value) in records.into_iter().enumerate() {
        match serde_json::from_value::<AtlasRecord>(value) {
            Ok(record) => {
                if parsed.measurement_id.is_none() {
                    parsed.measurement_id = record.msm_id;
                }
                match into_raw_result(record) {
                    Some(result) => parsed.results.push(result),
                    None => {
                        tracing::warn!("Skipping result #{index}: no timestamp");
                        parsed.malformed += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Skipping result #{index}: {e}");
                parsed.malformed += 1;
            }
        }
    }

    parsed
}

fn into_raw_result(record: AtlasRecord) -> Option<RawResult> {
    let timestamp = record.timestamp?;

    // Multi-resolver measurements report one response per resolver; the
    // first one stands for the probe.
    let response = if record.response.result.is_none() && record.response.error.is_none() {
        record.resultset.into_iter().next().unwrap_or_default()
    } else {
        record.response
    };

    let response_time = response_time(&response);
    let payload = response.result.as_ref().and_then(first_answer_text);

    Some(RawResult {
        timestamp,
        probe_id: record.prb_id,
        response_time,
        payload,
    })
}

fn response_time(response: &AtlasResponse) -> RawResponseTime {
    if let Some(error) = &response.error {
        if error.get("timeout").is_some() {
            return RawResponseTime::Timeout;
        }
        return RawResponseTime::Error(error.to_string());
    }

    match response.result.as_ref().and_then(|r| r.rt) {
        Some(rt) if rt.is_finite() && rt >= 0.0 => RawResponseTime::Millis(rt),
        _ => RawResponseTime::Missing,
    }
}

/// Returns the text of the first answer, preferring the probe's own
/// decoding over the raw answer buffer.
fn first_answer_text(result: &AtlasDnsResult) -> Option<String> {
    if let Some(text) = result.answers.first().and_then(|a| a.rdata.first()) {
        return Some(text.clone());
    }
    result.abuf.as_deref().and_then(decode_abuf)
}

/// Decodes a base64 DNS wire-format message and returns its first answer.
///
/// TXT strings are joined; other record types use their presentation
/// format. Returns `None` when the buffer is undecodable or has no answers.
#[must_use]
pub fn decode_abuf(abuf: &str) -> Option<String> {
    let bytes = STANDARD.decode(abuf).ok()?;
    let message = Message::from_vec(&bytes).ok()?;
    let record = message.answers().first()?;

    match record.data()? {
        RData::TXT(txt) => Some(
            txt.iter()
                .map(|part| String::from_utf8_lossy(part).into_owned())
                .collect::<String>(),
        ),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
