//! Report columns and their accessors.

use std::fmt;
use std::str::FromStr;

use super::{PLACEHOLDER, ReportError, UNKNOWN, format_ms};
use crate::compare::DeltaRow;

/// A column of the table report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Probe id.
    ProbeId,
    /// Probe ASN.
    Asn,
    /// Probe country code.
    CountryCode,
    /// Probe public address.
    IpAddress,
    /// Response time in set A.
    RtA,
    /// Response time in set B.
    RtB,
    /// A − B.
    RtDiff,
    /// POP code(s) from the DNS response.
    DnsResponse,
}

impl Column {
    /// Every column, in default display order.
    pub const ALL: [Self; 8] = [
        Self::ProbeId,
        Self::Asn,
        Self::CountryCode,
        Self::IpAddress,
        Self::RtA,
        Self::RtB,
        Self::RtDiff,
        Self::DnsResponse,
    ];

    /// Configuration name of the column.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ProbeId => "probe_id",
            Self::Asn => "asn",
            Self::CountryCode => "country_code",
            Self::IpAddress => "ip_address",
            Self::RtA => "rt_a",
            Self::RtB => "rt_b",
            Self::RtDiff => "rt_diff",
            Self::DnsResponse => "dns_response",
        }
    }

    /// Minimum display width.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::ProbeId => 12,
            Self::Asn => 10,
            Self::CountryCode => 4,
            Self::IpAddress | Self::DnsResponse => 15,
            Self::RtA | Self::RtB => 13,
            Self::RtDiff => 12,
        }
    }

    /// Header text. `label_a`/`label_b` name the two sets.
    #[must_use]
    pub fn header(self, label_a: &str, label_b: &str) -> String {
        match self {
            Self::ProbeId => "Probe_ID".to_string(),
            Self::Asn => "ASN".to_string(),
            Self::CountryCode => "CC".to_string(),
            Self::IpAddress => "IP_Address".to_string(),
            Self::RtA => format!("{label_a}(ms)"),
            Self::RtB => format!("{label_b}(ms)"),
            Self::RtDiff => "diff(ms)".to_string(),
            Self::DnsResponse => "DNSSrvsubstr".to_string(),
        }
    }

    /// Returns true for columns whose values are numbers.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::RtA | Self::RtB | Self::RtDiff)
    }

    /// Plain cell text for a row.
    #[must_use]
    pub fn value(self, row: &DeltaRow) -> String {
        let meta = row.row.meta.as_ref();
        match self {
            Self::ProbeId => row.probe_id().to_string(),
            Self::Asn => meta
                .and_then(|m| m.asn())
                .map_or_else(|| UNKNOWN.to_string(), |a| a.to_string()),
            Self::CountryCode => meta
                .and_then(|m| m.country_code())
                .unwrap_or(UNKNOWN)
                .to_string(),
            Self::IpAddress => meta
                .and_then(|m| m.ip_address())
                .unwrap_or(UNKNOWN)
                .to_string(),
            Self::RtA => format_ms(row.rt_a()),
            Self::RtB => format_ms(row.rt_b()),
            Self::RtDiff => format_ms(row.latency_diff),
            Self::DnsResponse => dns_response(row),
        }
    }
}

fn dns_response(row: &DeltaRow) -> String {
    match (row.pop_a(), row.pop_b()) {
        (Some(a), Some(b)) if a != b => format!("{a}:{b}"),
        (Some(pop), _) | (None, Some(pop)) => pop.to_string(),
        (None, None) => PLACEHOLDER.to_string(),
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "rt_delta" {
            return Ok(Self::RtDiff);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| ReportError::UnknownColumn {
                name: s.to_string(),
                expected: Self::ALL.map(Self::name).join(", "),
            })
    }
}

/// Parses configured column names, keeping their order.
///
/// # Errors
///
/// Returns [`ReportError::UnknownColumn`] for the first unrecognised name.
pub fn parse_columns<S: AsRef<str>>(names: &[S]) -> Result<Vec<Column>, ReportError> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}
