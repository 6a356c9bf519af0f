//! Metrics exposition output for periodic scrapers.
//!
//! Each metric gets `# HELP` / `# TYPE` lines followed by one sample per
//! probe (or per window), e.g.
//!
//! ```text
//! ra_dns_check_response_time_ms{set="a",probe_id="1001",pop="AMS",asn="3333",country_code="NL"} 12.5
//! ```
//!
//! Samples with no value (timeouts, missing diffs) are left out rather
//! than written as placeholders.

use std::fmt::Write as _;

use super::{Report, UNKNOWN, WindowInfo};
use crate::compare::DeltaRow;

const PREFIX: &str = "ra_dns_check";

/// Renders the scrape report as lines.
#[must_use]
pub fn render_scrape(report: &Report<'_>) -> Vec<String> {
    let windows: Vec<(&str, &WindowInfo)> = std::iter::once(("a", report.a))
        .chain(report.b.map(|b| ("b", b)))
        .collect();
    let mut lines = Vec::new();

    describe(
        &mut lines,
        "window_timestamp_seconds",
        "Start of the selected measurement round.",
    );
    for (set, window) in &windows {
        lines.push(sample(
            "window_timestamp_seconds",
            &window_labels(set, window),
            window.round_start.to_string(),
        ));
    }

    describe(
        &mut lines,
        "window_stale",
        "1 if the selected round is older than the staleness threshold.",
    );
    for (set, window) in &windows {
        lines.push(sample(
            "window_stale",
            &window_labels(set, window),
            u8::from(window.stale).to_string(),
        ));
    }

    describe(
        &mut lines,
        "response_time_ms",
        "DNS response time reported by the probe.",
    );
    for row in report.rows {
        for (set, rt, pop) in [("a", row.rt_a(), row.pop_a()), ("b", row.rt_b(), row.pop_b())] {
            if let Some(rt) = rt {
                lines.push(sample(
                    "response_time_ms",
                    &probe_labels(set, row, pop),
                    format_value(rt),
                ));
            }
        }
    }

    if report.b.is_some() {
        comparison_metrics(&mut lines, report.rows);
    }

    lines
}

fn comparison_metrics(lines: &mut Vec<String>, rows: &[DeltaRow]) {
    describe(
        lines,
        "response_time_diff_ms",
        "Response time in set a minus set b.",
    );
    for row in rows {
        if let Some(diff) = row.latency_diff {
            lines.push(sample(
                "response_time_diff_ms",
                &id_label(row),
                format_value(diff),
            ));
        }
    }

    describe(
        lines,
        "pop_changed",
        "1 if the answering POP differs between the sets.",
    );
    for row in rows.iter().filter(|r| r.pop_a().is_some() && r.pop_b().is_some()) {
        lines.push(sample(
            "pop_changed",
            &id_label(row),
            u8::from(row.pop_changed).to_string(),
        ));
    }

    describe(
        lines,
        "significant",
        "1 if the latency diff or a POP change crosses the configured threshold.",
    );
    for row in rows {
        lines.push(sample(
            "significant",
            &id_label(row),
            u8::from(row.significant).to_string(),
        ));
    }
}

fn describe(lines: &mut Vec<String>, name: &str, help: &str) {
    lines.push(format!("# HELP {PREFIX}_{name} {help}"));
    lines.push(format!("# TYPE {PREFIX}_{name} gauge"));
}

fn sample(name: &str, labels: &[(&str, String)], value: String) -> String {
    let mut line = format!("{PREFIX}_{name}{{");
    for (i, (key, val)) in labels.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        let _ = write!(line, "{key}=\"{}\"", escape(val));
    }
    let _ = write!(line, "}} {value}");
    line
}

fn window_labels(set: &str, window: &WindowInfo) -> Vec<(&'static str, String)> {
    vec![("set", set.to_string()), ("source", window.source.clone())]
}

fn id_label(row: &DeltaRow) -> Vec<(&'static str, String)> {
    vec![("probe_id", row.probe_id().to_string())]
}

fn probe_labels(set: &str, row: &DeltaRow, pop: Option<&str>) -> Vec<(&'static str, String)> {
    let meta = row.row.meta.as_ref();
    vec![
        ("set", set.to_string()),
        ("probe_id", row.probe_id().to_string()),
        ("pop", pop.unwrap_or(UNKNOWN).to_string()),
        (
            "asn",
            meta.and_then(|m| m.asn())
                .map_or_else(|| UNKNOWN.to_string(), |a| a.to_string()),
        ),
        (
            "country_code",
            meta.and_then(|m| m.country_code())
                .unwrap_or(UNKNOWN)
                .to_string(),
        ),
    ]
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else {
        value.to_string()
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// One parsed exposition sample.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Full metric name.
    pub name: String,
    /// Labels in written order.
    pub labels: Vec<(String, String)>,
    /// Sample value.
    pub value: f64,
}

impl MetricSample {
    /// Returns the value of a label.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parses one sample line written by [`render_scrape`].
///
/// Returns `None` for comments, blank lines and anything malformed.
#[must_use]
pub fn parse_metric_line(line: &str) -> Option<MetricSample> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let Some(open) = line.find('{') else {
        let (name, value) = line.split_once(' ')?;
        return Some(MetricSample {
            name: name.to_string(),
            labels: Vec::new(),
            value: parse_value(value)?,
        });
    };

    let name = line[..open].to_string();
    let mut labels = Vec::new();
    let mut chars = line[open + 1..].chars();
    loop {
        let mut key = String::new();
        loop {
            match chars.next()? {
                '}' if key.is_empty() => {
                    return Some(MetricSample {
                        name,
                        labels,
                        value: parse_value(chars.as_str())?,
                    });
                }
                ',' if key.is_empty() => {}
                '=' => break,
                c => key.push(c),
            }
        }

        if chars.next()? != '"' {
            return None;
        }
        let mut value = String::new();
        loop {
            match chars.next()? {
                '\\' => match chars.next()? {
                    'n' => value.push('\n'),
                    c => value.push(c),
                },
                '"' => break,
                c => value.push(c),
            }
        }
        labels.push((key, value));
    }
}

fn parse_value(text: &str) -> Option<f64> {
    match text.trim() {
        "+Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}
