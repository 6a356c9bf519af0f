//! Terminal table rendering.

use chrono::DateTime;
use colored::Colorize;

use super::{Column, ComparisonSummary, Report, SetStatistics, WindowInfo, format_ms};
use crate::compare::DeltaRow;
use crate::time::UnixTime;

/// Table-mode switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// Columns to show, in order.
    pub columns: Vec<Column>,
    /// Use ANSI colors.
    pub color: bool,
    /// Append `*` / `!` marks to aberrant cells.
    pub emphasis: bool,
    /// Skip the header line.
    pub no_header: bool,
    /// Skip per-probe lines, keep the summary.
    pub do_not_list_probes: bool,
    /// Only list probes with a slow response on either side.
    pub slow_only: bool,
    /// Print per-set statistics.
    pub summary_stats: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            columns: Column::ALL.to_vec(),
            color: false,
            emphasis: false,
            no_header: false,
            do_not_list_probes: false,
            slow_only: false,
            summary_stats: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Slow,
    Missing,
    Worse,
    Better,
    Unchanged,
    Changed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    None,
    Star,
    Bang,
}

/// Renders the table report as lines.
#[must_use]
pub fn render_table(report: &Report<'_>, options: &TableOptions) -> Vec<String> {
    let mut lines = Vec::new();
    let label_a = report.a.label.as_str();
    let label_b = report.b.map_or("-", |b| b.label.as_str());

    if !options.do_not_list_probes {
        if !options.no_header {
            let header: Vec<String> = options
                .columns
                .iter()
                .map(|c| pad(*c, &c.header(label_a, label_b), options.emphasis))
                .collect();
            let header = header.join(" ");
            lines.push(header.trim_end().to_string());
            lines.push("-".repeat(header.trim_end().len()));
        }

        for row in report
            .rows
            .iter()
            .filter(|r| !options.slow_only || r.is_slow())
        {
            lines.push(render_row(row, options, report.latency_threshold_ms));
        }
    }

    if options.summary_stats {
        lines.push(String::new());
        lines.extend(set_statistics_lines(report.a));
        if let Some(b) = report.b {
            lines.extend(set_statistics_lines(b));
        }
    }

    lines.push(String::new());
    lines.extend(footer_lines(report));
    lines
}

fn render_row(row: &DeltaRow, options: &TableOptions, latency_threshold_ms: f64) -> String {
    let pop_shown = options.columns.contains(&Column::DnsResponse);
    let cells: Vec<String> = options
        .columns
        .iter()
        .map(|&column| {
            let (tone, mark) = classify(column, row, latency_threshold_ms, pop_shown);
            let text = format!("{}{}", column.value(row), mark_text(mark, options.emphasis));
            let padded = pad(column, &text, options.emphasis);
            if options.color {
                paint(&padded, tone)
            } else {
                padded
            }
        })
        .collect();
    cells.join(" ").trim_end().to_string()
}

/// Without a `dns_response` column a POP change is marked on the probe id.
fn classify(
    column: Column,
    row: &DeltaRow,
    latency_threshold_ms: f64,
    pop_shown: bool,
) -> (Tone, Mark) {
    match column {
        Column::RtA => rt_tone(row.rt_a(), row.slow_a),
        Column::RtB => rt_tone(row.rt_b(), row.slow_b),
        Column::RtDiff => match row.latency_diff {
            None => (Tone::Missing, Mark::None),
            Some(d) if d.abs() >= latency_threshold_ms => (diff_tone(d), Mark::Star),
            Some(d) if d.abs() < f64::EPSILON => (Tone::Unchanged, Mark::None),
            Some(_) => (Tone::Plain, Mark::None),
        },
        Column::DnsResponse if row.pop_changed => (Tone::Changed, Mark::Bang),
        Column::ProbeId if row.pop_changed && !pop_shown => (Tone::Changed, Mark::Bang),
        _ => (Tone::Plain, Mark::None),
    }
}

// negative: B is slower than A
fn diff_tone(diff: f64) -> Tone {
    if diff.abs() < f64::EPSILON {
        Tone::Unchanged
    } else if diff < 0.0 {
        Tone::Worse
    } else {
        Tone::Better
    }
}

fn rt_tone(rt: Option<f64>, slow: bool) -> (Tone, Mark) {
    match rt {
        None => (Tone::Missing, Mark::None),
        Some(_) if slow => (Tone::Slow, Mark::Star),
        Some(_) => (Tone::Plain, Mark::None),
    }
}

fn mark_text(mark: Mark, emphasis: bool) -> &'static str {
    match (emphasis, mark) {
        (false, _) => "",
        (true, Mark::None) => " ",
        (true, Mark::Star) => "*",
        (true, Mark::Bang) => "!",
    }
}

/// Pads a cell to its column width: numbers right-aligned, text left.
fn pad(column: Column, text: &str, emphasis: bool) -> String {
    let width = column.width() + usize::from(emphasis && column.is_numeric());
    if column.is_numeric() || column == Column::ProbeId || column == Column::Asn {
        format!("{text:>width$}")
    } else {
        format!("{text:<width$}")
    }
}

fn paint(text: &str, tone: Tone) -> String {
    match tone {
        Tone::Plain => text.to_string(),
        Tone::Slow => text.yellow().to_string(),
        Tone::Missing | Tone::Unchanged => text.magenta().to_string(),
        Tone::Worse | Tone::Changed => text.red().bold().to_string(),
        Tone::Better => text.green().bold().to_string(),
    }
}

fn footer_lines(report: &Report<'_>) -> Vec<String> {
    let summary = ComparisonSummary::from_rows(report.rows);
    let mut lines = Vec::new();

    match report.b {
        Some(b) => {
            lines.push(format!(
                "Compared {} ({}) with {} ({})",
                report.a.source,
                format_time(report.a.round_start),
                b.source,
                format_time(b.round_start)
            ));
            lines.push(format!(
                "Probes in both sets: {}, only in {}: {}, only in {}: {}",
                summary.both, report.a.label, summary.only_a, b.label, summary.only_b
            ));
            lines.push(format!(
                "Significant changes: {} (|diff| >= {:.2} ms or POP change; {} POP change(s))",
                summary.significant, report.latency_threshold_ms, summary.pop_changed
            ));
            lines.push(format!(
                "Latency diff ({} - {}) over {} probe(s): mean {} ms, median {} ms",
                report.a.label,
                b.label,
                summary.diffs,
                format_ms(summary.mean_diff),
                format_ms(summary.median_diff)
            ));
        }
        None => {
            lines.push(format!(
                "Snapshot of {} ({}): {} probe(s)",
                report.a.source,
                format_time(report.a.round_start),
                report.rows.len()
            ));
        }
    }

    for window in std::iter::once(report.a).chain(report.b) {
        if window.stale {
            lines.push(format!(
                "Note: data for {} is stale (round started {})",
                window.label,
                format_time(window.round_start)
            ));
        }
    }
    lines
}

fn set_statistics_lines(window: &WindowInfo) -> Vec<String> {
    let SetStatistics {
        total,
        errors,
        malformed,
        slow,
        earliest,
        latest,
        rt_min,
        rt_mean,
        rt_max,
        rt_stddev,
    } = &window.stats;

    vec![
        format!("Statistics for {} ({}):", window.label, window.source),
        format!(
            "  responses: {total}, errors: {errors}, malformed: {malformed}, slow: {slow}"
        ),
        format!(
            "  created between {} and {}",
            earliest.map_or_else(|| super::PLACEHOLDER.to_string(), format_time),
            latest.map_or_else(|| super::PLACEHOLDER.to_string(), format_time)
        ),
        format!(
            "  rt (ms): min {}, avg {}, max {}, stddev {}",
            format_ms(*rt_min),
            format_ms(*rt_mean),
            format_ms(*rt_max),
            format_ms(*rt_stddev)
        ),
    ]
}

/// Formats Unix seconds as `YYYY-MM-DD HH:MM:SS UTC`.
#[must_use]
pub fn format_time(t: UnixTime) -> String {
    DateTime::from_timestamp(t, 0).map_or_else(
        || t.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}
