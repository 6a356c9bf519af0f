//! Application execution logic.
//!
//! Loads or fetches both result sets, picks a round from each, refreshes
//! probe metadata, compares, and renders the report.

use std::path::PathBuf;

use thiserror::Error;

use ra_dns_check::atlas::{AtlasApi, FetchError, HttpClient, ReqwestClient};
use ra_dns_check::compare::{AlignOptions, CompareError, ExclusionList, SampleSet, compare};
use ra_dns_check::config::{Side, ValidatedConfig};
use ra_dns_check::measurement::{
    DataSource, ResultSet, ResultsError, SelectedRound, WindowError, load_file, parse_results,
    select_round,
};
use ra_dns_check::probes::{FileProbeCache, ProbeMetadataService};
use ra_dns_check::report::{
    Report, ReportMode, SetStatistics, WindowInfo, format_time, render_scrape, render_table,
};
use ra_dns_check::time::{Clock, Sleeper, SystemClock};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// A local result file could not be loaded.
    #[error(transparent)]
    Load(#[from] ResultsError),

    /// A measurement could not be fetched from the API.
    #[error("Failed to fetch measurement {measurement}: {source}")]
    Fetch {
        /// Measurement id
        measurement: u64,
        /// Underlying fetch error
        #[source]
        source: FetchError,
    },

    /// No round qualifies for a requested moment.
    #[error(transparent)]
    Window(#[from] WindowError),

    /// Neither set has a round for its requested moment.
    #[error("{}", join_messages(.0))]
    Windows(Vec<WindowError>),

    /// Exclusion list unreadable, or no probes in common.
    #[error(transparent)]
    Compare(#[from] CompareError),
}

impl RunError {
    /// Maps the error to the process exit code.
    ///
    /// 1 for configuration problems, 3 when a window has no data, 2 otherwise.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Compare(CompareError::ExclusionListRead { .. }) => 1,
            Self::Window(_) | Self::Windows(_) => 3,
            _ => 2,
        }
    }
}

/// Executes one comparison and prints the report to stdout.
///
/// # Errors
///
/// Returns an error if a set cannot be loaded, a window has no data, or
/// the sets cannot be compared.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: &ValidatedConfig) -> Result<(), RunError> {
    let api = AtlasApi::new(ReqwestClient::new(), config.api_url.clone())
        .with_retry_policy(config.retry_policy.clone());

    for line in build_report(config, &api, &SystemClock).await? {
        println!("{line}");
    }
    Ok(())
}

/// Runs the whole pipeline and returns the rendered lines.
pub async fn build_report<H, S, C>(
    config: &ValidatedConfig,
    api: &AtlasApi<H, S>,
    clock: &C,
) -> Result<Vec<String>, RunError>
where
    H: HttpClient,
    S: Sleeper,
    C: Clock + Clone,
{
    let exclusions = match &config.exclusion_list {
        Some(path) => ExclusionList::load(path)?,
        None => ExclusionList::default(),
    };

    let set_a = load_side(&config.plan.a, api, config).await?;
    let set_b = match &config.plan.b {
        Some(side) => Some(load_side(side, api, config).await?),
        None => None,
    };

    let round_a = select_round(&set_a, config.plan.a.target, &config.window, clock);
    let round_b = match (&set_b, &config.plan.b) {
        (Some(set), Some(side)) => Some(select_round(set, side.target, &config.window, clock)),
        _ => None,
    };
    let (round_a, round_b) = match (round_a, round_b.transpose()) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(a), Err(b)) => return Err(RunError::Windows(vec![a, b])),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => return Err(e.into()),
    };

    let samples_a = SampleSet::from_results(&round_a.round.results, &config.pop);
    let samples_b = round_b.map(|r| SampleSet::from_results(&r.round.results, &config.pop));

    let needed: Vec<_> = samples_a
        .probe_ids()
        .chain(samples_b.iter().flat_map(SampleSet::probe_ids))
        .collect();
    let service = ProbeMetadataService::new(
        FileProbeCache::new(&config.probe_cache),
        config.probe_settings.clone(),
        clock.clone(),
    );
    let probes = service.prepare(api, needed).await;

    let options = AlignOptions {
        all_probes: config.all_probes,
        exclusions,
    };
    let rows = compare(
        &samples_a,
        samples_b.as_ref(),
        &options,
        &config.thresholds,
        &probes,
    )?;
    tracing::debug!("Compared {} probe row(s)", rows.len());

    let mut info_a = window_info(&config.plan.a, &set_a, &round_a, samples_a.malformed(), config);
    let mut info_b = match (&config.plan.b, &set_b, &round_b, &samples_b) {
        (Some(side), Some(set), Some(round), Some(samples)) => {
            Some(window_info(side, set, round, samples.malformed(), config))
        }
        _ => None,
    };
    if let Some(b) = info_b.as_mut() {
        disambiguate(&mut info_a, b);
    }

    let report = Report {
        a: &info_a,
        b: info_b.as_ref(),
        rows: &rows,
        latency_threshold_ms: config.thresholds.latency_diff_ms,
    };

    Ok(match config.mode {
        ReportMode::Table => render_table(&report, &config.table),
        ReportMode::Scrape => render_scrape(&report),
    })
}

async fn load_side<H: HttpClient, S: Sleeper>(
    side: &Side,
    api: &AtlasApi<H, S>,
    config: &ValidatedConfig,
) -> Result<ResultSet, RunError> {
    match &side.source {
        DataSource::File(path) => Ok(load_file(path, config.round_interval)?),
        DataSource::Measurement(id) => api
            .fetch_result_set(*id, side.target, config.round_interval)
            .await
            .map_err(|source| RunError::Fetch {
                measurement: *id,
                source,
            }),
    }
}

fn window_info(
    side: &Side,
    set: &ResultSet,
    selected: &SelectedRound<'_>,
    normalize_failures: usize,
    config: &ValidatedConfig,
) -> WindowInfo {
    WindowInfo {
        label: set.label().to_string(),
        source: side.source.to_string(),
        round_start: selected.round.start,
        stale: selected.stale,
        stats: SetStatistics::from_round(
            selected.round,
            set.malformed() + normalize_failures,
            config.thresholds.slow_ms,
        ),
    }
}

/// Suffixes both labels with their round start when they would read the same.
fn disambiguate(a: &mut WindowInfo, b: &mut WindowInfo) {
    if a.label == b.label {
        a.label = format!("{}@{}", a.label, a.round_start);
        b.label = format!("{}@{}", b.label, b.round_start);
    }
}

fn join_messages(errors: &[WindowError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Lists the timestamp of every result in each file, one block per file.
///
/// # Errors
///
/// Returns an error if a file cannot be read or is not a JSON array.
pub fn timestamp_lines(files: &[PathBuf]) -> Result<Vec<String>, RunError> {
    let mut lines = Vec::new();
    for path in files {
        let content = std::fs::read_to_string(path).map_err(|e| ResultsError::FileRead {
            path: path.clone(),
            source: e,
        })?;
        let parsed = parse_results(&content)?;

        lines.push(path.display().to_string());
        lines.extend(parsed.results.iter().map(|r| format_time(r.timestamp)));
    }
    Ok(lines)
}
