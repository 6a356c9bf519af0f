//! Tests for validated configuration.

use std::path::PathBuf;
use std::time::Duration;

use super::ConfigError;
use super::cli::Cli;
use super::defaults;
use super::toml::TomlConfig;
use super::validated::{ColorMode, ValidatedConfig, write_default_config};
use crate::measurement::DataSource;
use crate::report::{Column, ReportMode};

/// 2025-01-01 00:00:00 UTC
const NOW: i64 = 1_735_689_600;

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["ra-dns-check"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

fn validate(args: &[&str], toml: Option<&TomlConfig>) -> Result<ValidatedConfig, ConfigError> {
    ValidatedConfig::from_raw(&cli(args), toml, NOW)
}

mod plan {
    use super::*;

    #[test]
    fn single_source_without_datetimes_is_snapshot() {
        let config = validate(&["1001"], None).unwrap();

        assert_eq!(config.plan.a.source, DataSource::Measurement(1001));
        assert_eq!(config.plan.a.target, None);
        assert!(config.plan.b.is_none());
    }

    #[test]
    fn single_source_with_one_datetime_is_snapshot_at_that_moment() {
        let config = validate(&["1001", "--dt2", "1706702400"], None).unwrap();

        assert_eq!(config.plan.a.target, Some(1_706_702_400));
        assert!(config.plan.b.is_none());
    }

    #[test]
    fn single_source_with_two_datetimes_compares_itself() {
        let config = validate(
            &["1001", "--dt1", "2024-01-31_1200", "--dt2", "2024-01-31_1300"],
            None,
        )
        .unwrap();

        let b = config.plan.b.unwrap();
        assert_eq!(config.plan.a.source, b.source);
        assert_eq!(config.plan.a.target, Some(1_706_702_400));
        assert_eq!(b.target, Some(1_706_706_000));
    }

    #[test]
    fn two_sources_pair_with_their_datetimes() {
        let config = validate(&["1001", "1002", "--dt2", "1706702400"], None).unwrap();

        let b = config.plan.b.unwrap();
        assert_eq!(config.plan.a.source, DataSource::Measurement(1001));
        assert_eq!(config.plan.a.target, None);
        assert_eq!(b.source, DataSource::Measurement(1002));
        assert_eq!(b.target, Some(1_706_702_400));
    }

    #[test]
    fn local_file_is_a_file_source() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        let config = validate(&[path], None).unwrap();
        assert_eq!(
            config.plan.a.source,
            DataSource::File(file.path().to_path_buf())
        );
    }

    #[test]
    fn no_source_is_an_error() {
        assert!(matches!(
            validate(&[], None),
            Err(ConfigError::MissingSource { .. })
        ));
    }

    #[test]
    fn three_sources_is_an_error() {
        assert!(matches!(
            validate(&["1", "2", "3"], None),
            Err(ConfigError::TooManySources { count: 3 })
        ));
    }

    #[test]
    fn unknown_source_is_an_error() {
        let err = validate(&["no-such-file.json"], None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSource { ref value } if value == "no-such-file.json"));
    }

    #[test]
    fn future_datetime_is_an_error() {
        assert!(matches!(
            validate(&["1001", "--dt1", "2030-01-01_0000"], None),
            Err(ConfigError::InvalidDatetime {
                field: "datetime1",
                ..
            })
        ));
    }

    #[test]
    fn oldest_result_datetime_moves_the_floor() {
        let toml = toml("[selection]\noldest_result_datetime = \"2024-06-01_0000\"");

        assert!(validate(&["1001", "--dt1", "2024-01-31_1200"], Some(&toml)).is_err());
        assert!(validate(&["1001", "--dt1", "2024-07-01_1200"], Some(&toml)).is_ok());
    }
}

mod report {
    use super::*;

    #[test]
    fn defaults() {
        let config = validate(&["1001"], None).unwrap();

        assert_eq!(config.mode, ReportMode::Table);
        assert_eq!(config.table.columns, Column::ALL.to_vec());
        assert_eq!(config.color, ColorMode::Auto);
        assert!(config.table.color);
        assert!(!config.table.emphasis);
        assert!(!config.table.summary_stats);
    }

    #[test]
    fn cli_columns_replace_toml_columns() {
        let toml = toml("[report]\ncolumns = [\"asn\", \"country_code\"]");

        let from_toml = validate(&["1001"], Some(&toml)).unwrap();
        assert_eq!(from_toml.table.columns, vec![Column::Asn, Column::CountryCode]);

        let from_cli = validate(&["1001", "--columns", "rt_delta,probe_id"], Some(&toml)).unwrap();
        assert_eq!(from_cli.table.columns, vec![Column::RtDiff, Column::ProbeId]);
    }

    #[test]
    fn unknown_column_is_fatal() {
        let err = validate(&["1001", "--columns", "probe_id,latency"], None).unwrap_err();
        assert!(matches!(err, ConfigError::Column(_)));
        assert!(err.to_string().contains("latency"));
    }

    #[test]
    fn boolean_flags_use_or() {
        let toml = toml("[report]\nno_header = true\n\n[selection]\nall_probes = true");
        let config = validate(&["1001", "-e"], Some(&toml)).unwrap();

        assert!(config.table.no_header);
        assert!(config.table.emphasis);
        assert!(config.all_probes);
        assert!(!config.table.slow_only);
    }

    #[test]
    fn scrape_flag_or_toml_mode() {
        assert_eq!(
            validate(&["1001", "--scrape"], None).unwrap().mode,
            ReportMode::Scrape
        );
        let toml = toml("[report]\nmode = \"scrape\"");
        assert_eq!(
            validate(&["1001"], Some(&toml)).unwrap().mode,
            ReportMode::Scrape
        );
    }

    #[test]
    fn color_resolution() {
        let off = toml("[report]\ncolor = false");

        assert_eq!(validate(&["1001"], Some(&off)).unwrap().color, ColorMode::Never);
        assert_eq!(validate(&["1001", "-c"], Some(&off)).unwrap().color, ColorMode::Always);
        assert_eq!(validate(&["1001", "-c", "-C"], None).unwrap().color, ColorMode::Never);
        assert!(!validate(&["1001", "-C"], None).unwrap().table.color);
    }
}

mod thresholds {
    use super::*;

    #[test]
    fn defaults() {
        let config = validate(&["1001"], None).unwrap();

        assert!((config.thresholds.latency_diff_ms - 5.0).abs() < f64::EPSILON);
        assert!((config.thresholds.slow_ms - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.pop.delimiter, '.');
        assert_eq!(config.pop.index, 1);
    }

    #[test]
    fn cli_beats_toml_beats_default() {
        let toml = toml("[thresholds]\nlatency_diff = 10.0\nslow = 80.0");
        let config = validate(&["1001", "-l", "3"], Some(&toml)).unwrap();

        assert!((config.thresholds.latency_diff_ms - 3.0).abs() < f64::EPSILON);
        assert!((config.thresholds.slow_ms - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let toml = toml("[thresholds]\nslow = -1.0");
        assert!(matches!(
            validate(&["1001"], Some(&toml)),
            Err(ConfigError::InvalidThreshold { field: "slow", .. })
        ));
    }

    #[test]
    fn split_char_must_be_one_char() {
        assert!(matches!(
            validate(&["1001", "-t", "::"], None),
            Err(ConfigError::InvalidSplitChar(_))
        ));

        let toml = toml("[response]\nsplit_char = \"-\"\nitem_occurrence = 2");
        let config = validate(&["1001"], Some(&toml)).unwrap();
        assert_eq!(config.pop.delimiter, '-');
        assert_eq!(config.pop.index, 2);
    }
}

mod selection {
    use super::*;

    #[test]
    fn window_defaults() {
        let config = validate(&["1001"], None).unwrap();

        assert_eq!(config.window.floor, defaults::OLDEST_RESULT_UNIX);
        assert_eq!(config.window.staleness, Duration::from_secs(600));
        assert_eq!(config.round_interval, Duration::from_secs(300));
        assert!(config.exclusion_list.is_none());
    }

    #[test]
    fn staleness_and_interval_overrides() {
        let toml = toml("[thresholds]\nscrape_staleness_seconds = 60\n\n[selection]\nround_interval = 240");
        let config = validate(&["1001", "--scrape-staleness", "900"], Some(&toml)).unwrap();

        assert_eq!(config.window.staleness, Duration::from_secs(900));
        assert_eq!(config.round_interval, Duration::from_secs(240));
    }

    #[test]
    fn zero_round_interval_is_rejected() {
        assert!(matches!(
            validate(&["1001", "--round-interval", "0"], None),
            Err(ConfigError::InvalidDuration {
                field: "round_interval",
                ..
            })
        ));
    }

    #[test]
    fn exclusion_list_tilde_is_expanded() {
        let toml = toml("[selection]\nexclusion_list_file = \"~/skip.txt\"");
        let config = validate(&["1001"], Some(&toml)).unwrap();

        let path = config.exclusion_list.unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("skip.txt"));
        }
    }

    #[test]
    fn cli_exclusion_list_wins() {
        let toml = toml("[selection]\nexclusion_list_file = \"/etc/skip.txt\"");
        let config = validate(&["1001", "-x", "mine.txt"], Some(&toml)).unwrap();

        assert_eq!(config.exclusion_list, Some(PathBuf::from("mine.txt")));
    }
}

mod probes {
    use super::*;

    #[test]
    fn defaults() {
        let config = validate(&["1001"], None).unwrap();

        assert!(config.probe_settings.fetch_missing);
        assert_eq!(config.probe_settings.max_age, Duration::from_secs(86_400));
        assert_eq!(
            config.probe_settings.feed_url.as_str(),
            crate::probes::DEFAULT_FEED_URL
        );
        assert_eq!(config.api_url.as_str(), crate::atlas::DEFAULT_API_URL);
        assert!(
            config
                .probe_cache
                .ends_with(defaults::PROBE_CACHE_FILE_NAME)
        );
    }

    #[test]
    fn toml_overrides() {
        let toml = toml(
            r#"
            [probes]
            cache_file = "/var/cache/probes.json"
            max_age = 60
            fetch_missing = false
            feed_url = "https://mirror.example.net/meta-latest"
        "#,
        );
        let config = validate(&["1001"], Some(&toml)).unwrap();

        assert_eq!(config.probe_cache, PathBuf::from("/var/cache/probes.json"));
        assert_eq!(config.probe_settings.max_age, Duration::from_secs(60));
        assert!(!config.probe_settings.fetch_missing);
        assert_eq!(
            config.probe_settings.feed_url.host_str(),
            Some("mirror.example.net")
        );
    }

    #[test]
    fn cli_probe_cache_wins() {
        let toml = toml("[probes]\ncache_file = \"/var/cache/probes.json\"");
        let config = validate(&["1001", "--probe-cache", "here.json"], Some(&toml)).unwrap();

        assert_eq!(config.probe_cache, PathBuf::from("here.json"));
    }

    #[test]
    fn invalid_feed_url_is_rejected() {
        let toml = toml("[probes]\nfeed_url = \"not a url\"");
        assert!(matches!(
            validate(&["1001"], Some(&toml)),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}

mod retry {
    use super::*;

    #[test]
    fn defaults() {
        let config = validate(&["1001"], None).unwrap();

        assert_eq!(config.retry_policy.max_attempts, 3);
        assert_eq!(config.retry_policy.initial_delay, Duration::from_secs(2));
        assert_eq!(config.retry_policy.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn toml_values() {
        let toml = toml("[atlas.retry]\nmax_attempts = 5\ninitial_delay = 1\nmax_delay = 8\nmultiplier = 3.0");
        let config = validate(&["1001"], Some(&toml)).unwrap();

        assert_eq!(config.retry_policy.max_attempts, 5);
        assert_eq!(config.retry_policy.initial_delay, Duration::from_secs(1));
        assert_eq!(config.retry_policy.max_delay, Duration::from_secs(8));
        assert!((config.retry_policy.multiplier - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for content in [
            "[atlas.retry]\nmax_attempts = 0",
            "[atlas.retry]\ninitial_delay = 0",
            "[atlas.retry]\nmultiplier = 0.0",
            "[atlas.retry]\ninitial_delay = 10\nmax_delay = 5",
        ] {
            assert!(
                matches!(
                    validate(&["1001"], Some(&toml(content))),
                    Err(ConfigError::InvalidRetry(_))
                ),
                "{content}"
            );
        }
    }
}

mod output {
    use super::*;

    #[test]
    fn display_summarizes_config() {
        let config = validate(&["1001", "1002", "--columns", "probe_id,rt_diff"], None).unwrap();
        let text = config.to_string();

        assert!(text.contains("a: 1001@latest"));
        assert!(text.contains("b: 1002@latest"));
        assert!(text.contains("columns: [probe_id,rt_diff]"));
        assert!(text.contains("latency_diff: 5ms"));
    }

    #[test]
    fn write_default_config_creates_parsable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ra-dns-check.toml");

        write_default_config(&path).unwrap();

        let loaded = TomlConfig::load(&path).unwrap();
        assert!(loaded.report.columns.is_none());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let cli = cli(&["--config", path.to_str().unwrap(), "1001"]);

        assert!(matches!(
            ValidatedConfig::load(&cli, NOW),
            Err(ConfigError::FileRead { .. })
        ));
    }
}
