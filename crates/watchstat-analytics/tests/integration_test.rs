//! Integration tests for watchstat-analytics

use watchstat_analytics::{AnalysisManager, AnalysisOptions, AnalysisReport, DeviceCategory};
use watchstat_common::{
    test_utils::{assert_approx_eq, create_temp_dir, export_fixtures, init_test_logging},
    ClassifierMode, FilmType,
};
use watchstat_ingest::{load_export, ExportSource};

fn analyze(options: AnalysisOptions) -> AnalysisReport {
    init_test_logging();
    let dir = create_temp_dir();
    export_fixtures::write_export_dir(dir.path());

    let records = load_export(&ExportSource::from_path(dir.path()))
        .and_then(|raw| raw.into_records())
        .expect("fixture export should load");

    AnalysisManager::with_bundled_codes(options)
        .and_then(|manager| manager.run(&records))
        .expect("analysis should succeed")
}

#[test]
fn test_fixture_export_summary_and_billing() {
    let report = analyze(AnalysisOptions::default());

    // Autoplay blip and trailer are dropped
    assert_eq!(report.summary.total_records, 6);
    assert_eq!(report.summary.filtered_records, 4);
    assert_eq!(report.summary.unique_titles, 4);
    assert_eq!(report.summary.unique_devices, 3);
    assert_eq!(report.summary.unique_countries, 3);

    assert_approx_eq(report.billing.total, 31.98, 1e-9);
    assert_eq!(report.billing.currency.as_deref(), Some("USD"));
    assert_eq!(report.ip_sessions, 2);
}

#[test]
fn test_fixture_export_watch_time_and_devices() {
    let report = analyze(AnalysisOptions::default());

    let profiles: Vec<&str> = report.watch_time.iter().map(|w| w.profile.as_str()).collect();
    assert_eq!(profiles, vec!["Alice", "Bob"]);
    assert_approx_eq(report.watch_time[0].watched_hours, 0.75, 1e-9);
    assert_approx_eq(report.watch_time[1].watched_hours, 159.0 / 60.0, 1e-9);

    let devices: Vec<(DeviceCategory, u32)> =
        report.devices.iter().map(|d| (d.category, d.count)).collect();
    assert_eq!(
        devices,
        vec![(DeviceCategory::Tv, 2), (DeviceCategory::Tablet, 2)]
    );
}

#[test]
fn test_fixture_export_countries() {
    let report = analyze(AnalysisOptions::default());

    let rows: Vec<(&str, u32)> = report
        .countries
        .rows
        .iter()
        .map(|r| (r.iso3.as_str(), r.sessions))
        .collect();
    assert_eq!(rows, vec![("SWE", 2), ("USA", 1)]);

    assert_eq!(report.countries.unmatched.len(), 1);
    assert_eq!(report.countries.unmatched[0].code, "XK");
}

#[test]
fn test_fixture_export_rankings() {
    let report = analyze(AnalysisOptions::default());

    let top: Vec<(&str, &str, u32)> = report
        .top_titles
        .iter()
        .map(|t| (t.profile.as_str(), t.title.as_str(), t.count))
        .collect();
    assert_eq!(
        top,
        vec![("Bob", "Dark", 2), ("Alice", "Heat", 1), ("Bob", "Arrival", 1)]
    );

    assert!(report.top_series.iter().all(|t| t.film_type == FilmType::Series));
    assert_eq!(report.top_series.len(), 1);
    assert_eq!(report.top_movies.len(), 2);
}

#[test]
fn test_threshold_applies_to_rankings() {
    // Arrival is 85% watched, Heat 90%, the Dark episodes 95%
    let report = analyze(AnalysisOptions {
        min_percent_watched: 90,
        ..AnalysisOptions::default()
    });
    let titles: Vec<&str> = report.top_titles.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Dark", "Heat"]);
}

#[test]
fn test_fixture_export_heatmaps() {
    let report = analyze(AnalysisOptions::default());
    assert_eq!(report.heatmaps.len(), 2);

    let alice = &report.heatmaps[0];
    assert_eq!(alice.profile, "Alice");
    assert_eq!(alice.counts[20][0], 1);
    assert_eq!(alice.total(), 1);

    let bob = &report.heatmaps[1];
    assert_eq!(bob.counts[22][5], 1);
    assert_eq!(bob.counts[22][6], 1);
    assert_eq!(bob.counts[23][6], 1);
}

#[test]
fn test_heatmap_in_local_time() {
    let report = analyze(AnalysisOptions {
        timezone: Some(chrono_tz::Europe::Stockholm),
        ..AnalysisOptions::default()
    });

    // Sunday 23:40 UTC is Monday 00:40 in Stockholm
    let bob = &report.heatmaps[1];
    assert_eq!(bob.counts[0][0], 1);
    assert_eq!(bob.counts[23][6], 1);
}

#[test]
fn test_legacy_classifier_run() {
    let report = analyze(AnalysisOptions {
        classifier: ClassifierMode::Legacy,
        ..AnalysisOptions::default()
    });
    assert_eq!(report.top_series.len(), 1);
    assert_eq!(report.top_series[0].title, "Dark");
}

#[test]
fn test_report_serializes_without_records() {
    let report = analyze(AnalysisOptions::default());
    assert_eq!(report.records.len(), 4);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("records").is_none());
    assert_eq!(json["countries"]["rows"][0]["iso2"], "SE");
    assert_eq!(json["devices"][0]["category"], "TV");
    assert_eq!(json["top_titles"][0]["film_type"], "Series");
}
