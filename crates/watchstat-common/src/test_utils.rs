//! Test utilities and shared test helpers for watchstat.
//!
//! Fixtures here are used by unit tests in this crate and, through the
//! `testing` feature, by the integration tests of the other workspace crates.

use std::{path::Path, sync::Once};

use chrono::{NaiveDate, NaiveDateTime};
use tracing_subscriber::{fmt, EnvFilter};

use crate::{ClockDuration, DerivedRecord, FilmType, ViewingRecord};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Test fixture for a naive timestamp.
pub fn mock_timestamp(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, min, sec))
        .expect("valid fixture timestamp")
}

/// Create a temporary directory for tests that automatically cleans up.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Record-level fixtures.
pub mod fixtures {
    use super::*;

    /// A regular 45 minute session on a TV in the US.
    pub fn viewing_record(profile: &str, title: &str) -> ViewingRecord {
        ViewingRecord {
            profile_name: profile.to_string(),
            title: title.to_string(),
            start_time: mock_timestamp(2023, 1, 2, 20, 0, 0),
            duration: ClockDuration::new(0, 45, 0),
            bookmark: ClockDuration::new(0, 50, 0),
            device_type: "Samsung Smart TV".to_string(),
            country: "US (United States)".to_string(),
            supplemental_video_type: None,
        }
    }

    /// A session with explicit start time and durations.
    pub fn viewing_record_at(
        profile: &str,
        title: &str,
        start_time: NaiveDateTime,
        duration: &str,
        bookmark: &str,
    ) -> ViewingRecord {
        ViewingRecord {
            start_time,
            duration: duration.parse().expect("valid fixture duration"),
            bookmark: bookmark.parse().expect("valid fixture bookmark"),
            ..viewing_record(profile, title)
        }
    }

    /// A derived record built directly, bypassing the pipeline.
    pub fn derived_record(
        profile: &str,
        title: &str,
        film_type: FilmType,
        percent_watched_bucketed: Option<u32>,
    ) -> DerivedRecord {
        let record = viewing_record(profile, title);
        let show_title = title.split(':').next().unwrap_or(title).trim().to_string();
        DerivedRecord {
            watched_minutes: 45,
            duration_minutes: 50,
            watched_hours: 0.75,
            percent_watched: percent_watched_bucketed.map(f64::from),
            percent_watched_bucketed,
            show_title,
            film_type,
            record,
        }
    }
}

/// Export file fixtures in the layout of a real data export.
pub mod export_fixtures {
    use super::*;

    /// Viewing activity with a trailer, an autoplay blip, two series
    /// episodes and two movies.
    pub const VIEWING_ACTIVITY_CSV: &str = "\
Profile Name,Start Time,Duration,Attributes,Title,Supplemental Video Type,Device Type,Bookmark,Latest Bookmark,Country
Alice,2023-01-02 20:00:00,00:45:00,,Heat,,Samsung Smart TV,00:50:00,00:50:00,US (United States)
Alice,2023-01-02 21:00:00,00:00:40,Autoplayed,Heat,,Samsung Smart TV,00:00:40,00:00:40,US (United States)
Alice,2023-01-03 08:30:00,00:02:00,,Heat,TRAILER,Apple iPhone 12,00:02:00,00:02:00,US (United States)
Bob,2023-01-07 22:15:00,00:30:00,,\"Dark: Season 1: Secrets (Episode 1)\",,Chromecast,00:31:00,00:31:00,SE (Sweden)
Bob,2023-01-08 22:50:00,00:29:00,,\"Dark: Season 1: Lies (Episode 2)\",,Apple iPad,00:30:00,00:30:00,SE (Sweden)
Bob,2023-01-08 23:40:00,01:40:00,,Arrival,,Apple iPad,01:56:00,01:56:00,XK (Kosovo)
";

    /// Billing history with one declined payment.
    pub const BILLING_HISTORY_CSV: &str = "\
Profile Name,Transaction Date,Pmt Status,Final Invoice Result,Gross Sale Amt,Currency
Alice,2023-01-01,APPROVED,SETTLED,15.99,USD
Alice,2023-02-01,DECLINED,FAILED,15.99,USD
Alice,2023-03-01,APPROVED,SETTLED,15.99,USD
";

    /// IP address log.
    pub const IP_ADDRESSES_CSV: &str = "\
Esn,Country,Localized Device Description,Device Description,Ip Address,Region Code Display Name,Ts
X1,US (United States),Samsung TV,Samsung Smart TV,203.0.113.10,California,2023-01-02 20:00:00
X2,SE (Sweden),iPad,Apple iPad,198.51.100.7,Stockholm,2023-01-08 22:50:00
";

    /// Write the three export files into `dir` using the flat layout.
    pub fn write_export_dir(dir: &Path) {
        std::fs::write(dir.join("ViewingActivity.csv"), VIEWING_ACTIVITY_CSV)
            .expect("write viewing fixture");
        std::fs::write(dir.join("BillingHistory.csv"), BILLING_HISTORY_CSV)
            .expect("write billing fixture");
        std::fs::write(dir.join("IpAddressesStreaming.csv"), IP_ADDRESSES_CSV)
            .expect("write ip fixture");
    }
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// Create a minimal valid test configuration as YAML string.
    pub fn minimal_config_yaml() -> &'static str {
        r#"
export:
  path: "Files"
"#
    }

    /// Create a full test configuration as YAML string.
    pub fn full_config_yaml() -> &'static str {
        concat!(
            "export:\n",
            "  path: \"exports/netflix-report.zip\"\n",
            "  output_dir: \"report\"\n",
            "\n",
            "analysis:\n",
            "  min_watched_seconds: 90\n",
            "  min_percent_watched: 85\n",
            "  top_n: 5\n",
            "  classifier: legacy\n",
            "  timezone: \"Europe/Stockholm\"\n",
            "\n",
            "catalog:\n",
            "  api_key: \"test_api_key\"\n",
            "  base_url: \"https://api.themoviedb.org/3\"\n",
            "  language: \"en-US\"\n",
            "  timeout_seconds: 10\n",
            "  max_concurrent_lookups: 4\n",
            "  genre_overrides:\n",
            "    10770: \"TV-Film\"\n",
            "\n",
            "charts:\n",
            "  enabled: true\n",
            "  width: 1024\n",
            "  height: 768\n",
            "  colors:\n",
            "    low: \"#000000\"\n",
            "    high: \"#e50914\"\n",
            "    background: \"#ffffff\"\n",
            "\n",
            "logging:\n",
            "  level: \"debug\"\n",
            "  format: compact\n"
        )
    }
}

/// Property-based testing utilities using proptest.
pub mod property_testing {
    use crate::ClockDuration;
    use proptest::prelude::*;

    /// Strategy for `HH:MM:SS` durations, including multi-digit hours.
    pub fn clock_duration_strategy() -> impl Strategy<Value = ClockDuration> {
        (0u32..=120, 0u32..60, 0u32..60).prop_map(|(h, m, s)| ClockDuration::new(h, m, s))
    }

    /// Strategy for profile names.
    pub fn profile_name_strategy() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["Alice", "Bob", "Kids", "Guest"]).prop_map(str::to_string)
    }

    /// Strategy for titles, with and without a show qualifier.
    pub fn title_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            r"[A-Z][a-z]{2,10}",
            r"[A-Z][a-z]{2,10}: Season [1-9]: [A-Z][a-z]{2,8} \(Episode [1-9]\)",
        ]
    }
}
