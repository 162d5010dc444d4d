//! Watched-time and completion fields

use tracing::{debug, instrument};
use watchstat_common::{bucket_percent, percent_of, DerivedRecord, ViewingRecord};

use crate::{classifier::show_title, TitleClassifier};

/// Derive minutes, hours, completion and title fields for one record
pub fn derive_record(record: ViewingRecord, classifier: &TitleClassifier) -> DerivedRecord {
    let watched_minutes = record.duration.whole_minutes();
    let duration_minutes = record.bookmark.whole_minutes();
    let percent_watched = percent_of(watched_minutes, duration_minutes);

    DerivedRecord {
        watched_minutes,
        duration_minutes,
        watched_hours: f64::from(watched_minutes) / 60.0,
        percent_watched,
        percent_watched_bucketed: percent_watched.map(bucket_percent),
        show_title: show_title(&record.title).to_string(),
        film_type: classifier.classify(&record.title),
        record,
    }
}

/// Derive every record
#[instrument(skip(records, classifier), fields(records = records.len()))]
pub fn derive_all(records: Vec<ViewingRecord>, classifier: &TitleClassifier) -> Vec<DerivedRecord> {
    let derived: Vec<DerivedRecord> = records
        .into_iter()
        .map(|record| derive_record(record, classifier))
        .collect();

    let zero_duration = derived
        .iter()
        .filter(|r| r.percent_watched.is_none())
        .count();
    if zero_duration > 0 {
        debug!(zero_duration, "Records without a bookmark length have no completion");
    }
    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchstat_common::{test_utils::fixtures, FilmType};

    fn record(duration: &str, bookmark: &str) -> ViewingRecord {
        fixtures::viewing_record_at(
            "Alice",
            "Heat",
            watchstat_common::test_utils::mock_timestamp(2023, 1, 2, 20, 0, 0),
            duration,
            bookmark,
        )
    }

    #[test]
    fn test_short_session_scenario() {
        let derived = derive_record(record("00:01:30", "00:01:45"), &TitleClassifier::default());

        assert_eq!(derived.watched_minutes, 1);
        assert_eq!(derived.duration_minutes, 1);
        assert_eq!(derived.percent_watched, Some(100.0));
        assert_eq!(derived.percent_watched_bucketed, Some(100));
    }

    #[test]
    fn test_zero_duration_has_no_percent() {
        let derived = derive_record(record("00:05:00", "00:00:30"), &TitleClassifier::default());

        assert_eq!(derived.duration_minutes, 0);
        assert_eq!(derived.percent_watched, None);
        assert_eq!(derived.percent_watched_bucketed, None);
        assert_eq!(derived.watched_hours, 5.0 / 60.0);
    }

    #[test]
    fn test_hours_and_buckets() {
        let derived = derive_record(record("01:30:00", "02:00:00"), &TitleClassifier::default());
        assert_eq!(derived.watched_hours, 1.5);
        assert_eq!(derived.percent_watched, Some(75.0));
        assert_eq!(derived.percent_watched_bucketed, Some(75));

        // Replays can push completion past 100
        let replay = derive_record(record("01:00:00", "00:30:00"), &TitleClassifier::default());
        assert_eq!(replay.percent_watched_bucketed, Some(200));
    }

    #[test]
    fn test_title_fields() {
        let mut series = record("00:40:00", "00:45:00");
        series.title = "Dark: Season 1: Secrets (Episode 1)".to_string();
        let derived = derive_record(series, &TitleClassifier::default());

        assert_eq!(derived.show_title, "Dark");
        assert_eq!(derived.film_type, FilmType::Series);
        assert_eq!(derived.title_key(), "Dark");
    }

    #[test]
    fn test_derive_all_preserves_order() {
        let records = vec![record("00:10:00", "00:20:00"), record("00:20:00", "00:20:00")];
        let derived = derive_all(records, &TitleClassifier::default());
        assert_eq!(derived.len(), 2);
        assert_eq!(derived[0].percent_watched_bucketed, Some(50));
        assert_eq!(derived[1].percent_watched_bucketed, Some(100));
    }
}
