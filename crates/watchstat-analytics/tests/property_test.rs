//! Property tests for the derivation and aggregation stages

use proptest::prelude::*;
use watchstat_analytics::{
    derive_all, filter_viewing, DataAggregator, FilterOptions, HeatmapAggregator,
    TitleClassifier, TitleFrequencyAggregator, WatchTimeAggregator,
};
use watchstat_common::{
    test_utils::{
        fixtures, mock_timestamp,
        property_testing::{clock_duration_strategy, profile_name_strategy, title_strategy},
    },
    ClockDuration, ViewingRecord,
};

fn viewing_strategy() -> impl Strategy<Value = ViewingRecord> {
    (
        profile_name_strategy(),
        title_strategy(),
        clock_duration_strategy(),
        clock_duration_strategy(),
        0u32..28,
        0u32..24,
        proptest::option::weighted(0.2, Just("TRAILER".to_string())),
    )
        .prop_map(|(profile, title, duration, bookmark, day, hour, supplemental)| {
            ViewingRecord {
                start_time: mock_timestamp(2023, 2, day + 1, hour, 0, 0),
                duration,
                bookmark,
                supplemental_video_type: supplemental,
                ..fixtures::viewing_record(&profile, &title)
            }
        })
}

proptest! {
    #[test]
    fn prop_filter_keeps_only_long_regular_sessions(
        records in prop::collection::vec(viewing_strategy(), 0..50),
        threshold in 0u64..600
    ) {
        let options = FilterOptions { min_watched_seconds: threshold };
        let kept = filter_viewing(&records, &options);

        prop_assert!(kept.len() <= records.len());
        for record in &kept {
            prop_assert!(record.supplemental_video_type.is_none());
            prop_assert!(record.duration.total_seconds() > threshold);
        }

        let expected = records.iter().filter(|r| options.keeps(r)).count();
        prop_assert_eq!(kept.len(), expected);
    }

    #[test]
    fn prop_buckets_are_multiples_of_five(
        records in prop::collection::vec(viewing_strategy(), 0..50)
    ) {
        let derived = derive_all(records, &TitleClassifier::default());
        for record in &derived {
            match record.percent_watched_bucketed {
                Some(bucket) => prop_assert_eq!(bucket % 5, 0),
                None => prop_assert_eq!(record.duration_minutes, 0),
            }
        }
    }

    #[test]
    fn prop_watch_time_sums_to_record_hours(
        records in prop::collection::vec(viewing_strategy(), 0..50)
    ) {
        let derived = derive_all(records, &TitleClassifier::default());
        let totals = WatchTimeAggregator.aggregate(&derived).unwrap();

        let expected: f64 = derived.iter().map(|r| r.watched_hours).sum();
        let actual: f64 = totals.iter().map(|t| t.watched_hours).sum();
        prop_assert!((expected - actual).abs() < 1e-6);

        for pair in totals.windows(2) {
            prop_assert!(pair[0].watched_hours <= pair[1].watched_hours);
        }
    }

    #[test]
    fn prop_heatmap_counts_every_record(
        records in prop::collection::vec(viewing_strategy(), 0..50)
    ) {
        let derived = derive_all(records, &TitleClassifier::default());
        let tables = HeatmapAggregator::new().aggregate(&derived).unwrap();
        let total: u32 = tables.iter().map(|t| t.total()).sum();
        prop_assert_eq!(total as usize, derived.len());
    }

    #[test]
    fn prop_title_ranking_is_sorted_and_bounded(
        records in prop::collection::vec(viewing_strategy(), 0..80),
        top_n in 1usize..15,
        threshold in 0u32..120
    ) {
        let derived = derive_all(records, &TitleClassifier::default());
        let ranking = TitleFrequencyAggregator::new(threshold, top_n)
            .aggregate(&derived)
            .unwrap();

        prop_assert!(ranking.len() <= top_n);
        for pair in ranking.windows(2) {
            prop_assert!(pair[0].count >= pair[1].count);
        }

        let eligible = derived.iter().filter(|r| r.watched_at_least(threshold)).count();
        let counted: u32 = ranking.iter().map(|t| t.count).sum();
        prop_assert!(counted as usize <= eligible);
    }

    #[test]
    fn prop_filter_compares_parsed_durations(
        duration in clock_duration_strategy()
    ) {
        let record = ViewingRecord {
            duration,
            ..fixtures::viewing_record("Alice", "Heat")
        };
        let threshold = ClockDuration::new(9, 59, 59).total_seconds();
        let kept = filter_viewing(&[record], &FilterOptions { min_watched_seconds: threshold });
        prop_assert_eq!(kept.len() == 1, duration.total_seconds() > threshold);
    }
}
