//! Removal of trailers and autoplay noise

use tracing::{debug, instrument};
use watchstat_common::ViewingRecord;

/// Options for [`filter_viewing`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    /// Sessions must be watched strictly longer than this
    pub min_watched_seconds: u64,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            min_watched_seconds: 60,
        }
    }
}

impl FilterOptions {
    /// Whether a record survives the filter
    pub fn keeps(&self, record: &ViewingRecord) -> bool {
        record.supplemental_video_type.is_none()
            && record.duration.total_seconds() > self.min_watched_seconds
    }
}

/// Keep regular playback sessions watched longer than the threshold.
///
/// Durations are compared as parsed seconds, so `10:00:00` is longer than
/// `9:59:59`.
#[instrument(skip(records), fields(input = records.len()))]
pub fn filter_viewing(records: &[ViewingRecord], options: &FilterOptions) -> Vec<ViewingRecord> {
    let kept: Vec<ViewingRecord> = records
        .iter()
        .filter(|record| options.keeps(record))
        .cloned()
        .collect();

    debug!(
        kept = kept.len(),
        dropped = records.len() - kept.len(),
        "Filtered viewing records"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchstat_common::{test_utils::fixtures, ClockDuration};

    fn record(duration: ClockDuration, supplemental: Option<&str>) -> ViewingRecord {
        ViewingRecord {
            duration,
            supplemental_video_type: supplemental.map(str::to_string),
            ..fixtures::viewing_record("Alice", "Heat")
        }
    }

    #[test]
    fn test_drops_supplemental_records() {
        let records = vec![
            record(ClockDuration::new(0, 5, 0), Some("TRAILER")),
            record(ClockDuration::new(0, 5, 0), None),
        ];
        let kept = filter_viewing(&records, &FilterOptions::default());
        assert_eq!(kept.len(), 1);
        assert!(kept[0].supplemental_video_type.is_none());
    }

    #[test]
    fn test_threshold_is_strict() {
        let records = vec![
            record(ClockDuration::new(0, 0, 59), None),
            record(ClockDuration::new(0, 1, 0), None),
            record(ClockDuration::new(0, 1, 1), None),
        ];
        let kept = filter_viewing(&records, &FilterOptions::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].duration, ClockDuration::new(0, 1, 1));
    }

    #[test]
    fn test_long_sessions_compare_numerically() {
        let records = vec![record(ClockDuration::new(10, 0, 0), None)];
        let options = FilterOptions {
            min_watched_seconds: ClockDuration::new(9, 59, 59).total_seconds(),
        };
        assert_eq!(filter_viewing(&records, &options).len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_viewing(&[], &FilterOptions::default()).is_empty());
    }
}
