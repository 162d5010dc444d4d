//! Headline counts

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use watchstat_common::DerivedRecord;

/// Headline metrics over the filtered records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Distinct titles as exported
    pub unique_titles: usize,
    /// Distinct device descriptions
    pub unique_devices: usize,
    /// Distinct country strings
    pub unique_countries: usize,
    /// Viewing rows before filtering
    pub total_records: usize,
    /// Viewing rows after filtering
    pub filtered_records: usize,
}

/// Count distinct values over the filtered records
pub fn summarize(total_records: usize, records: &[DerivedRecord]) -> SummaryStats {
    SummaryStats {
        unique_titles: distinct(records, |r| r.record.title.as_str()),
        unique_devices: distinct(records, |r| r.record.device_type.as_str()),
        unique_countries: distinct(records, |r| r.record.country.as_str()),
        total_records,
        filtered_records: records.len(),
    }
}

fn distinct<'a, F>(records: &'a [DerivedRecord], field: F) -> usize
where
    F: Fn(&'a DerivedRecord) -> &'a str,
{
    records.iter().map(field).collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchstat_common::{test_utils::fixtures, FilmType};

    #[test]
    fn test_distinct_counts() {
        let mut ipad = fixtures::derived_record("Bob", "Heat", FilmType::Movie, Some(100));
        ipad.record.device_type = "Apple iPad".to_string();
        ipad.record.country = "SE (Sweden)".to_string();

        let records = vec![
            fixtures::derived_record("Alice", "Heat", FilmType::Movie, Some(100)),
            fixtures::derived_record("Alice", "Arrival", FilmType::Movie, Some(50)),
            ipad,
        ];

        let stats = summarize(5, &records);
        assert_eq!(stats.unique_titles, 2);
        assert_eq!(stats.unique_devices, 2);
        assert_eq!(stats.unique_countries, 2);
        assert_eq!(stats.total_records, 5);
        assert_eq!(stats.filtered_records, 3);
    }

    #[test]
    fn test_empty() {
        assert_eq!(summarize(0, &[]), SummaryStats::default());
    }
}
