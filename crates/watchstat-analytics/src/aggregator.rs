//! Aggregation of derived viewing records into chart-ready tables

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};

use chrono::{Datelike, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use watchstat_common::{DerivedRecord, FilmType, Result};
use watchstat_ingest::CountryCodes;

/// Trait for folding derived records into one output table
pub trait DataAggregator {
    /// The produced table
    type Output;

    /// Aggregate the records
    fn aggregate(&self, records: &[DerivedRecord]) -> Result<Self::Output>;
}

/// Total watched hours of one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileWatchTime {
    /// Profile name
    pub profile: String,
    /// Sum of watched hours
    pub watched_hours: f64,
}

/// Sessions from one resolved country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySessionRow {
    /// Alpha-2 code
    pub iso2: String,
    /// Alpha-3 code
    pub iso3: String,
    /// Country name
    pub country: String,
    /// Distinct session start times
    pub sessions: u32,
}

/// A country prefix missing from the reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedCountry {
    /// Two-character prefix as exported
    pub code: String,
    /// Distinct session start times
    pub sessions: u32,
}

/// Sessions per country
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySessions {
    /// Resolved countries, most sessions first
    pub rows: Vec<CountrySessionRow>,
    /// Prefixes that did not resolve, most sessions first
    pub unmatched: Vec<UnmatchedCountry>,
}

/// Sessions per hour of day and weekday for one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapTable {
    /// Profile name
    pub profile: String,
    /// `counts[hour][weekday]`, weekday 0 is Monday
    pub counts: [[u32; 7]; 24],
}

impl HeatmapTable {
    /// Weekday column labels in order
    pub const WEEKDAYS: [&'static str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];

    fn empty(profile: &str) -> Self {
        Self {
            profile: profile.to_string(),
            counts: [[0; 7]; 24],
        }
    }

    /// Sum of all cells
    pub fn total(&self) -> u32 {
        self.counts.iter().flatten().sum()
    }

    /// Largest cell value
    pub fn max(&self) -> u32 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Device categories recognized in device descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceCategory {
    /// Personal computer
    #[serde(rename = "PC")]
    Pc,
    /// Mobile phone
    Phone,
    /// Tablet
    Tablet,
    /// Television or streaming stick
    #[serde(rename = "TV")]
    Tv,
    /// VR headset
    #[serde(rename = "VR")]
    Vr,
}

impl DeviceCategory {
    /// Map one lower-cased device token to its category
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "tv" | "chromecast" => Some(Self::Tv),
            "ipad" | "tablet" => Some(Self::Tablet),
            "pc" | "mac" => Some(Self::Pc),
            "iphone" | "phone" => Some(Self::Phone),
            "vr" => Some(Self::Vr),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pc => "PC",
            Self::Phone => "Phone",
            Self::Tablet => "Tablet",
            Self::Tv => "TV",
            Self::Vr => "VR",
        };
        f.write_str(label)
    }
}

/// Occurrences of one device category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCount {
    /// Category
    pub category: DeviceCategory,
    /// Matching tokens across all records
    pub count: u32,
}

/// How often a profile watched a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleCount {
    /// Profile name
    pub profile: String,
    /// Movie title or show title
    pub title: String,
    /// Movie or series
    pub film_type: FilmType,
    /// Substantially watched sessions
    pub count: u32,
}

/// Aggregator for watched hours per profile
#[derive(Debug, Default)]
pub struct WatchTimeAggregator;

impl DataAggregator for WatchTimeAggregator {
    type Output = Vec<ProfileWatchTime>;

    #[instrument(skip(self, records))]
    fn aggregate(&self, records: &[DerivedRecord]) -> Result<Self::Output> {
        let mut hours: HashMap<&str, f64> = HashMap::new();
        for record in records {
            *hours.entry(record.record.profile_name.as_str()).or_insert(0.0) += record.watched_hours;
        }

        let mut result: Vec<ProfileWatchTime> = hours
            .into_iter()
            .map(|(profile, watched_hours)| ProfileWatchTime {
                profile: profile.to_string(),
                watched_hours,
            })
            .collect();

        // Ascending by hours, ties by name
        result.sort_by(|a, b| {
            a.watched_hours
                .total_cmp(&b.watched_hours)
                .then_with(|| a.profile.cmp(&b.profile))
        });

        debug!("Aggregated watch time for {} profiles", result.len());
        Ok(result)
    }
}

/// Aggregator for distinct sessions per country
#[derive(Debug)]
pub struct CountrySessionsAggregator<'a> {
    codes: &'a CountryCodes,
}

impl<'a> CountrySessionsAggregator<'a> {
    /// Resolve countries against `codes`
    pub fn new(codes: &'a CountryCodes) -> Self {
        Self { codes }
    }
}

impl DataAggregator for CountrySessionsAggregator<'_> {
    type Output = CountrySessions;

    #[instrument(skip(self, records))]
    fn aggregate(&self, records: &[DerivedRecord]) -> Result<Self::Output> {
        let mut starts: HashMap<&str, HashSet<NaiveDateTime>> = HashMap::new();
        for record in records {
            starts
                .entry(record.record.country_code())
                .or_default()
                .insert(record.record.start_time);
        }

        let mut sessions = CountrySessions::default();
        for (code, times) in starts {
            let count = times.len() as u32;
            match self.codes.lookup(code) {
                Some(entry) => sessions.rows.push(CountrySessionRow {
                    iso2: entry.alpha2.clone(),
                    iso3: entry.alpha3.clone(),
                    country: entry.name.clone(),
                    sessions: count,
                }),
                None => sessions.unmatched.push(UnmatchedCountry {
                    code: code.to_string(),
                    sessions: count,
                }),
            }
        }

        sessions
            .rows
            .sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.iso2.cmp(&b.iso2)));
        sessions
            .unmatched
            .sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.code.cmp(&b.code)));

        for unmatched in &sessions.unmatched {
            warn!(
                code = %unmatched.code,
                sessions = unmatched.sessions,
                "Country code not in reference table, dropped from country sessions"
            );
        }

        debug!(
            "Aggregated sessions for {} countries ({} unmatched)",
            sessions.rows.len(),
            sessions.unmatched.len()
        );
        Ok(sessions)
    }
}

/// Aggregator for the per-profile weekday × hour heatmap
#[derive(Debug, Default)]
pub struct HeatmapAggregator {
    timezone: Option<Tz>,
}

impl HeatmapAggregator {
    /// Heatmap in UTC, as exported
    pub fn new() -> Self {
        Self { timezone: None }
    }

    /// Heatmap in a local timezone
    pub fn with_timezone(timezone: Tz) -> Self {
        Self {
            timezone: Some(timezone),
        }
    }

    /// Hour of day and Monday-based weekday index of a start time
    fn slot(&self, start: NaiveDateTime) -> (usize, usize) {
        match self.timezone {
            Some(tz) => {
                let local = Utc.from_utc_datetime(&start).with_timezone(&tz);
                (
                    local.hour() as usize,
                    local.weekday().num_days_from_monday() as usize,
                )
            }
            None => (
                start.hour() as usize,
                start.weekday().num_days_from_monday() as usize,
            ),
        }
    }
}

impl DataAggregator for HeatmapAggregator {
    type Output = Vec<HeatmapTable>;

    #[instrument(skip(self, records))]
    fn aggregate(&self, records: &[DerivedRecord]) -> Result<Self::Output> {
        let mut tables: BTreeMap<&str, HeatmapTable> = BTreeMap::new();
        for record in records {
            let profile = record.record.profile_name.as_str();
            let (hour, weekday) = self.slot(record.record.start_time);
            tables
                .entry(profile)
                .or_insert_with(|| HeatmapTable::empty(profile))
                .counts[hour][weekday] += 1;
        }

        let result: Vec<HeatmapTable> = tables.into_values().collect();
        debug!("Aggregated heatmaps for {} profiles", result.len());
        Ok(result)
    }
}

/// Aggregator for device category counts
#[derive(Debug, Default)]
pub struct DeviceCountAggregator;

impl DataAggregator for DeviceCountAggregator {
    type Output = Vec<DeviceCount>;

    #[instrument(skip(self, records))]
    fn aggregate(&self, records: &[DerivedRecord]) -> Result<Self::Output> {
        let mut counts: HashMap<DeviceCategory, u32> = HashMap::new();
        for record in records {
            for token in record.record.device_type.split_whitespace() {
                if let Some(category) = DeviceCategory::from_token(&token.to_lowercase()) {
                    *counts.entry(category).or_insert(0) += 1;
                }
            }
        }

        let mut result: Vec<DeviceCount> = counts
            .into_iter()
            .map(|(category, count)| DeviceCount { category, count })
            .collect();

        // Ascending by count, ties by category name
        result.sort_by(|a, b| {
            a.count
                .cmp(&b.count)
                .then_with(|| a.category.to_string().cmp(&b.category.to_string()))
        });

        debug!("Aggregated {} device categories", result.len());
        Ok(result)
    }
}

/// Aggregator for the most watched titles
#[derive(Debug, Clone)]
pub struct TitleFrequencyAggregator {
    /// Inclusive bucketed-completion threshold
    pub min_percent_watched: u32,
    /// Rows kept
    pub top_n: usize,
    /// Restrict to movies or series
    pub film_type: Option<FilmType>,
    /// Restrict to one profile
    pub profile: Option<String>,
}

impl TitleFrequencyAggregator {
    /// Top `top_n` titles watched at least `min_percent_watched`
    pub fn new(min_percent_watched: u32, top_n: usize) -> Self {
        Self {
            min_percent_watched,
            top_n,
            film_type: None,
            profile: None,
        }
    }

    /// Only count one film type
    pub fn with_film_type(mut self, film_type: FilmType) -> Self {
        self.film_type = Some(film_type);
        self
    }

    /// Only count one profile
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    fn includes(&self, record: &DerivedRecord) -> bool {
        record.watched_at_least(self.min_percent_watched)
            && self.film_type.map_or(true, |ft| ft == record.film_type)
            && self
                .profile
                .as_deref()
                .map_or(true, |p| p == record.record.profile_name)
    }
}

impl DataAggregator for TitleFrequencyAggregator {
    type Output = Vec<TitleCount>;

    #[instrument(skip(self, records), fields(threshold = self.min_percent_watched, top_n = self.top_n))]
    fn aggregate(&self, records: &[DerivedRecord]) -> Result<Self::Output> {
        let mut counts: HashMap<(&str, &str, FilmType), u32> = HashMap::new();
        for record in records.iter().filter(|r| self.includes(r)) {
            let key = (
                record.record.profile_name.as_str(),
                record.title_key(),
                record.film_type,
            );
            *counts.entry(key).or_insert(0) += 1;
        }

        let mut result: Vec<TitleCount> = counts
            .into_iter()
            .map(|((profile, title, film_type), count)| TitleCount {
                profile: profile.to_string(),
                title: title.to_string(),
                film_type,
                count,
            })
            .collect();

        result.sort_by(compare_title_counts);
        result.truncate(self.top_n);

        debug!("Aggregated {} top titles", result.len());
        Ok(result)
    }
}

/// Descending by count, ties by profile then title
fn compare_title_counts(a: &TitleCount, b: &TitleCount) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.profile.cmp(&b.profile))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.film_type.cmp(&b.film_type))
}
