//! Domain types shared across the watchstat crates

use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::WatchstatError;

/// Elapsed time encoded as `HH:MM:SS`
///
/// Hours are not limited to two digits; a 12 hour session is `12:00:00`.
/// Compare durations through [`ClockDuration::total_seconds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClockDuration {
    /// Whole hours
    pub hours: u32,
    /// Minutes component
    pub minutes: u32,
    /// Seconds component
    pub seconds: u32,
}

impl ClockDuration {
    /// Largest hours value whose minute count still fits in a `u32`
    pub const MAX_HOURS: u32 = u32::MAX / 60 - 1;

    /// Create a duration from its components
    pub const fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Total number of seconds
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    /// Hours and minutes as minutes, seconds truncated
    pub fn whole_minutes(&self) -> u32 {
        self.hours.saturating_mul(60).saturating_add(self.minutes)
    }
}

impl FromStr for ClockDuration {
    type Err = WatchstatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 3 {
            crate::bail!(WatchstatError::data(format!(
                "Expected HH:MM:SS duration, got '{}'",
                s
            )));
        }

        let mut values = [0u32; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse::<u32>().map_err(|e| {
                WatchstatError::data_with_source(format!("Invalid duration component in '{}'", s), e)
            })?;
        }

        let [hours, minutes, seconds] = values;
        if minutes >= 60 || seconds >= 60 {
            crate::bail!(WatchstatError::data(format!(
                "Minutes and seconds must be below 60 in '{}'",
                s
            )));
        }
        if hours > Self::MAX_HOURS {
            crate::bail!(WatchstatError::data(format!("Duration '{}' is too long", s)));
        }

        Ok(Self::new(hours, minutes, seconds))
    }
}

impl fmt::Display for ClockDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

impl Serialize for ClockDuration {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockDuration {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether a title is a standalone film or part of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilmType {
    /// Standalone film
    Movie,
    /// Episode of a show
    Series,
}

impl fmt::Display for FilmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "Movie"),
            Self::Series => write!(f, "Series"),
        }
    }
}

/// How series titles are recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Whole-word keyword match
    #[default]
    Token,
    /// Space-padded keyword alternation, matches older reports
    Legacy,
}

/// One playback session from the viewing activity table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewingRecord {
    /// Profile that played the title
    pub profile_name: String,
    /// Title as exported, possibly `Show: Season 1: Episode`
    pub title: String,
    /// Session start, UTC as exported
    pub start_time: NaiveDateTime,
    /// Time actually watched
    pub duration: ClockDuration,
    /// Playback position at the end of the session
    pub bookmark: ClockDuration,
    /// Free-text device description
    pub device_type: String,
    /// Country string, first two characters are the alpha-2 code
    pub country: String,
    /// Trailer/preview marker, `None` for regular playback
    pub supplemental_video_type: Option<String>,
}

impl ViewingRecord {
    /// First two characters of the country column
    pub fn country_code(&self) -> &str {
        match self.country.char_indices().nth(2) {
            Some((idx, _)) => &self.country[..idx],
            None => &self.country,
        }
    }
}

/// A viewing record with the fields derived by the analytics pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    /// Source record
    #[serde(flatten)]
    pub record: ViewingRecord,
    /// Watched time in whole minutes
    pub watched_minutes: u32,
    /// Bookmark position in whole minutes
    pub duration_minutes: u32,
    /// `watched_minutes / 60`
    pub watched_hours: f64,
    /// Completion percentage, `None` when `duration_minutes` is zero
    pub percent_watched: Option<f64>,
    /// Completion rounded to the nearest multiple of five
    pub percent_watched_bucketed: Option<u32>,
    /// Title prefix before the first colon
    pub show_title: String,
    /// Movie or series
    pub film_type: FilmType,
}

impl DerivedRecord {
    /// Whether the bucketed completion reaches `threshold` (inclusive)
    pub fn watched_at_least(&self, threshold: u32) -> bool {
        self.percent_watched_bucketed
            .is_some_and(|bucket| bucket >= threshold)
    }

    /// Key used when counting titles: full title for movies, show title for series
    pub fn title_key(&self) -> &str {
        match self.film_type {
            FilmType::Movie => &self.record.title,
            FilmType::Series => &self.show_title,
        }
    }
}

/// One row of the billing history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRecord {
    /// Payment status, `APPROVED` for accepted payments
    pub pmt_status: String,
    /// Invoice result, `SETTLED` for settled payments
    pub final_invoice_result: String,
    /// Gross amount charged
    pub gross_sale_amt: f64,
    /// ISO currency code
    pub currency: String,
}

/// One row of the IP address log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpSession {
    /// Client IP address
    pub ip_address: String,
    /// Country string as exported
    pub country: String,
    /// Region display name
    pub region: Option<String>,
    /// Device description
    pub device_description: Option<String>,
    /// Raw timestamp string
    pub timestamp: Option<String>,
}

/// Row of the ISO-3166 country code reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCodeEntry {
    /// English short name
    pub name: String,
    /// Alpha-2 code
    pub alpha2: String,
    /// Alpha-3 code
    pub alpha3: String,
    /// UN M49 numeric code
    pub un_code: String,
}

/// A candidate returned by a movie metadata catalog search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Localized title
    #[serde(default)]
    pub title: String,
    /// Title in the original language
    #[serde(default)]
    pub original_title: String,
    /// Catalog genre identifiers
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Average user rating
    #[serde(default)]
    pub vote_average: f64,
    /// Number of ratings
    #[serde(default)]
    pub vote_count: u64,
    /// Release date as `YYYY-MM-DD`
    #[serde(default)]
    pub release_date: Option<String>,
    /// Popularity score
    #[serde(default)]
    pub popularity: f64,
}

/// A resolved catalog entry with genre display names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMatch {
    /// Winning candidate for the title
    pub entry: CatalogEntry,
    /// Display names for `entry.genre_ids`, unknown ids skipped
    pub genres: Vec<String>,
}

/// A movie record with its catalog metadata, if any was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// Derived viewing record
    pub record: DerivedRecord,
    /// Catalog match, `None` when the title was not found
    pub metadata: Option<CatalogMatch>,
}
