//! End-to-end analysis over one loaded export

use chrono_tz::Tz;
use serde::Serialize;
use tracing::{info, instrument};
use watchstat_common::{ClassifierMode, DerivedRecord, FilmType, Result, WatchstatError};
use watchstat_config::AnalysisConfig;
use watchstat_ingest::{CountryCodes, ExportRecords};

use crate::{
    aggregator::{
        CountrySessions, CountrySessionsAggregator, DataAggregator, DeviceCount,
        DeviceCountAggregator, HeatmapAggregator, HeatmapTable, ProfileWatchTime, TitleCount,
        TitleFrequencyAggregator, WatchTimeAggregator,
    },
    billing::{summarize_billing, BillingSummary},
    classifier::TitleClassifier,
    duration::derive_all,
    filter::{filter_viewing, FilterOptions},
    summary::{summarize, SummaryStats},
};

/// Tunables for one analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    /// Sessions must be watched strictly longer than this
    pub min_watched_seconds: u64,
    /// Inclusive substantially-watched threshold on bucketed completion
    pub min_percent_watched: u32,
    /// Rows kept in each title ranking
    pub top_n: usize,
    /// Series detection mode
    pub classifier: ClassifierMode,
    /// Heatmap timezone, UTC when `None`
    pub timezone: Option<Tz>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            min_watched_seconds: 60,
            min_percent_watched: 80,
            top_n: 10,
            classifier: ClassifierMode::Token,
            timezone: None,
        }
    }
}

impl AnalysisOptions {
    /// Build options from the `analysis` config section
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let timezone = config
            .timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>().map_err(|err| {
                    WatchstatError::config(format!("Invalid analysis timezone '{name}': {err}"))
                })
            })
            .transpose()?;

        Ok(Self {
            min_watched_seconds: config.min_watched_seconds,
            min_percent_watched: config.min_percent_watched,
            top_n: config.top_n,
            classifier: config.classifier,
            timezone,
        })
    }
}

/// Every table derived from one export
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Headline counts
    pub summary: SummaryStats,
    /// Settled billing total
    pub billing: BillingSummary,
    /// Streaming IP sessions in the export
    pub ip_sessions: usize,
    /// Watched hours per profile
    pub watch_time: Vec<ProfileWatchTime>,
    /// Sessions per country
    pub countries: CountrySessions,
    /// Weekday × hour activity per profile
    pub heatmaps: Vec<HeatmapTable>,
    /// Device category counts
    pub devices: Vec<DeviceCount>,
    /// Most watched titles of any type
    pub top_titles: Vec<TitleCount>,
    /// Most watched movies
    pub top_movies: Vec<TitleCount>,
    /// Most watched series
    pub top_series: Vec<TitleCount>,
    /// Filtered and derived records, input to catalog enrichment
    #[serde(skip)]
    pub records: Vec<DerivedRecord>,
}

/// Runs filtering, derivation and every aggregation
#[derive(Debug)]
pub struct AnalysisManager {
    options: AnalysisOptions,
    country_codes: CountryCodes,
}

impl AnalysisManager {
    /// Create a manager with an explicit country table
    pub fn new(options: AnalysisOptions, country_codes: CountryCodes) -> Self {
        Self {
            options,
            country_codes,
        }
    }

    /// Create a manager with the bundled ISO 3166 table
    pub fn with_bundled_codes(options: AnalysisOptions) -> Result<Self> {
        Ok(Self::new(options, CountryCodes::bundled()?))
    }

    /// The active options
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    fn title_ranking(&self, film_type: Option<FilmType>) -> TitleFrequencyAggregator {
        let aggregator =
            TitleFrequencyAggregator::new(self.options.min_percent_watched, self.options.top_n);
        match film_type {
            Some(film_type) => aggregator.with_film_type(film_type),
            None => aggregator,
        }
    }

    /// Analyze a loaded export
    #[instrument(skip(self, export), fields(viewing = export.viewing.len()))]
    pub fn run(&self, export: &ExportRecords) -> Result<AnalysisReport> {
        let filter = FilterOptions {
            min_watched_seconds: self.options.min_watched_seconds,
        };
        let kept = filter_viewing(&export.viewing, &filter);
        let records = derive_all(kept, &TitleClassifier::new(self.options.classifier));

        let heatmap = match self.options.timezone {
            Some(tz) => HeatmapAggregator::with_timezone(tz),
            None => HeatmapAggregator::new(),
        };

        let report = AnalysisReport {
            summary: summarize(export.viewing.len(), &records),
            billing: summarize_billing(&export.billing),
            ip_sessions: export.ip_sessions.len(),
            watch_time: WatchTimeAggregator.aggregate(&records)?,
            countries: CountrySessionsAggregator::new(&self.country_codes).aggregate(&records)?,
            heatmaps: heatmap.aggregate(&records)?,
            devices: DeviceCountAggregator.aggregate(&records)?,
            top_titles: self.title_ranking(None).aggregate(&records)?,
            top_movies: self.title_ranking(Some(FilmType::Movie)).aggregate(&records)?,
            top_series: self.title_ranking(Some(FilmType::Series)).aggregate(&records)?,
            records,
        };

        info!(
            profiles = report.watch_time.len(),
            titles = report.summary.unique_titles,
            kept = report.summary.filtered_records,
            unmatched_countries = report.countries.unmatched.len(),
            "Analysis complete"
        );
        Ok(report)
    }
}
