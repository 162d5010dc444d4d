//! # Watchstat Analytics
//!
//! The derivation pipeline that turns raw viewing records into the tables
//! every chart and the report consume:
//!
//! 1. [`filter_viewing`] drops trailers and autoplay blips,
//! 2. [`derive_all`] adds minutes, hours and completion percentages,
//! 3. [`TitleClassifier`] splits show titles and tells movies from series,
//! 4. the aggregators in [`aggregator`] fold the derived records into tables.
//!
//! [`AnalysisManager`] runs all of it in one call.

pub mod aggregator;
pub mod billing;
pub mod classifier;
pub mod duration;
pub mod filter;
pub mod pipeline;
pub mod summary;

pub use aggregator::{
    CountrySessionRow, CountrySessions, CountrySessionsAggregator, DataAggregator, DeviceCategory,
    DeviceCount, DeviceCountAggregator, HeatmapAggregator, HeatmapTable, ProfileWatchTime,
    TitleCount, TitleFrequencyAggregator, UnmatchedCountry, WatchTimeAggregator,
};
pub use billing::{summarize_billing, BillingSummary};
pub use classifier::{show_title, TitleClassifier};
pub use duration::{derive_all, derive_record};
pub use filter::{filter_viewing, FilterOptions};
pub use pipeline::{AnalysisManager, AnalysisOptions, AnalysisReport};
pub use summary::{summarize, SummaryStats};
