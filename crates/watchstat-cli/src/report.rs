//! JSON report written at the end of a run

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use watchstat_analytics::AnalysisReport;
use watchstat_catalog::{Enrichment, GenreCount, RatingDistribution};

/// File name of the report inside the output directory
pub const REPORT_FILE: &str = "report.json";

/// Catalog-derived tables
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSection {
    #[serde(flatten)]
    pub enrichment: Enrichment,
    /// Movie records that received metadata
    pub matched_records: usize,
    /// Genre counts over substantially watched movies
    pub genres: Vec<GenreCount>,
    /// Ratings per profile and genre
    pub ratings: Vec<RatingDistribution>,
}

impl CatalogSection {
    pub fn new(
        enrichment: Enrichment,
        genres: Vec<GenreCount>,
        ratings: Vec<RatingDistribution>,
    ) -> Self {
        Self {
            matched_records: enrichment.matched(),
            enrichment,
            genres,
            ratings,
        }
    }
}

/// Everything one run produced
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// When the run finished, UTC
    pub generated_at: DateTime<Utc>,
    /// Export the run read from
    pub export: PathBuf,
    #[serde(flatten)]
    pub analysis: AnalysisReport,
    /// `None` when enrichment was skipped
    pub catalog: Option<CatalogSection>,
    /// Chart files written
    pub charts: Vec<PathBuf>,
}

impl Report {
    pub fn new(
        export: impl Into<PathBuf>,
        analysis: AnalysisReport,
        catalog: Option<CatalogSection>,
        charts: Vec<PathBuf>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            export: export.into(),
            analysis,
            catalog,
            charts,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }

    /// Write the pretty-printed report to `path`
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }
}
