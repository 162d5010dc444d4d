//! One end-to-end run: load, analyze, enrich, render, report

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};
use watchstat_analytics::{AnalysisManager, AnalysisOptions, AnalysisReport};
use watchstat_catalog::{genre_frequency, rating_distribution, CatalogEnricher};
use watchstat_charts::{render_all, ChartStyle};
use watchstat_config::{CatalogConfig, Config};
use watchstat_ingest::{load_export, CountryCodes, ExportSource, RawExport};

use crate::report::{CatalogSection, Report, REPORT_FILE};

/// Sub-directory of the output directory holding chart images
pub const CHARTS_DIR: &str = "charts";

/// What a finished run left behind
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub report_path: PathBuf,
}

fn country_codes(config: &Config) -> Result<CountryCodes> {
    match &config.export.country_codes {
        Some(path) => CountryCodes::from_path(path)
            .with_context(|| format!("Failed to load country codes from {path}")),
        None => Ok(CountryCodes::bundled()?),
    }
}

/// Look up watched movies in the catalog when one is configured
#[instrument(skip_all)]
async fn enrich(
    config: &CatalogConfig,
    analysis: &AnalysisReport,
    threshold: u32,
) -> Result<Option<CatalogSection>> {
    if !config.is_active() {
        info!("Catalog enrichment skipped: disabled or no API key");
        return Ok(None);
    }

    let enricher = CatalogEnricher::from_config(config)?;
    let enrichment = enricher.enrich(&analysis.records).await;
    if enrichment.failed_lookups > 0 {
        warn!(
            failed = enrichment.failed_lookups,
            "Some catalog lookups failed, their titles carry no metadata"
        );
    }

    let genres = genre_frequency(&enrichment.records, threshold);
    let ratings = rating_distribution(&enrichment.records, threshold);
    Ok(Some(CatalogSection::new(enrichment, genres, ratings)))
}

fn render_charts(
    config: &Config,
    analysis: &AnalysisReport,
    catalog: Option<&CatalogSection>,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    if !config.charts.enabled {
        info!("Chart rendering disabled");
        return Ok(Vec::new());
    }

    let style = ChartStyle::from_config(&config.charts)?;
    let genres = catalog.map(|c| c.genres.as_slice()).unwrap_or_default();
    Ok(render_all(analysis, genres, &style, &output_dir.join(CHARTS_DIR))?)
}

fn log_headlines(report: &Report) {
    let summary = &report.analysis.summary;
    info!(
        titles = summary.unique_titles,
        devices = summary.unique_devices,
        countries = summary.unique_countries,
        records = summary.total_records,
        kept = summary.filtered_records,
        "Viewing summary"
    );

    let billing = &report.analysis.billing;
    info!(
        total = billing.total,
        currency = billing.currency.as_deref().unwrap_or("-"),
        payments = billing.settled_payments,
        "Amount spent"
    );
    info!(sessions = report.analysis.ip_sessions, "Streaming IP sessions");

    if let Some(top) = report.analysis.top_titles.first() {
        info!(
            title = %top.title,
            profile = %top.profile,
            count = top.count,
            "Most watched title"
        );
    }
}

/// Run the whole pipeline for `config`
#[instrument(skip(config), fields(export = %config.export.path))]
pub async fn run(config: &Config) -> Result<RunOutcome> {
    let source = ExportSource::from_path(&config.export.path);
    let records = load_export(&source)
        .and_then(RawExport::into_records)
        .with_context(|| format!("Failed to load export from {}", source.path().display()))?;

    let options = AnalysisOptions::from_config(&config.analysis)?;
    let threshold = options.min_percent_watched;
    let analysis = AnalysisManager::new(options, country_codes(config)?).run(&records)?;

    let catalog = enrich(&config.catalog, &analysis, threshold).await?;

    let output_dir = PathBuf::from(&config.export.output_dir);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let charts = render_charts(config, &analysis, catalog.as_ref(), &output_dir)?;

    let report = Report::new(source.path(), analysis, catalog, charts);
    let report_path = output_dir.join(REPORT_FILE);
    report.write(&report_path)?;

    log_headlines(&report);
    info!("Report written to {}", report_path.display());

    Ok(RunOutcome {
        report,
        report_path,
    })
}
