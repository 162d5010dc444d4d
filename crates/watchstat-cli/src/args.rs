//! Command line arguments

use std::path::PathBuf;

use clap::Parser;
use watchstat_config::Config;

/// Descriptive statistics over a streaming-service data export
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "watchstat", author, version, about, long_about = None)]
pub struct Args {
    /// Export directory or `.zip` archive
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory receiving `report.json` and charts
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Number of entries in each top-titles table
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// Skip catalog enrichment even when an API key is configured
    #[arg(long)]
    pub no_catalog: bool,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Log level
    #[arg(short, long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Command line values take precedence over file and environment values
    pub fn apply(&self, config: &mut Config) {
        if let Some(export) = &self.export {
            config.export.path = export.display().to_string();
        }
        if let Some(dir) = &self.output_dir {
            config.export.output_dir = dir.display().to_string();
        }
        if let Some(top) = self.top {
            config.analysis.top_n = top;
        }
        if self.no_catalog {
            config.catalog.enabled = false;
        }
        if self.no_charts {
            config.charts.enabled = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
