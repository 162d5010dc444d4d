//! # Watchstat CLI
//!
//! Argument parsing, configuration assembly and the end-to-end run behind the
//! `watchstat` binary.

pub mod args;
pub mod report;
pub mod run;

pub use args::Args;
pub use report::{CatalogSection, Report, REPORT_FILE};
pub use run::{run, RunOutcome, CHARTS_DIR};

use anyhow::{Context, Result};
use watchstat_config::{Config, ConfigLoader};

/// Build the effective configuration: file or defaults, environment, then
/// command line
pub fn configure(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    args.apply(&mut config);
    config
        .validate_all()
        .context("Invalid configuration after command line overrides")?;
    Ok(config)
}
