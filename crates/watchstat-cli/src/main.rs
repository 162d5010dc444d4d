//! Watchstat - Main Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

use watchstat_cli::{configure, run, Args};
use watchstat_common::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = configure(&args)?;

    init_logging(config.logging.to_logging_config())?;
    info!("Starting watchstat v{}", env!("CARGO_PKG_VERSION"));

    let outcome = run(&config).await?;
    info!(
        charts = outcome.report.charts.len(),
        "Done, report at {}",
        outcome.report_path.display()
    );

    Ok(())
}
