//! Chart rendering trait and the render-everything entry point

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};
use watchstat_analytics::AnalysisReport;
use watchstat_catalog::GenreCount;
use watchstat_common::Result;

use crate::{
    heatmap::HeatmapChart,
    renderers::{CountryChart, DeviceChart, GenreChart, TopTitlesChart, WatchTimeChart},
    style::ChartStyle,
};

/// Trait for drawing one table to an image file
pub trait ChartRenderer {
    /// The table this chart draws
    type Data: ?Sized;

    /// Short identifier, also the output file stem
    fn name(&self) -> &str;

    /// Human-readable chart title
    fn description(&self) -> &str;

    /// Draw `data` to `path`; empty data is a chart error
    fn render(&self, data: &Self::Data, style: &ChartStyle, path: &Path) -> Result<()>;
}

/// Lower-case, filesystem-safe form of a profile name
pub fn file_slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if slug.is_empty() {
        "unnamed".to_string()
    } else {
        slug
    }
}

fn render_one<R: ChartRenderer>(
    renderer: &R,
    data: &R::Data,
    style: &ChartStyle,
    path: PathBuf,
    written: &mut Vec<PathBuf>,
) {
    match renderer.render(data, style, &path) {
        Ok(()) => written.push(path),
        Err(err) => warn!(chart = renderer.name(), error = %err, "Skipping chart"),
    }
}

/// Render every chart for `report` into `output_dir`.
///
/// Returns the written files. A chart that fails, for example because its
/// table is empty, is logged and skipped.
#[instrument(skip(report, genres, style))]
pub fn render_all(
    report: &AnalysisReport,
    genres: &[GenreCount],
    style: &ChartStyle,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();
    let png = |stem: &str| output_dir.join(format!("{stem}.png"));

    let watch_time = WatchTimeChart;
    render_one(&watch_time, &report.watch_time[..], style, png(watch_time.name()), &mut written);

    let devices = DeviceChart;
    render_one(&devices, &report.devices[..], style, png(devices.name()), &mut written);

    let countries = CountryChart;
    render_one(&countries, &report.countries, style, png(countries.name()), &mut written);

    for (chart, data) in [
        (TopTitlesChart::all(), &report.top_titles),
        (TopTitlesChart::movies(), &report.top_movies),
        (TopTitlesChart::series(), &report.top_series),
    ] {
        render_one(&chart, &data[..], style, png(chart.name()), &mut written);
    }

    let heatmap = HeatmapChart;
    for table in &report.heatmaps {
        let stem = format!("{}_{}", heatmap.name(), file_slug(&table.profile));
        render_one(&heatmap, table, style, png(&stem), &mut written);
    }

    if !genres.is_empty() {
        let genre_chart = GenreChart;
        render_one(&genre_chart, genres, style, png(genre_chart.name()), &mut written);
    }

    info!(charts = written.len(), dir = %output_dir.display(), "Charts rendered");
    Ok(written)
}
