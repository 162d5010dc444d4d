//! Shared bar chart drawing

use std::path::Path;

use plotters::prelude::*;
use watchstat_common::{ensure, Result, WatchstatError};

use crate::style::ChartStyle;

/// Bar direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Bars grow upwards, labels on the x axis
    Vertical,
    /// Bars grow to the right, first label on top
    Horizontal,
}

/// A labelled series ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub title: String,
    pub label_desc: String,
    pub value_desc: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub orientation: Orientation,
}

impl BarSeries {
    pub fn new(title: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            title: title.into(),
            label_desc: String::new(),
            value_desc: String::new(),
            labels: Vec::new(),
            values: Vec::new(),
            orientation,
        }
    }

    pub fn with_axes(mut self, label_desc: impl Into<String>, value_desc: impl Into<String>) -> Self {
        self.label_desc = label_desc.into();
        self.value_desc = value_desc.into();
        self
    }

    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.labels.push(label.into());
        self.values.push(value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest value, at least 1 so the axis never collapses
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(1.0, f64::max)
    }
}

/// Shorten long labels on a char boundary
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn segment_label(labels: &[String], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => labels
            .get(*i)
            .map(|label| truncate_label(label, 24))
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

/// Draw `series` into a PNG at `path`
pub fn draw_bars(series: &BarSeries, style: &ChartStyle, path: &Path) -> Result<()> {
    ensure!(
        !series.is_empty(),
        WatchstatError::chart(format!("No data for '{}'", series.title))
    );

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&style.background)?;

    let count = series.values.len();
    let max = series.max_value();
    let upper = max * 1.1;

    match series.orientation {
        Orientation::Vertical => {
            let mut chart = ChartBuilder::on(&root)
                .caption(&series.title, style.title_font())
                .margin(20)
                .x_label_area_size(60)
                .y_label_area_size(70)
                .build_cartesian_2d((0..count).into_segmented(), 0f64..upper)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(count)
                .x_label_formatter(&|x| segment_label(&series.labels, x))
                .x_desc(series.label_desc.as_str())
                .y_desc(series.value_desc.as_str())
                .label_style(style.label_font())
                .axis_desc_style(style.label_font())
                .draw()?;

            chart.draw_series(series.values.iter().enumerate().map(|(i, value)| {
                let color = style.scale.color_for(*value, max);
                Rectangle::new(
                    [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *value)],
                    color.filled(),
                )
            }))?;
        }
        Orientation::Horizontal => {
            // Row 0 is drawn at the top
            let flipped: Vec<String> = series.labels.iter().rev().cloned().collect();
            let mut chart = ChartBuilder::on(&root)
                .caption(&series.title, style.title_font())
                .margin(20)
                .x_label_area_size(60)
                .y_label_area_size(220)
                .build_cartesian_2d(0f64..upper, (0..count).into_segmented())?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(count)
                .y_label_formatter(&|y| segment_label(&flipped, y))
                .x_desc(series.value_desc.as_str())
                .y_desc(series.label_desc.as_str())
                .label_style(style.label_font())
                .axis_desc_style(style.label_font())
                .draw()?;

            chart.draw_series(series.values.iter().enumerate().map(|(i, value)| {
                let row = count - 1 - i;
                let color = style.scale.color_for(*value, max);
                Rectangle::new(
                    [(0.0, SegmentValue::Exact(row)), (*value, SegmentValue::Exact(row + 1))],
                    color.filled(),
                )
            }))?;
        }
    }

    root.present()?;
    tracing::info!("Rendered '{}' to {}", series.title, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Heat", 10), "Heat");
        assert_eq!(truncate_label("The Lord of the Rings", 10), "The Lor...");
        assert_eq!(truncate_label("Bröderna Lejonhjärta", 10), "Brödern...");
    }

    #[test]
    fn test_segment_label() {
        let labels = vec!["TV".to_string(), "Tablet".to_string()];
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(1)), "Tablet");
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(5)), "");
        assert_eq!(segment_label(&labels, &SegmentValue::Last), "");
    }

    #[test]
    fn test_series_max_never_zero() {
        let mut series = BarSeries::new("Empty-ish", Orientation::Vertical);
        series.push("a", 0.0);
        assert_eq!(series.max_value(), 1.0);
        series.push("b", 4.5);
        assert_eq!(series.max_value(), 4.5);
    }

    #[test]
    fn test_empty_series_is_a_chart_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let err = draw_bars(
            &BarSeries::new("Nothing", Orientation::Horizontal),
            &ChartStyle::default(),
            &path,
        )
        .unwrap_err();

        assert!(matches!(err, WatchstatError::Chart { .. }));
        assert!(!path.exists());
    }
}
