//! Weekday × hour activity heatmap

use std::path::Path;

use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use watchstat_analytics::HeatmapTable;
use watchstat_common::{ensure, Result, WatchstatError};

use crate::{renderer::ChartRenderer, style::ChartStyle};

/// One heatmap per profile: weekdays across, hours down
#[derive(Debug, Default)]
pub struct HeatmapChart;

fn weekday_label(value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(d) | SegmentValue::Exact(d) => HeatmapTable::WEEKDAYS
            .get(*d)
            .map(|day| day[..3].to_string())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

fn hour_label(value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(h) | SegmentValue::Exact(h) if *h < 24 => format!("{h:02}:00"),
        _ => String::new(),
    }
}

/// Non-zero cells as `(weekday, hour, count)`, the ones that get a label
fn annotated_cells(table: &HeatmapTable) -> Vec<(usize, usize, u32)> {
    (0..24usize)
        .flat_map(|hour| (0..7usize).map(move |day| (day, hour)))
        .filter_map(|(day, hour)| {
            let count = table.counts[hour][day];
            (count > 0).then_some((day, hour, count))
        })
        .collect()
}

/// Black or white, whichever reads better on `fill`
fn label_color(fill: RGBColor) -> RGBColor {
    let luma = 0.299 * f64::from(fill.0) + 0.587 * f64::from(fill.1) + 0.114 * f64::from(fill.2);
    if luma < 140.0 {
        WHITE
    } else {
        BLACK
    }
}

impl ChartRenderer for HeatmapChart {
    type Data = HeatmapTable;

    fn name(&self) -> &str {
        "heatmap"
    }

    fn description(&self) -> &str {
        "Viewing activity by weekday and hour"
    }

    fn render(&self, data: &Self::Data, style: &ChartStyle, path: &Path) -> Result<()> {
        let max = data.max();
        ensure!(
            max > 0,
            WatchstatError::chart(format!("No sessions for profile '{}'", data.profile))
        );

        let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
        root.fill(&style.background)?;

        let caption = format!("{}: {}", self.description(), data.profile);
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, style.title_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d((0..7usize).into_segmented(), (0..24usize).into_segmented())?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(7)
            .y_labels(24)
            .x_label_formatter(&weekday_label)
            .y_label_formatter(&hour_label)
            .label_style(style.label_font())
            .draw()?;

        let cells = (0..24usize).flat_map(|hour| (0..7usize).map(move |day| (hour, day)));
        chart.draw_series(cells.map(|(hour, day)| {
            let count = data.counts[hour][day];
            let color = style.scale.color_for(f64::from(count), f64::from(max));
            Rectangle::new(
                [
                    (SegmentValue::Exact(day), SegmentValue::Exact(hour)),
                    (SegmentValue::Exact(day + 1), SegmentValue::Exact(hour + 1)),
                ],
                color.filled(),
            )
        }))?;

        let centered = Pos::new(HPos::Center, VPos::Center);
        let on_dark = style.label_font().color(&WHITE).pos(centered);
        let on_light = style.label_font().color(&BLACK).pos(centered);
        chart.draw_series(annotated_cells(data).into_iter().map(|(day, hour, count)| {
            let fill = style.scale.color_for(f64::from(count), f64::from(max));
            let font = if label_color(fill) == WHITE {
                on_dark.clone()
            } else {
                on_light.clone()
            };
            Text::new(
                count.to_string(),
                (SegmentValue::CenterOf(day), SegmentValue::CenterOf(hour)),
                font,
            )
        }))?;

        root.present()?;
        tracing::info!("Rendered heatmap for {} to {}", data.profile, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_labels() {
        assert_eq!(weekday_label(&SegmentValue::CenterOf(0)), "Mon");
        assert_eq!(weekday_label(&SegmentValue::CenterOf(6)), "Sun");
        assert_eq!(weekday_label(&SegmentValue::CenterOf(7)), "");
        assert_eq!(hour_label(&SegmentValue::CenterOf(7)), "07:00");
        assert_eq!(hour_label(&SegmentValue::CenterOf(24)), "");
        assert_eq!(hour_label(&SegmentValue::Last), "");
    }

    #[test]
    fn test_annotated_cells_skip_zero_counts() {
        let mut counts = [[0; 7]; 24];
        counts[20][0] = 3;
        counts[22][6] = 1;
        let table = HeatmapTable {
            profile: "Alice".to_string(),
            counts,
        };
        assert_eq!(annotated_cells(&table), vec![(0, 20, 3), (6, 22, 1)]);
    }

    #[test]
    fn test_label_color_contrasts_with_fill() {
        assert_eq!(label_color(RGBColor(1, 1, 1)), WHITE);
        assert_eq!(label_color(RGBColor(219, 0, 0)), WHITE);
        assert_eq!(label_color(RGBColor(255, 255, 255)), BLACK);
    }

    #[test]
    fn test_empty_table_is_a_chart_error() {
        let dir = tempfile::tempdir().unwrap();
        let table = HeatmapTable {
            profile: "Alice".to_string(),
            counts: [[0; 7]; 24],
        };
        let err = HeatmapChart
            .render(&table, &ChartStyle::default(), &dir.path().join("h.png"))
            .unwrap_err();
        assert!(matches!(err, WatchstatError::Chart { .. }));
    }
}
