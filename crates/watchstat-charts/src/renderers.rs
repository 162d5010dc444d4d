//! Bar chart renderers for the aggregate tables

use std::{collections::BTreeMap, path::Path};

use watchstat_analytics::{CountrySessions, DeviceCount, ProfileWatchTime, TitleCount};
use watchstat_catalog::GenreCount;
use watchstat_common::{FilmType, Result};

use crate::{
    bar::{draw_bars, BarSeries, Orientation},
    renderer::ChartRenderer,
    style::ChartStyle,
};

/// Watched hours per profile
#[derive(Debug, Default)]
pub struct WatchTimeChart;

impl WatchTimeChart {
    pub fn series(&self, data: &[ProfileWatchTime]) -> BarSeries {
        let mut series =
            BarSeries::new(self.description(), Orientation::Vertical).with_axes("Profile", "Hours");
        for row in data {
            series.push(&row.profile, row.watched_hours);
        }
        series
    }
}

impl ChartRenderer for WatchTimeChart {
    type Data = [ProfileWatchTime];

    fn name(&self) -> &str {
        "watch_time"
    }

    fn description(&self) -> &str {
        "Watch time per profile"
    }

    fn render(&self, data: &Self::Data, style: &ChartStyle, path: &Path) -> Result<()> {
        draw_bars(&self.series(data), style, path)
    }
}

/// Device category counts
#[derive(Debug, Default)]
pub struct DeviceChart;

impl DeviceChart {
    pub fn series(&self, data: &[DeviceCount]) -> BarSeries {
        let mut series =
            BarSeries::new(self.description(), Orientation::Vertical).with_axes("Device", "Sessions");
        for row in data {
            series.push(row.category.to_string(), f64::from(row.count));
        }
        series
    }
}

impl ChartRenderer for DeviceChart {
    type Data = [DeviceCount];

    fn name(&self) -> &str {
        "devices"
    }

    fn description(&self) -> &str {
        "Devices used"
    }

    fn render(&self, data: &Self::Data, style: &ChartStyle, path: &Path) -> Result<()> {
        draw_bars(&self.series(data), style, path)
    }
}

/// Sessions per resolved country
#[derive(Debug, Default)]
pub struct CountryChart;

impl CountryChart {
    pub fn series(&self, data: &CountrySessions) -> BarSeries {
        let mut series = BarSeries::new(self.description(), Orientation::Horizontal)
            .with_axes("Country", "Sessions");
        for row in &data.rows {
            series.push(format!("{} ({})", row.country, row.iso3), f64::from(row.sessions));
        }
        series
    }
}

impl ChartRenderer for CountryChart {
    type Data = CountrySessions;

    fn name(&self) -> &str {
        "countries"
    }

    fn description(&self) -> &str {
        "Where was content streamed"
    }

    fn render(&self, data: &Self::Data, style: &ChartStyle, path: &Path) -> Result<()> {
        draw_bars(&self.series(data), style, path)
    }
}

/// Most watched titles, optionally of one film type
#[derive(Debug)]
pub struct TopTitlesChart {
    name: &'static str,
    description: &'static str,
}

impl TopTitlesChart {
    pub fn all() -> Self {
        Self {
            name: "top_titles",
            description: "Most watched titles",
        }
    }

    pub fn movies() -> Self {
        Self {
            name: "top_movies",
            description: "Most watched movies",
        }
    }

    pub fn series() -> Self {
        Self {
            name: "top_series",
            description: "Most watched series",
        }
    }

    /// Chart for one film type
    pub fn for_film_type(film_type: FilmType) -> Self {
        match film_type {
            FilmType::Movie => Self::movies(),
            FilmType::Series => Self::series(),
        }
    }

    pub fn bar_series(&self, data: &[TitleCount]) -> BarSeries {
        let mut series = BarSeries::new(self.description, Orientation::Horizontal)
            .with_axes("Title", "Times watched");
        for row in data {
            series.push(format!("{} ({})", row.title, row.profile), f64::from(row.count));
        }
        series
    }
}

impl ChartRenderer for TopTitlesChart {
    type Data = [TitleCount];

    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn render(&self, data: &Self::Data, style: &ChartStyle, path: &Path) -> Result<()> {
        draw_bars(&self.bar_series(data), style, path)
    }
}

/// Genre counts summed over profiles
#[derive(Debug, Default)]
pub struct GenreChart;

impl GenreChart {
    pub fn series(&self, data: &[GenreCount]) -> BarSeries {
        let mut totals: BTreeMap<&str, u32> = BTreeMap::new();
        for row in data {
            *totals.entry(row.genre.as_str()).or_insert(0) += row.count;
        }

        let mut sorted: Vec<(&str, u32)> = totals.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut series =
            BarSeries::new(self.description(), Orientation::Horizontal).with_axes("Genre", "Movies");
        for (genre, count) in sorted {
            series.push(genre, f64::from(count));
        }
        series
    }
}

impl ChartRenderer for GenreChart {
    type Data = [GenreCount];

    fn name(&self) -> &str {
        "genres"
    }

    fn description(&self) -> &str {
        "Genres of substantially watched movies"
    }

    fn render(&self, data: &Self::Data, style: &ChartStyle, path: &Path) -> Result<()> {
        draw_bars(&self.series(data), style, path)
    }
}
