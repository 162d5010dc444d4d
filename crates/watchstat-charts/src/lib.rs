//! # Watchstat Charts
//!
//! PNG renderers for the analysis tables. Every chart implements
//! [`ChartRenderer`]; [`render_all`] draws the full set for one report and
//! skips charts whose table is empty.

pub mod bar;
pub mod heatmap;
pub mod renderer;
pub mod renderers;
pub mod style;

pub use bar::{draw_bars, truncate_label, BarSeries, Orientation};
pub use heatmap::HeatmapChart;
pub use renderer::{file_slug, render_all, ChartRenderer};
pub use renderers::{CountryChart, DeviceChart, GenreChart, TopTitlesChart, WatchTimeChart};
pub use style::{parse_hex_color, ChartStyle, ColorScale};
