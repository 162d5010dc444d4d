//! Chart dimensions, fonts and the color scale

use plotters::style::{FontDesc, FontFamily, FontStyle, RGBColor, TextStyle};
use watchstat_common::{Result, WatchstatError};
use watchstat_config::{ChartColors, ChartsConfig};

/// Parse a `#RRGGBB` color
pub fn parse_hex_color(value: &str) -> Result<RGBColor> {
    let invalid = || WatchstatError::validation(format!("Invalid hex color '{value}'"));

    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());
    Ok(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Piecewise-linear scale through four evenly spaced stops
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    stops: [RGBColor; 4],
}

impl Default for ColorScale {
    /// Black through dark red to red
    fn default() -> Self {
        Self {
            stops: [
                RGBColor(1, 1, 1),
                RGBColor(86, 77, 77),
                RGBColor(131, 16, 16),
                RGBColor(219, 0, 0),
            ],
        }
    }
}

impl ColorScale {
    pub fn new(stops: [RGBColor; 4]) -> Self {
        Self { stops }
    }

    /// Build from the configured colors
    pub fn from_colors(colors: &ChartColors) -> Result<Self> {
        Ok(Self::new([
            parse_hex_color(&colors.low)?,
            parse_hex_color(&colors.mid_low)?,
            parse_hex_color(&colors.mid_high)?,
            parse_hex_color(&colors.high)?,
        ]))
    }

    /// Color at `position`, clamped to `0.0..=1.0`
    pub fn color_at(&self, position: f64) -> RGBColor {
        let position = if position.is_finite() {
            position.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let segments = (self.stops.len() - 1) as f64;
        let scaled = position * segments;
        let index = (scaled.floor() as usize).min(self.stops.len() - 2);
        let t = scaled - index as f64;

        let (from, to) = (self.stops[index], self.stops[index + 1]);
        let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
    }

    /// Color for `value` relative to `max`
    pub fn color_for(&self, value: f64, max: f64) -> RGBColor {
        if max > 0.0 {
            self.color_at(value / max)
        } else {
            self.color_at(0.0)
        }
    }
}

/// Everything a renderer needs besides its data
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub font_size: u32,
    pub scale: ColorScale,
    pub background: RGBColor,
    pub text: RGBColor,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            font_family: "sans-serif".to_string(),
            font_size: 14,
            scale: ColorScale::default(),
            background: RGBColor(255, 255, 255),
            text: RGBColor(0, 0, 0),
        }
    }
}

impl ChartStyle {
    /// Build from the `charts` config section
    pub fn from_config(config: &ChartsConfig) -> Result<Self> {
        Ok(Self {
            width: config.width,
            height: config.height,
            font_family: config.font_family.clone(),
            font_size: config.font_size,
            scale: ColorScale::from_colors(&config.colors)?,
            background: parse_hex_color(&config.colors.background)?,
            text: parse_hex_color(&config.colors.text)?,
        })
    }

    fn font(&self, size: u32) -> TextStyle<'_> {
        FontDesc::new(
            FontFamily::Name(&self.font_family),
            f64::from(size),
            FontStyle::Normal,
        )
        .color(&self.text)
    }

    /// Caption font, larger than labels
    pub fn title_font(&self) -> TextStyle<'_> {
        self.font(self.font_size + self.font_size / 2)
    }

    /// Axis label font
    pub fn label_font(&self) -> TextStyle<'_> {
        self.font(self.font_size)
    }
}
