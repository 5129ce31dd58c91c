use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{GaugeError, Result};

// ============================================================================
// COLOR
// ============================================================================

/// Color representation for gauge elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Parses `#rgb`, `#rrggbb` or `rgb(r, g, b)`.
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        let invalid = || GaugeError::InvalidColor(input.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            return match digits.as_slice() {
                [r, g, b] => Ok(Self::new(r * 17, g * 17, b * 17)),
                [r1, r0, g1, g0, b1, b0] => {
                    Ok(Self::new(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0))
                }
                _ => Err(invalid()),
            };
        }

        let inner = s
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let channels: Vec<u8> = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>().ok())
            .collect::<Option<_>>()
            .ok_or_else(invalid)?;
        match channels.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = GaugeError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

// ============================================================================
// THEME
// ============================================================================

/// Visual styling for every element of the gauge scene.
///
/// Defaults reproduce the stock dashboard look. Elements also carry CSS class
/// names in SVG output, so a stylesheet can still override these values.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Frame clear color for rasterized output
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub background: Color,

    // Wrapping circles
    #[builder(default = Color::new(113, 113, 113))]
    pub bounding_fill: Color,
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub bounding_stroke: Color,
    #[builder(default = 0.5)]
    pub bounding_stroke_width: f32,
    pub inner_fill: Option<Color>,
    #[builder(default = Color::new(0xe0, 0xe0, 0xe0))]
    pub inner_stroke: Color,
    #[builder(default = 2.0)]
    pub inner_stroke_width: f32,

    // Text
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub title_color: Color,
    #[builder(default = Color::new(220, 220, 220))]
    pub tick_label_color: Color,
    #[builder(default = "sans-serif".to_string())]
    pub font_family: String,

    // Ticks
    #[builder(default = Color::new(140, 140, 140))]
    pub minor_tick_color: Color,
    #[builder(default = 1.0)]
    pub minor_tick_width: f32,
    #[builder(default = Color::new(180, 180, 180))]
    pub major_tick_color: Color,
    #[builder(default = 2.0)]
    pub major_tick_width: f32,

    // Zones
    #[builder(default = Color::new(0xf0, 0xad, 0x4e))]
    pub warning_color: Color,
    #[builder(default = Color::new(0xd9, 0x53, 0x4f))]
    pub critical_color: Color,

    // Needle
    #[builder(default = Color::new(0xdc, 0x39, 0x12))]
    pub needle_fill: Color,
    #[builder(default = Color::new(0xc6, 0x33, 0x10))]
    pub needle_stroke: Color,
    #[builder(default = 0.7)]
    pub needle_fill_opacity: f32,
    #[builder(default = Color::new(0x46, 0x84, 0xee))]
    pub pivot_fill: Color,
    #[builder(default = Color::new(0x66, 0x66, 0x66))]
    pub pivot_stroke: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::builder().build()
    }
}

// ============================================================================
// GAUGE CONFIGURATION
// ============================================================================

/// Parameters a dashboard editor supplies for one gauge.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    #[builder(default = 0.0)]
    pub min_value: f64,
    #[builder(default = 100.0)]
    pub max_value: f64,
    #[builder(default = "".to_string())]
    pub metric_name: String,
    #[builder(default)]
    pub theme: Theme,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GaugeConfig {
    pub fn range(&self) -> f64 {
        self.max_value - self.min_value
    }

    /// Rejects ranges the angular mapping cannot handle.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = (self.min_value, self.max_value);
        if !min.is_finite() || !max.is_finite() || max <= min || !(max - min).is_finite() {
            return Err(GaugeError::InvalidRange { min, max });
        }
        Ok(())
    }

    /// Loads a config file; the format follows the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
