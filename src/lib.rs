// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod config;
pub mod data;
pub mod error;
pub mod gauge;
pub mod geometry;
pub mod raster;
pub mod scene;
pub mod svg;
pub mod window;

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

pub use config::{Color, GaugeConfig, Theme};
pub use data::{extract_scalar, ChartData};
pub use error::{GaugeError, Result};
pub use gauge::GaugeChart;
pub use geometry::{GaugeGeometry, Point};
pub use raster::{load_font, render_to_frame};
pub use scene::{Container, Scene, SceneNode};
pub use svg::to_svg;
pub use window::PreviewOptions;
