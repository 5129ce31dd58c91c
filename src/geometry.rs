use crate::config::GaugeConfig;
use crate::error::{GaugeError, Result};

/// Total angle covered by the dial, in degrees.
pub const SWEEP_DEGREES: f64 = 270.0;
/// Angle of the minimum value, measured from the left horizontal.
pub const START_DEGREES: f64 = -45.0;

pub const MAJOR_INTERVALS: usize = 10;
pub const MINOR_SUBDIVISIONS: usize = 5;

// Radius factors for each feature of the dial
pub const INNER_CIRCLE_FACTOR: f64 = 0.9;
pub const ZONE_INNER_FACTOR: f64 = 0.75;
pub const ZONE_OUTER_FACTOR: f64 = 0.85;
pub const MINOR_TICK_FACTOR: f64 = 0.75;
pub const MAJOR_TICK_FACTOR: f64 = 0.7;
pub const TICK_OUTER_FACTOR: f64 = 0.85;
pub const TICK_LABEL_FACTOR: f64 = 0.63;
pub const NEEDLE_HEAD_FACTOR: f64 = 0.85;
pub const NEEDLE_SHOULDER_FACTOR: f64 = 0.12;
pub const NEEDLE_TAIL_FACTOR: f64 = 0.28;
pub const PIVOT_FACTOR: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Point on a circle around `center` in dial angles: 0° points left and
/// angles grow clockwise on screen, so 90° is straight up.
pub fn dial_point(center: Point, radius: f64, degrees: f64) -> Point {
    let angle = degrees.to_radians();
    Point::new(
        center.x - radius * angle.cos(),
        center.y - radius * angle.sin(),
    )
}

/// Per-draw geometry of a gauge: where the dial sits and how values map onto it.
///
/// Built from the container size and the configured range, then used as the
/// single source for every coordinate in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeGeometry {
    pub center: Point,
    pub radius: f64,
    pub font_size: f64,
    pub min: f64,
    pub max: f64,
}

impl GaugeGeometry {
    pub fn new(width: u32, height: u32, config: &GaugeConfig) -> Result<Self> {
        config.validate()?;
        if width == 0 || height == 0 {
            return Err(GaugeError::EmptyContainer { width, height });
        }

        // Pixel snapping: the dial box is 95% of the container, in whole pixels.
        let gauge_width = (width as f64 * 0.95).trunc();
        let gauge_height = (height as f64 * 0.95).trunc();
        let radius = (gauge_width / 2.0).trunc().min((gauge_height / 2.0).trunc());

        Ok(Self {
            center: Point::new((width / 2) as f64, (height / 2) as f64),
            radius,
            font_size: (radius / 9.0).floor(),
            min: config.min_value,
            max: config.max_value,
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn degrees_for(&self, value: f64) -> f64 {
        (value - self.min) / self.range() * SWEEP_DEGREES + START_DEGREES
    }

    pub fn radians_for(&self, value: f64) -> f64 {
        self.degrees_for(value).to_radians()
    }

    /// Point at `value`'s angle on a circle of `radius_factor * radius`.
    pub fn point_for(&self, value: f64, radius_factor: f64) -> Point {
        dial_point(self.center, self.radius * radius_factor, self.degrees_for(value))
    }

    /// Value used for needle placement. Missing or NaN readings rest at `min`.
    pub fn clamp(&self, value: Option<f64>) -> f64 {
        match value {
            Some(v) if !v.is_nan() => v.clamp(self.min, self.max),
            _ => self.min,
        }
    }

    pub fn warning_zone(&self) -> (f64, f64) {
        let range = self.range();
        (self.min + range * 0.75, self.min + range * 0.9)
    }

    pub fn critical_zone(&self) -> (f64, f64) {
        (self.min + self.range() * 0.9, self.max)
    }

    pub fn major_ticks(&self) -> Vec<f64> {
        let delta = self.range() / MAJOR_INTERVALS as f64;
        (0..=MAJOR_INTERVALS)
            .map(|i| {
                if i == MAJOR_INTERVALS {
                    self.max
                } else {
                    self.min + delta * i as f64
                }
            })
            .collect()
    }

    /// Minor tick values, excluding positions already covered by a major tick.
    pub fn minor_ticks(&self) -> Vec<f64> {
        let major_delta = self.range() / MAJOR_INTERVALS as f64;
        let minor_delta = major_delta / MINOR_SUBDIVISIONS as f64;
        self.major_ticks()
            .iter()
            .take(MAJOR_INTERVALS)
            .flat_map(|major| (1..MINOR_SUBDIVISIONS).map(move |j| major + minor_delta * j as f64))
            .collect()
    }

    /// Outline of the needle for an already clamped value.
    ///
    /// Order is head, head shoulder, tail shoulder, tail, tail shoulder,
    /// head shoulder, head; the tail sits half a turn away from the head.
    pub fn pointer_path(&self, value: f64) -> [Point; 7] {
        let range = self.range();
        let delta = range / 13.0;
        let tail_value = value - range * (1.0 / (SWEEP_DEGREES / 360.0)) / 2.0;

        let head = self.point_for(value, NEEDLE_HEAD_FACTOR);
        let head1 = self.point_for(value - delta, NEEDLE_SHOULDER_FACTOR);
        let head2 = self.point_for(value + delta, NEEDLE_SHOULDER_FACTOR);
        let tail = self.point_for(tail_value, NEEDLE_TAIL_FACTOR);
        let tail1 = self.point_for(tail_value - delta, NEEDLE_SHOULDER_FACTOR);
        let tail2 = self.point_for(tail_value + delta, NEEDLE_SHOULDER_FACTOR);

        [head, head1, tail2, tail, tail1, head2, head]
    }
}
