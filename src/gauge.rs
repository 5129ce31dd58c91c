use crate::config::{Color, GaugeConfig, Theme};
use crate::data::{extract_scalar, ChartData};
use crate::error::Result;
use crate::geometry::{
    GaugeGeometry, INNER_CIRCLE_FACTOR, MAJOR_TICK_FACTOR, MINOR_TICK_FACTOR, PIVOT_FACTOR,
    TICK_LABEL_FACTOR, TICK_OUTER_FACTOR, ZONE_INNER_FACTOR, ZONE_OUTER_FACTOR,
};
use crate::scene::{basis_curve, Container, Scene, SceneNode, Style, TextAnchor};

/// Circular gauge chart: one needle over a fixed range with warning and
/// critical zones.
#[derive(Debug, Clone)]
pub struct GaugeChart {
    config: GaugeConfig,
}

impl GaugeChart {
    pub fn new(config: GaugeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    /// Appends one gauge scene to `container`.
    ///
    /// Each call appends again; hosts that redraw should clear the container
    /// first. Nothing is appended when the range or container is unusable.
    pub fn draw(&self, container: &mut Container, value: Option<f64>) -> Result<()> {
        let scene = self.build_scene(container.width, container.height, value)?;
        container.append(scene);
        Ok(())
    }

    /// Draws the reading found in a chart query result.
    pub fn draw_data(&self, container: &mut Container, data: &ChartData) -> Result<()> {
        self.draw(container, extract_scalar(data))
    }

    pub fn build_scene(&self, width: u32, height: u32, value: Option<f64>) -> Result<Scene> {
        let geometry = GaugeGeometry::new(width, height, &self.config)?;
        let theme = &self.config.theme;

        if is_missing(value) {
            tracing::warn!(metric = %self.config.metric_name, "no value to display, needle rests at min");
        }
        let needle_value = geometry.clamp(value);
        tracing::debug!(width, height, ?value, needle_value, radius = geometry.radius, "drawing gauge");

        let mut scene = Scene::new(width, height).with_font_family(&theme.font_family);
        add_wrapping_circles(&mut scene, &geometry, theme);
        add_title(&mut scene, &geometry, &self.config.metric_name, theme);

        let (warning_start, warning_end) = geometry.warning_zone();
        add_color_zone(&mut scene, &geometry, warning_start, warning_end, theme.warning_color);
        let (critical_start, critical_end) = geometry.critical_zone();
        add_color_zone(&mut scene, &geometry, critical_start, critical_end, theme.critical_color);

        add_ticks(&mut scene, &geometry, theme);
        add_needle(&mut scene, &geometry, needle_value, theme);

        Ok(scene)
    }
}

// Helper functions building each layer of the dial

fn add_wrapping_circles(scene: &mut Scene, geometry: &GaugeGeometry, theme: &Theme) {
    scene.add_node(SceneNode::Circle {
        center: geometry.center,
        radius: geometry.radius,
        class: Some("bounding-circle"),
        style: Style::fill(theme.bounding_fill)
            .with_stroke(theme.bounding_stroke, theme.bounding_stroke_width),
    });
    scene.add_node(SceneNode::Circle {
        center: geometry.center,
        radius: INNER_CIRCLE_FACTOR * geometry.radius,
        class: Some("inner-circle"),
        style: Style {
            fill: theme.inner_fill,
            ..Style::stroke(theme.inner_stroke, theme.inner_stroke_width)
        },
    });
}

fn add_title(scene: &mut Scene, geometry: &GaugeGeometry, title: &str, theme: &Theme) {
    scene.add_node(SceneNode::Text {
        position: geometry.center.offset(0.0, -geometry.radius / 2.0),
        dy: geometry.font_size / 2.0,
        text: title.to_string(),
        anchor: TextAnchor::Middle,
        font_size: geometry.font_size,
        class: Some("gauge-name"),
        color: theme.title_color,
    });
}

fn add_color_zone(scene: &mut Scene, geometry: &GaugeGeometry, start: f64, end: f64, color: Color) {
    if end - start <= 0.0 {
        return;
    }
    scene.add_node(SceneNode::Sector {
        center: geometry.center,
        inner_radius: ZONE_INNER_FACTOR * geometry.radius,
        outer_radius: ZONE_OUTER_FACTOR * geometry.radius,
        start_degrees: geometry.degrees_for(start),
        end_degrees: geometry.degrees_for(end),
        fill: color,
    });
}

fn add_ticks(scene: &mut Scene, geometry: &GaugeGeometry, theme: &Theme) {
    for minor in geometry.minor_ticks() {
        scene.add_node(SceneNode::Line {
            from: geometry.point_for(minor, MINOR_TICK_FACTOR),
            to: geometry.point_for(minor, TICK_OUTER_FACTOR),
            class: Some("tick"),
            color: theme.minor_tick_color,
            width: theme.minor_tick_width,
        });
    }

    for major in geometry.major_ticks() {
        scene.add_node(SceneNode::Line {
            from: geometry.point_for(major, MAJOR_TICK_FACTOR),
            to: geometry.point_for(major, TICK_OUTER_FACTOR),
            class: Some("tick thick"),
            color: theme.major_tick_color,
            width: theme.major_tick_width,
        });
    }

    // Only the range bounds get numbers.
    for (value, anchor) in [
        (geometry.min, TextAnchor::Start),
        (geometry.max, TextAnchor::End),
    ] {
        scene.add_node(SceneNode::Text {
            position: geometry.point_for(value, TICK_LABEL_FACTOR),
            dy: geometry.font_size / 3.0,
            text: format_value(value),
            anchor,
            font_size: geometry.font_size,
            class: Some("tick-values"),
            color: theme.tick_label_color,
        });
    }
}

fn add_needle(scene: &mut Scene, geometry: &GaugeGeometry, value: f64, theme: &Theme) {
    let outline = geometry.pointer_path(value);
    let pointer = SceneNode::Path {
        commands: basis_curve(&outline),
        style: Style::fill(theme.needle_fill)
            .with_fill_opacity(theme.needle_fill_opacity)
            .with_stroke(theme.needle_stroke, 1.0),
    };
    let pivot = SceneNode::Circle {
        center: geometry.center,
        radius: PIVOT_FACTOR * geometry.radius,
        class: None,
        style: Style::fill(theme.pivot_fill).with_stroke(theme.pivot_stroke, 1.0),
    };
    scene.add_node(SceneNode::Group {
        class: Some("pointerContainer"),
        children: vec![pointer, pivot],
    });
}

/// True when a reading cannot place the needle and it falls back to `min`.
fn is_missing(value: Option<f64>) -> bool {
    value.map_or(true, f64::is_nan)
}

/// Formats a bound the way a dashboard prints numbers: integers without a
/// fractional part, and exponent form (`1e+21`, `5e-7`) once the magnitude
/// reaches 1e21 or drops below 1e-6.
pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        // Also covers -0.
        return "0".to_string();
    }
    let magnitude = value.abs();
    if value.is_finite() && (magnitude >= 1e21 || magnitude < 1e-6) {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    format!("{value}")
}
