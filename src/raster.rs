//! Software rasterizer for chart scenes into RGBA8 frames.

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::config::Color;
use crate::error::{GaugeError, Result};
use crate::geometry::Point;
use crate::scene::{PathCommand, Scene, SceneNode, Style, TextAnchor};

const CURVE_SEGMENTS: usize = 16;
const SUBSCANLINES: usize = 4;

pub fn load_font(data: Vec<u8>) -> Result<Font<'static>> {
    Font::try_from_vec(data).ok_or_else(|| GaugeError::Font("unsupported font data".to_string()))
}

/// Renders a scene into a freshly allocated frame cleared to `background`.
pub fn render_to_frame(scene: &Scene, background: Color, font: Option<&Font>) -> Vec<u8> {
    let (width, height) = (scene.width as usize, scene.height as usize);
    let mut frame = vec![0u8; width * height * 4];
    let mut canvas = Canvas::new(&mut frame, width, height);
    canvas.clear(background);
    canvas.render_scene(scene, font);
    frame
}

// ============================================================================
// CANVAS
// ============================================================================

pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    pub fn render_scene(&mut self, scene: &Scene, font: Option<&Font>) {
        if font.is_none() {
            tracing::debug!("no font loaded, skipping text nodes");
        }
        for node in &scene.nodes {
            self.render_node(node, font);
        }
    }

    fn render_node(&mut self, node: &SceneNode, font: Option<&Font>) {
        match node {
            SceneNode::Circle {
                center,
                radius,
                style,
                ..
            } => {
                if let Some(fill) = style.fill {
                    self.fill_circle(*center, *radius, fill, style.fill_opacity);
                }
                if let Some(stroke) = style.stroke {
                    self.stroke_circle(*center, *radius, style.stroke_width as f64, stroke);
                }
            }
            SceneNode::Sector {
                center,
                inner_radius,
                outer_radius,
                start_degrees,
                end_degrees,
                fill,
            } => {
                self.fill_sector(
                    *center,
                    *inner_radius,
                    *outer_radius,
                    *start_degrees,
                    *end_degrees,
                    *fill,
                );
            }
            SceneNode::Line {
                from, to, color, width, ..
            } => {
                self.draw_thick_line_aa(*from, *to, *width as f64, *color);
            }
            SceneNode::Text {
                position,
                dy,
                text,
                anchor,
                font_size,
                color,
                ..
            } => {
                if let Some(font) = font {
                    self.draw_text(font, position.offset(0.0, *dy), text, *anchor, *font_size, *color);
                }
            }
            SceneNode::Path { commands, style } => {
                self.draw_path(commands, style);
            }
            SceneNode::Group { children, .. } => {
                for child in children {
                    self.render_node(child, font);
                }
            }
        }
    }

    fn set_pixel(&mut self, x: i64, y: i64, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let a = alpha.clamp(0.0, 1.0);
        let src = [color.r as f32, color.g as f32, color.b as f32];
        for (channel, value) in src.iter().enumerate() {
            let dst = self.frame[idx + channel] as f32;
            self.frame[idx + channel] = (value * a + dst * (1.0 - a)).round() as u8;
        }
        self.frame[idx + 3] = 0xff;
    }

    fn bounds(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> (i64, i64, i64, i64) {
        (
            (min_x.floor() as i64 - 1).max(0),
            (min_y.floor() as i64 - 1).max(0),
            (max_x.ceil() as i64 + 1).min(self.width as i64 - 1),
            (max_y.ceil() as i64 + 1).min(self.height as i64 - 1),
        )
    }

    // ------------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------------

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color, opacity: f32) {
        let (x0, y0, x1, y1) = self.bounds(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        );
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dist = Point::new(x as f64 + 0.5, y as f64 + 0.5).distance(center);
                let aa = (radius + 0.5 - dist).clamp(0.0, 1.0) as f32;
                if aa > 0.01 {
                    self.set_pixel(x, y, color, aa * opacity);
                }
            }
        }
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Color) {
        let reach = radius + width / 2.0 + 1.0;
        let (x0, y0, x1, y1) = self.bounds(
            center.x - reach,
            center.y - reach,
            center.x + reach,
            center.y + reach,
        );
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dist = Point::new(x as f64 + 0.5, y as f64 + 0.5).distance(center);
                let aa = (width / 2.0 + 0.5 - (dist - radius).abs()).clamp(0.0, 1.0) as f32;
                if aa > 0.01 {
                    self.set_pixel(x, y, color, aa);
                }
            }
        }
    }

    fn fill_sector(
        &mut self,
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_degrees: f64,
        end_degrees: f64,
        color: Color,
    ) {
        let span = end_degrees - start_degrees;
        let (x0, y0, x1, y1) = self.bounds(
            center.x - outer_radius,
            center.y - outer_radius,
            center.x + outer_radius,
            center.y + outer_radius,
        );
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                let dist = Point::new(px, py).distance(center);
                let radial = ((dist - inner_radius + 0.5).min(outer_radius + 0.5 - dist))
                    .clamp(0.0, 1.0) as f32;
                if radial <= 0.01 {
                    continue;
                }
                // Inverse of the dial mapping: 0° left of center, clockwise.
                let angle = (center.y - py).atan2(center.x - px).to_degrees();
                let offset = (angle - start_degrees).rem_euclid(360.0);
                if offset <= span {
                    self.set_pixel(x, y, color, radial);
                }
            }
        }
    }

    fn draw_thick_line_aa(&mut self, from: Point, to: Point, thickness: f64, color: Color) {
        let (x0, y0, x1, y1) = self.bounds(
            from.x.min(to.x) - thickness,
            from.y.min(to.y) - thickness,
            from.x.max(to.x) + thickness,
            from.y.max(to.y) + thickness,
        );
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len_sq = dx * dx + dy * dy;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                let t = if len_sq > 0.0 {
                    (((px - from.x) * dx + (py - from.y) * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let nearest = Point::new(from.x + t * dx, from.y + t * dy);
                let dist = nearest.distance(Point::new(px, py));
                let aa = (thickness / 2.0 + 0.5 - dist).clamp(0.0, 1.0) as f32;
                if aa > 0.01 {
                    self.set_pixel(x, y, color, aa);
                }
            }
        }
    }

    fn draw_path(&mut self, commands: &[PathCommand], style: &Style) {
        let outline = flatten(commands);
        if outline.len() < 2 {
            return;
        }
        if let Some(fill) = style.fill {
            self.fill_polygon(&outline, fill, style.fill_opacity);
        }
        if let Some(stroke) = style.stroke {
            for segment in outline.windows(2) {
                self.draw_thick_line_aa(segment[0], segment[1], style.stroke_width as f64, stroke);
            }
        }
    }

    /// Even-odd scanline fill with vertical supersampling.
    fn fill_polygon(&mut self, outline: &[Point], color: Color, opacity: f32) {
        let (min_y, max_y) = outline
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        let (min_x, max_x) = outline
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        let (x0, y0, x1, y1) = self.bounds(min_x, min_y, max_x, max_y);
        if x1 < x0 {
            return;
        }

        let mut coverage = vec![0.0f32; (x1 - x0 + 1) as usize];
        for y in y0..=y1 {
            coverage.iter_mut().for_each(|c| *c = 0.0);
            for sub in 0..SUBSCANLINES {
                let sy = y as f64 + (sub as f64 + 0.5) / SUBSCANLINES as f64;
                let mut crossings = scanline_crossings(outline, sy);
                crossings.sort_by(|a, b| a.total_cmp(b));
                for span in crossings.chunks_exact(2) {
                    let start = ((span[0] - 0.5).ceil() as i64).max(x0);
                    let end = ((span[1] - 0.5).floor() as i64).min(x1);
                    for x in start..=end {
                        coverage[(x - x0) as usize] += 1.0 / SUBSCANLINES as f32;
                    }
                }
            }
            for (i, c) in coverage.iter().enumerate() {
                if *c > 0.0 {
                    self.set_pixel(x0 + i as i64, y, color, c * opacity);
                }
            }
        }
    }

    fn draw_text(
        &mut self,
        font: &Font,
        baseline: Point,
        text: &str,
        anchor: TextAnchor,
        font_size: f64,
        color: Color,
    ) {
        if text.is_empty() || font_size <= 0.0 {
            return;
        }
        let scale = Scale::uniform(font_size as f32);
        let width = text_width(font, text, scale);
        let start_x = match anchor {
            TextAnchor::Start => baseline.x,
            TextAnchor::Middle => baseline.x - width / 2.0,
            TextAnchor::End => baseline.x - width,
        };
        let glyphs: Vec<PositionedGlyph> = font
            .layout(text, scale, point(start_x as f32, baseline.y as f32))
            .collect();
        for glyph in glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                let mut coverage = Vec::new();
                glyph.draw(|gx, gy, v| {
                    coverage.push((bb.min.x as i64 + gx as i64, bb.min.y as i64 + gy as i64, v));
                });
                for (x, y, v) in coverage {
                    if v > 0.01 {
                        self.set_pixel(x, y, color, v);
                    }
                }
            }
        }
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn text_width(font: &Font, text: &str, scale: Scale) -> f64 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| (g.position().x + g.unpositioned().h_metrics().advance_width) as f64)
        .unwrap_or(0.0)
}

/// Flattens path commands into a polyline.
pub fn flatten(commands: &[PathCommand]) -> Vec<Point> {
    let mut points: Vec<Point> = Vec::new();
    for command in commands {
        match *command {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => points.push(p),
            PathCommand::CubicTo(c1, c2, end) => {
                let Some(&start) = points.last() else {
                    points.push(end);
                    continue;
                };
                for i in 1..=CURVE_SEGMENTS {
                    let t = i as f64 / CURVE_SEGMENTS as f64;
                    let mt = 1.0 - t;
                    let a = mt * mt * mt;
                    let b = 3.0 * mt * mt * t;
                    let c = 3.0 * mt * t * t;
                    let d = t * t * t;
                    points.push(Point::new(
                        a * start.x + b * c1.x + c * c2.x + d * end.x,
                        a * start.y + b * c1.y + c * c2.y + d * end.y,
                    ));
                }
            }
        }
    }
    points
}

fn scanline_crossings(outline: &[Point], y: f64) -> Vec<f64> {
    let n = outline.len();
    (0..n)
        .filter_map(|i| {
            let a = outline[i];
            let b = outline[(i + 1) % n];
            if (a.y <= y && b.y > y) || (b.y <= y && a.y > y) {
                Some(a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const WHITE: Color = Color::new(0xff, 0xff, 0xff);
    const RED: Color = Color::new(0xff, 0x00, 0x00);

    fn pixel(frame: &[u8], width: usize, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * width + x) * 4;
        [frame[idx], frame[idx + 1], frame[idx + 2], frame[idx + 3]]
    }

    #[test]
    fn clear_fills_opaque_background() {
        let scene = Scene::new(4, 3);
        let frame = render_to_frame(&scene, Color::new(1, 2, 3), None);
        assert_eq!(frame.len(), 4 * 3 * 4);
        assert!(frame.chunks_exact(4).all(|p| p == [1, 2, 3, 0xff]));
    }

    #[test]
    fn filled_circle_covers_center_only() {
        let mut scene = Scene::new(40, 40);
        scene.add_node(SceneNode::Circle {
            center: Point::new(20.0, 20.0),
            radius: 5.0,
            class: None,
            style: Style::fill(RED),
        });
        let frame = render_to_frame(&scene, WHITE, None);
        assert_eq!(pixel(&frame, 40, 20, 20), [0xff, 0, 0, 0xff]);
        assert_eq!(pixel(&frame, 40, 2, 2), [0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn sector_fills_only_its_angles() {
        let mut scene = Scene::new(100, 100);
        // 45° to 135° covers the top of the ring.
        scene.add_node(SceneNode::Sector {
            center: Point::new(50.0, 50.0),
            inner_radius: 30.0,
            outer_radius: 40.0,
            start_degrees: 45.0,
            end_degrees: 135.0,
            fill: RED,
        });
        let frame = render_to_frame(&scene, WHITE, None);
        assert_eq!(pixel(&frame, 100, 50, 15), [0xff, 0, 0, 0xff]);
        // bottom of ring and the hole stay white
        assert_eq!(pixel(&frame, 100, 50, 85), [0xff, 0xff, 0xff, 0xff]);
        assert_eq!(pixel(&frame, 100, 50, 50), [0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn polygon_fill_respects_opacity() {
        let mut scene = Scene::new(20, 20);
        scene.add_node(SceneNode::Path {
            commands: vec![
                PathCommand::MoveTo(Point::new(2.0, 2.0)),
                PathCommand::LineTo(Point::new(18.0, 2.0)),
                PathCommand::LineTo(Point::new(18.0, 18.0)),
                PathCommand::LineTo(Point::new(2.0, 18.0)),
                PathCommand::LineTo(Point::new(2.0, 2.0)),
            ],
            style: Style::fill(Color::new(0, 0, 0)).with_fill_opacity(0.5),
        });
        let frame = render_to_frame(&scene, WHITE, None);
        let [r, g, b, a] = pixel(&frame, 20, 10, 10);
        assert_eq!((r, g, b, a), (128, 128, 128, 0xff));
        assert_eq!(pixel(&frame, 20, 0, 0), [0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn flatten_ends_on_curve_endpoint() {
        let points = flatten(&[
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::CubicTo(
                Point::new(0.0, 10.0),
                Point::new(10.0, 10.0),
                Point::new(10.0, 0.0),
            ),
        ]);
        assert_eq!(points.len(), 1 + CURVE_SEGMENTS);
        let last = points[points.len() - 1];
        assert!(last.distance(Point::new(10.0, 0.0)) < 1e-9);
    }

    #[test]
    fn rejects_garbage_font_data() {
        assert_matches!(load_font(vec![0, 1, 2, 3]), Err(GaugeError::Font(_)));
    }
}
