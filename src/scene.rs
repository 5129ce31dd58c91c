use crate::config::Color;
use crate::geometry::Point;

// ============================================================================
// SCENE NODES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Paint applied to a closed shape or a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Option<Color>,
    pub fill_opacity: f32,
    pub stroke: Option<Color>,
    pub stroke_width: f32,
}

impl Style {
    pub fn fill(color: Color) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    pub fn stroke(color: Color, width: f32) -> Self {
        Self {
            stroke: Some(color),
            stroke_width: width,
            ..Self::default()
        }
    }

    pub fn with_stroke(mut self, color: Color, width: f32) -> Self {
        self.stroke = Some(color);
        self.stroke_width = width;
        self
    }

    pub fn with_fill_opacity(mut self, opacity: f32) -> Self {
        self.fill_opacity = opacity;
        self
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            fill_opacity: 1.0,
            stroke: None,
            stroke_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Circle {
        center: Point,
        radius: f64,
        class: Option<&'static str>,
        style: Style,
    },
    /// Ring segment between two radii, angles in dial degrees.
    Sector {
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_degrees: f64,
        end_degrees: f64,
        fill: Color,
    },
    Line {
        from: Point,
        to: Point,
        class: Option<&'static str>,
        color: Color,
        width: f32,
    },
    Text {
        position: Point,
        dy: f64,
        text: String,
        anchor: TextAnchor,
        font_size: f64,
        class: Option<&'static str>,
        color: Color,
    },
    Path {
        commands: Vec<PathCommand>,
        style: Style,
    },
    Group {
        class: Option<&'static str>,
        children: Vec<SceneNode>,
    },
}

impl SceneNode {
    pub fn class(&self) -> Option<&'static str> {
        match self {
            SceneNode::Circle { class, .. }
            | SceneNode::Line { class, .. }
            | SceneNode::Text { class, .. }
            | SceneNode::Group { class, .. } => *class,
            SceneNode::Sector { .. } | SceneNode::Path { .. } => None,
        }
    }
}

// ============================================================================
// BASIS CURVE
// ============================================================================

const BEZIER1: [f64; 4] = [0.0, 2.0 / 3.0, 1.0 / 3.0, 0.0];
const BEZIER2: [f64; 4] = [0.0, 1.0 / 3.0, 2.0 / 3.0, 0.0];
const BEZIER3: [f64; 4] = [0.0, 1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0];

fn dot4(weights: [f64; 4], xs: [f64; 4], ys: [f64; 4]) -> Point {
    let dot = |v: [f64; 4]| weights.iter().zip(v).map(|(w, c)| w * c).sum::<f64>();
    Point::new(dot(xs), dot(ys))
}

/// Smooths `points` into a uniform cubic B-spline that starts and ends on the
/// first and last points, emitted as Bézier segments.
///
/// Fewer than three points fall back to straight segments.
pub fn basis_curve(points: &[Point]) -> Vec<PathCommand> {
    let Some((&first, rest)) = points.split_first() else {
        return Vec::new();
    };
    if points.len() < 3 {
        return std::iter::once(PathCommand::MoveTo(first))
            .chain(rest.iter().map(|p| PathCommand::LineTo(*p)))
            .collect();
    }

    let n = points.len();
    let last = points[n - 1];
    let mut xs = [first.x, first.x, first.x, points[1].x];
    let mut ys = [first.y, first.y, first.y, points[1].y];

    let mut commands = vec![
        PathCommand::MoveTo(first),
        PathCommand::LineTo(dot4(BEZIER3, xs, ys)),
    ];
    for i in 2..=n {
        // The last point is repeated once to pull the curve onto it.
        let p = points.get(i).copied().unwrap_or(last);
        xs.rotate_left(1);
        ys.rotate_left(1);
        xs[3] = p.x;
        ys[3] = p.y;
        commands.push(PathCommand::CubicTo(
            dot4(BEZIER1, xs, ys),
            dot4(BEZIER2, xs, ys),
            dot4(BEZIER3, xs, ys),
        ));
    }
    commands.push(PathCommand::LineTo(last));
    commands
}

// ============================================================================
// SCENE & CONTAINER
// ============================================================================

/// One complete drawing of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            font_family: "sans-serif".to_string(),
            nodes: Vec::new(),
        }
    }

    pub fn with_font_family(mut self, font_family: &str) -> Self {
        self.font_family = font_family.to_string();
        self
    }

    pub fn add_node(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    /// Depth-first walk over every node, groups included.
    pub fn walk(&self) -> impl Iterator<Item = &SceneNode> {
        let mut stack: Vec<&SceneNode> = self.nodes.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            if let SceneNode::Group { children, .. } = node {
                stack.extend(children.iter().rev());
            }
            Some(node)
        })
    }

    pub fn count_class(&self, class: &str) -> usize {
        self.walk().filter(|node| node.class() == Some(class)).count()
    }
}

/// Drawing surface a host hands to a chart. Charts append scenes to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub width: u32,
    pub height: u32,
    pub scenes: Vec<Scene>,
}

impl Container {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scenes: Vec::new(),
        }
    }

    pub fn append(&mut self, scene: Scene) {
        self.scenes.push(scene);
    }

    pub fn clear(&mut self) {
        self.scenes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn basis_curve_starts_and_ends_on_endpoints() {
        let points = [pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)];
        let commands = basis_curve(&points);

        assert_eq!(commands.first(), Some(&PathCommand::MoveTo(points[0])));
        assert_eq!(commands.last(), Some(&PathCommand::LineTo(points[3])));
        // move, lead-in line, one cubic per remaining point plus the repeat, final line
        assert_eq!(commands.len(), 2 + points.len() - 1 + 1);
    }

    #[test]
    fn basis_curve_lead_in_matches_spline_weights() {
        let commands = basis_curve(&[pt(0.0, 0.0), pt(6.0, 12.0), pt(12.0, 0.0)]);
        match commands[1] {
            PathCommand::LineTo(p) => {
                assert!((p.x - 1.0).abs() < 1e-9 && (p.y - 2.0).abs() < 1e-9);
            }
            other => panic!("expected line, got {other:?}"),
        }
        match commands[2] {
            PathCommand::CubicTo(c1, c2, end) => {
                assert!((c1.x - 2.0).abs() < 1e-9 && (c1.y - 4.0).abs() < 1e-9);
                assert!((c2.x - 4.0).abs() < 1e-9 && (c2.y - 8.0).abs() < 1e-9);
                assert!((end.x - 6.0).abs() < 1e-9 && (end.y - 8.0).abs() < 1e-9);
            }
            other => panic!("expected cubic, got {other:?}"),
        }
    }

    #[test]
    fn short_inputs_fall_back_to_lines() {
        assert!(basis_curve(&[]).is_empty());
        assert_eq!(
            basis_curve(&[pt(1.0, 1.0), pt(2.0, 2.0)]),
            vec![
                PathCommand::MoveTo(pt(1.0, 1.0)),
                PathCommand::LineTo(pt(2.0, 2.0))
            ]
        );
    }

    #[test]
    fn walk_descends_into_groups() {
        let mut scene = Scene::new(10, 10);
        scene.add_node(SceneNode::Group {
            class: Some("outer"),
            children: vec![SceneNode::Line {
                from: pt(0.0, 0.0),
                to: pt(1.0, 1.0),
                class: Some("tick"),
                color: Color::new(0, 0, 0),
                width: 1.0,
            }],
        });
        assert_eq!(scene.walk().count(), 2);
        assert_eq!(scene.count_class("tick"), 1);
    }

    #[test]
    fn container_keeps_appended_scenes() {
        let mut container = Container::new(20, 10);
        assert!(container.is_empty());
        container.append(Scene::new(20, 10));
        container.append(Scene::new(20, 10));
        assert_eq!(container.scenes.len(), 2);
        container.clear();
        assert!(container.is_empty());
    }
}
