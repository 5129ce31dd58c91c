//! SVG output for chart scenes.
//!
//! Every node keeps its CSS class so dashboard stylesheets can restyle the
//! gauge; inline styles carry the theme values as the baseline.

use std::fmt::Write as _;

use crate::geometry::dial_point;
use crate::scene::{Container, PathCommand, Scene, SceneNode, Style};

/// Serializes one scene as a standalone SVG document.
pub fn to_svg(scene: &Scene) -> String {
    let mut svg = String::new();
    write_header(&mut svg, scene.width, scene.height);
    write_scene_group(&mut svg, scene);
    svg.push_str("</svg>\n");
    svg
}

impl Container {
    /// Serializes every appended scene, in order, into one SVG document.
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        write_header(&mut svg, self.width, self.height);
        for scene in &self.scenes {
            write_scene_group(&mut svg, scene);
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn write_header(svg: &mut String, width: u32, height: u32) {
    svg.push_str(&format!(
        r#"<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">"#
    ));
    svg.push('\n');
}

fn write_scene_group(svg: &mut String, scene: &Scene) {
    svg.push_str(&format!(
        r#"<g font-family="{}">"#,
        escape(&scene.font_family)
    ));
    svg.push('\n');
    for node in &scene.nodes {
        write_node(svg, node, 1);
    }
    svg.push_str("</g>\n");
}

fn write_node(svg: &mut String, node: &SceneNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        SceneNode::Circle {
            center,
            radius,
            class,
            style,
        } => {
            svg.push_str(&format!(
                r#"{indent}<circle{} cx="{}" cy="{}" r="{}" style="{}"/>"#,
                class_attr(*class),
                num(center.x),
                num(center.y),
                num(*radius),
                style_attr(style)
            ));
        }
        SceneNode::Sector {
            center,
            inner_radius,
            outer_radius,
            start_degrees,
            end_degrees,
            fill,
        } => {
            let large_arc = u8::from((end_degrees - start_degrees).abs() > 180.0);
            let outer_start = dial_point(*center, *outer_radius, *start_degrees);
            let outer_end = dial_point(*center, *outer_radius, *end_degrees);
            let inner_end = dial_point(*center, *inner_radius, *end_degrees);
            let inner_start = dial_point(*center, *inner_radius, *start_degrees);
            // Dial angles grow clockwise on screen, which is SVG's sweep flag 1.
            svg.push_str(&format!(
                r#"{indent}<path d="M{},{}A{r},{r} 0 {large_arc},1 {},{}L{},{}A{ir},{ir} 0 {large_arc},0 {},{}Z" style="fill:{fill}"/>"#,
                num(outer_start.x),
                num(outer_start.y),
                num(outer_end.x),
                num(outer_end.y),
                num(inner_end.x),
                num(inner_end.y),
                num(inner_start.x),
                num(inner_start.y),
                r = num(*outer_radius),
                ir = num(*inner_radius),
            ));
        }
        SceneNode::Line {
            from,
            to,
            class,
            color,
            width,
        } => {
            svg.push_str(&format!(
                r#"{indent}<line{} x1="{}" y1="{}" x2="{}" y2="{}" style="stroke:{color};stroke-width:{}px"/>"#,
                class_attr(*class),
                num(from.x),
                num(from.y),
                num(to.x),
                num(to.y),
                num(*width as f64)
            ));
        }
        SceneNode::Text {
            position,
            dy,
            text,
            anchor,
            font_size,
            class,
            color,
        } => {
            svg.push_str(&format!(
                r#"{indent}<text{} x="{}" y="{}" dy="{}" text-anchor="{}" style="font-size:{}px;fill:{color};stroke-width:0px">{}</text>"#,
                class_attr(*class),
                num(position.x),
                num(position.y),
                num(*dy),
                anchor.as_str(),
                num(*font_size),
                escape(text)
            ));
        }
        SceneNode::Path { commands, style } => {
            svg.push_str(&format!(
                r#"{indent}<path d="{}" style="{}"/>"#,
                path_data(commands),
                style_attr(style)
            ));
        }
        SceneNode::Group { class, children } => {
            svg.push_str(&format!("{indent}<g{}>\n", class_attr(*class)));
            for child in children {
                write_node(svg, child, depth + 1);
            }
            svg.push_str(&format!("{indent}</g>"));
        }
    }
    svg.push('\n');
}

pub fn path_data(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    for command in commands {
        // Writing into a String never fails.
        let _ = match command {
            PathCommand::MoveTo(p) => write!(d, "M{},{}", num(p.x), num(p.y)),
            PathCommand::LineTo(p) => write!(d, "L{},{}", num(p.x), num(p.y)),
            PathCommand::CubicTo(c1, c2, p) => write!(
                d,
                "C{},{},{},{},{},{}",
                num(c1.x),
                num(c1.y),
                num(c2.x),
                num(c2.y),
                num(p.x),
                num(p.y)
            ),
        };
    }
    d
}

fn style_attr(style: &Style) -> String {
    let mut parts = Vec::new();
    match style.fill {
        Some(fill) => parts.push(format!("fill:{fill}")),
        None => parts.push("fill:none".to_string()),
    }
    if style.fill_opacity < 1.0 {
        parts.push(format!("fill-opacity:{}", num(style.fill_opacity as f64)));
    }
    if let Some(stroke) = style.stroke {
        parts.push(format!("stroke:{stroke}"));
        parts.push(format!("stroke-width:{}px", num(style.stroke_width as f64)));
    }
    parts.join(";")
}

fn class_attr(class: Option<&str>) -> String {
    class
        .map(|c| format!(r#" class="{}""#, escape(c)))
        .unwrap_or_default()
}

/// Compact coordinate: at most three decimals, no trailing zeros.
fn num(value: f64) -> String {
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        _ => s.to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Color;
    use crate::geometry::Point;

    #[test]
    fn formats_numbers_compactly() {
        assert_eq!(num(10.0), "10");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(1.23456), "1.235");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(-2.5), "-2.5");
    }

    #[test]
    fn escapes_text_content() {
        assert_eq!(escape(r#"a<b & "c""#), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn writes_path_commands() {
        let d = path_data(&[
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::LineTo(Point::new(1.5, 2.0)),
            PathCommand::CubicTo(
                Point::new(1.0, 1.0),
                Point::new(2.0, 2.0),
                Point::new(3.0, 3.0),
            ),
        ]);
        assert_eq!(d, "M0,0L1.5,2C1,1,2,2,3,3");
    }

    #[test]
    fn styles_list_fill_and_stroke() {
        let style = Style::fill(Color::new(0xdc, 0x39, 0x12))
            .with_fill_opacity(0.7)
            .with_stroke(Color::new(0xc6, 0x33, 0x10), 1.0);
        assert_eq!(
            style_attr(&style),
            "fill:#dc3912;fill-opacity:0.7;stroke:#c63310;stroke-width:1px"
        );
        assert_eq!(
            style_attr(&Style::stroke(Color::new(0xe0, 0xe0, 0xe0), 2.0)),
            "fill:none;stroke:#e0e0e0;stroke-width:2px"
        );
    }

    #[test]
    fn document_wraps_scene_nodes() {
        let mut scene = Scene::new(120, 80);
        scene.add_node(SceneNode::Circle {
            center: Point::new(60.0, 40.0),
            radius: 38.0,
            class: Some("bounding-circle"),
            style: Style::fill(Color::new(113, 113, 113)),
        });
        let svg = to_svg(&scene);
        assert!(svg.starts_with(r#"<svg width="120" height="80""#));
        assert!(svg.contains(r#"<circle class="bounding-circle" cx="60" cy="40" r="38" style="fill:#717171"/>"#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
