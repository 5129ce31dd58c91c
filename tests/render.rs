use assert_matches::assert_matches;
use gauge_vis::{
    render_to_frame, ChartData, Container, GaugeChart, GaugeConfig, GaugeError, Theme,
};

fn chart(min: f64, max: f64, name: &str) -> GaugeChart {
    GaugeChart::new(
        GaugeConfig::builder()
            .min_value(min)
            .max_value(max)
            .metric_name(name.to_string())
            .build(),
    )
}

fn svg_for(chart: &GaugeChart, value: Option<f64>) -> String {
    let mut container = Container::new(300, 300);
    chart.draw(&mut container, value).unwrap();
    container.to_svg()
}

fn pixel(frame: &[u8], width: usize, x: usize, y: usize) -> [u8; 4] {
    let idx = (y * width + x) * 4;
    [frame[idx], frame[idx + 1], frame[idx + 2], frame[idx + 3]]
}

#[test]
fn svg_document_has_every_gauge_part() {
    let svg = svg_for(&chart(0.0, 100.0, "CPU"), Some(42.0));

    assert!(svg.starts_with(r#"<svg width="300" height="300""#));
    assert!(svg.contains(r#"class="bounding-circle""#));
    assert!(svg.contains(r#"class="inner-circle""#));
    assert!(svg.contains(r#"class="pointerContainer""#));
    assert!(svg.contains(">CPU</text>"));
    assert!(svg.contains(">0</text>"));
    assert!(svg.contains(">100</text>"));
    assert_eq!(svg.matches("<line").count(), 51);
    assert_eq!(svg.matches(r#"class="tick thick""#).count(), 11);
    assert!(svg.contains("fill:#f0ad4e"));
    assert!(svg.contains("fill:#d9534f"));
    assert!(svg.contains("fill:#dc3912;fill-opacity:0.7;stroke:#c63310"));
}

#[test]
fn titles_are_escaped() {
    let svg = svg_for(&chart(0.0, 1.0, "Reads & <Writes>"), Some(0.5));
    assert!(svg.contains(">Reads &amp; &lt;Writes&gt;</text>"));
}

#[test]
fn overshoot_draws_the_same_gauge_as_max() {
    let chart = chart(0.0, 100.0, "Load");
    assert_eq!(svg_for(&chart, Some(150.0)), svg_for(&chart, Some(100.0)));
    assert_ne!(svg_for(&chart, Some(99.0)), svg_for(&chart, Some(100.0)));
}

#[test]
fn degenerate_range_is_reported_not_drawn() {
    let mut container = Container::new(300, 300);
    let result = chart(0.0, 0.0, "").draw(&mut container, Some(0.0));
    assert_matches!(result, Err(GaugeError::InvalidRange { .. }));
    assert!(container.is_empty());
    assert!(!container.to_svg().contains("NaN"));

    let result = chart(-1e308, 1e308, "").draw(&mut container, Some(0.0));
    assert_matches!(result, Err(GaugeError::InvalidRange { .. }));
    assert!(container.is_empty());
    assert!(!container.to_svg().contains("NaN"));
}

#[test]
fn redraw_without_clear_duplicates_scene() {
    let chart = chart(0.0, 100.0, "");
    let mut container = Container::new(200, 200);
    chart.draw(&mut container, Some(10.0)).unwrap();
    chart.draw(&mut container, Some(10.0)).unwrap();
    assert_eq!(container.to_svg().matches(r#"class="bounding-circle""#).count(), 2);

    container.clear();
    chart.draw(&mut container, Some(10.0)).unwrap();
    assert_eq!(container.to_svg().matches(r#"class="bounding-circle""#).count(), 1);
}

#[test]
fn chart_data_drives_the_needle() {
    let data = ChartData::from_json(
        r#"{"series": [{"values": [{"aggConfigResult": {"value": 63}}]}]}"#,
    )
    .unwrap();
    let chart = chart(0.0, 100.0, "");

    let mut from_data = Container::new(300, 300);
    chart.draw_data(&mut from_data, &data).unwrap();
    assert_eq!(from_data.to_svg(), svg_for(&chart, Some(63.0)));

    let mut empty = Container::new(300, 300);
    chart.draw_data(&mut empty, &ChartData::default()).unwrap();
    assert_eq!(empty.to_svg(), svg_for(&chart, Some(0.0)));
}

#[test]
fn config_file_contents_flow_into_the_scene() {
    let config = GaugeConfig::from_toml_str(
        r##"
        min_value = 10
        max_value = 20
        metric_name = "Pressure"

        [theme]
        critical_color = "#800000"
        "##,
    )
    .unwrap();
    let svg = svg_for(&GaugeChart::new(config), Some(15.0));
    assert!(svg.contains(">Pressure</text>"));
    assert!(svg.contains(">10</text>"));
    assert!(svg.contains(">20</text>"));
    assert!(svg.contains("fill:#800000"));
    assert!(!svg.contains("fill:#d9534f"));
}

#[test]
fn raster_shows_needle_above_center_at_midpoint() {
    let theme = Theme::default();
    let chart = chart(0.0, 100.0, "");

    let up = chart.build_scene(300, 300, Some(50.0)).unwrap();
    let frame = render_to_frame(&up, theme.background, None);

    // Pivot covers the center.
    assert_eq!(pixel(&frame, 300, 150, 150), [0x46, 0x84, 0xee, 0xff]);

    // Halfway up the needle: translucent red over the dial face.
    let [r, g, b, _] = pixel(&frame, 300, 150, 100);
    assert!(r > g + 50 && r > b + 50, "expected needle color, got {r},{g},{b}");

    // At min the needle points down-left, leaving the same spot bare.
    let down = chart.build_scene(300, 300, Some(0.0)).unwrap();
    let frame = render_to_frame(&down, theme.background, None);
    assert_eq!(pixel(&frame, 300, 150, 100), [113, 113, 113, 0xff]);
}
