use anyhow::{bail, Context};
use gauge_vis::{
    extract_scalar, load_font, ChartData, Container, GaugeChart, GaugeConfig, PreviewOptions,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: gauge-vis [--config FILE] [--data FILE.json | --value X] [--size WxH] \
[--range MIN MAX] [--title NAME] [--font FILE] [--out FILE.svg] [--preview]";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    data: Option<PathBuf>,
    value: Option<f64>,
    size: Option<(u32, u32)>,
    range: Option<(f64, f64)>,
    title: Option<String>,
    font: Option<PathBuf>,
    out: Option<PathBuf>,
    preview: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut next = |name: &str| args.next().with_context(|| format!("{name} needs a value"));
        match arg.as_str() {
            "--config" => parsed.config = Some(next("--config")?.into()),
            "--data" => parsed.data = Some(next("--data")?.into()),
            "--value" => parsed.value = Some(next("--value")?.parse().context("--value")?),
            "--size" => parsed.size = Some(parse_size(&next("--size")?)?),
            "--range" => {
                let min: f64 = next("--range")?.parse().context("--range min")?;
                let max: f64 = next("--range")?.parse().context("--range max")?;
                parsed.range = Some((min, max));
            }
            "--title" => parsed.title = Some(next("--title")?),
            "--font" => parsed.font = Some(next("--font")?.into()),
            "--out" => parsed.out = Some(next("--out")?.into()),
            "--preview" => parsed.preview = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument {other}\n{USAGE}"),
        }
    }
    Ok(parsed)
}

fn parse_size(raw: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = raw
        .split_once('x')
        .with_context(|| format!("size must look like 300x300, got {raw}"))?;
    Ok((w.parse().context("width")?, h.parse().context("height")?))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gauge_vis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = parse_args()?;

    let mut config = match &args.config {
        Some(path) => GaugeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GaugeConfig::default(),
    };
    if let Some((min, max)) = args.range {
        config.min_value = min;
        config.max_value = max;
    }
    if let Some(title) = &args.title {
        config.metric_name = title.clone();
    }

    let value = match &args.data {
        Some(path) => {
            let data = ChartData::load(path)
                .with_context(|| format!("loading chart data {}", path.display()))?;
            extract_scalar(&data)
        }
        None => args.value,
    };
    let (width, height) = args.size.unwrap_or((300, 300));
    let chart = GaugeChart::new(config);

    if args.preview {
        let font = match &args.font {
            Some(path) => Some(load_font(std::fs::read(path)?)?),
            None => None,
        };
        let options = PreviewOptions::builder()
            .width(width)
            .height(height)
            .maybe_font(font)
            .build();

        let (sender, receiver) = mpsc::channel();
        if let Some(value) = value {
            sender.send(value)?;
        }
        // Further readings arrive on stdin, one per line.
        thread::spawn(move || {
            for line in io::stdin().lock().lines().map_while(Result::ok) {
                match line.trim().parse::<f64>() {
                    Ok(v) => {
                        if sender.send(v).is_err() {
                            break;
                        }
                    }
                    Err(_) => tracing::warn!(%line, "ignoring non-numeric input"),
                }
            }
        });
        chart.show_with_values(options, receiver)?;
        return Ok(());
    }

    let mut container = Container::new(width, height);
    chart.draw(&mut container, value)?;
    let svg = container.to_svg();

    match &args.out {
        Some(path) => {
            std::fs::write(path, svg).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote gauge");
        }
        None => io::stdout().write_all(svg.as_bytes())?,
    }
    Ok(())
}
