use gauge_vis::{GaugeChart, GaugeConfig, PreviewOptions};
use rand::Rng;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GaugeConfig::builder()
        .min_value(0.0)
        .max_value(200.0)
        .metric_name("Requests/s".to_string())
        .build();
    let chart = GaugeChart::new(config);

    // Readings wander around, now and then overshooting the range.
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut rng = rand::rng();
        let mut value: f64 = 100.0;
        loop {
            value = (value + rng.random_range(-15.0..15.0)).clamp(-20.0, 220.0);
            if sender.send(value).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(250));
        }
    });

    println!("Displaying gauge with a random walk reading, press Ctrl+C to exit");

    let options = PreviewOptions::builder().width(400).height(400).build();
    chart.show_with_values(options, receiver)?;
    Ok(())
}
