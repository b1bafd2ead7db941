use std::{env, fs, path::PathBuf, time::Instant};

use image::{GrayImage, ImageReader, Luma};
use laserline::track::{track_laser_line, track_laser_line_in_roi, Roi, TrackingReport};
use laserline::TrackingParameters;
use serde::{Deserialize, Serialize};
#[cfg(feature = "tracing")]
use tracing_log::LogTracer;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

/// Configuration for the tracking example, loaded from JSON.
#[derive(Debug, Deserialize)]
struct ExampleConfig {
    /// Input scanline image. A synthetic seam is rendered when absent.
    #[serde(default)]
    image_path: Option<String>,
    /// Where to write the report JSON.
    #[serde(default)]
    output_path: Option<String>,
    #[serde(default)]
    roi: Option<Roi>,
    #[serde(default)]
    params: TrackingParameters,
}

#[derive(Debug, Serialize)]
struct ExampleOutput {
    image_path: Option<String>,
    config_path: String,
    width: u32,
    height: u32,
    roi: Option<Roi>,
    duration_us: u64,
    report: TrackingReport,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let config_path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("testdata/laser_line_config.json"));

    let cfg: ExampleConfig = {
        let raw = fs::read_to_string(&config_path)?;
        serde_json::from_str(&raw)?
    };

    let img = match &cfg.image_path {
        Some(path) => ImageReader::open(path)?.decode()?.to_luma8(),
        None => render_seam(640, 120),
    };

    let t0 = Instant::now();
    let report = match cfg.roi {
        Some(roi) => track_laser_line_in_roi(&img, roi, cfg.params)?,
        None => track_laser_line(&img, cfg.params)?,
    };
    let duration_us = t0.elapsed().as_micros() as u64;

    log::info!(
        "tracking finished status={:?} range={:?} passes={} duration_us={}",
        report.status,
        report.valid_range,
        report.passes.len(),
        duration_us
    );

    let output = ExampleOutput {
        image_path: cfg.image_path.clone(),
        config_path: config_path.display().to_string(),
        width: img.width(),
        height: img.height(),
        roi: cfg.roi,
        duration_us,
        report,
    };

    let output_path = cfg
        .output_path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("testdata/laser_line_report.json"));
    let json = serde_json::to_string_pretty(&output)?;
    fs::write(&output_path, json)?;
    println!("wrote report to {}", output_path.display());

    Ok(())
}

fn init_logging() {
    // Ignore errors if a logger/subscriber was already installed.
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init();
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = laserline::core::init_with_level(log::LevelFilter::Info);
    }
}

/// Dark background with a bright seam: flat, a V-groove, then flat again.
fn render_seam(width: u32, height: u32) -> GrayImage {
    let mut img = GrayImage::from_pixel(width, height, Luma([20]));
    let base = height as i64 / 3;
    let groove = (width as i64 / 3, 2 * width as i64 / 3);
    let depth = height as i64 / 3;
    for x in 0..width as i64 {
        let y = if x < groove.0 || x >= groove.1 {
            base
        } else {
            let mid = (groove.0 + groove.1) / 2;
            let half = (groove.1 - groove.0) / 2;
            base + depth * (half - (x - mid).abs()) / half
        };
        for (dy, grey) in [(-1, 150u8), (0, 230), (1, 150)] {
            let yy = y + dy;
            if (0..height as i64).contains(&yy) {
                img.put_pixel(x as u32, yy as u32, Luma([grey]));
            }
        }
    }
    img
}
