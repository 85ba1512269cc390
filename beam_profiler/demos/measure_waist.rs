//! Example: measure the beam waist of one image or of every image in a directory
//!
//! Images are decoded to grayscale, normalized and run through the waist
//! estimator with the selected fit strategy. Profile plots with the fitted
//! overlay are written next to the results when `BEAM_PLOT_DIR` is set.
//!
//! # Environment
//!
//! ```text
//! BEAM_IMAGE     image file or directory of images (required)
//! BEAM_STRATEGY  gaussian | saturated | one_over_e_squared (default: gaussian)
//! BEAM_CONFIG    YAML or JSON WaistConfig (optional)
//! BEAM_PLOT_DIR  directory for PNG plots (optional)
//! BEAM_LOG_DIR   directory for daily-rolling log files (optional)
//! ```
//!
//! # Usage
//!
//! ```bash
//! BEAM_IMAGE=beams/ BEAM_STRATEGY=saturated cargo run --example measure_waist
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use beam_profiler::prelude::*;

fn main() -> Result<()> {
    match env::var("BEAM_LOG_DIR") {
        Ok(dir) => common::setup_logging("info", Path::new(&dir))?,
        Err(_) => common::setup_console_logging("info")?,
    }

    let image_path = env::var("BEAM_IMAGE")
        .map(PathBuf::from)
        .context("BEAM_IMAGE environment variable must be set")?;
    let strategy = match env::var("BEAM_STRATEGY") {
        Ok(name) => FitStrategy::from_str(&name)
            .with_context(|| format!("Unknown fit strategy '{name}'"))?,
        Err(_) => FitStrategy::default(),
    };
    let config = match env::var("BEAM_CONFIG") {
        Ok(path) => WaistConfig::load(Path::new(&path))?,
        Err(_) => WaistConfig::default(),
    };
    let mut plotter = env::var("BEAM_PLOT_DIR").ok().map(PngPlotter::new);

    let registry = if image_path.is_dir() {
        ImageRegistry::load_dir(&image_path)?
    } else {
        let name = image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
            .to_string();
        let mut registry = ImageRegistry::new();
        registry.insert(name, load_normalized(&image_path)?);
        registry
    };

    let estimator = WaistEstimator::new(config);
    tracing::info!(strategy = %strategy, images = registry.len(), "Measuring beam waists");

    for name in registry.names() {
        let grid = registry.get(name)?;
        let measurement = match estimator.measure(grid, strategy) {
            Ok(measurement) => measurement,
            Err(err) => {
                tracing::warn!("{name}: {err}");
                continue;
            }
        };

        let WaistResult { x, y } = measurement.result();
        println!("{name}: x-radius {x} um, y-radius {y} um");

        if let Some(plotter) = plotter.as_mut() {
            plotter.render_profile(
                &format!("{name}_x"),
                &measurement.x.profile,
                Some(&measurement.x.fitted),
            )?;
            plotter.render_profile(
                &format!("{name}_y"),
                &measurement.y.profile,
                Some(&measurement.y.fitted),
            )?;
        }
    }

    Ok(())
}
