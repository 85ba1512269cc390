//! Beam profiler - laser beam waist measurement from intensity images.
//!
//! The pipeline turns a grayscale beam image into a radius along each axis:
//! - Normalization and centroid-anchored cropping of the intensity grid
//! - Projection onto normalized x and y profiles
//! - Levenberg-Marquardt fitting of a Gaussian (or knife-edge erf) model
//! - Saturation-aware fitting that ignores clipped samples
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use beam_profiler::prelude::*;
//!
//! let grid = load_normalized(Path::new("dist114mm.png"))?;
//! let estimator = WaistEstimator::new(WaistConfig::default());
//! let waist = estimator.waist(&grid)?;
//!
//! println!("x-radius: {} um, y-radius: {} um", waist.x, waist.y);
//! ```

pub mod array_ops;
pub mod centroid;
pub mod convolution;
mod error;
pub mod fit;
mod grid;
pub mod io;
pub mod manual_entry;
pub mod plot;
pub mod projection;
pub mod registry;
pub mod saturation;
pub mod waist;

#[cfg(test)]
pub(crate) mod test_utils;

pub mod prelude;

// ============================================================================
// Core types
// ============================================================================

pub use error::{Error, Result};
pub use grid::Grid;

// ============================================================================
// Pipeline stages
// ============================================================================

pub use array_ops::{clip, normalize, range};
pub use centroid::{Centroid, CropWindow, centroid, focus, focus_successive};
pub use convolution::blur;
pub use projection::{ProfilePair, project};
pub use saturation::{SaturationBand, TrimmedSeries, trim};

// ============================================================================
// Fitting and estimation
// ============================================================================

pub use fit::{EdgeFit, EdgeParams, GaussianFit, GaussianParams, SolverConfig, fit_edge};
pub use waist::{
    AxisMeasurement, FitStrategy, WaistConfig, WaistEstimator, WaistMeasurement, WaistResult,
};

// ============================================================================
// Collaborators
// ============================================================================

pub use io::{load_grayscale, load_normalized};
pub use manual_entry::{EdgeFitReport, EdgeScan, parse_rows};
pub use plot::{PlotSink, PngPlotter};
pub use registry::ImageRegistry;
