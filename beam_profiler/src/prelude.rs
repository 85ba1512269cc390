//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use beam_profiler::prelude::*;
//! ```

pub use crate::{Error, Grid, Result};

pub use crate::{FitStrategy, WaistConfig, WaistEstimator, WaistMeasurement, WaistResult};

pub use crate::{ImageRegistry, PlotSink, PngPlotter, load_grayscale, load_normalized};

pub use crate::{EdgeFitReport, SaturationBand, SolverConfig};
