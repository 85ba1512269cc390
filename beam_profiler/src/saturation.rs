//! Removal of untrusted samples before fitting saturated profiles.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Samples per free parameter required by [`min_samples_for`].
pub const SAMPLES_PER_PARAMETER: usize = 3;

/// Normalized intensity band whose samples are trusted for fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationBand {
    pub floor: f64,
    pub limit: f64,
}

impl SaturationBand {
    pub fn new(floor: f64, limit: f64) -> Self {
        Self { floor, limit }
    }

    /// Band that keeps every non-NaN sample.
    pub fn unbounded() -> Self {
        Self {
            floor: f64::NEG_INFINITY,
            limit: f64::INFINITY,
        }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.floor && value <= self.limit
    }

    /// Fails on an inverted band or a NaN bound.
    pub fn check(&self) -> Result<()> {
        if self.floor.is_nan() || self.limit.is_nan() {
            return Err(Error::DegenerateInput("saturation band bound is NaN"));
        }
        if self.floor > self.limit {
            return Err(Error::DegenerateInput("saturation band is inverted"));
        }
        Ok(())
    }
}

/// Surviving samples of a series, with their original positions.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedSeries {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl TrimmedSeries {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Indices as `f64` abscissae for the fitter.
    pub fn positions(&self) -> Vec<f64> {
        self.indices.iter().map(|&i| i as f64).collect()
    }
}

/// Minimum surviving samples for a model with `parameter_count` free parameters.
pub fn min_samples_for(parameter_count: usize) -> usize {
    parameter_count * SAMPLES_PER_PARAMETER
}

/// Drops samples below `band.floor`, above `band.limit`, or NaN.
pub fn trim(series: &[f64], band: SaturationBand, min_samples: usize) -> Result<TrimmedSeries> {
    band.check()?;

    let (indices, values): (Vec<usize>, Vec<f64>) = series
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, v)| band.contains(v))
        .unzip();

    if indices.len() < min_samples {
        return Err(Error::InsufficientData {
            available: indices.len(),
            required: min_samples,
        });
    }

    tracing::trace!(
        "Trimmed series to {} of {} samples within [{}, {}]",
        indices.len(),
        series.len(),
        band.floor,
        band.limit
    );
    Ok(TrimmedSeries { indices, values })
}
