//! Normalization, range and clipping of intensity data.
//!
//! Every operation exists for 1-D series (`&[f64]`) and for [`Grid`]s; the
//! grid versions apply the series version to the flattened pixels.

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Minimum and maximum of the finite values in `values`.
pub fn range(values: &[f64]) -> Result<(f64, f64)> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        return Err(Error::DegenerateInput("no finite values"));
    }
    Ok((min, max))
}

/// Rescales `values` to `[0, 1]`: `(v - min) / (max - min)`.
///
/// Fails on NaN or infinite samples, when the maximum is zero (a dark frame)
/// or when all values are equal.
pub fn normalize_series(values: &[f64]) -> Result<Vec<f64>> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::DegenerateInput("intensity contains NaN or infinity"));
    }
    let (min, max) = range(values)?;
    if max == 0.0 {
        return Err(Error::DegenerateInput("maximum intensity is zero"));
    }
    let span = max - min;
    if span <= 0.0 {
        return Err(Error::DegenerateInput("intensity is constant"));
    }

    Ok(values.iter().map(|&v| (v - min) / span).collect())
}

pub fn normalize(grid: &Grid) -> Result<Grid> {
    let values = normalize_series(grid.values())?;
    Grid::new(grid.width(), grid.height(), values)
}

/// Normalized values that exceed `floor`; everything else becomes 0.
pub fn clip_series(values: &[f64], floor: f64) -> Result<Vec<f64>> {
    let mut normalized = normalize_series(values)?;
    for v in &mut normalized {
        if *v <= floor {
            *v = 0.0;
        }
    }
    Ok(normalized)
}

pub fn clip(grid: &Grid, floor: f64) -> Result<Grid> {
    let values = clip_series(grid.values(), floor)?;
    Grid::new(grid.width(), grid.height(), values)
}

/// Rounds in place to `decimals` places, ties to even.
pub fn round_decimals(values: &mut [f64], decimals: i32) {
    let scale = 10f64.powi(decimals);
    for v in values {
        *v = round_to(*v, scale);
    }
}

#[inline]
pub(crate) fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round_ties_even() / scale
}

/// Index of the first maximum, ignoring NaN.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
