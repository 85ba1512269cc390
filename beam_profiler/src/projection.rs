//! Marginal intensity profiles of a grid.

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Normalized marginal profiles of one image.
///
/// `x[i]` is the sum of column `i`, `y[j]` the sum of row `j`; each is divided
/// by its own maximum so the peak sample is exactly 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePair {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

pub fn project(grid: &Grid) -> Result<ProfilePair> {
    let mut column_sums = vec![0.0f64; grid.width()];
    let mut row_sums = Vec::with_capacity(grid.height());

    for row in grid.rows() {
        let mut row_sum = 0.0;
        for (sum, &v) in column_sums.iter_mut().zip(row) {
            *sum += v;
            row_sum += v;
        }
        row_sums.push(row_sum);
    }

    Ok(ProfilePair {
        x: scale_to_peak(column_sums, "column sums are zero")?,
        y: scale_to_peak(row_sums, "row sums are zero")?,
    })
}

fn scale_to_peak(mut sums: Vec<f64>, what: &'static str) -> Result<Vec<f64>> {
    let peak = sums.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !peak.is_finite() || peak <= 0.0 {
        return Err(Error::DegenerateInput(what));
    }
    for v in &mut sums {
        *v /= peak;
    }
    Ok(sums)
}
