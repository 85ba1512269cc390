//! Intensity-weighted beam centre and centroid-anchored cropping.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::projection::{ProfilePair, project};

/// Integer pixel position of the beam's intensity-weighted centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Centroid {
    pub x: usize,
    pub y: usize,
}

/// Requested crop size for [`focus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropWindow {
    pub width: usize,
    pub height: usize,
}

impl CropWindow {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Weighted mean index `Σ i·p[i] / Σ p[i]`, rounded half to even.
fn weighted_index(profile: &[f64], what: &'static str) -> Result<usize> {
    let (moment, total) = profile
        .iter()
        .enumerate()
        .fold((0.0f64, 0.0f64), |(m, t), (i, &v)| (m + i as f64 * v, t + v));

    if !total.is_finite() || total <= 0.0 {
        return Err(Error::DegenerateInput(what));
    }
    // Non-negative profiles keep the mean within [0, len - 1]
    Ok((moment / total).round_ties_even().max(0.0) as usize)
}

pub fn centroid(profiles: &ProfilePair) -> Result<Centroid> {
    Ok(Centroid {
        x: weighted_index(&profiles.x, "x profile sums to zero")?,
        y: weighted_index(&profiles.y, "y profile sums to zero")?,
    })
}

/// Crops `grid` to a window centred on its centroid.
///
/// Half extents are `width / 2` and `height / 2` on each side, so odd sizes
/// lose one pixel. A window reaching past any image edge is an error; callers
/// narrow the window and retry.
pub fn focus(grid: &Grid, window: CropWindow) -> Result<Grid> {
    let center = centroid(&project(grid)?)?;
    let half_w = window.width / 2;
    let half_h = window.height / 2;

    let out_of_bounds = || Error::OutOfBounds {
        width: window.width,
        height: window.height,
        center_x: center.x,
        center_y: center.y,
        image_width: grid.width(),
        image_height: grid.height(),
    };

    let left = center.x.checked_sub(half_w).ok_or_else(out_of_bounds)?;
    let top = center.y.checked_sub(half_h).ok_or_else(out_of_bounds)?;

    let cropped = grid
        .crop(left, top, 2 * half_w, 2 * half_h)
        .ok_or_else(out_of_bounds)?;

    tracing::debug!(
        "Focused {}x{} grid to {}x{} around ({}, {})",
        grid.width(),
        grid.height(),
        cropped.width(),
        cropped.height(),
        center.x,
        center.y
    );
    Ok(cropped)
}

/// Applies [`focus`] for each window in turn, narrowing step by step.
pub fn focus_successive(grid: &Grid, windows: &[CropWindow]) -> Result<Grid> {
    let mut current = grid.clone();
    for &window in windows {
        current = focus(&current, window)?;
    }
    Ok(current)
}
