//! Loading beam images from disk.

use std::path::Path;

use crate::array_ops::{normalize, round_decimals};
use crate::error::{Error, Result};
use crate::grid::Grid;

/// Decimal places kept by [`load_normalized`].
pub const LOAD_DECIMALS: i32 = 4;

/// Decodes an image and converts it to 8-bit luma, one grid value per pixel.
///
/// Values keep the raw 0..=255 scale.
pub fn load_grayscale(path: &Path) -> Result<Grid> {
    let image = image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let luma = image.to_luma8();
    let (width, height) = luma.dimensions();

    let values = luma.into_raw().into_iter().map(f64::from).collect();
    Grid::new(width as usize, height as usize, values)
}

/// [`load_grayscale`] followed by normalization to `[0, 1]`, rounded to
/// [`LOAD_DECIMALS`] places.
pub fn load_normalized(path: &Path) -> Result<Grid> {
    let mut grid = normalize(&load_grayscale(path)?)?;
    round_decimals(grid.values_mut(), LOAD_DECIMALS);

    tracing::debug!(
        "Loaded {}x{} image from {}",
        grid.width(),
        grid.height(),
        path.display()
    );
    Ok(grid)
}
