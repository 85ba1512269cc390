//! Separable Gaussian blur for smoothing speckle before the waist pipeline.
//!
//! The kernel is truncated at [`BLUR_TRUNCATE`] standard deviations and edges
//! are reflected about the outer pixel boundary (`d c b a | a b c d | d c b a`),
//! so a blur level of ~10 is light and ~100 is heavy.

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Kernel half-width in standard deviations.
pub const BLUR_TRUNCATE: f64 = 1.0;

/// Normalized 1-D Gaussian kernel of radius `⌊truncate·sigma + 0.5⌋`.
///
/// Returns the identity kernel `[1.0]` when the radius rounds to zero.
pub fn gaussian_kernel_1d(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma + 0.5) as usize;
    if radius == 0 {
        return vec![1.0];
    }

    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Blurs `grid` with a Gaussian of standard deviation `sigma` pixels.
///
/// Rows are convolved first, then columns. `sigma == 0` returns the grid
/// unchanged.
pub fn blur(grid: &Grid, sigma: f64) -> Result<Grid> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(Error::DegenerateInput(
            "blur sigma must be finite and non-negative",
        ));
    }

    let kernel = gaussian_kernel_1d(sigma, BLUR_TRUNCATE);
    if kernel.len() == 1 || grid.is_empty() {
        return Ok(grid.clone());
    }

    let (width, height) = (grid.width(), grid.height());

    let mut rows = vec![0.0f64; grid.len()];
    for (input, output) in grid
        .values()
        .chunks_exact(width)
        .zip(rows.chunks_exact_mut(width))
    {
        convolve_line(input, output, &kernel);
    }

    let mut output = vec![0.0f64; grid.len()];
    let mut column = vec![0.0f64; height];
    let mut blurred = vec![0.0f64; height];
    for x in 0..width {
        for (y, v) in column.iter_mut().enumerate() {
            *v = rows[y * width + x];
        }
        convolve_line(&column, &mut blurred, &kernel);
        for (y, &v) in blurred.iter().enumerate() {
            output[y * width + x] = v;
        }
    }

    tracing::debug!("Blurred {width}x{height} grid with sigma {sigma}");
    Grid::new(width, height, output)
}

fn convolve_line(input: &[f64], output: &mut [f64], kernel: &[f64]) {
    let radius = (kernel.len() / 2) as isize;
    let len = input.len();

    for (i, out) in output.iter_mut().enumerate() {
        *out = kernel
            .iter()
            .enumerate()
            .map(|(k, &w)| w * input[reflect(i as isize + k as isize - radius, len)])
            .sum();
    }
}

/// Folds an out-of-range index back into `0..len`, repeating the edge sample.
#[inline]
fn reflect(index: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let folded = index.rem_euclid(period) as usize;
    if folded < len {
        folded
    } else {
        2 * len - 1 - folded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array_ops::argmax;
    use crate::test_utils::{gaussian_beam, impulse};

    #[test]
    fn test_kernel_radius_rounds_truncated_sigma() {
        assert_eq!(gaussian_kernel_1d(10.0, 1.0).len(), 21);
        assert_eq!(gaussian_kernel_1d(2.4, 1.0).len(), 5);
        assert_eq!(gaussian_kernel_1d(2.5, 1.0).len(), 7);
        assert_eq!(gaussian_kernel_1d(0.4, 1.0), vec![1.0]);
    }

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        for sigma in [0.7, 3.0, 10.0, 100.0] {
            let kernel = gaussian_kernel_1d(sigma, BLUR_TRUNCATE);
            let sum: f64 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sigma {sigma}: sum {sum}");

            let n = kernel.len();
            for i in 0..n / 2 {
                assert_eq!(kernel[i], kernel[n - 1 - i]);
            }
            assert_eq!(argmax(&kernel), Some(n / 2));
        }
    }

    #[test]
    fn test_reflect_repeats_edge_sample() {
        let folded: Vec<usize> = (-3..7).map(|i| reflect(i, 4)).collect();
        assert_eq!(folded, vec![2, 1, 0, 0, 1, 2, 3, 3, 2, 1]);
        assert_eq!(reflect(-5, 1), 0);
        assert_eq!(reflect(9, 1), 0);
    }

    #[test]
    fn test_blur_reflects_at_the_border() {
        // sigma 1 gives radius 1; the edge pixel sees itself through the reflection
        let grid = Grid::new(4, 1, vec![1.0, 0.0, 0.0, 0.0]).unwrap();
        let blurred = blur(&grid, 1.0).unwrap();

        let side = (-0.5f64).exp();
        let norm = 1.0 + 2.0 * side;
        assert!((blurred[(0, 0)] - (1.0 + side) / norm).abs() < 1e-12);
        assert!((blurred[(1, 0)] - side / norm).abs() < 1e-12);
        assert_eq!(blurred[(2, 0)], 0.0);
    }

    #[test]
    fn test_blur_of_interior_impulse_is_outer_kernel_product() {
        let sigma = 3.0;
        let kernel = gaussian_kernel_1d(sigma, BLUR_TRUNCATE);
        let radius = kernel.len() / 2;
        let blurred = blur(&impulse(21, 21, 10, 10), sigma).unwrap();

        for y in 0..21 {
            for x in 0..21 {
                let (dx, dy) = (x as isize - 10, y as isize - 10);
                let expected = if dx.unsigned_abs() <= radius && dy.unsigned_abs() <= radius {
                    kernel[(dx + radius as isize) as usize] * kernel[(dy + radius as isize) as usize]
                } else {
                    0.0
                };
                assert!((blurred[(x, y)] - expected).abs() < 1e-15, "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_blur_keeps_constant_grid_and_beam_center() {
        let flat = Grid::new_filled(7, 5, 0.25);
        let blurred = blur(&flat, 10.0).unwrap();
        assert!(blurred.values().iter().all(|v| (v - 0.25).abs() < 1e-12));

        let beam = gaussian_beam(61, 61, (30.0, 30.0), (6.0, 6.0));
        let blurred = blur(&beam, 3.0).unwrap();
        assert_eq!(argmax(blurred.values()), Some(30 * 61 + 30));
        assert!(blurred[(30, 30)] < 1.0);
    }

    #[test]
    fn test_zero_sigma_is_identity_and_invalid_sigma_fails() {
        let beam = gaussian_beam(16, 12, (8.0, 6.0), (3.0, 2.0));
        assert_eq!(blur(&beam, 0.0).unwrap(), beam);

        for sigma in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                blur(&beam, sigma),
                Err(Error::DegenerateInput(_))
            ));
        }
    }
}
