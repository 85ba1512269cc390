//! Synthetic beam profiles and images shared by the unit tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::grid::Grid;

/// `amplitude · exp(-2·((x - center) / width)²)` sampled at `0..len`.
pub fn gaussian_profile(len: usize, center: f64, width: f64, amplitude: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let s = (i as f64 - center) / width;
            amplitude * (-2.0 * s * s).exp()
        })
        .collect()
}

/// A Gaussian profile whose peak is flattened at `ceiling`, as a saturated
/// sensor records it.
pub fn clamped_gaussian_profile(len: usize, center: f64, width: f64, ceiling: f64) -> Vec<f64> {
    gaussian_profile(len, center, width, 1.0)
        .into_iter()
        .map(|v| v.min(ceiling))
        .collect()
}

/// Separable elliptical beam: product of an x and a y Gaussian profile.
pub fn gaussian_beam(
    width: usize,
    height: usize,
    center: (f64, f64),
    radius: (f64, f64),
) -> Grid {
    let xs = gaussian_profile(width, center.0, radius.0, 1.0);
    let ys = gaussian_profile(height, center.1, radius.1, 1.0);
    Grid::from_fn(width, height, |x, y| xs[x] * ys[y])
}

/// Single bright pixel on a dark frame.
pub fn impulse(width: usize, height: usize, x: usize, y: usize) -> Grid {
    Grid::from_fn(width, height, |px, py| if (px, py) == (x, y) { 1.0 } else { 0.0 })
}

/// Adds uniform noise in `[-amplitude, amplitude]` with a fixed seed.
pub fn add_noise(values: &mut [f64], amplitude: f64, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for v in values {
        *v += rng.random_range(-amplitude..=amplitude);
    }
}

/// Knife-edge scan recorded with the profiler's manual entry table
/// (micrometers, power in mW).
pub const KNIFE_EDGE_SCAN: [(f64, f64); 10] = [
    (1524.0, 3.66),
    (1651.0, 3.5),
    (1676.4, 3.17),
    (1701.8, 2.53),
    (1727.2, 1.71),
    (1752.6, 0.87),
    (1778.0, 0.32),
    (1803.4, 0.1),
    (1828.8, 0.016),
    (1854.2, 0.001),
];

pub fn knife_edge_columns() -> (Vec<f64>, Vec<f64>) {
    KNIFE_EDGE_SCAN.iter().copied().unzip()
}

pub fn assert_close(actual: f64, expected: f64, relative: f64) {
    let tolerance = expected.abs() * relative;
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
