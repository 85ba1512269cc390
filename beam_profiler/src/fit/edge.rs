//! Complementary error-function (knife-edge) profile:
//! `f(x) = A/2 · (1 - erf(√2·(x - x0)/w)) + y0`.
//!
//! `y0` is held fixed, so the optimizer sees three free parameters
//! `[A, w, x0]`. Optional box bounds are enforced by clamping after each step.

use std::f64::consts::{PI, SQRT_2};

use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;

use super::lm_optimizer::{FitModel, SolverConfig, optimize};
use crate::array_ops::range;
use crate::error::{Error, Result};

/// Waist bounds for the interactive edge fit, in abscissa units.
pub const WAIST_BOUNDS: (f64, f64) = (10.0, 2000.0);

/// Number of points in an overlay curve.
pub const CURVE_SAMPLES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeParams {
    pub amplitude: f64,
    pub waist: f64,
    pub x_offset: f64,
    pub y_offset: f64,
}

impl EdgeParams {
    pub const NAMES: [&'static str; 4] = ["amplitude", "waist", "x_offset", "y_offset"];

    pub fn evaluate(&self, x: f64) -> f64 {
        EdgeModel::fixed_offset(self.y_offset).evaluate(x, &self.free())
    }

    /// Parameter names paired with their values, in report order.
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            (Self::NAMES[0], self.amplitude),
            (Self::NAMES[1], self.waist),
            (Self::NAMES[2], self.x_offset),
            (Self::NAMES[3], self.y_offset),
        ]
    }

    /// `samples` evenly spaced points over `[start, end]`, with model values.
    pub fn curve(&self, start: f64, end: f64, samples: usize) -> (Vec<f64>, Vec<f64>) {
        let xs = linspace(start, end, samples);
        let ys = xs.iter().map(|&x| self.evaluate(x)).collect();
        (xs, ys)
    }

    fn free(&self) -> [f64; 3] {
        [self.amplitude, self.waist, self.x_offset]
    }
}

/// Inclusive box bounds on the free edge parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeBounds {
    pub amplitude: (f64, f64),
    pub waist: (f64, f64),
    pub x_offset: (f64, f64),
}

impl EdgeBounds {
    /// Bounds derived from the data: amplitude between half and all of the
    /// observed y range, waist in [`WAIST_BOUNDS`], offset within the x domain.
    pub fn from_data(xs: &[f64], ys: &[f64]) -> Result<Self> {
        let (x_min, x_max) = range(xs)?;
        let (y_min, y_max) = range(ys)?;
        let y_span = y_max - y_min;
        if y_span <= 0.0 {
            return Err(Error::DegenerateInput("edge data has no intensity range"));
        }

        Ok(Self {
            amplitude: (y_span / 2.0, y_span),
            waist: WAIST_BOUNDS,
            x_offset: (x_min, x_max),
        })
    }

    fn clamp(&self, params: &mut [f64; 3]) {
        params[0] = params[0].clamp(self.amplitude.0, self.amplitude.1);
        params[1] = params[1].clamp(self.waist.0, self.waist.1);
        params[2] = params[2].clamp(self.x_offset.0, self.x_offset.1);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeModel {
    pub y_offset: f64,
    pub bounds: Option<EdgeBounds>,
}

impl EdgeModel {
    pub fn fixed_offset(y_offset: f64) -> Self {
        Self {
            y_offset,
            bounds: None,
        }
    }

    pub fn bounded(y_offset: f64, bounds: EdgeBounds) -> Self {
        Self {
            y_offset,
            bounds: Some(bounds),
        }
    }
}

impl FitModel<3> for EdgeModel {
    #[inline]
    fn evaluate(&self, x: f64, params: &[f64; 3]) -> f64 {
        let [amplitude, waist, x_offset] = *params;
        amplitude / 2.0 * (1.0 - erf(SQRT_2 * (x - x_offset) / waist)) + self.y_offset
    }

    #[inline]
    fn jacobian_row(&self, x: f64, params: &[f64; 3]) -> [f64; 3] {
        let [amplitude, waist, x_offset] = *params;
        let z = SQRT_2 * (x - x_offset) / waist;
        // d erf(z)/dz = 2/√π · exp(-z²)
        let gauss = (-z * z).exp() / PI.sqrt();

        [
            (1.0 - erf(z)) / 2.0,               // df/dA
            amplitude * gauss * z / waist,      // df/dw
            amplitude * gauss * SQRT_2 / waist, // df/dx0
        ]
    }

    #[inline]
    fn constrain(&self, params: &mut [f64; 3]) {
        if let Some(bounds) = &self.bounds {
            bounds.clamp(params);
        } else if params[1] == 0.0 {
            params[1] = f64::MIN_POSITIVE;
        }
    }
}

/// Converged edge fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFit {
    pub params: EdgeParams,
    pub chi2: f64,
    pub iterations: usize,
}

/// Bounded edge fit used for manually entered knife-edge data.
///
/// Seeds `A = max y`, `w = (max x - min x) / 2`, `x0 = mean x`, each clamped
/// into [`EdgeBounds::from_data`]; `y0` is fixed at 0.
pub fn fit_edge(xs: &[f64], ys: &[f64], config: &SolverConfig) -> Result<EdgeFit> {
    if xs.len() != ys.len() {
        return Err(Error::SizeMismatch {
            expected: xs.len(),
            actual: ys.len(),
        });
    }
    if xs.is_empty() {
        return Err(Error::InsufficientData {
            available: 0,
            required: 3,
        });
    }

    let bounds = EdgeBounds::from_data(xs, ys)?;
    let (x_min, x_max) = range(xs)?;
    let (_, y_max) = range(ys)?;
    let x_mean = xs.iter().sum::<f64>() / xs.len() as f64;

    let mut seed = [y_max, (x_max - x_min) / 2.0, x_mean];
    bounds.clamp(&mut seed);

    let model = EdgeModel::bounded(0.0, bounds);
    let outcome = optimize(&model, xs, ys, seed, config)?;
    let [amplitude, waist, x_offset] = outcome.params;

    tracing::debug!(
        "Edge fit: amplitude={amplitude:.4} waist={waist:.3} x_offset={x_offset:.3} chi2={:.3e}",
        outcome.chi2
    );

    Ok(EdgeFit {
        params: EdgeParams {
            amplitude,
            waist,
            x_offset,
            y_offset: model.y_offset,
        },
        chi2: outcome.chi2,
        iterations: outcome.iterations,
    })
}

fn linspace(start: f64, end: f64, samples: usize) -> Vec<f64> {
    match samples {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (samples - 1) as f64;
            (0..samples).map(|i| start + step * i as f64).collect()
        }
    }
}
