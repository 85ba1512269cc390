//! 1/e² Gaussian beam profile: `g(x) = c · exp(-2·((x - a) / b)²)`.

use serde::{Deserialize, Serialize};

use super::lm_optimizer::{FitModel, SolverConfig, optimize};
use crate::array_ops::{argmax, range};
use crate::error::{Error, Result};

/// Width seed for unsaturated profiles, in samples.
pub const DEFAULT_WIDTH_SEED: f64 = 200.0;

/// Amplitude seed for unsaturated profiles.
pub const DEFAULT_AMPLITUDE_SEED: f64 = 1.1;

/// Smallest width the optimizer may step to; the model is singular at 0.
const MIN_WIDTH: f64 = 1e-3;

/// Parameters of the Gaussian beam model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianParams {
    /// Peak position `a`, in samples.
    pub center: f64,
    /// 1/e² radius `b`, in samples.
    pub width: f64,
    /// Peak value `c`.
    pub amplitude: f64,
}

impl GaussianParams {
    pub fn new(center: f64, width: f64, amplitude: f64) -> Self {
        Self {
            center,
            width,
            amplitude,
        }
    }

    /// Seed used for unsaturated profiles: peak index, width 200, amplitude 1.1.
    pub fn seed_for(profile: &[f64]) -> Result<Self> {
        let peak = argmax(profile).ok_or(Error::DegenerateInput("empty profile"))?;
        Ok(Self::new(
            peak as f64,
            DEFAULT_WIDTH_SEED,
            DEFAULT_AMPLITUDE_SEED,
        ))
    }

    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        GaussianModel::unbounded().evaluate(x, &self.to_array())
    }

    /// Model evaluated at indices `0..len`.
    pub fn curve(&self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.evaluate(i as f64)).collect()
    }

    fn to_array(self) -> [f64; 3] {
        [self.center, self.width, self.amplitude]
    }

    fn from_array([center, width, amplitude]: [f64; 3]) -> Self {
        Self {
            center,
            width,
            amplitude,
        }
    }
}

/// Converged Gaussian fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianFit {
    pub params: GaussianParams,
    pub chi2: f64,
    pub iterations: usize,
}

/// Gaussian model for L-M optimization. Parameters: `[a, b, c]`.
///
/// The width is kept in `[MIN_WIDTH, max_width]`; fits over sampled data cap
/// it at the extent of the abscissae.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianModel {
    pub max_width: f64,
}

impl GaussianModel {
    pub fn unbounded() -> Self {
        Self {
            max_width: f64::INFINITY,
        }
    }

    /// Model whose width may not exceed the extent of `xs`.
    pub fn spanning(xs: &[f64]) -> Result<Self> {
        let (min, max) = range(xs)?;
        Ok(Self {
            max_width: (max - min).max(MIN_WIDTH),
        })
    }
}

impl Default for GaussianModel {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl FitModel<3> for GaussianModel {
    #[inline]
    fn evaluate(&self, x: f64, params: &[f64; 3]) -> f64 {
        let [a, b, c] = *params;
        let s = (x - a) / b;
        c * (-2.0 * s * s).exp()
    }

    #[inline]
    fn jacobian_row(&self, x: f64, params: &[f64; 3]) -> [f64; 3] {
        let [a, b, c] = *params;
        let s = (x - a) / b;
        let e = (-2.0 * s * s).exp();
        let ce = c * e;

        [
            ce * 4.0 * s / b,     // dg/da
            ce * 4.0 * s * s / b, // dg/db
            e,                    // dg/dc
        ]
    }

    #[inline]
    fn constrain(&self, params: &mut [f64; 3]) {
        // g depends on b², keep the positive branch
        params[1] = params[1].abs().clamp(MIN_WIDTH, self.max_width);
    }
}

/// Fits the Gaussian model to `(xs, ys)` from `seed`.
///
/// The width is bounded by the extent of `xs`, so a seed wider than the data
/// starts at that extent.
pub fn fit_gaussian(
    xs: &[f64],
    ys: &[f64],
    seed: GaussianParams,
    config: &SolverConfig,
) -> Result<GaussianFit> {
    if xs.len() != ys.len() {
        return Err(Error::SizeMismatch {
            expected: xs.len(),
            actual: ys.len(),
        });
    }
    if xs.len() < 3 {
        return Err(Error::InsufficientData {
            available: xs.len(),
            required: 3,
        });
    }

    let model = GaussianModel::spanning(xs)?;
    let outcome = optimize(&model, xs, ys, seed.to_array(), config)?;
    let params = GaussianParams::from_array(outcome.params);

    tracing::debug!(
        "Gaussian fit: center={:.3} width={:.3} amplitude={:.4} chi2={:.3e} in {} iterations",
        params.center,
        params.width,
        params.amplitude,
        outcome.chi2,
        outcome.iterations
    );

    Ok(GaussianFit {
        params,
        chi2: outcome.chi2,
        iterations: outcome.iterations,
    })
}

/// Fits a whole profile indexed `0..len` with the default unsaturated seed.
pub fn fit_gaussian_profile(profile: &[f64], config: &SolverConfig) -> Result<GaussianFit> {
    let seed = GaussianParams::seed_for(profile)?;
    let xs: Vec<f64> = (0..profile.len()).map(|i| i as f64).collect();
    fit_gaussian(&xs, profile, seed, config)
}
