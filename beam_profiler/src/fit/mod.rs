//! Least-squares fitting of 1-D beam profiles.
//!
//! [`lm_optimizer`] holds the generic Levenberg-Marquardt loop; [`gaussian`]
//! and [`edge`] supply the two physical models fitted by the estimators.

pub mod edge;
pub mod gaussian;
mod linear_solver;
pub mod lm_optimizer;


pub use edge::{CURVE_SAMPLES, EdgeBounds, EdgeFit, EdgeModel, EdgeParams, fit_edge};
pub use gaussian::{GaussianFit, GaussianModel, GaussianParams, fit_gaussian, fit_gaussian_profile};
pub use lm_optimizer::{FitModel, FitOutcome, SolverConfig};

use crate::error::Result;

/// Fits any [`FitModel`] with the default solver configuration.
pub fn fit<const N: usize, M: FitModel<N>>(
    model: &M,
    xs: &[f64],
    ys: &[f64],
    initial: [f64; N],
) -> Result<FitOutcome<N>> {
    lm_optimizer::optimize(model, xs, ys, initial, &SolverConfig::default())
}
