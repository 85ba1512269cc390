//! Levenberg-Marquardt optimizer for 1-D profile models.
//!
//! Generic over the parameter count so the Gaussian (3) and edge (3 free)
//! models share one implementation. Uses Marquardt's diagonal scaling of the
//! damping term, which keeps the step well-conditioned when parameters live
//! on very different scales (amplitudes near 1, widths in the hundreds).

use serde::{Deserialize, Serialize};

use super::linear_solver::solve;
use crate::error::{Error, Result};

/// Configuration for Levenberg-Marquardt optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum number of iterations (accepted or rejected steps).
    pub max_iterations: usize,
    /// Relative parameter change below which the fit counts as converged.
    pub step_tolerance: f64,
    /// Initial damping parameter.
    pub initial_lambda: f64,
    /// Factor to increase lambda on a rejected step.
    pub lambda_up: f64,
    /// Factor to decrease lambda on an accepted step.
    pub lambda_down: f64,
    /// Damping above which the solve is abandoned.
    pub max_lambda: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            step_tolerance: 1e-10,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            max_lambda: 1e16,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) {
        if let Err(reason) = self.check() {
            panic!("{reason}");
        }
    }

    /// First violated constraint, if any.
    pub fn check(&self) -> std::result::Result<(), String> {
        let rules = [
            (
                self.max_iterations > 0,
                "max_iterations must be positive".to_string(),
            ),
            (
                self.step_tolerance > 0.0,
                format!("step_tolerance must be positive, got {}", self.step_tolerance),
            ),
            (
                self.initial_lambda > 0.0,
                format!("initial_lambda must be positive, got {}", self.initial_lambda),
            ),
            (
                self.lambda_up > 1.0,
                format!("lambda_up must be > 1, got {}", self.lambda_up),
            ),
            (
                self.lambda_down > 0.0 && self.lambda_down < 1.0,
                format!("lambda_down must be in (0, 1), got {}", self.lambda_down),
            ),
            (
                self.max_lambda > self.initial_lambda,
                "max_lambda must exceed initial_lambda".to_string(),
            ),
        ];

        match rules.into_iter().find(|(ok, _)| !ok) {
            Some((_, reason)) => Err(reason),
            None => Ok(()),
        }
    }
}

/// Converged parameters and residual statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOutcome<const N: usize> {
    pub params: [f64; N],
    /// Sum of squared residuals at `params`.
    pub chi2: f64,
    pub iterations: usize,
}

/// A model `y = f(x; p)` that can be fit with [`optimize`].
pub trait FitModel<const N: usize> {
    /// Evaluate the model at `x`.
    fn evaluate(&self, x: f64, params: &[f64; N]) -> f64;

    /// Partial derivatives of the model with respect to each parameter.
    fn jacobian_row(&self, x: f64, params: &[f64; N]) -> [f64; N];

    /// Project parameters back into their feasible region after an update.
    fn constrain(&self, _params: &mut [f64; N]) {}
}

/// Minimizes `Σ (ys[i] - model(xs[i]))²` starting from `initial`.
///
/// Deterministic for identical inputs. Fails with [`Error::FitDiverged`] when
/// the damped normal matrix is singular, the damping runs away, or the
/// iteration budget is spent before the step size converges.
pub fn optimize<const N: usize, M: FitModel<N>>(
    model: &M,
    xs: &[f64],
    ys: &[f64],
    initial: [f64; N],
    config: &SolverConfig,
) -> Result<FitOutcome<N>> {
    if xs.len() != ys.len() {
        return Err(Error::SizeMismatch {
            expected: xs.len(),
            actual: ys.len(),
        });
    }
    if xs.len() < N {
        return Err(Error::InsufficientData {
            available: xs.len(),
            required: N,
        });
    }

    let mut params = initial;
    model.constrain(&mut params);

    let mut chi2 = compute_chi2(model, xs, ys, &params);
    if !chi2.is_finite() {
        return Err(Error::FitDiverged {
            iterations: 0,
            reason: "non-finite residuals at initial guess",
        });
    }

    // Residuals this small are exact fits at f64 precision
    let chi2_floor = ys.iter().map(|y| y * y).sum::<f64>() * f64::EPSILON * f64::EPSILON;

    let mut lambda = config.initial_lambda;
    let mut jacobian = Vec::with_capacity(xs.len());
    let mut residuals = Vec::with_capacity(xs.len());

    for iter in 0..config.max_iterations {
        let iterations = iter + 1;

        if chi2 <= chi2_floor {
            return Ok(FitOutcome {
                params,
                chi2,
                iterations,
            });
        }

        fill_jacobian_residuals(model, xs, ys, &params, &mut jacobian, &mut residuals);
        let (hessian, gradient) = compute_hessian_gradient(&jacobian, &residuals);

        let mut damped_hessian = hessian;
        for (i, row) in damped_hessian.iter_mut().enumerate() {
            row[i] *= 1.0 + lambda;
        }

        let Some(delta) = solve(&damped_hessian, &gradient) else {
            return Err(Error::FitDiverged {
                iterations,
                reason: "singular normal matrix",
            });
        };

        let mut candidate = params;
        for (p, d) in candidate.iter_mut().zip(delta.iter()) {
            *p += d;
        }
        model.constrain(&mut candidate);

        let step_converged = candidate
            .iter()
            .zip(params.iter())
            .all(|(&c, &p)| (c - p).abs() <= config.step_tolerance * (p.abs() + config.step_tolerance));

        let new_chi2 = compute_chi2(model, xs, ys, &candidate);

        if new_chi2.is_finite() && new_chi2 < chi2 {
            params = candidate;
            chi2 = new_chi2;
            lambda *= config.lambda_down;
        } else {
            lambda *= config.lambda_up;
            if !step_converged && lambda > config.max_lambda {
                return Err(Error::FitDiverged {
                    iterations,
                    reason: "damping exceeded its limit without improving the fit",
                });
            }
        }

        // A step this small, accepted or not, cannot move the fit any further
        if step_converged {
            return Ok(FitOutcome {
                params,
                chi2,
                iterations,
            });
        }
    }

    Err(Error::FitDiverged {
        iterations: config.max_iterations,
        reason: "iteration budget exhausted",
    })
}

pub(crate) fn compute_chi2<const N: usize, M: FitModel<N>>(
    model: &M,
    xs: &[f64],
    ys: &[f64],
    params: &[f64; N],
) -> f64 {
    xs.iter()
        .zip(ys.iter())
        .map(|(&x, &y)| {
            let residual = y - model.evaluate(x, params);
            residual * residual
        })
        .sum()
}

/// Fill jacobian and residual buffers, reusing existing allocations.
fn fill_jacobian_residuals<const N: usize, M: FitModel<N>>(
    model: &M,
    xs: &[f64],
    ys: &[f64],
    params: &[f64; N],
    jacobian: &mut Vec<[f64; N]>,
    residuals: &mut Vec<f64>,
) {
    jacobian.clear();
    residuals.clear();

    for (&x, &y) in xs.iter().zip(ys.iter()) {
        jacobian.push(model.jacobian_row(x, params));
        residuals.push(y - model.evaluate(x, params));
    }
}

/// Compute `JᵀJ` and `Jᵀr`, filling the upper triangle and mirroring it.
#[allow(clippy::needless_range_loop)]
pub fn compute_hessian_gradient<const N: usize>(
    jacobian: &[[f64; N]],
    residuals: &[f64],
) -> ([[f64; N]; N], [f64; N]) {
    let mut hessian = [[0.0f64; N]; N];
    let mut gradient = [0.0f64; N];

    for (row, &r) in jacobian.iter().zip(residuals.iter()) {
        for i in 0..N {
            gradient[i] += row[i] * r;
            for j in i..N {
                hessian[i][j] += row[i] * row[j];
            }
        }
    }

    for i in 1..N {
        for j in 0..i {
            hessian[i][j] = hessian[j][i];
        }
    }

    (hessian, gradient)
}
