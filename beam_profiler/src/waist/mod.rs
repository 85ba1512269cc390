//! Beam radius estimation from intensity images and profiles.
//!
//! Every strategy shares the same front end: normalize the grid, optionally
//! blur it, apply the configured centroid crops, and project onto both axes.
//! The strategies differ only in how each profile becomes a radius.

mod config;
#[cfg(test)]
mod tests;

pub use config::{DEFAULT_PIXEL_PITCH_UM, FitStrategy, WaistConfig};

use crate::array_ops::{argmax, normalize, normalize_series, round_to};
use crate::centroid::focus_successive;
use crate::convolution::blur;
use crate::error::{Error, Result};
use crate::fit::{GaussianFit, GaussianParams, fit_gaussian, fit_gaussian_profile};
use crate::grid::Grid;
use crate::projection::{ProfilePair, project};
use crate::saturation::{SaturationBand, min_samples_for, trim};

/// Normalized level of the 1/e² intensity point.
pub const ONE_OVER_E_SQUARED_LEVEL: f64 = 0.135;

/// Converts the 1/e² span in pixels to a radius in micrometers.
pub const ONE_OVER_E_SQUARED_SCALE: f64 = 0.66;

/// Width seed for saturated profiles, in samples.
pub const SATURATED_WIDTH_SEED: f64 = 100.0;

/// Amplitude seed for saturated profiles.
pub const SATURATED_AMPLITUDE_SEED: f64 = 1.0;

const GAUSSIAN_PARAMETERS: usize = 3;

/// Beam radii along both axes, in micrometers, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaistResult {
    pub x: f64,
    pub y: f64,
}

/// One axis of a [`WaistMeasurement`].
#[derive(Debug, Clone, PartialEq)]
pub struct AxisMeasurement {
    /// Normalized marginal profile the fit was run on.
    pub profile: Vec<f64>,
    /// Fitted model over the profile's index range, for overlays.
    pub fitted: Vec<f64>,
    pub fit: GaussianFit,
    /// Radius in micrometers, rounded to one decimal.
    pub radius_um: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaistMeasurement {
    pub strategy: FitStrategy,
    pub x: AxisMeasurement,
    pub y: AxisMeasurement,
}

impl WaistMeasurement {
    pub fn result(&self) -> WaistResult {
        WaistResult {
            x: self.x.radius_um,
            y: self.y.radius_um,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WaistEstimator {
    config: WaistConfig,
}

impl WaistEstimator {
    pub fn new(config: WaistConfig) -> Self {
        config.validate();
        Self { config }
    }

    pub fn config(&self) -> &WaistConfig {
        &self.config
    }

    /// Normalizes `grid`, blurs it if configured, applies the crops and
    /// projects it.
    pub fn profiles(&self, grid: &Grid) -> Result<ProfilePair> {
        let mut normalized = normalize(grid)?;
        if self.config.blur_sigma > 0.0 {
            normalized = blur(&normalized, self.config.blur_sigma)?;
        }
        let focused = focus_successive(&normalized, &self.config.crop_windows)?;
        project(&focused)
    }

    /// Radii from an unsaturated Gaussian fit of each axis profile.
    pub fn waist(&self, grid: &Grid) -> Result<WaistResult> {
        Ok(self.measure(grid, FitStrategy::Gaussian)?.result())
    }

    /// Radius of one profile from the extent of its fitted curve above 1/e².
    pub fn waist_one_over_e_squared(&self, profile: &[f64]) -> Result<f64> {
        Ok(self.one_over_e_squared_axis(profile.to_vec())?.radius_um)
    }

    /// Fitted curve over the full index range and radius of a saturated
    /// profile, fitting only the samples inside `band`.
    pub fn saturated_waist(&self, profile: &[f64], band: SaturationBand) -> Result<(Vec<f64>, f64)> {
        let axis = self.saturated_axis(profile.to_vec(), band)?;
        Ok((axis.fitted, axis.radius_um))
    }

    /// Full pipeline for `strategy`, keeping the per-axis data for display.
    pub fn measure(&self, grid: &Grid, strategy: FitStrategy) -> Result<WaistMeasurement> {
        let ProfilePair { x, y } = self.profiles(grid)?;
        let measurement = WaistMeasurement {
            strategy,
            x: self.measure_axis(x, strategy)?,
            y: self.measure_axis(y, strategy)?,
        };

        tracing::info!(
            "Beam waist ({strategy}): x = {} um, y = {} um",
            measurement.x.radius_um,
            measurement.y.radius_um
        );
        Ok(measurement)
    }

    fn measure_axis(&self, profile: Vec<f64>, strategy: FitStrategy) -> Result<AxisMeasurement> {
        match strategy {
            FitStrategy::Gaussian => self.gaussian_axis(profile),
            FitStrategy::Saturated => self.saturated_axis(profile, self.config.saturation_band),
            FitStrategy::OneOverESquared => self.one_over_e_squared_axis(profile),
        }
    }

    fn gaussian_axis(&self, profile: Vec<f64>) -> Result<AxisMeasurement> {
        let fit = fit_gaussian_profile(&profile, &self.config.solver)?;
        let fitted = normalize_series(&fit.params.curve(profile.len()))?;
        let radius_um = self.to_micrometers(fit.params.width.abs());

        Ok(AxisMeasurement {
            profile,
            fitted,
            fit,
            radius_um,
        })
    }

    fn one_over_e_squared_axis(&self, profile: Vec<f64>) -> Result<AxisMeasurement> {
        let fit = fit_gaussian_profile(&profile, &self.config.solver)?;
        let fitted = normalize_series(&fit.params.curve(profile.len()))?;
        let (lower, upper) = run_above(&fitted, ONE_OVER_E_SQUARED_LEVEL)
            .ok_or(Error::DegenerateInput("fitted curve never exceeds 1/e²"))?;
        let radius_um = round_to((upper - lower) as f64 * ONE_OVER_E_SQUARED_SCALE, 10.0);

        Ok(AxisMeasurement {
            profile,
            fitted,
            fit,
            radius_um,
        })
    }

    fn saturated_axis(&self, profile: Vec<f64>, band: SaturationBand) -> Result<AxisMeasurement> {
        let peak = argmax(&profile).ok_or(Error::DegenerateInput("empty profile"))?;
        let trimmed = trim(&profile, band, min_samples_for(GAUSSIAN_PARAMETERS))?;
        let seed = GaussianParams::new(peak as f64, SATURATED_WIDTH_SEED, SATURATED_AMPLITUDE_SEED);

        let fit = fit_gaussian(&trimmed.positions(), &trimmed.values, seed, &self.config.solver)?;
        let fitted = fit.params.curve(profile.len());
        let radius_um = self.to_micrometers(fit.params.width.abs());

        tracing::debug!(
            "Saturated fit used {} of {} samples",
            trimmed.len(),
            profile.len()
        );
        Ok(AxisMeasurement {
            profile,
            fitted,
            fit,
            radius_um,
        })
    }

    fn to_micrometers(&self, pixels: f64) -> f64 {
        round_to(pixels * self.config.pixel_pitch_um, 10.0)
    }
}

/// First and last index of the contiguous run around the peak of `curve`
/// whose values exceed `level`.
fn run_above(curve: &[f64], level: f64) -> Option<(usize, usize)> {
    let peak = argmax(curve)?;
    if curve[peak] <= level {
        return None;
    }

    let lower = curve[..peak]
        .iter()
        .rposition(|&v| v <= level)
        .map_or(0, |i| i + 1);
    let upper = curve[peak..]
        .iter()
        .position(|&v| v <= level)
        .map_or(curve.len() - 1, |i| peak + i - 1);
    Some((lower, upper))
}
