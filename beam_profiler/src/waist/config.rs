//! Estimator configuration.

use std::path::Path;

use common::ConfigError;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::centroid::CropWindow;
use crate::error::Result;
use crate::fit::SolverConfig;
use crate::saturation::SaturationBand;

/// Pixel pitch of the Raspberry Pi camera v2 sensor, in micrometers.
pub const DEFAULT_PIXEL_PITCH_UM: f64 = 1.12;

/// How a profile is turned into a beam radius.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum FitStrategy {
    /// Gaussian fit over the whole profile; radius is the fitted width.
    #[default]
    Gaussian,
    /// Gaussian fit over samples inside the saturation band only.
    Saturated,
    /// Width of the fitted curve above the 1/e² level, scaled by 0.66.
    OneOverESquared,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaistConfig {
    /// Physical size of one pixel, in micrometers.
    pub pixel_pitch_um: f64,
    /// Gaussian blur applied after normalization, in pixels; 0 disables it.
    pub blur_sigma: f64,
    /// Successive centroid-anchored crops applied after normalization.
    pub crop_windows: Vec<CropWindow>,
    /// Trusted intensity band for [`FitStrategy::Saturated`].
    pub saturation_band: SaturationBand,
    pub solver: SolverConfig,
}

impl Default for WaistConfig {
    fn default() -> Self {
        Self {
            pixel_pitch_um: DEFAULT_PIXEL_PITCH_UM,
            blur_sigma: 0.0,
            crop_windows: Vec::new(),
            saturation_band: SaturationBand::new(0.0, 0.85),
            solver: SolverConfig::default(),
        }
    }
}

impl WaistConfig {
    /// Reads a YAML or JSON config, chosen by file extension.
    ///
    /// Values that parse but violate [`check`](Self::check) are reported as
    /// [`ConfigError::Invalid`].
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = common::load_config(path)?;
        config.check().map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    pub fn validate(&self) {
        if let Err(reason) = self.check() {
            panic!("{reason}");
        }
    }

    /// First violated constraint, if any.
    pub fn check(&self) -> std::result::Result<(), String> {
        if !(self.pixel_pitch_um.is_finite() && self.pixel_pitch_um > 0.0) {
            return Err(format!(
                "pixel_pitch_um must be positive, got {}",
                self.pixel_pitch_um
            ));
        }
        if !(self.blur_sigma.is_finite() && self.blur_sigma >= 0.0) {
            return Err(format!(
                "blur_sigma must be non-negative, got {}",
                self.blur_sigma
            ));
        }
        if let Some(window) = self
            .crop_windows
            .iter()
            .find(|w| w.width < 2 || w.height < 2)
        {
            return Err(format!(
                "crop window {}x{} is smaller than 2x2",
                window.width, window.height
            ));
        }
        let band = self.saturation_band;
        if band.check().is_err() {
            return Err(format!(
                "saturation band [{}, {}] is inverted or NaN",
                band.floor, band.limit
            ));
        }
        self.solver.check()
    }
}
