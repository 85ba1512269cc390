use std::str::FromStr;

use strum::IntoEnumIterator;

use super::*;
use crate::centroid::CropWindow;
use crate::fit::SolverConfig;
use crate::test_utils::{assert_close, clamped_gaussian_profile, gaussian_beam, gaussian_profile};

#[test]
fn test_waist_of_elliptical_beam() {
    let grid = gaussian_beam(120, 100, (60.0, 50.0), (20.0, 15.0));
    let waist = WaistEstimator::default().waist(&grid).unwrap();

    assert_close(waist.x, 20.0 * 1.12, 0.01);
    assert_close(waist.y, 15.0 * 1.12, 0.01);
}

#[test]
fn test_waist_scales_with_pixel_pitch() {
    let grid = gaussian_beam(120, 100, (60.0, 50.0), (20.0, 15.0));
    let estimator = WaistEstimator::new(WaistConfig {
        pixel_pitch_um: 2.0,
        ..WaistConfig::default()
    });

    let waist = estimator.waist(&grid).unwrap();
    assert_close(waist.x, 40.0, 0.01);
    assert_close(waist.y, 30.0, 0.01);
}

#[test]
fn test_waist_is_rounded_to_one_decimal() {
    let grid = gaussian_beam(90, 90, (44.0, 47.0), (13.3, 9.7));
    let waist = WaistEstimator::default().waist(&grid).unwrap();

    for radius in [waist.x, waist.y] {
        assert!(((radius * 10.0).round() - radius * 10.0).abs() < 1e-9);
    }
}

#[test]
fn test_waist_of_dark_frame_is_degenerate() {
    let grid = Grid::new_filled(20, 20, 0.0);
    assert!(matches!(
        WaistEstimator::default().waist(&grid),
        Err(Error::DegenerateInput(_))
    ));
}

#[test]
fn test_waist_with_crop_windows() {
    let grid = gaussian_beam(300, 240, (140.0, 130.0), (20.0, 15.0));
    let estimator = WaistEstimator::new(WaistConfig {
        crop_windows: vec![CropWindow::new(200, 200), CropWindow::new(120, 100)],
        ..WaistConfig::default()
    });

    let measurement = estimator.measure(&grid, FitStrategy::Gaussian).unwrap();
    assert_eq!(measurement.x.profile.len(), 120);
    assert_eq!(measurement.y.profile.len(), 100);
    assert_close(measurement.x.radius_um, 22.4, 0.01);
    assert_close(measurement.y.radius_um, 16.8, 0.01);
}

#[test]
fn test_blur_widens_measured_waist() {
    let grid = gaussian_beam(120, 100, (60.0, 50.0), (20.0, 15.0));
    let sharp = WaistEstimator::default().waist(&grid).unwrap();
    let blurred = WaistEstimator::new(WaistConfig {
        blur_sigma: 5.0,
        ..WaistConfig::default()
    })
    .waist(&grid)
    .unwrap();

    assert!(blurred.x > sharp.x, "{blurred:?} vs {sharp:?}");
    assert!(blurred.y > sharp.y, "{blurred:?} vs {sharp:?}");
}

#[test]
fn test_crop_larger_than_image_is_out_of_bounds() {
    let grid = gaussian_beam(60, 60, (30.0, 30.0), (8.0, 8.0));
    let estimator = WaistEstimator::new(WaistConfig {
        crop_windows: vec![CropWindow::new(100, 40)],
        ..WaistConfig::default()
    });

    assert!(matches!(
        estimator.waist(&grid),
        Err(Error::OutOfBounds { .. })
    ));
}

#[test]
fn test_one_over_e_squared_span() {
    // Curve exceeds 0.135 on [30, 70]: span 40 pixels
    let profile = gaussian_profile(100, 50.0, 20.0, 1.0);
    let radius = WaistEstimator::default()
        .waist_one_over_e_squared(&profile)
        .unwrap();
    assert!((radius - 26.4).abs() < 1e-9, "radius = {radius}");
}

#[test]
fn test_run_above_level() {
    let curve = [0.0, 0.1, 0.5, 1.0, 0.6, 0.2, 0.05, 0.3];
    assert_eq!(run_above(&curve, 0.135), Some((2, 5)));
    assert_eq!(run_above(&[1.0, 0.9, 0.0], 0.135), Some((0, 1)));
    assert_eq!(run_above(&[0.1, 0.1], 0.135), None);
    assert_eq!(run_above(&[], 0.135), None);
}

#[test]
fn test_saturated_waist_recovers_true_width() {
    let profile = clamped_gaussian_profile(100, 50.0, 15.0, 0.9);
    let estimator = WaistEstimator::default();

    let (curve, radius) = estimator
        .saturated_waist(&profile, SaturationBand::new(0.0, 0.85))
        .unwrap();
    assert_eq!(curve.len(), profile.len());
    assert_close(radius, 15.0 * 1.12, 0.10);
    // The fit sees only unsaturated samples, so the curve rises above the clamp
    assert!(curve[50] > 0.9);
}

#[test]
fn test_unsaturated_fit_is_biased_by_clamping() {
    let profile = clamped_gaussian_profile(100, 50.0, 15.0, 0.9);
    let estimator = WaistEstimator::default();

    let (_, saturated) = estimator
        .saturated_waist(&profile, SaturationBand::new(0.0, 0.85))
        .unwrap();
    let naive = fit_gaussian_profile(&profile, &SolverConfig::default()).unwrap();
    let naive_um = naive.params.width.abs() * DEFAULT_PIXEL_PITCH_UM;

    assert_close(saturated, 16.8, 0.01);
    assert!(
        naive_um > saturated,
        "naive {naive_um} should exceed saturated {saturated}"
    );
}

#[test]
fn test_saturated_with_too_few_samples() {
    let profile = clamped_gaussian_profile(20, 10.0, 30.0, 0.9);
    let err = WaistEstimator::default()
        .saturated_waist(&profile, SaturationBand::new(0.0, 0.5))
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientData { required: 9, .. }));
}

#[test]
fn test_saturated_waist_rejects_invalid_band() {
    let profile = clamped_gaussian_profile(100, 50.0, 15.0, 0.9);
    let estimator = WaistEstimator::default();

    for band in [SaturationBand::new(0.85, 0.0), SaturationBand::new(f64::NAN, 0.85)] {
        let err = estimator.saturated_waist(&profile, band).unwrap_err();
        assert!(matches!(err, Error::DegenerateInput(_)), "{band:?}: {err}");
    }
}

#[test]
fn test_measure_saturated_grid() {
    let grid = gaussian_beam(120, 100, (60.0, 50.0), (20.0, 15.0)).map(|v| v.min(0.8));
    let measurement = WaistEstimator::default()
        .measure(&grid, FitStrategy::Saturated)
        .unwrap();

    assert_eq!(measurement.strategy, FitStrategy::Saturated);
    assert_eq!(measurement.x.fitted.len(), 120);
    assert_eq!(measurement.y.fitted.len(), 100);
    assert!(measurement.x.radius_um > measurement.y.radius_um);
}

#[test]
fn test_measure_keeps_profiles_for_display() {
    let grid = gaussian_beam(80, 60, (40.0, 30.0), (12.0, 9.0));
    let estimator = WaistEstimator::default();

    for strategy in FitStrategy::iter() {
        let m = estimator.measure(&grid, strategy).unwrap();
        assert_eq!(m.x.profile.len(), 80);
        assert_eq!(m.y.profile.len(), 60);
        assert_eq!(m.x.fitted.len(), 80);
        assert!(m.x.profile.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(m.x.radius_um > 0.0 && m.y.radius_um > 0.0);
    }
}

#[test]
fn test_measure_one_over_e_squared_matches_profile_call() {
    let grid = gaussian_beam(120, 100, (60.0, 50.0), (20.0, 15.0));
    let estimator = WaistEstimator::default();

    let measurement = estimator.measure(&grid, FitStrategy::OneOverESquared).unwrap();
    let direct = estimator
        .waist_one_over_e_squared(&measurement.x.profile)
        .unwrap();
    assert_eq!(measurement.x.radius_um, direct);
}

#[test]
fn test_strategy_names() {
    assert_eq!(FitStrategy::OneOverESquared.to_string(), "one_over_e_squared");
    assert_eq!(FitStrategy::from_str("Saturated").unwrap(), FitStrategy::Saturated);
    assert!(FitStrategy::from_str("lorentzian").is_err());
    assert_eq!(FitStrategy::iter().count(), 3);
}

#[test]
fn test_config_round_trips_through_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("waist.yaml");
    let config = WaistConfig {
        pixel_pitch_um: 3.45,
        crop_windows: vec![CropWindow::new(800, 800), CropWindow::new(500, 500)],
        saturation_band: SaturationBand::new(0.05, 0.8),
        ..WaistConfig::default()
    };

    common::save_config(&config, &path).unwrap();
    assert_eq!(WaistConfig::load(&path).unwrap(), config);
}

#[test]
fn test_partial_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("waist.json");
    std::fs::write(&path, r#"{ "pixel_pitch_um": 2.2 }"#).unwrap();

    let config = WaistConfig::load(&path).unwrap();
    assert_eq!(config.pixel_pitch_um, 2.2);
    assert!(config.crop_windows.is_empty());
    assert_eq!(config.solver, SolverConfig::default());
}

#[test]
fn test_config_with_unknown_extension() {
    let err = WaistConfig::load(std::path::Path::new("waist.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_config_file_with_invalid_values_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let cases = [
        ("pitch.json", r#"{ "pixel_pitch_um": -1.0 }"#, "pixel_pitch_um"),
        ("blur.json", r#"{ "blur_sigma": -2.0 }"#, "blur_sigma"),
        (
            "crop.json",
            r#"{ "crop_windows": [{ "width": 1, "height": 40 }] }"#,
            "crop window",
        ),
        (
            "band.yaml",
            "saturation_band:\n  floor: 0.9\n  limit: 0.1\n",
            "saturation band",
        ),
        ("solver.yaml", "solver:\n  lambda_down: 2.0\n", "lambda_down"),
    ];

    for (file, text, needle) in cases {
        let path = dir.path().join(file);
        std::fs::write(&path, text).unwrap();

        let err = WaistConfig::load(&path).unwrap_err();
        assert!(
            matches!(err, Error::Config(common::ConfigError::Invalid { .. })),
            "{file}: {err}"
        );
        assert!(err.to_string().contains(needle), "{file}: {err}");
    }
}

#[test]
#[should_panic(expected = "pixel_pitch_um must be positive")]
fn test_invalid_pixel_pitch() {
    WaistEstimator::new(WaistConfig {
        pixel_pitch_um: 0.0,
        ..WaistConfig::default()
    });
}
