//! Rendering of profiles, fits and images for inspection.
//!
//! The measurement pipeline never draws anything itself; applications hand
//! its results to a [`PlotSink`].

use std::path::{Path, PathBuf};

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

use crate::array_ops::range;
use crate::error::{Error, Result};
use crate::grid::Grid;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([160, 160, 160]);
const DATA: Rgb<u8> = Rgb([31, 119, 180]);
const OVERLAY: Rgb<u8> = Rgb([214, 39, 40]);
const MARGIN: u32 = 12;
const MARKER_RADIUS: i32 = 2;

/// Paired abscissae and ordinates.
#[derive(Debug, Clone, Copy)]
pub struct XySeries<'a> {
    pub xs: &'a [f64],
    pub ys: &'a [f64],
}

impl<'a> XySeries<'a> {
    pub fn new(xs: &'a [f64], ys: &'a [f64]) -> Self {
        Self { xs, ys }
    }
}

/// Destination for visual output.
pub trait PlotSink {
    /// Scattered `(x, y)` samples with an optional fitted curve.
    fn render_xy(&mut self, name: &str, data: XySeries<'_>, overlay: Option<XySeries<'_>>)
    -> Result<()>;

    /// 2-D intensity image.
    fn render_grid(&mut self, name: &str, grid: &Grid) -> Result<()>;

    /// 1-D profile indexed by pixel, with an optional fitted curve over the
    /// same indices.
    fn render_profile(&mut self, name: &str, profile: &[f64], overlay: Option<&[f64]>) -> Result<()> {
        let xs: Vec<f64> = (0..profile.len().max(overlay.map_or(0, <[f64]>::len)))
            .map(|i| i as f64)
            .collect();
        self.render_xy(
            name,
            XySeries::new(&xs[..profile.len()], profile),
            overlay.map(|ys| XySeries::new(&xs[..ys.len()], ys)),
        )
    }
}

/// Writes each plot as `<out_dir>/<name>.png`.
#[derive(Debug, Clone)]
pub struct PngPlotter {
    out_dir: PathBuf,
    width: u32,
    height: u32,
}

impl PngPlotter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            width: 640,
            height: 480,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        assert!(
            width > 2 * MARGIN && height > 2 * MARGIN,
            "plot size {width}x{height} leaves no drawing area"
        );
        self.width = width;
        self.height = height;
        self
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.out_dir.join(format!("{name}.png"))
    }

    fn save(&self, name: &str, save: impl FnOnce(&Path) -> image::ImageResult<()>) -> Result<()> {
        let path = self.path_for(name);
        std::fs::create_dir_all(&self.out_dir).map_err(|source| Error::Io {
            path: self.out_dir.clone(),
            source,
        })?;
        save(&path).map_err(|source| Error::Image {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Wrote plot {}", path.display());
        Ok(())
    }
}

impl PlotSink for PngPlotter {
    fn render_xy(
        &mut self,
        name: &str,
        data: XySeries<'_>,
        overlay: Option<XySeries<'_>>,
    ) -> Result<()> {
        let frame = Frame::fit(self.width, self.height, data, overlay)?;
        let mut canvas = RgbImage::from_pixel(self.width, self.height, BACKGROUND);

        // Axes at the lower and left edges of the data area
        let (left, bottom) = frame.to_pixel(frame.x_min, frame.y_min);
        let (right, top) = frame.to_pixel(frame.x_max, frame.y_max);
        draw_line_segment_mut(&mut canvas, (left, bottom), (right, bottom), AXIS);
        draw_line_segment_mut(&mut canvas, (left, bottom), (left, top), AXIS);

        for (&x, &y) in data.xs.iter().zip(data.ys) {
            if x.is_finite() && y.is_finite() {
                let center = frame.marker_center(x, y);
                draw_hollow_circle_mut(&mut canvas, center, MARKER_RADIUS, DATA);
            }
        }
        if let Some(overlay) = overlay {
            draw_polyline(&mut canvas, &frame, overlay, OVERLAY);
        }

        self.save(name, |path| canvas.save(path))
    }

    fn render_grid(&mut self, name: &str, grid: &Grid) -> Result<()> {
        let (min, max) = range(grid.values())?;
        let span = if max > min { max - min } else { 1.0 };
        let bytes = grid
            .values()
            .iter()
            .map(|&v| (((v - min) / span).clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();

        let image = GrayImage::from_raw(grid.width() as u32, grid.height() as u32, bytes).ok_or(
            Error::SizeMismatch {
                expected: grid.width() * grid.height(),
                actual: grid.len(),
            },
        )?;
        self.save(name, |path| image.save(path))
    }
}

/// Data-to-pixel transform covering both series.
struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: u32,
    height: u32,
}

impl Frame {
    fn fit(width: u32, height: u32, data: XySeries<'_>, overlay: Option<XySeries<'_>>) -> Result<Self> {
        if data.xs.len() != data.ys.len() {
            return Err(Error::SizeMismatch {
                expected: data.xs.len(),
                actual: data.ys.len(),
            });
        }

        let mut xs = data.xs.to_vec();
        let mut ys = data.ys.to_vec();
        if let Some(overlay) = overlay {
            xs.extend_from_slice(overlay.xs);
            ys.extend_from_slice(overlay.ys);
        }
        let (x_min, x_max) = widen(range(&xs)?);
        let (y_min, y_max) = widen(range(&ys)?);

        Ok(Self {
            x_min,
            x_max,
            y_min: y_min.min(0.0),
            y_max,
            width,
            height,
        })
    }

    fn to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let inner_w = f64::from(self.width - 2 * MARGIN - 1);
        let inner_h = f64::from(self.height - 2 * MARGIN - 1);
        let px = f64::from(MARGIN) + (x - self.x_min) / (self.x_max - self.x_min) * inner_w;
        let py = f64::from(MARGIN) + (self.y_max - y) / (self.y_max - self.y_min) * inner_h;
        (px as f32, py as f32)
    }

    fn marker_center(&self, x: f64, y: f64) -> (i32, i32) {
        let (px, py) = self.to_pixel(x, y);
        (px.round() as i32, py.round() as i32)
    }
}

/// Expands an empty range so the transform stays finite.
fn widen((min, max): (f64, f64)) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 0.5, max + 0.5) }
}

fn draw_polyline(canvas: &mut RgbImage, frame: &Frame, series: XySeries<'_>, color: Rgb<u8>) {
    let points: Vec<(f32, f32)> = series
        .xs
        .iter()
        .zip(series.ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| frame.to_pixel(x, y))
        .collect();
    for pair in points.windows(2) {
        draw_line_segment_mut(canvas, pair[0], pair[1], color);
    }
}
