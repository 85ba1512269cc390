//! Error type shared by every stage of the waist pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the beam profiling pipeline.
///
/// Nothing in the pipeline retries or substitutes defaults; the first failing
/// stage returns one of these to the caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Degenerate input: {0}")]
    DegenerateInput(&'static str),

    #[error(
        "Crop window {width}x{height} around ({center_x}, {center_y}) exceeds image extent {image_width}x{image_height}"
    )]
    OutOfBounds {
        width: usize,
        height: usize,
        center_x: usize,
        center_y: usize,
        image_width: usize,
        image_height: usize,
    },

    #[error("Insufficient data: {available} samples left, at least {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error("Fit diverged after {iterations} iterations: {reason}")]
    FitDiverged {
        iterations: usize,
        reason: &'static str,
    },

    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Invalid value '{value}' in row {row}, column {column}")]
    InvalidCell {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("No image registered under '{0}'")]
    UnknownImage(String),

    #[error("Failed to load image '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read directory '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] common::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
