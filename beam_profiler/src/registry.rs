//! Named collection of normalized beam images.

use std::path::Path;

use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::io::load_normalized;

/// Extensions picked up by [`ImageRegistry::load_dir`].
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

/// Images keyed by a logical name (the file stem when loaded from disk).
///
/// Built once by the application and passed by reference to whatever needs
/// to look images up.
#[derive(Debug, Clone, Default)]
pub struct ImageRegistry {
    images: HashMap<String, Grid>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every image file directly inside `dir`.
    ///
    /// Files that fail to decode or normalize are logged and skipped; only a
    /// failure to read the directory itself is an error.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let io_error = |source| Error::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut registry = Self::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if !has_image_extension(&path) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match load_normalized(&path) {
                Ok(grid) => {
                    registry.insert(name, grid);
                }
                Err(err) => tracing::warn!("Skipping {}: {err}", path.display()),
            }
        }

        tracing::info!(
            "Registered {} images from {}",
            registry.len(),
            dir.display()
        );
        Ok(registry)
    }

    /// Adds or replaces an image, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, grid: Grid) -> Option<Grid> {
        self.images.insert(name.into(), grid)
    }

    pub fn get(&self, name: &str) -> Result<&Grid> {
        self.images
            .get(name)
            .ok_or_else(|| Error::UnknownImage(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.images.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
