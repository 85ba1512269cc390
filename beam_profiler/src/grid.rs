use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};

/// Row-major 2-D intensity buffer. Rows are y, columns are x.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    values: Vec<f64>,
    width: usize,
    height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> Result<Self> {
        let expected = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: values.len(),
        })?;
        if values.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }

        Ok(Self {
            values,
            width,
            height,
        })
    }

    pub fn new_filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            values: vec![value; width * height],
            width,
            height,
        }
    }

    /// Builds a grid by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self {
            values,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    #[inline]
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values.get(y * self.width + x).copied()
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f64] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.width;
        &self.values[start..start + self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on zero width
        self.values.chunks_exact(self.width.max(1))
    }

    /// Same shape, values replaced by `f(value)`.
    pub fn map(&self, f: impl FnMut(f64) -> f64) -> Self {
        Self {
            values: self.values.iter().copied().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Copies the `width x height` region whose top-left corner is `(x, y)`.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> Option<Self> {
        if x > self.width
            || y > self.height
            || width > self.width - x
            || height > self.height - y
        {
            return None;
        }

        let mut values = Vec::with_capacity(width * height);
        for row in y..y + height {
            values.extend_from_slice(&self.row(row)[x..x + width]);
        }

        Some(Self {
            values,
            width,
            height,
        })
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = f64;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.values[y * self.width + x]
    }
}

impl IndexMut<(usize, usize)> for Grid {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.values[y * self.width + x]
    }
}

impl AsRef<[f64]> for Grid {
    #[inline]
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let grid = Grid::new(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.len(), 6);

        let err = Grid::new(3, 2, vec![1.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            Error::SizeMismatch {
                expected: 6,
                actual: 5
            }
        ));
    }

    #[test]
    fn test_index_is_x_then_y() {
        // row 0 = [1, 2, 3], row 1 = [4, 5, 6]
        let grid = Grid::new(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(grid[(2, 0)], 3.0);
        assert_eq!(grid[(0, 1)], 4.0);
        assert_eq!(grid.get(2, 1), Some(6.0));
        assert_eq!(grid.get(3, 1), None);
        assert_eq!(grid.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_from_fn_and_rows() {
        let grid = Grid::from_fn(2, 3, |x, y| (10 * y + x) as f64);
        let rows: Vec<&[f64]> = grid.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], &[0.0, 1.0]);
        assert_eq!(rows[2], &[20.0, 21.0]);
    }

    #[test]
    fn test_crop_inside_and_outside() {
        let grid = Grid::from_fn(4, 3, |x, y| (10 * y + x) as f64);

        let sub = grid.crop(1, 1, 3, 2).unwrap();
        assert_eq!(sub.width(), 3);
        assert_eq!(sub.height(), 2);
        assert_eq!(sub.values(), &[11.0, 12.0, 13.0, 21.0, 22.0, 23.0]);

        assert!(grid.crop(2, 0, 3, 1).is_none());
        assert!(grid.crop(0, 0, 4, 4).is_none());
        assert!(grid.crop(5, 0, 0, 0).is_none());
    }

    #[test]
    fn test_map_keeps_shape() {
        let grid = Grid::new_filled(2, 2, 3.0);
        let doubled = grid.map(|v| v * 2.0);
        assert_eq!(doubled.values(), &[6.0; 4]);
        assert_eq!(doubled.width(), 2);
    }
}
