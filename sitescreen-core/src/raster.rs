//! North-up rasters and the band algebra used to derive indicator layers.
//!
//! Boolean layers are stored as `Grid<f64>` holding `1.0` for true and
//! `0.0` for false. `NaN` marks a masked cell and propagates through every
//! operation, so a pixel without data never turns into a confident answer.
//!
//! # Examples
//! ```
//! use geo::Coord;
//! use sitescreen_core::{Grid, GridTransform};
//!
//! let transform = GridTransform::new(Coord { x: 0.0, y: 60.0 }, 30.0);
//! let ndvi = Grid::from_vec(2, 1, transform, vec![0.1, 0.6])?;
//! let bare = ndvi.lt(0.2);
//! assert_eq!(bare.cells(), &[1.0, 0.0]);
//! # Ok::<(), sitescreen_core::RasterError>(())
//! ```
#![expect(
    clippy::float_arithmetic,
    reason = "raster algebra is floating-point by nature"
)]

use geo::Coord;
use thiserror::Error;

/// Errors raised by raster construction and algebra.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RasterError {
    /// Width or height was zero.
    #[error("raster dimensions must be non-zero, got {width}x{height}")]
    EmptyShape {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// The number of cells did not match `width * height`.
    #[error("raster of {width}x{height} needs {expected} cells, got {actual}")]
    DataLength {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
        /// Cells required.
        expected: usize,
        /// Cells supplied.
        actual: usize,
    },
    /// The cell size was not a positive finite number.
    #[error("raster cell size must be positive and finite, got {cell_size}")]
    InvalidCellSize {
        /// Offending cell size.
        cell_size: f64,
    },
    /// Two rasters combined in one operation were not co-registered.
    #[error("raster {left:?} does not align with raster {right:?}")]
    ShapeMismatch {
        /// `(width, height)` of the left operand.
        left: (usize, usize),
        /// `(width, height)` of the right operand.
        right: (usize, usize),
    },
    /// A sum was requested over no layers.
    #[error("at least one raster layer is required")]
    NoLayers,
}

/// Affine placement of a north-up raster.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridTransform {
    /// Map coordinate of the top-left corner of the top-left cell.
    pub origin: Coord<f64>,
    /// Edge length of a square cell in map units.
    pub cell_size: f64,
}

impl GridTransform {
    /// Construct a transform.
    #[must_use]
    pub const fn new(origin: Coord<f64>, cell_size: f64) -> Self {
        Self { origin, cell_size }
    }

    /// Return the map coordinate of the centre of cell `(col, row)`.
    #[expect(
        clippy::cast_precision_loss,
        reason = "raster indices stay far below 2^52"
    )]
    #[must_use]
    pub fn cell_center(&self, col: usize, row: usize) -> Coord<f64> {
        Coord {
            x: self.origin.x + (col as f64 + 0.5) * self.cell_size,
            y: self.origin.y - (row as f64 + 0.5) * self.cell_size,
        }
    }

    /// Return the `(col, row)` of the cell containing `coord`, if it lies on
    /// a raster of `width` by `height` cells.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "offsets are checked to be finite and non-negative before the cast"
    )]
    #[must_use]
    pub fn cell_at(&self, coord: Coord<f64>, width: usize, height: usize) -> Option<(usize, usize)> {
        let fx = ((coord.x - self.origin.x) / self.cell_size).floor();
        let fy = ((self.origin.y - coord.y) / self.cell_size).floor();
        if !fx.is_finite() || !fy.is_finite() || fx < 0.0 || fy < 0.0 {
            return None;
        }
        let (col, row) = (fx as usize, fy as usize);
        (col < width && row < height).then_some((col, row))
    }
}

/// A row-major raster of `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    transform: GridTransform,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Build a raster from row-major cells.
    ///
    /// # Errors
    /// Returns [`RasterError::EmptyShape`] for zero dimensions,
    /// [`RasterError::InvalidCellSize`] for a non-positive cell size and
    /// [`RasterError::DataLength`] when `cells` has the wrong length.
    pub fn from_vec(
        width: usize,
        height: usize,
        transform: GridTransform,
        cells: Vec<T>,
    ) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyShape { width, height });
        }
        if !transform.cell_size.is_finite() || transform.cell_size <= 0.0 {
            return Err(RasterError::InvalidCellSize {
                cell_size: transform.cell_size,
            });
        }
        let expected = width.saturating_mul(height);
        if cells.len() != expected {
            return Err(RasterError::DataLength {
                width,
                height,
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            transform,
            cells,
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)` pair.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Placement of the raster.
    #[must_use]
    pub const fn transform(&self) -> &GridTransform {
        &self.transform
    }

    /// Row-major cell values.
    #[must_use]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Mutable row-major cell values.
    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Return the cell at `(col, row)`.
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> Option<&T> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(row * self.width + col)
    }

    /// Return the cell under a map coordinate.
    #[must_use]
    pub fn sample(&self, coord: Coord<f64>) -> Option<&T> {
        let (col, row) = self.transform.cell_at(coord, self.width, self.height)?;
        self.get(col, row)
    }

    /// Report whether `other` shares this raster's shape and placement.
    #[must_use]
    pub fn is_aligned_with<U>(&self, other: &Grid<U>) -> bool {
        self.shape() == other.shape() && self.transform == other.transform
    }

    /// Fail unless `other` is co-registered with `self`.
    ///
    /// # Errors
    /// Returns [`RasterError::ShapeMismatch`] when the rasters differ in
    /// shape or placement.
    pub fn ensure_aligned<U>(&self, other: &Grid<U>) -> Result<(), RasterError> {
        if self.is_aligned_with(other) {
            Ok(())
        } else {
            Err(RasterError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            })
        }
    }

    /// Iterate over `(col, row, value)` in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.cells
            .chunks(self.width)
            .enumerate()
            .flat_map(|(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(move |(col, value)| (col, row, value))
            })
    }

    /// Apply `f` to every cell.
    #[must_use]
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            transform: self.transform,
            cells: self.cells.iter().map(f).collect(),
        }
    }

    /// Combine two co-registered rasters cell by cell.
    ///
    /// # Errors
    /// Returns [`RasterError::ShapeMismatch`] when the rasters are not aligned.
    pub fn zip_with<U, V>(
        &self,
        other: &Grid<U>,
        mut f: impl FnMut(&T, &U) -> V,
    ) -> Result<Grid<V>, RasterError> {
        self.ensure_aligned(other)?;
        Ok(Grid {
            width: self.width,
            height: self.height,
            transform: self.transform,
            cells: self
                .cells
                .iter()
                .zip(&other.cells)
                .map(|(left, right)| f(left, right))
                .collect(),
        })
    }
}

impl<T: Clone> Grid<T> {
    /// Build a raster with every cell set to `value`.
    ///
    /// # Errors
    /// See [`Grid::from_vec`].
    pub fn filled(
        width: usize,
        height: usize,
        transform: GridTransform,
        value: T,
    ) -> Result<Self, RasterError> {
        Self::from_vec(
            width,
            height,
            transform,
            vec![value; width.saturating_mul(height)],
        )
    }
}

fn truth(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

impl Grid<f64> {
    /// Normalised difference `(self - other) / (self + other)`.
    ///
    /// Cells where the denominator is zero become masked.
    ///
    /// # Errors
    /// Returns [`RasterError::ShapeMismatch`] when the rasters are not aligned.
    pub fn normalized_difference(&self, other: &Self) -> Result<Self, RasterError> {
        self.zip_with(other, |&a, &b| {
            let denominator = a + b;
            if denominator == 0.0 {
                f64::NAN
            } else {
                (a - b) / denominator
            }
        })
    }

    /// Strict less-than comparison against a constant.
    #[must_use]
    pub fn lt(&self, threshold: f64) -> Self {
        self.map(|&value| {
            if value.is_nan() {
                f64::NAN
            } else {
                truth(value < threshold)
            }
        })
    }

    /// Strict greater-than comparison against a constant.
    #[must_use]
    pub fn gt(&self, threshold: f64) -> Self {
        self.map(|&value| {
            if value.is_nan() {
                f64::NAN
            } else {
                truth(value > threshold)
            }
        })
    }

    /// Logical AND of two boolean layers. Non-zero counts as true.
    ///
    /// # Errors
    /// Returns [`RasterError::ShapeMismatch`] when the rasters are not aligned.
    pub fn and(&self, other: &Self) -> Result<Self, RasterError> {
        self.zip_with(other, |&a, &b| {
            if a.is_nan() || b.is_nan() {
                f64::NAN
            } else {
                truth(a != 0.0 && b != 0.0)
            }
        })
    }

    /// Logical OR of two boolean layers. Non-zero counts as true.
    ///
    /// # Errors
    /// Returns [`RasterError::ShapeMismatch`] when the rasters are not aligned.
    pub fn or(&self, other: &Self) -> Result<Self, RasterError> {
        self.zip_with(other, |&a, &b| {
            if a.is_nan() || b.is_nan() {
                f64::NAN
            } else {
                truth(a != 0.0 || b != 0.0)
            }
        })
    }

    /// Logical NOT of a boolean layer.
    #[must_use]
    pub fn not(&self) -> Self {
        self.map(|&value| {
            if value.is_nan() {
                f64::NAN
            } else {
                truth(value == 0.0)
            }
        })
    }

    /// Multiply every cell by `weight`.
    #[must_use]
    pub fn weighted(&self, weight: f64) -> Self {
        self.map(|&value| value * weight)
    }

    /// Cell-wise sum of co-registered layers.
    ///
    /// # Errors
    /// Returns [`RasterError::NoLayers`] for an empty slice and
    /// [`RasterError::ShapeMismatch`] when the layers are not aligned.
    pub fn sum_layers(layers: &[Self]) -> Result<Self, RasterError> {
        let (first, rest) = layers.split_first().ok_or(RasterError::NoLayers)?;
        rest.iter()
            .try_fold(first.clone(), |total, layer| total.zip_with(layer, |a, b| a + b))
    }

    /// Count of cells that are not masked.
    #[must_use]
    pub fn valid_cells(&self) -> usize {
        self.cells.iter().filter(|value| !value.is_nan()).count()
    }
}
