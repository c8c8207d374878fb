//! Row-major 2D grid storage
//!
//! Every per-cell quantity in the simulation (cell states, factor classes,
//! altitude, slope tables) is stored in a [`Grid`]. Values are kept in a flat
//! `Vec<T>` in row-major order so whole rows can be handed out as slices,
//! which is what the halo exchange and the gather step move between workers.

use serde::{Deserialize, Serialize};

/// Generic 2D grid in row-major order
///
/// `width` is the number of columns, `height` the number of rows.
/// Cell `(row, col)` lives at `data[row * width + col]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`
    #[must_use]
    pub fn with_value(height: usize, width: usize, value: T) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Fill entire grid with a value
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Overwrite one row with the given values
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds or `values` has the wrong length
    pub fn copy_row_from(&mut self, row: usize, values: &[T]) {
        assert_eq!(values.len(), self.width, "Row length mismatch");
        self.row_mut(row).clone_from_slice(values);
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f(row, col)` for every cell
    pub fn from_fn(height: usize, width: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Wrap existing row-major data
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != height * width`
    #[must_use]
    pub fn from_rows(height: usize, width: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), width * height, "Grid data size mismatch");
        Self {
            data,
            width,
            height,
        }
    }

    /// Number of columns
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get reference to the flat row-major data
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get mutable reference to the flat row-major data
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get a reference to the cell at `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> &T {
        assert!(
            row < self.height && col < self.width,
            "Coordinates out of bounds"
        );
        &self.data[row * self.width + col]
    }

    /// Set value at `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(
            row < self.height && col < self.width,
            "Coordinates out of bounds"
        );
        self.data[row * self.width + col] = value;
    }

    /// Borrow one row as a slice
    #[must_use]
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    /// Borrow one row mutably
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let start = row * self.width;
        &mut self.data[start..start + self.width]
    }

    /// Borrow a contiguous block of rows `[first, first + count)` as one slice
    #[must_use]
    pub fn rows(&self, first: usize, count: usize) -> &[T] {
        let start = first * self.width;
        &self.data[start..start + count * self.width]
    }

    /// Iterate over rows
    pub fn iter_rows(&self) -> std::slice::Chunks<'_, T> {
        self.data.chunks(self.width.max(1))
    }
}

impl<T: Copy> Grid<T> {
    /// Copy of the cell at `(row, col)`
    #[must_use]
    pub fn at(&self, row: usize, col: usize) -> T {
        *self.get(row, col)
    }
}
