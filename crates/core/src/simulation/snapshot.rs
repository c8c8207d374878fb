//! Full-grid snapshots handed to the rendering side

use crate::core_types::{CellState, Census, Grid};
use serde::{Deserialize, Serialize};

/// The assembled global grid after one generation
///
/// Rows are the interior rows of every partition in ascending rank order;
/// generation 0 is the initial condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    generation: usize,
    cells: Grid<CellState>,
}

impl Snapshot {
    /// Wrap an assembled grid
    ///
    /// # Arguments
    ///
    /// * `generation` - Transitions applied since the initial condition
    /// * `cells` - Interior rows of every partition, in rank order
    #[must_use]
    pub fn new(generation: usize, cells: Grid<CellState>) -> Self {
        Self { generation, cells }
    }

    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn cells(&self) -> &Grid<CellState> {
        &self.cells
    }

    /// Simulated rows (margin rows excluded)
    #[must_use]
    pub fn rows(&self) -> usize {
        self.cells.height()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cells.width()
    }

    #[must_use]
    pub fn state(&self, row: usize, col: usize) -> CellState {
        self.cells.at(row, col)
    }

    /// Cell counts per state over the whole snapshot
    #[must_use]
    pub fn census(&self) -> Census {
        Census::of(self.cells.as_slice())
    }

    /// Rows of numeric state codes (1 = non-fuel … 4 = burnt)
    #[must_use]
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter_rows()
            .map(|row| row.iter().map(|state| state.code()).collect())
            .collect()
    }
}
