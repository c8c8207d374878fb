//! Row-block domain decomposition
//!
//! The global grid is split into row-contiguous partitions, one per worker.
//! Each partition holds its interior rows plus a ghost row above and below.
//! Ghost rows mirror the neighboring partition's boundary row; the outermost
//! ghost rows (above rank 0, below the last rank) are never refreshed and act
//! as the global top/bottom margin.

use crate::config::{RemainderPolicy, SimulationConfig};
use crate::core_types::{CellState, Census, Grid};
use crate::error::ConfigError;
use tracing::{info, warn};

/// Side length of the square ignition seed block
const SEED_BLOCK: usize = 2;

/// How the global rows are assigned to workers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionLayout {
    columns: usize,
    rows_per_worker: Vec<usize>,
    row_offsets: Vec<usize>,
    dropped_rows: usize,
}

impl PartitionLayout {
    /// Split `total_rows` among `worker_count` workers
    ///
    /// # Arguments
    ///
    /// * `total_rows` - Simulated rows, margins excluded
    /// * `columns` - Grid width, margin columns included
    /// * `worker_count` - Number of partitions
    /// * `policy` - Handling of rows left over by the integer split
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnevenRows`] under [`RemainderPolicy::Reject`]
    /// when the rows do not divide evenly, and [`ConfigError::Zero`] for an
    /// empty grid or worker set.
    pub fn new(
        total_rows: usize,
        columns: usize,
        worker_count: usize,
        policy: RemainderPolicy,
    ) -> Result<Self, ConfigError> {
        if worker_count == 0 {
            return Err(ConfigError::Zero {
                name: "worker_count",
            });
        }
        if total_rows < worker_count {
            return Err(ConfigError::TooManyWorkers {
                workers: worker_count,
                rows: total_rows,
            });
        }

        let base = total_rows / worker_count;
        let remainder = total_rows % worker_count;

        let (rows_per_worker, dropped_rows) = match policy {
            _ if remainder == 0 => (vec![base; worker_count], 0),
            RemainderPolicy::Reject => {
                return Err(ConfigError::UnevenRows {
                    rows: total_rows,
                    workers: worker_count,
                    remainder,
                })
            }
            RemainderPolicy::Truncate => {
                warn!(
                    "Dropping {} remainder rows: {} rows over {} workers",
                    remainder, total_rows, worker_count
                );
                (vec![base; worker_count], remainder)
            }
            RemainderPolicy::Distribute => (
                (0..worker_count)
                    .map(|rank| base + usize::from(rank < remainder))
                    .collect(),
                0,
            ),
        };

        let row_offsets = rows_per_worker
            .iter()
            .scan(0, |offset, &rows| {
                let start = *offset;
                *offset += rows;
                Some(start)
            })
            .collect();

        Ok(Self {
            columns,
            rows_per_worker,
            row_offsets,
            dropped_rows,
        })
    }

    /// Layout for a validated configuration
    ///
    /// # Errors
    ///
    /// See [`PartitionLayout::new`].
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let layout = Self::new(
            config.total_rows,
            config.columns,
            config.worker_count,
            config.remainder_policy,
        )?;
        info!(
            "Partitioned {}x{} grid over {} workers: rows per worker {:?}",
            layout.simulated_rows(),
            layout.columns,
            layout.worker_count(),
            layout.rows_per_worker
        );
        Ok(layout)
    }

    /// Number of partitions
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.rows_per_worker.len()
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Interior rows owned by `rank`
    #[must_use]
    pub fn interior_rows(&self, rank: usize) -> usize {
        self.rows_per_worker[rank]
    }

    /// Global index of the first interior row of `rank`
    #[must_use]
    pub fn row_offset(&self, rank: usize) -> usize {
        self.row_offsets[rank]
    }

    /// Rows that actually take part in the simulation
    #[must_use]
    pub fn simulated_rows(&self) -> usize {
        self.rows_per_worker.iter().sum()
    }

    /// Rows dropped by [`RemainderPolicy::Truncate`]
    #[must_use]
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Rank that owns the ignition seed
    #[must_use]
    pub fn ignition_rank(&self) -> usize {
        self.worker_count() / 2
    }

    /// Initial partition for `rank`: margins `NonFuel`, interior `Fuel`, and
    /// the seed block `Burning` on the ignition rank
    #[must_use]
    pub fn initial_partition(&self, rank: usize) -> Partition {
        Partition::initial(
            rank,
            self.interior_rows(rank),
            self.columns,
            rank == self.ignition_rank(),
        )
    }
}

/// One worker's block of the grid, ghost rows included
///
/// Row 0 and row `interior_rows + 1` are ghost rows; column 0 and the last
/// column are margin columns that never ignite.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    rank: usize,
    cells: Grid<CellState>,
}

impl Partition {
    /// Fresh partition in the initial condition
    ///
    /// # Arguments
    ///
    /// * `rank` - Worker index of the partition
    /// * `interior_rows` - Rows owned by the worker, ghost rows excluded
    /// * `cols` - Grid width, margin columns included
    /// * `seeded` - Whether to place the ignition block
    ///
    /// # Returns
    ///
    /// `(interior_rows + 2) × cols` partition: ghost rows and margin columns
    /// `NonFuel`, interior `Fuel`, plus the `Burning` seed block if requested
    #[must_use]
    pub fn initial(rank: usize, interior_rows: usize, cols: usize, seeded: bool) -> Self {
        let rows = interior_rows + 2;
        let cells = Grid::from_fn(rows, cols, |row, col| {
            if row == 0 || row == rows - 1 || col == 0 || col == cols - 1 {
                CellState::NonFuel
            } else {
                CellState::Fuel
            }
        });
        let mut partition = Self { rank, cells };
        if seeded {
            partition.seed_ignition();
        }
        partition
    }

    /// Wrap an existing `(interior_rows + 2) × cols` cell grid
    ///
    /// # Panics
    ///
    /// Panics if the grid has fewer than three rows (no interior)
    #[must_use]
    pub fn from_grid(rank: usize, cells: Grid<CellState>) -> Self {
        assert!(cells.height() >= 3, "Partition needs at least one interior row");
        Self { rank, cells }
    }

    /// Set the seed block around the local center to `Burning`
    fn seed_ignition(&mut self) {
        let ignite_row = self.cells.height() / 2;
        let ignite_col = self.cells.width() / 2;
        for row in ignite_row.saturating_sub(SEED_BLOCK - 1)..=ignite_row {
            for col in ignite_col.saturating_sub(SEED_BLOCK - 1)..=ignite_col {
                if !self.is_margin(row, col) {
                    self.cells.set(row, col, CellState::Burning);
                }
            }
        }
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of interior (non-ghost) rows
    #[must_use]
    pub fn interior_rows(&self) -> usize {
        self.cells.height() - 2
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cells.width()
    }

    /// Whole buffer, ghost rows included
    #[must_use]
    pub fn cells(&self) -> &Grid<CellState> {
        &self.cells
    }

    #[must_use]
    pub fn state(&self, row: usize, col: usize) -> CellState {
        self.cells.at(row, col)
    }

    /// Whether `(row, col)` is a ghost row or margin column
    #[must_use]
    pub fn is_margin(&self, row: usize, col: usize) -> bool {
        row == 0 || row + 1 >= self.cells.height() || col == 0 || col + 1 >= self.cells.width()
    }

    /// First interior row, sent to the previous rank
    #[must_use]
    pub fn first_interior_row(&self) -> &[CellState] {
        self.cells.row(1)
    }

    /// Last interior row, sent to the next rank
    #[must_use]
    pub fn last_interior_row(&self) -> &[CellState] {
        self.cells.row(self.cells.height() - 2)
    }

    /// Copy of the previous rank's last interior row
    #[must_use]
    pub fn top_ghost(&self) -> &[CellState] {
        self.cells.row(0)
    }

    /// Copy of the next rank's first interior row
    #[must_use]
    pub fn bottom_ghost(&self) -> &[CellState] {
        self.cells.row(self.cells.height() - 1)
    }

    /// Overwrite the ghost row above the interior
    pub fn set_top_ghost(&mut self, row: &[CellState]) {
        self.cells.copy_row_from(0, row);
    }

    /// Overwrite the ghost row below the interior
    pub fn set_bottom_ghost(&mut self, row: &[CellState]) {
        let last = self.cells.height() - 1;
        self.cells.copy_row_from(last, row);
    }

    /// Interior rows as one contiguous row-major slice
    #[must_use]
    pub fn interior(&self) -> &[CellState] {
        self.cells.rows(1, self.interior_rows())
    }

    /// Count cells in each state over the interior rows
    #[must_use]
    pub fn interior_census(&self) -> Census {
        Census::of(self.interior())
    }
}
