//! Per-state cell counts

use super::CellState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of cells in each state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    counts: [usize; 4],
}

impl Census {
    /// Count the states in a slice of cells
    #[must_use]
    pub fn of(cells: &[CellState]) -> Self {
        let mut counts = [0; 4];
        for state in cells {
            counts[state.index()] += 1;
        }
        Self { counts }
    }

    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.counts[state.index()]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Cells that are burning or burned down
    #[must_use]
    pub fn affected(&self) -> usize {
        self.count(CellState::Burning) + self.count(CellState::Burnt)
    }
}

impl fmt::Display for Census {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "non-fuel {}, fuel {}, burning {}, burnt {}",
            self.count(CellState::NonFuel),
            self.count(CellState::Fuel),
            self.count(CellState::Burning),
            self.count(CellState::Burnt)
        )
    }
}
