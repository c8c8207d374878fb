//! Many-to-one gather of partition interiors
//!
//! Workers run ahead of each other by at most a few generations, so
//! contributions can arrive interleaved across generations. The aggregator
//! buffers them per generation and releases a snapshot only once every rank
//! has contributed, always in generation order.

use super::snapshot::Snapshot;
use crate::core_types::{decode_row, CellState, Grid, InvalidCellCode};
use crate::error::{LinkFault, SimulationError};
use crate::grid::PartitionLayout;
use std::collections::BTreeMap;

/// One worker's interior rows for one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatherMessage {
    pub rank: usize,
    pub generation: usize,
    /// Row-major cell state codes of the interior rows
    pub cells: Vec<u8>,
}

/// Collects gather messages and assembles ordered snapshots
#[derive(Debug)]
pub struct ResultAggregator {
    layout: PartitionLayout,
    pending: BTreeMap<usize, Vec<Option<Vec<u8>>>>,
    next_generation: usize,
}

impl ResultAggregator {
    /// Aggregator expecting snapshots from generation `first_generation` on
    #[must_use]
    pub fn new(layout: &PartitionLayout, first_generation: usize) -> Self {
        Self {
            layout: layout.clone(),
            pending: BTreeMap::new(),
            next_generation: first_generation,
        }
    }

    /// Generation of the next snapshot to be released
    #[must_use]
    pub fn next_generation(&self) -> usize {
        self.next_generation
    }

    /// Buffer one contribution
    ///
    /// # Errors
    ///
    /// Rejects contributions from unknown ranks, duplicates, contributions
    /// for an already released generation and wrongly sized interiors.
    pub fn accept(&mut self, message: GatherMessage) -> Result<(), SimulationError> {
        let GatherMessage {
            rank,
            generation,
            cells,
        } = message;
        let fault = |kind| SimulationError::Communication {
            generation,
            worker: rank,
            fault: kind,
        };

        let worker_count = self.layout.worker_count();
        if rank >= worker_count {
            return Err(fault(LinkFault::UnknownRank { rank }));
        }
        if generation < self.next_generation {
            return Err(fault(LinkFault::DuplicateContribution { rank, generation }));
        }

        let expected = self.layout.interior_rows(rank) * self.layout.columns();
        if cells.len() != expected {
            return Err(fault(LinkFault::RowLength {
                expected,
                received: cells.len(),
            }));
        }

        let slots = self
            .pending
            .entry(generation)
            .or_insert_with(|| vec![None; worker_count]);
        if slots[rank].is_some() {
            return Err(fault(LinkFault::DuplicateContribution { rank, generation }));
        }
        slots[rank] = Some(cells);
        Ok(())
    }

    /// Release the next snapshot if every rank has contributed to it
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error naming the contributing rank if a
    /// contribution holds an unknown cell code.
    pub fn pop_ready(&mut self) -> Result<Option<Snapshot>, SimulationError> {
        let generation = self.next_generation;
        let complete = self
            .pending
            .get(&generation)
            .is_some_and(|slots| slots.iter().all(Option::is_some));
        if !complete {
            return Ok(None);
        }

        let slots = self.pending.remove(&generation).unwrap_or_default();
        let mut data: Vec<CellState> =
            Vec::with_capacity(self.layout.simulated_rows() * self.layout.columns());
        for (rank, contribution) in slots.into_iter().enumerate() {
            let codes = contribution.unwrap_or_default();
            let states = decode_row(&codes).map_err(|InvalidCellCode(code)| {
                SimulationError::InvalidState {
                    generation,
                    worker: rank,
                    code,
                }
            })?;
            data.extend(states);
        }

        self.next_generation += 1;
        Ok(Some(Snapshot::new(
            generation,
            Grid::from_rows(self.layout.simulated_rows(), self.layout.columns(), data),
        )))
    }

    /// Generations with at least one contribution still waiting
    #[must_use]
    pub fn buffered_generations(&self) -> usize {
        self.pending.len()
    }
}
