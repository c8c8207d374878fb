//! Ghost-row exchange between row-adjacent partitions
//!
//! Each neighbor edge is a pair of bounded channels, one per direction. A
//! side of the exchange always sends its boundary row first and then blocks
//! for the peer's row of the same generation. Because every message fits in
//! the channel buffer, the send never waits on the peer's receive and the
//! fixed per-worker order (next rank first, previous rank second) cannot
//! deadlock.

use crate::core_types::{decode_row, encode_row, CellState, InvalidCellCode};
use crate::error::{LinkFault, SimulationError};
use crate::grid::Partition;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

/// Messages buffered per direction of one edge
const EDGE_CAPACITY: usize = 1;

/// One boundary row in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaloMessage {
    pub generation: usize,
    /// Cell state codes of the row
    pub cells: Vec<u8>,
}

/// One worker's end of a neighbor edge
#[derive(Debug)]
pub struct HaloLink {
    rank: usize,
    peer: usize,
    sender: SyncSender<HaloMessage>,
    receiver: Receiver<HaloMessage>,
}

impl HaloLink {
    /// Connect two ranks; returns `(end held by a, end held by b)`
    #[must_use]
    pub fn pair(a: usize, b: usize) -> (HaloLink, HaloLink) {
        let (a_to_b, b_from_a) = sync_channel(EDGE_CAPACITY);
        let (b_to_a, a_from_b) = sync_channel(EDGE_CAPACITY);
        (
            HaloLink {
                rank: a,
                peer: b,
                sender: a_to_b,
                receiver: a_from_b,
            },
            HaloLink {
                rank: b,
                peer: a,
                sender: b_to_a,
                receiver: b_from_a,
            },
        )
    }

    #[must_use]
    pub fn peer(&self) -> usize {
        self.peer
    }

    /// Send `outgoing`, then wait for the peer's row of the same generation
    ///
    /// # Errors
    ///
    /// Returns a communication failure if the peer is gone or sent a row of
    /// the wrong generation or length, and an invalid-state error if the row
    /// holds an unknown cell code.
    pub fn exchange(
        &self,
        generation: usize,
        outgoing: &[CellState],
    ) -> Result<Vec<CellState>, SimulationError> {
        let fault = |kind| SimulationError::Communication {
            generation,
            worker: self.rank,
            fault: kind,
        };
        let disconnected = || fault(LinkFault::PeerDisconnected { peer: self.peer });

        self.sender
            .send(HaloMessage {
                generation,
                cells: encode_row(outgoing),
            })
            .map_err(|_| disconnected())?;

        let message = self.receiver.recv().map_err(|_| disconnected())?;

        if message.generation != generation {
            return Err(fault(LinkFault::GenerationSkew {
                expected: generation,
                received: message.generation,
            }));
        }
        if message.cells.len() != outgoing.len() {
            return Err(fault(LinkFault::RowLength {
                expected: outgoing.len(),
                received: message.cells.len(),
            }));
        }

        decode_row(&message.cells).map_err(|InvalidCellCode(code)| SimulationError::InvalidState {
            generation,
            worker: self.rank,
            code,
        })
    }
}

/// Both optional edges of one worker
#[derive(Debug, Default)]
pub struct HaloExchange {
    previous: Option<HaloLink>,
    next: Option<HaloLink>,
}

impl HaloExchange {
    /// Wire up `worker_count` workers in a line; element `i` belongs to rank `i`
    #[must_use]
    pub fn for_workers(worker_count: usize) -> Vec<HaloExchange> {
        let mut exchanges: Vec<HaloExchange> =
            (0..worker_count).map(|_| HaloExchange::default()).collect();
        for rank in 1..worker_count {
            let (upper, lower) = HaloLink::pair(rank - 1, rank);
            exchanges[rank - 1].next = Some(upper);
            exchanges[rank].previous = Some(lower);
        }
        exchanges
    }

    /// Whether this worker has any neighbor at all
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.previous.is_none() && self.next.is_none()
    }

    /// Refresh both ghost rows of `partition` from its neighbors
    ///
    /// The next rank receives the last interior row and fills the bottom
    /// ghost row; the previous rank receives the first interior row and fills
    /// the top ghost row. Missing neighbors leave the ghost row as margin.
    ///
    /// # Errors
    ///
    /// See [`HaloLink::exchange`].
    pub fn exchange(
        &self,
        partition: &mut Partition,
        generation: usize,
    ) -> Result<(), SimulationError> {
        if let Some(next) = &self.next {
            let row = next.exchange(generation, partition.last_interior_row())?;
            partition.set_bottom_ghost(&row);
        }
        if let Some(previous) = &self.previous {
            let row = previous.exchange(generation, partition.first_interior_row())?;
            partition.set_top_ghost(&row);
        }
        Ok(())
    }
}
