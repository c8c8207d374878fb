//! Error types for configuration, worker communication and cell state decoding
//!
//! Every failure aborts the whole run. Errors raised inside a worker carry the
//! generation index and the worker rank at which they happened so the
//! diagnostic points at the exact step that stalled.

use thiserror::Error;

/// Invalid run configuration, detected before any worker starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },

    #[error("columns must be at least 3 (two margin columns plus one interior), got {0}")]
    TooFewColumns(usize),

    #[error("worker count {workers} exceeds total rows {rows}")]
    TooManyWorkers { workers: usize, rows: usize },

    #[error(
        "total rows {rows} not divisible by worker count {workers} \
         (remainder {remainder}); choose a truncate or distribute remainder policy"
    )]
    UnevenRows {
        rows: usize,
        workers: usize,
        remainder: usize,
    },

    #[error("{name} must lie in {range}, got {value}")]
    OutOfRange {
        name: &'static str,
        range: &'static str,
        value: f64,
    },
}

/// What went wrong on a worker-to-worker or worker-to-coordinator channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkFault {
    #[error("peer worker {peer} disconnected")]
    PeerDisconnected { peer: usize },

    #[error("expected a message for generation {expected}, received generation {received}")]
    GenerationSkew { expected: usize, received: usize },

    #[error("expected {expected} cells in row, received {received}")]
    RowLength { expected: usize, received: usize },

    #[error("worker {rank} contributed twice to generation {generation}")]
    DuplicateContribution { rank: usize, generation: usize },

    #[error("contribution from unknown worker {rank}")]
    UnknownRank { rank: usize },

    #[error("coordinator stopped receiving snapshots")]
    CoordinatorGone,
}

/// Fatal simulation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("communication failure at generation {generation} on worker {worker}: {fault}")]
    Communication {
        generation: usize,
        worker: usize,
        fault: LinkFault,
    },

    #[error("invalid cell state code {code} at generation {generation} on worker {worker}")]
    InvalidState {
        generation: usize,
        worker: usize,
        code: u8,
    },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("every worker stopped before generation {generation} was gathered")]
    Incomplete { generation: usize },
}

impl SimulationError {
    /// Whether this error is only the echo of a failure elsewhere
    ///
    /// A worker that loses its peer reports `PeerDisconnected`; the peer that
    /// actually failed reports the root cause.
    #[must_use]
    pub fn is_cascade(&self) -> bool {
        matches!(
            self,
            SimulationError::Communication {
                fault: LinkFault::PeerDisconnected { .. } | LinkFault::CoordinatorGone,
                ..
            }
        )
    }

    /// Rank of the worker the error was raised on, if any
    #[must_use]
    pub fn worker(&self) -> Option<usize> {
        match self {
            SimulationError::Config(_) | SimulationError::Incomplete { .. } => None,
            SimulationError::Communication { worker, .. }
            | SimulationError::InvalidState { worker, .. }
            | SimulationError::WorkerPanicked { worker } => Some(*worker),
        }
    }
}
