//! Parallel simulation driver
//!
//! [`Simulation::run`] starts one scoped thread per partition. Each worker
//! repeats transition → halo exchange → gather for the configured number of
//! generations; the calling thread is the coordinating point that assembles
//! the gathered interiors into [`Snapshot`]s and hands them out in generation
//! order. Workers own their partition buffers outright; the only data that
//! crosses threads are row copies sent over channels.
//!
//! Generation numbering: snapshot 0 is the initial condition, snapshot `g`
//! is the state after `g` transitions. Diagnostics use the same numbering.

pub mod aggregator;
pub mod halo;
pub mod snapshot;
mod worker;

pub use aggregator::{GatherMessage, ResultAggregator};
pub use halo::{HaloExchange, HaloLink, HaloMessage};
pub use snapshot::Snapshot;

use crate::config::SimulationConfig;
use crate::core_types::{Census, Grid};
use crate::engine::{worker_draws, DrawSource};
use crate::error::SimulationError;
use crate::grid::{Environment, FactorToggles, PartitionLayout};
use std::sync::mpsc::{sync_channel, Receiver};
use std::thread;
use tracing::{debug, info};
use worker::Worker;

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub generations: usize,
    pub worker_count: usize,
    pub final_census: Census,
}

/// Why the coordinator stopped before the last snapshot
enum CoordinatorStop {
    /// All gather senders hung up; a worker failure explains why
    WorkersGone { generation: usize },
    /// The coordinator itself rejected a contribution
    Failed(SimulationError),
}

/// A validated, ready-to-run simulation
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    layout: PartitionLayout,
}

impl Simulation {
    /// Validate `config` and lay out the partitions
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] for an invalid configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let layout = PartitionLayout::from_config(&config)?;
        Ok(Self { config, layout })
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &PartitionLayout {
        &self.layout
    }

    /// The initial condition as a full-grid snapshot (generation 0)
    #[must_use]
    pub fn initial_snapshot(&self) -> Snapshot {
        let cols = self.layout.columns();
        let mut data = Vec::with_capacity(self.layout.simulated_rows() * cols);
        for rank in 0..self.layout.worker_count() {
            data.extend_from_slice(self.layout.initial_partition(rank).interior());
        }
        Snapshot::new(0, Grid::from_rows(self.layout.simulated_rows(), cols, data))
    }

    /// Static factor maps for the whole grid, margin rows included
    #[must_use]
    pub fn factor_maps(&self) -> Environment {
        Environment::build(
            self.layout.simulated_rows() + 2,
            self.layout.columns(),
            FactorToggles::from_config(&self.config),
        )
    }

    /// Run every generation, handing each snapshot to `on_snapshot` in order
    ///
    /// # Errors
    ///
    /// Returns the first root-cause failure of any worker or of the gather
    /// step. No snapshot after the failing generation is delivered.
    pub fn run<F>(&self, on_snapshot: F) -> Result<RunSummary, SimulationError>
    where
        F: FnMut(Snapshot),
    {
        let random = self.config.random;
        self.run_with_draws(on_snapshot, |rank| worker_draws(random, rank))
    }

    /// [`Simulation::run`] with the per-rank draw stream supplied by `draws_for`
    fn run_with_draws<F, D>(
        &self,
        mut on_snapshot: F,
        draws_for: D,
    ) -> Result<RunSummary, SimulationError>
    where
        F: FnMut(Snapshot),
        D: Fn(usize) -> Box<dyn DrawSource + Send>,
    {
        let worker_count = self.layout.worker_count();
        info!(
            "Starting wildfire run: {}x{} grid, {} generations, {} workers",
            self.layout.simulated_rows(),
            self.layout.columns(),
            self.config.generations,
            worker_count
        );

        let (gather_tx, gather_rx) = sync_channel(worker_count * 2);

        let (outcome, worker_results) = thread::scope(|scope| {
            let handles: Vec<_> = HaloExchange::for_workers(worker_count)
                .into_iter()
                .enumerate()
                .map(|(rank, halo)| {
                    let worker = Worker::new(
                        rank,
                        &self.config,
                        &self.layout,
                        draws_for(rank),
                        halo,
                        gather_tx.clone(),
                    );
                    scope.spawn(move || worker.run())
                })
                .collect();
            // Only workers hold senders now, so a full hang-up ends the gather
            drop(gather_tx);

            let outcome = self.coordinate(gather_rx, &mut on_snapshot);

            let worker_results: Vec<Result<(), SimulationError>> = handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| {
                    handle
                        .join()
                        .unwrap_or(Err(SimulationError::WorkerPanicked { worker: rank }))
                })
                .collect();
            (outcome, worker_results)
        });

        let final_census = resolve(outcome, worker_results)?;
        info!(
            "Wildfire run finished after {} generations: {}",
            self.config.generations, final_census
        );
        Ok(RunSummary {
            generations: self.config.generations,
            worker_count,
            final_census,
        })
    }

    /// Run and keep every snapshot
    ///
    /// # Errors
    ///
    /// See [`Simulation::run`].
    pub fn run_collect(&self) -> Result<Vec<Snapshot>, SimulationError> {
        let mut snapshots = Vec::with_capacity(self.config.generations);
        self.run(|snapshot| snapshots.push(snapshot))?;
        Ok(snapshots)
    }

    /// Gather loop on the coordinating thread
    ///
    /// Consumes the receiver so that returning early hangs up on the
    /// workers, which then stop at their next gather.
    #[allow(clippy::needless_pass_by_value)]
    fn coordinate<F>(
        &self,
        gather_rx: Receiver<GatherMessage>,
        on_snapshot: &mut F,
    ) -> Result<Census, CoordinatorStop>
    where
        F: FnMut(Snapshot),
    {
        let mut aggregator = ResultAggregator::new(&self.layout, 1);
        let mut census = self.initial_snapshot().census();

        while aggregator.next_generation() <= self.config.generations {
            let Ok(message) = gather_rx.recv() else {
                return Err(CoordinatorStop::WorkersGone {
                    generation: aggregator.next_generation(),
                });
            };
            aggregator.accept(message).map_err(CoordinatorStop::Failed)?;

            while let Some(snapshot) = aggregator.pop_ready().map_err(CoordinatorStop::Failed)? {
                census = snapshot.census();
                debug!("Generation {}: {}", snapshot.generation(), census);
                on_snapshot(snapshot);
            }
        }
        Ok(census)
    }
}

/// Pick the error that explains the run's outcome
fn resolve(
    outcome: Result<Census, CoordinatorStop>,
    worker_results: Vec<Result<(), SimulationError>>,
) -> Result<Census, SimulationError> {
    let mut errors: Vec<SimulationError> = worker_results
        .into_iter()
        .filter_map(Result::err)
        .collect();
    // Root causes first, each group in rank order
    errors.sort_by_key(SimulationError::is_cascade);
    let root_cause = errors.into_iter().next();

    match (outcome, root_cause) {
        (Err(CoordinatorStop::Failed(err)), _) | (_, Some(err)) => Err(err),
        (Err(CoordinatorStop::WorkersGone { generation }), None) => {
            Err(SimulationError::Incomplete { generation })
        }
        (Ok(census), None) => Ok(census),
    }
}
