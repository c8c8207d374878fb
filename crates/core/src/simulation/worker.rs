//! One partition's generation loop

use super::aggregator::GatherMessage;
use super::halo::HaloExchange;
use crate::config::SimulationConfig;
use crate::core_types::encode_row;
use crate::engine::{DrawSource, FireTransitionEngine};
use crate::error::{LinkFault, SimulationError};
use crate::grid::{Environment, FactorToggles, Partition, PartitionLayout};
use std::sync::mpsc::SyncSender;
use tracing::{error, trace};

/// Owns one partition and drives it through every generation
pub(crate) struct Worker {
    rank: usize,
    generations: usize,
    partition: Partition,
    engine: FireTransitionEngine,
    draws: Box<dyn DrawSource + Send>,
    halo: HaloExchange,
    gather: SyncSender<GatherMessage>,
}

impl Worker {
    pub(crate) fn new(
        rank: usize,
        config: &SimulationConfig,
        layout: &PartitionLayout,
        draws: Box<dyn DrawSource + Send>,
        halo: HaloExchange,
        gather: SyncSender<GatherMessage>,
    ) -> Self {
        let partition = layout.initial_partition(rank);
        let environment = Environment::build(
            partition.cells().height(),
            partition.cols(),
            FactorToggles::from_config(config),
        );
        Self {
            rank,
            generations: config.generations,
            partition,
            engine: FireTransitionEngine::new(environment, config.p_continue_burn),
            draws,
            halo,
            gather,
        }
    }

    /// Run every generation: transition, halo exchange, gather
    pub(crate) fn run(mut self) -> Result<(), SimulationError> {
        let result = self.run_generations();
        if let Err(err) = &result {
            if err.is_cascade() {
                trace!("Worker {} stopping: {}", self.rank, err);
            } else {
                error!("Worker {} failed: {}", self.rank, err);
            }
        }
        result
    }

    fn run_generations(&mut self) -> Result<(), SimulationError> {
        for generation in 1..=self.generations {
            // Fresh buffer every step; the old snapshot is dropped whole
            let (next, stats) = self
                .engine
                .step_with_stats(&self.partition, self.draws.as_mut());
            self.partition = next;

            self.halo.exchange(&mut self.partition, generation)?;

            trace!(
                "Worker {} generation {}: {} ignitions, {} extinctions",
                self.rank,
                generation,
                stats.ignitions,
                stats.extinctions
            );

            self.gather
                .send(GatherMessage {
                    rank: self.rank,
                    generation,
                    cells: encode_row(self.partition.interior()),
                })
                .map_err(|_| SimulationError::Communication {
                    generation,
                    worker: self.rank,
                    fault: LinkFault::CoordinatorGone,
                })?;
        }
        Ok(())
    }
}
