//! Wildfire Cellular Automaton Core Library
//!
//! A stochastic cellular-automaton wildfire model run in parallel over
//! row-block partitions of the landscape grid. Ignition probability follows
//! the Alexandridis et al. (2008) Spetses Island model: a base probability
//! scaled by vegetation class, vegetation density, terrain slope and wind
//! direction.
//!
//! ## Parallel execution
//!
//! - Each worker thread owns one partition plus two ghost rows
//! - Every generation: transition, ghost-row (halo) exchange with the
//!   row-adjacent workers, gather of interiors at the coordinating thread
//! - Snapshots of the full grid come out in generation order
//!
//! ## Grid dimensions
//!
//! Rows and columns are counted differently. [`SimulationConfig::total_rows`]
//! counts only the simulated rows: the non-fuel margin rows above and below
//! are added on top and never appear in a [`Snapshot`].
//! [`SimulationConfig::columns`] counts the full width, margin columns
//! included, and snapshots show them. A 300x300 configuration therefore
//! yields 300x300 snapshots with 298 burnable columns.
//!
//! ```rust,no_run
//! use wildfire_ca_core::{RandomSource, Simulation, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     worker_count: 4,
//!     random: RandomSource::Seeded(7),
//!     ..SimulationConfig::default()
//! };
//! let simulation = Simulation::new(config)?;
//! let summary = simulation.run(|snapshot| {
//!     println!("generation {}: {}", snapshot.generation(), snapshot.census());
//! })?;
//! println!("{}", summary.final_census);
//! # Ok::<(), wildfire_ca_core::SimulationError>(())
//! ```

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod error;

// Domain decomposition and the static environment
pub mod grid;

// Transition rule
pub mod engine;

// Worker threads, halo exchange and gather
pub mod simulation;

// Re-export core types
pub use config::{RandomSource, RemainderPolicy, SimulationConfig};
pub use core_types::{CellState, Census, FactorClass, Grid};
pub use error::{ConfigError, LinkFault, SimulationError};

// Re-export simulation types
pub use engine::{DrawSource, FireTransitionEngine, FixedDraw, SeededDraws};
pub use grid::{Environment, FactorToggles, Partition, PartitionLayout, WindTable};
pub use simulation::{RunSummary, Simulation, Snapshot};
