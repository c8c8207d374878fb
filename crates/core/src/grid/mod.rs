//! Grid decomposition and the static environment each partition runs against

pub mod environment;
pub mod partition;
pub mod wind;

// Re-export main types
pub use environment::{Environment, FactorToggles};
pub use partition::{Partition, PartitionLayout};
pub use wind::WindTable;
