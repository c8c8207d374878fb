//! Run configuration
//!
//! Defaults reproduce the classic 300×300 grid, 300 generation run with every
//! environmental factor switched off and a 50% chance for a burning cell to
//! keep burning.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// What to do with rows left over when `total_rows` does not divide evenly
/// among workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Refuse to start
    #[default]
    Reject,
    /// Drop the remainder rows (every worker gets `total_rows / workers`)
    Truncate,
    /// Give one extra row to each of the first `total_rows % workers` ranks
    Distribute,
}

/// Where the uniform random draws come from
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomSource {
    /// Seed every worker from OS entropy (non-reproducible)
    #[default]
    Entropy,
    /// Seed every worker from this value mixed with its rank
    Seeded(u64),
    /// Every draw returns this value in `[0, 1)`
    Fixed(f64),
}

/// Full configuration for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated rows of the global grid, excluding the top/bottom margin
    ///
    /// Every snapshot has exactly this many rows (fewer only under
    /// [`RemainderPolicy::Truncate`]). The margin rows above and below are
    /// extra, never-burning rows held as the outermost ghost rows.
    pub total_rows: usize,
    /// Columns of the global grid, including the left/right margin
    ///
    /// Column 0 and column `columns - 1` are non-fuel margins that appear in
    /// every snapshot, so at least three columns are required.
    pub columns: usize,
    /// Number of generations to run
    pub generations: usize,
    /// Probability that a burning cell keeps burning for another generation
    pub p_continue_burn: f64,
    pub wind_enabled: bool,
    pub vegetation_enabled: bool,
    pub density_enabled: bool,
    pub altitude_enabled: bool,
    /// Number of partitions / worker threads
    pub worker_count: usize,
    pub remainder_policy: RemainderPolicy,
    pub random: RandomSource,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_rows: 300,
            columns: 300,
            generations: 300,
            p_continue_burn: 0.5,
            wind_enabled: false,
            vegetation_enabled: false,
            density_enabled: false,
            altitude_enabled: false,
            worker_count: 1,
            remainder_policy: RemainderPolicy::Reject,
            random: RandomSource::Entropy,
        }
    }
}

impl SimulationConfig {
    /// Small grid with everything else at defaults
    #[must_use]
    pub fn with_grid(total_rows: usize, columns: usize, generations: usize) -> Self {
        Self {
            total_rows,
            columns,
            generations,
            ..Self::default()
        }
    }

    /// Enable or disable all four environmental factors at once
    #[must_use]
    pub fn with_all_factors(mut self, enabled: bool) -> Self {
        self.wind_enabled = enabled;
        self.vegetation_enabled = enabled;
        self.density_enabled = enabled;
        self.altitude_enabled = enabled;
        self
    }

    /// Check the configuration before any worker is started
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("total_rows", self.total_rows),
            ("columns", self.columns),
            ("generations", self.generations),
            ("worker_count", self.worker_count),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { name });
            }
        }

        if self.columns < 3 {
            return Err(ConfigError::TooFewColumns(self.columns));
        }

        if self.worker_count > self.total_rows {
            return Err(ConfigError::TooManyWorkers {
                workers: self.worker_count,
                rows: self.total_rows,
            });
        }

        if !(0.0..=1.0).contains(&self.p_continue_burn) {
            return Err(ConfigError::OutOfRange {
                name: "p_continue_burn",
                range: "[0, 1]",
                value: self.p_continue_burn,
            });
        }

        if let RandomSource::Fixed(value) = self.random {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    name: "fixed random draw",
                    range: "[0, 1)",
                    value,
                });
            }
        }

        let remainder = self.total_rows % self.worker_count;
        if remainder != 0 && self.remainder_policy == RemainderPolicy::Reject {
            return Err(ConfigError::UnevenRows {
                rows: self.total_rows,
                workers: self.worker_count,
                remainder,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_rows, 300);
        assert_eq!(config.p_continue_burn, 0.5);
        assert!(!config.wind_enabled);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let config = SimulationConfig::with_grid(10, 10, 0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                name: "generations"
            })
        );

        let config = SimulationConfig {
            worker_count: 0,
            ..SimulationConfig::with_grid(10, 10, 5)
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                name: "worker_count"
            })
        );
    }

    #[test]
    fn test_uneven_rows_follow_policy() {
        let mut config = SimulationConfig {
            worker_count: 3,
            ..SimulationConfig::with_grid(10, 10, 5)
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnevenRows {
                rows: 10,
                workers: 3,
                remainder: 1
            })
        );

        config.remainder_policy = RemainderPolicy::Truncate;
        assert!(config.validate().is_ok());
        config.remainder_policy = RemainderPolicy::Distribute;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_probability_bounds() {
        let config = SimulationConfig {
            p_continue_burn: 1.5,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                name: "p_continue_burn",
                ..
            })
        ));

        let config = SimulationConfig {
            p_continue_burn: f64::NAN,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            random: RandomSource::Fixed(1.0),
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_geometry_limits() {
        let config = SimulationConfig::with_grid(10, 2, 1);
        assert_eq!(config.validate(), Err(ConfigError::TooFewColumns(2)));

        let config = SimulationConfig {
            worker_count: 11,
            remainder_policy: RemainderPolicy::Distribute,
            ..SimulationConfig::with_grid(10, 10, 1)
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyWorkers {
                workers: 11,
                rows: 10
            })
        );
    }
}
