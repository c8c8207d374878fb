//! Static environment: vegetation, density, altitude, slope and wind
//!
//! The environment is built once per partition with the partition's local
//! shape (interior rows plus both ghost rows) and never mutated afterwards.
//! Because every factor depends only on the column index, partitions of the
//! same height end up with identical environments.

use super::wind::WindTable;
use crate::config::SimulationConfig;
use crate::core_types::{FactorClass, Grid};
use nalgebra::Matrix3;
use rayon::prelude::*;
use std::f64::consts::SQRT_2;

/// Base ignition probability `p_h` for a fuel cell next to a burning cell
pub const BASE_IGNITION_PROBABILITY: f64 = 0.58;

/// Slope coefficient `a` in `p_slope = exp(a · θ)`
pub const SLOPE_COEFFICIENT: f64 = 0.078;

/// Which environmental factors produce non-uniform grids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FactorToggles {
    pub wind: bool,
    pub vegetation: bool,
    pub density: bool,
    pub altitude: bool,
}

impl FactorToggles {
    /// Every factor switched off: uniform, neutral environment
    pub const NONE: Self = Self {
        wind: false,
        vegetation: false,
        density: false,
        altitude: false,
    };

    /// Every factor switched on
    pub const ALL: Self = Self {
        wind: true,
        vegetation: true,
        density: true,
        altitude: true,
    };

    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            wind: config.wind_enabled,
            vegetation: config.vegetation_enabled,
            density: config.density_enabled,
            altitude: config.altitude_enabled,
        }
    }
}

/// Class of column `col` when a factor is banded into thirds
///
/// Column `j <= cols/3` is class 1, `j <= 2·cols/3` class 2, the rest class 3.
#[must_use]
pub fn banded_class(col: usize, cols: usize) -> FactorClass {
    if col <= cols / 3 {
        FactorClass::Low
    } else if col <= cols * 2 / 3 {
        FactorClass::Medium
    } else {
        FactorClass::High
    }
}

/// Slope angle in degrees for an altitude difference over a horizontal distance
#[inline]
#[must_use]
pub fn slope_angle(rise: f64, distance: f64) -> f64 {
    (rise / distance).atan().to_degrees()
}

/// Per-partition static environment
#[derive(Debug, Clone)]
pub struct Environment {
    vegetation: Grid<FactorClass>,
    density: Grid<FactorClass>,
    altitude: Grid<f64>,
    slope: Grid<Matrix3<f64>>,
    wind: WindTable,
}

impl Environment {
    /// Build every factor grid for a `rows × cols` block
    #[must_use]
    pub fn build(rows: usize, cols: usize, toggles: FactorToggles) -> Self {
        let vegetation = factor_grid(rows, cols, toggles.vegetation);
        let density = factor_grid(rows, cols, toggles.density);
        let altitude = if toggles.altitude {
            Grid::from_fn(rows, cols, |_, col| col as f64)
        } else {
            Grid::with_value(rows, cols, 1.0)
        };
        Self::assemble(vegetation, density, altitude, WindTable::new(toggles.wind))
    }

    /// Environment where every multiplier is exactly 1
    ///
    /// Vegetation and density are class 2 (modifier 0), the ground is flat
    /// and there is no wind, so every ignition check uses the bare base
    /// probability. Disabled factors in [`Environment::build`] fall back to
    /// class 1 instead, which still dampens spread.
    #[must_use]
    pub fn neutral(rows: usize, cols: usize) -> Self {
        Self::assemble(
            Grid::with_value(rows, cols, FactorClass::Medium),
            Grid::with_value(rows, cols, FactorClass::Medium),
            Grid::with_value(rows, cols, 1.0),
            WindTable::neutral(),
        )
    }

    fn assemble(
        vegetation: Grid<FactorClass>,
        density: Grid<FactorClass>,
        altitude: Grid<f64>,
        wind: WindTable,
    ) -> Self {
        let slope = slope_grid(&altitude);
        Self {
            vegetation,
            density,
            altitude,
            slope,
            wind,
        }
    }

    /// Probability that the cell at `(row, col)` ignites from a burning
    /// neighbor at table position `(r, c)` (offset `(r-1, c-1)`)
    ///
    /// `p_h · (1 + p_veg) · (1 + p_den) · p_wind · p_slope`
    #[must_use]
    pub fn ignition_probability(&self, row: usize, col: usize, r: usize, c: usize) -> f64 {
        let p_veg = self.vegetation.at(row, col).vegetation_modifier();
        let p_den = self.density.at(row, col).density_modifier();
        let p_wind = self.wind.factor(r, c);
        let p_slope = (SLOPE_COEFFICIENT * self.slope.get(row, col)[(r, c)]).exp();
        BASE_IGNITION_PROBABILITY * (1.0 + p_veg) * (1.0 + p_den) * p_wind * p_slope
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.altitude.height()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.altitude.width()
    }

    #[must_use]
    pub fn vegetation(&self) -> &Grid<FactorClass> {
        &self.vegetation
    }

    #[must_use]
    pub fn density(&self) -> &Grid<FactorClass> {
        &self.density
    }

    #[must_use]
    pub fn altitude(&self) -> &Grid<f64> {
        &self.altitude
    }

    /// 3×3 slope table (degrees) of the cell at `(row, col)`
    #[must_use]
    pub fn slope_at(&self, row: usize, col: usize) -> &Matrix3<f64> {
        self.slope.get(row, col)
    }

    #[must_use]
    pub fn wind(&self) -> &WindTable {
        &self.wind
    }
}

fn factor_grid(rows: usize, cols: usize, banded: bool) -> Grid<FactorClass> {
    if banded {
        Grid::from_fn(rows, cols, |_, col| banded_class(col, cols))
    } else {
        Grid::with_value(rows, cols, FactorClass::Low)
    }
}

/// Slope tables for every cell; margin rows and columns stay flat
fn slope_grid(altitude: &Grid<f64>) -> Grid<Matrix3<f64>> {
    let rows = altitude.height();
    let cols = altitude.width();
    let mut slope = Grid::with_value(rows, cols, Matrix3::zeros());

    slope
        .as_mut_slice()
        .par_chunks_mut(cols.max(1))
        .enumerate()
        .for_each(|(row, out)| {
            if row == 0 || row + 1 >= rows {
                return;
            }
            for col in 1..cols.saturating_sub(1) {
                let here = altitude.at(row, col);
                out[col] = Matrix3::from_fn(|r, c| {
                    if r == 1 && c == 1 {
                        return 0.0;
                    }
                    let neighbor = altitude.at(row + r - 1, col + c - 1);
                    let distance = if r != 1 && c != 1 { SQRT_2 } else { 1.0 };
                    slope_angle(here - neighbor, distance)
                });
            }
        });

    slope
}
