//! Stochastic cellular-automaton transition
//!
//! One step maps a full partition snapshot (ghost rows and margins included)
//! to a brand-new buffer. Nothing is written into the snapshot being read, so
//! every cell sees its neighborhood exactly as it was at the start of the
//! generation.
//!
//! Per interior cell:
//! - `NonFuel` and `Burnt` are copied.
//! - `Burning` keeps burning when `draw < p_continue_burn`, else burns out.
//! - `Fuel` scans its 8 neighbors in row-major order. For each burning
//!   neighbor one draw is compared with the ignition probability for that
//!   direction; the first success ignites the cell and ends the scan.
//!   This first-match policy is order dependent on purpose.

use super::draws::DrawSource;
use crate::core_types::CellState;
use crate::grid::{Environment, Partition};
use tracing::trace;

/// Counts of state changes produced by one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionStats {
    /// `Fuel → Burning`
    pub ignitions: usize,
    /// `Burning → Burnt`
    pub extinctions: usize,
}

/// Applies the fire spread rule to one partition
#[derive(Debug, Clone)]
pub struct FireTransitionEngine {
    environment: Environment,
    p_continue_burn: f64,
}

impl FireTransitionEngine {
    #[must_use]
    pub fn new(environment: Environment, p_continue_burn: f64) -> Self {
        Self {
            environment,
            p_continue_burn,
        }
    }

    /// Compute the next generation of `current`
    pub fn step<D: DrawSource + ?Sized>(&self, current: &Partition, draws: &mut D) -> Partition {
        self.step_with_stats(current, draws).0
    }

    /// Compute the next generation and report how many cells changed
    ///
    /// # Panics
    ///
    /// Panics if the environment was built for a different partition shape
    pub fn step_with_stats<D: DrawSource + ?Sized>(
        &self,
        current: &Partition,
        draws: &mut D,
    ) -> (Partition, TransitionStats) {
        let cells = current.cells();
        assert!(
            cells.height() == self.environment.rows() && cells.width() == self.environment.cols(),
            "Environment shape does not match partition"
        );

        // Ghost rows and margin columns carry over unchanged
        let mut next = cells.clone();
        let mut stats = TransitionStats::default();

        for row in 1..cells.height() - 1 {
            for col in 1..cells.width().saturating_sub(1) {
                let state = cells.at(row, col);
                let new_state = match state {
                    CellState::NonFuel | CellState::Burnt => state,
                    CellState::Burning => self.burning_cell(draws),
                    CellState::Fuel => self.fuel_cell(current, row, col, draws),
                };
                match (state, new_state) {
                    (CellState::Fuel, CellState::Burning) => stats.ignitions += 1,
                    (CellState::Burning, CellState::Burnt) => stats.extinctions += 1,
                    _ => {}
                }
                next.set(row, col, new_state);
            }
        }

        trace!(
            "Worker {} transition: {} ignitions, {} extinctions",
            current.rank(),
            stats.ignitions,
            stats.extinctions
        );

        (Partition::from_grid(current.rank(), next), stats)
    }

    fn burning_cell<D: DrawSource + ?Sized>(&self, draws: &mut D) -> CellState {
        if draws.next_draw() < self.p_continue_burn {
            CellState::Burning
        } else {
            CellState::Burnt
        }
    }

    /// Next state of the fuel cell at `(row, col)`
    ///
    /// Only the first burning neighbor whose draw succeeds matters; no draw is
    /// taken for non-burning neighbors.
    pub fn fuel_cell<D: DrawSource + ?Sized>(
        &self,
        current: &Partition,
        row: usize,
        col: usize,
        draws: &mut D,
    ) -> CellState {
        for r in 0..3 {
            for c in 0..3 {
                if r == 1 && c == 1 {
                    continue;
                }
                if current.state(row + r - 1, col + c - 1) != CellState::Burning {
                    continue;
                }
                let p_burn = self.environment.ignition_probability(row, col, r, c);
                if p_burn > draws.next_draw() {
                    return CellState::Burning;
                }
            }
        }
        CellState::Fuel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Grid;
    use crate::engine::draws::{FixedDraw, ScriptedDraws, SeededDraws};
    use crate::grid::environment::BASE_IGNITION_PROBABILITY;
    use crate::grid::FactorToggles;

    /// 5×5 interior (7×5 buffer with ghost rows), single burning cell at the center
    fn single_seed() -> Partition {
        let mut cells = Partition::initial(0, 5, 7, false).cells().clone();
        cells.set(3, 3, CellState::Burning);
        Partition::from_grid(0, cells)
    }

    fn neutral_engine(partition: &Partition, p_continue_burn: f64) -> FireTransitionEngine {
        let rows = partition.cells().height();
        let cols = partition.cols();
        FireTransitionEngine::new(Environment::neutral(rows, cols), p_continue_burn)
    }

    #[test]
    fn test_step_does_not_mutate_input() {
        let current = single_seed();
        let before = current.clone();
        let engine = neutral_engine(&current, 1.0);
        let _ = engine.step(&current, &mut FixedDraw(0.0));
        assert_eq!(current, before);
    }

    #[test]
    fn test_ignition_threshold_is_strict() {
        let current = single_seed();
        let engine = neutral_engine(&current, 1.0);

        // Draw equal to p_burn: no ignition
        let next = engine.step(&current, &mut FixedDraw(BASE_IGNITION_PROBABILITY));
        assert_eq!(next.state(3, 3), CellState::Burning);
        assert_eq!(next.interior_census().count(CellState::Burning), 1);

        // Draw just below p_burn: all 8 neighbors ignite
        let draw = BASE_IGNITION_PROBABILITY - 1e-9;
        let (next, stats) = engine.step_with_stats(&current, &mut FixedDraw(draw));
        assert_eq!(stats.ignitions, 8);
        for row in 2..=4 {
            for col in 2..=4 {
                assert_eq!(next.state(row, col), CellState::Burning);
            }
        }
        // Cells two steps away have no burning neighbor yet
        assert_eq!(next.state(1, 1), CellState::Fuel);
        assert_eq!(next.state(5, 5), CellState::Fuel);
    }

    #[test]
    fn test_fuel_without_burning_neighbors_never_ignites() {
        let current = Partition::initial(0, 4, 6, false);
        let engine = neutral_engine(&current, 0.5);
        let mut draws = ScriptedDraws::new(vec![0.0]);
        let next = engine.step(&current, &mut draws);
        assert_eq!(next, current);
        // No burning cell anywhere means no draw was ever taken
        assert_eq!(draws.consumed(), 0);
    }

    #[test]
    fn test_continue_burn_branch_selection() {
        let current = single_seed();
        let engine = neutral_engine(&current, 0.5);

        // 0.49 < 0.5 keeps burning; it is also below p_h so neighbors ignite
        let next = engine.step(&current, &mut FixedDraw(0.49));
        assert_eq!(next.state(3, 3), CellState::Burning);

        let next = engine.step(&current, &mut FixedDraw(0.51));
        assert_eq!(next.state(3, 3), CellState::Burnt);
    }

    #[test]
    fn test_extremes_of_continue_probability() {
        let current = single_seed();

        let always = neutral_engine(&current, 1.0);
        let next = always.step(&current, &mut FixedDraw(0.999_999));
        assert_eq!(next.state(3, 3), CellState::Burning);

        let never = neutral_engine(&current, 0.0);
        let (next, stats) = never.step_with_stats(&current, &mut FixedDraw(0.0));
        assert_eq!(next.state(3, 3), CellState::Burnt);
        assert_eq!(stats.extinctions, 1);
    }

    #[test]
    fn test_first_match_stops_scanning() {
        // Two burning neighbors above-left and above-right of (2, 2)
        let mut cells = Partition::initial(0, 3, 5, false).cells().clone();
        cells.set(1, 1, CellState::Burning);
        cells.set(1, 3, CellState::Burning);
        let current = Partition::from_grid(0, cells);
        let engine = neutral_engine(&current, 1.0);

        // (1, 2) sees (1, 1) first, then (1, 3); a successful first draw ends the scan
        let mut first = ScriptedDraws::new(vec![0.1, 0.1]);
        assert_eq!(engine.fuel_cell(&current, 1, 2, &mut first), CellState::Burning);
        assert_eq!(first.consumed(), 1);

        // A failing first draw moves on to the second burning neighbor
        let mut retry = ScriptedDraws::new(vec![0.9, 0.1]);
        assert_eq!(engine.fuel_cell(&current, 1, 2, &mut retry), CellState::Burning);
        assert_eq!(retry.consumed(), 2);

        let mut both_fail = ScriptedDraws::new(vec![0.9, 0.9]);
        assert_eq!(engine.fuel_cell(&current, 1, 2, &mut both_fail), CellState::Fuel);
        assert_eq!(both_fail.consumed(), 2);

        // Full step, row-major: (1, 1) keeps burning, (1, 2) ignites on its first draw
        let mut draws = ScriptedDraws::new(vec![0.0, 0.1, 0.0]);
        let next = engine.step(&current, &mut draws);
        assert_eq!(next.state(1, 1), CellState::Burning);
        assert_eq!(next.state(1, 2), CellState::Burning);
    }

    #[test]
    fn test_absorbing_states_and_margins_are_stable() {
        let mut cells = Grid::with_value(5, 5, CellState::NonFuel);
        cells.set(1, 1, CellState::Burnt);
        cells.set(2, 2, CellState::Burning);
        cells.set(3, 3, CellState::NonFuel);
        cells.set(0, 2, CellState::Burning); // ghost row copy of a neighbor
        let current = Partition::from_grid(0, cells);
        let engine = FireTransitionEngine::new(Environment::build(5, 5, FactorToggles::ALL), 0.0);

        let mut rng = SeededDraws::from_seed(11);
        let mut state = current;
        for _ in 0..10 {
            state = engine.step(&state, &mut rng);
            assert_eq!(state.state(1, 1), CellState::Burnt);
            assert_eq!(state.state(3, 3), CellState::NonFuel);
            assert_eq!(state.state(0, 2), CellState::Burning);
            for row in 0..5 {
                assert_eq!(state.state(row, 0), CellState::NonFuel);
                assert_eq!(state.state(row, 4), CellState::NonFuel);
            }
        }
    }

    #[test]
    fn test_ghost_row_fire_ignites_boundary_cells() {
        // Only the top ghost row is burning
        let mut current = Partition::initial(1, 3, 5, false);
        let mut ghost = vec![CellState::NonFuel; 5];
        ghost[2] = CellState::Burning;
        current.set_top_ghost(&ghost);

        let engine = neutral_engine(&current, 1.0);
        let next = engine.step(&current, &mut FixedDraw(0.0));
        for col in 1..=3 {
            assert_eq!(next.state(1, col), CellState::Burning);
        }
        assert_eq!(next.state(2, 2), CellState::Fuel);
    }
}
