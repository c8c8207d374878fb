//! Direction-dependent wind multipliers
//!
//! A single 3×3 table shared by every cell: entry `(dr+1, dc+1)` scales the
//! ignition probability when the burning neighbor sits at offset `(dr, dc)`.
//! The angle table measures each direction against a wind blowing from the
//! top of the grid towards the bottom, so fire carried downwind (burning
//! neighbor above) gets the largest boost.

use nalgebra::Matrix3;

/// Constant `c1` of the wind factor
pub const WIND_C1: f64 = 0.045;
/// Constant `c2` of the wind factor
pub const WIND_C2: f64 = 0.131;
/// Wind speed `V` (m/s)
pub const WIND_SPEED: f64 = 10.0;

/// Angle (degrees) between the wind and the direction to each neighbor
const DIRECTION_ANGLES: [[f64; 3]; 3] = [
    [45.0, 0.0, 45.0],
    [90.0, 0.0, 90.0],
    [135.0, 180.0, 135.0],
];

/// Value stored for the cell itself: a cell never ignites itself
const SELF_INFLUENCE: f64 = 0.0;

/// Wind factor for a neighbor at angle `theta` (degrees)
///
/// `f(θ) = exp(c1·V) · exp(V·c2·(cos θ − 1))`
#[must_use]
pub fn wind_factor(theta_degrees: f64) -> f64 {
    let t = theta_degrees.to_radians();
    let ft = (WIND_SPEED * WIND_C2 * (t.cos() - 1.0)).exp();
    (WIND_C1 * WIND_SPEED).exp() * ft
}

/// 3×3 wind multiplier table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindTable(Matrix3<f64>);

impl WindTable {
    /// Build the table; disabled wind collapses to all ones
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self::neutral();
        }
        let mut table = Matrix3::from_fn(|r, c| wind_factor(DIRECTION_ANGLES[r][c]));
        table[(1, 1)] = SELF_INFLUENCE;
        Self(table)
    }

    /// All-ones table (no wind)
    #[must_use]
    pub fn neutral() -> Self {
        Self(Matrix3::repeat(1.0))
    }

    /// Multiplier for the neighbor at table position `(r, c)`
    #[inline]
    #[must_use]
    pub fn factor(&self, r: usize, c: usize) -> f64 {
        self.0[(r, c)]
    }
}
