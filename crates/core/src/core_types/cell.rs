//! Cell states and static factor classes
//!
//! Cell states cross worker boundaries as single-byte codes (the same
//! numbering the snapshot export uses), so decoding is fallible: an unknown
//! code means a logic defect somewhere upstream and must not be coerced.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of one grid cell
///
/// `NonFuel` and `Burnt` are absorbing. `Fuel` can only move to `Burning`,
/// and `Burning` can only stay `Burning` or move to `Burnt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    /// Nothing to burn (margins, rock, water)
    NonFuel = 1,
    /// Unburned vegetation
    Fuel = 2,
    /// Actively burning
    Burning = 3,
    /// Burned down
    Burnt = 4,
}

impl CellState {
    /// All four states in code order
    pub const ALL: [CellState; 4] = [
        CellState::NonFuel,
        CellState::Fuel,
        CellState::Burning,
        CellState::Burnt,
    ];

    /// Wire/export code of this state
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Index into a 4-element per-state table (0..4)
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Whether the state can never change again
    #[must_use]
    pub const fn is_absorbing(self) -> bool {
        matches!(self, CellState::NonFuel | CellState::Burnt)
    }
}

/// A byte that is not one of the four cell state codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid cell state code {0}")]
pub struct InvalidCellCode(pub u8);

impl TryFrom<u8> for CellState {
    type Error = InvalidCellCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(CellState::NonFuel),
            2 => Ok(CellState::Fuel),
            3 => Ok(CellState::Burning),
            4 => Ok(CellState::Burnt),
            other => Err(InvalidCellCode(other)),
        }
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Encode a row of states as wire codes
#[must_use]
pub fn encode_row(row: &[CellState]) -> Vec<u8> {
    row.iter().map(|state| state.code()).collect()
}

/// Decode a row of wire codes, failing on the first unknown code
///
/// # Errors
///
/// Returns [`InvalidCellCode`] carrying the offending byte.
pub fn decode_row(codes: &[u8]) -> Result<Vec<CellState>, InvalidCellCode> {
    codes.iter().map(|&code| CellState::try_from(code)).collect()
}

/// Vegetation or density class of a cell
///
/// Class 1 is sparse/light, class 3 dense/heavy. Both static factor grids
/// share the same three classes but map them to different modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FactorClass {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl FactorClass {
    /// Numeric class (1, 2 or 3)
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Vegetation modifier `p_veg`
    #[must_use]
    pub const fn vegetation_modifier(self) -> f64 {
        match self {
            FactorClass::Low => -0.3,
            FactorClass::Medium => 0.0,
            FactorClass::High => 0.4,
        }
    }

    /// Density modifier `p_den`
    #[must_use]
    pub const fn density_modifier(self) -> f64 {
        match self {
            FactorClass::Low => -0.4,
            FactorClass::Medium => 0.0,
            FactorClass::High => 0.3,
        }
    }
}
