//! Core types shared by every simulation stage

pub mod cell;
pub mod census;
pub mod grid;

pub use cell::{decode_row, encode_row, CellState, FactorClass, InvalidCellCode};
pub use census::Census;
pub use grid::Grid;
