//! Fire spread engine: the per-generation transition rule and its random draws

pub mod draws;
pub mod transition;

pub use draws::{worker_draws, DrawSource, FixedDraw, ScriptedDraws, SeededDraws};
pub use transition::{FireTransitionEngine, TransitionStats};
