//! Example environments
//!
//! Small deterministic [`DiscreteEnv`](crate::ports::DiscreteEnv)
//! implementations used by the CLI and the test suite.

pub mod grid_world;
pub mod knights_tour;

pub use grid_world::{Direction, GridWorld, Position};
pub use knights_tour::{KnightMove, KnightsTour, Square, TourState};
