//! Sliding-tile merge puzzle on a fixed 4x4 grid

pub mod board;
pub mod direction;
pub mod line;
pub mod session;

pub use board::{Board, Grid, MAX_TILE, MoveOutcome, SIZE, SPAWN_TWO_PROBABILITY, SpawnedTile};
pub use direction::Direction;
pub use line::{slide_merge_line, transpose};
pub use session::Game;
