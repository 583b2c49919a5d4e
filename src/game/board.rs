//! Board representation and the move/merge/spawn rules

use std::fmt;

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use super::{
    direction::Direction,
    line::{slide_merge_line, transpose},
};
use crate::Error;

/// Side length of the board.
pub const SIZE: usize = 4;

/// Number of cells on the board.
pub const CELLS: usize = SIZE * SIZE;

/// Probability that a spawned tile is a 2 (otherwise it is a 4).
pub const SPAWN_TWO_PROBABILITY: f64 = 0.9;

/// Largest tile a 4x4 game can produce (2^17).
pub const MAX_TILE: u32 = 1 << 17;

/// Row-major 4x4 matrix of tile values (0 = empty).
pub type Grid = [[u32; SIZE]; SIZE];

/// A tile placed by [`Board::spawn_tile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnedTile {
    pub row: usize,
    pub col: usize,
    pub value: u32,
}

/// Result of applying a direction to a board.
///
/// `moved` is the sole legality signal: a move that leaves the grid unchanged
/// spawns nothing and does not count as a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub moved: bool,
    pub spawned: Option<SpawnedTile>,
}

impl MoveOutcome {
    fn unchanged() -> Self {
        Self {
            moved: false,
            spawned: None,
        }
    }
}

/// A 4x4 board of tiles.
///
/// Every non-zero cell holds a power of two >= 2. The type is `Copy` (64 bytes),
/// so snapshots for observers are plain copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    cells: Grid,
}

impl Board {
    /// A board with no tiles.
    pub const EMPTY: Board = Board {
        cells: [[0; SIZE]; SIZE],
    };

    /// Start a game: an empty grid followed by two independent spawns.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut board = Board::EMPTY;
        board.spawn_tile(rng);
        board.spawn_tile(rng);
        board
    }

    /// Build a board from an explicit grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTile`] if any cell is neither 0 nor a power of
    /// two between 2 and [`MAX_TILE`].
    pub fn from_grid(cells: Grid) -> Result<Self, Error> {
        for (row, line) in cells.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(Error::InvalidTile { row, col, value });
                }
            }
        }
        Ok(Self { cells })
    }

    /// Build a board from 16 cells in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBoardLength`] unless exactly 16 values are given,
    /// and [`Error::InvalidTile`] for values that break the tile invariant.
    pub fn from_cells(values: &[u32]) -> Result<Self, Error> {
        if values.len() != CELLS {
            return Err(Error::InvalidBoardLength {
                expected: CELLS,
                got: values.len(),
            });
        }
        let mut grid = [[0u32; SIZE]; SIZE];
        for (i, &value) in values.iter().enumerate() {
            grid[i / SIZE][i % SIZE] = value;
        }
        Self::from_grid(grid)
    }

    /// Copy of the grid.
    pub fn grid(&self) -> Grid {
        self.cells
    }

    /// The 16 cells in row-major order.
    pub fn cells(&self) -> [u32; CELLS] {
        let mut out = [0u32; CELLS];
        for (i, value) in self.cells.iter().flatten().enumerate() {
            out[i] = *value;
        }
        out
    }

    /// Value at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        self.cells.get(row).and_then(|line| line.get(col)).copied()
    }

    /// Coordinates of empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut empty = Vec::with_capacity(CELLS);
        for (row, line) in self.cells.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if value == 0 {
                    empty.push((row, col));
                }
            }
        }
        empty
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v == 0).count()
    }

    pub fn count_tiles(&self) -> usize {
        CELLS - self.count_empty()
    }

    /// Place a 2 (90%) or 4 (10%) on a uniformly chosen empty cell.
    ///
    /// A full board is left untouched and `None` is returned; callers check
    /// terminality separately.
    pub fn spawn_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<SpawnedTile> {
        let empty = self.empty_cells();
        let &(row, col) = empty.choose(rng)?;
        let value = if rng.random::<f64>() < SPAWN_TWO_PROBABILITY {
            2
        } else {
            4
        };
        self.cells[row][col] = value;
        Some(SpawnedTile { row, col, value })
    }

    /// Board after sliding/merging every line in `direction`, without spawning.
    ///
    /// Vertical moves work on the transposed grid and right/down moves on
    /// reversed lines, so every direction reduces to [`slide_merge_line`].
    pub fn shifted(&self, direction: Direction) -> Board {
        let mut grid = if direction.is_vertical() {
            transpose(&self.cells)
        } else {
            self.cells
        };

        for line in grid.iter_mut() {
            if direction.is_reversed() {
                line.reverse();
                *line = slide_merge_line(*line);
                line.reverse();
            } else {
                *line = slide_merge_line(*line);
            }
        }

        if direction.is_vertical() {
            grid = transpose(&grid);
        }
        Board { cells: grid }
    }

    /// Slide/merge in `direction`; if the grid changed, spawn one tile.
    pub fn apply_move<R: Rng + ?Sized>(&mut self, direction: Direction, rng: &mut R) -> MoveOutcome {
        let next = self.shifted(direction);
        if next == *self {
            return MoveOutcome::unchanged();
        }
        *self = next;
        MoveOutcome {
            moved: true,
            spawned: self.spawn_tile(rng),
        }
    }

    /// True iff no direction changes the board.
    ///
    /// Works on scratch copies only; the board itself is never touched.
    pub fn is_terminal(&self) -> bool {
        Direction::ALL
            .iter()
            .all(|&direction| self.shifted(direction) == *self)
    }

    /// Directions that would change the board.
    pub fn legal_moves(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&direction| self.shifted(direction) != *self)
            .collect()
    }

    /// Sum of all tile values.
    ///
    /// This is deliberately not the conventional merge score.
    pub fn score(&self) -> u64 {
        self.cells.iter().flatten().map(|&v| u64::from(v)).sum()
    }

    pub fn highest_tile(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }
}

fn is_valid_tile(value: u32) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

impl From<Board> for Grid {
    fn from(board: Board) -> Self {
        board.cells
    }
}

impl TryFrom<Grid> for Board {
    type Error = Error;

    fn try_from(grid: Grid) -> Result<Self, Self::Error> {
        Board::from_grid(grid)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f, "{}", "-".repeat(SIZE * 7 + SIZE - 1))?;
            }
            let rendered: Vec<String> = line
                .iter()
                .map(|&v| {
                    if v == 0 {
                        " ".repeat(7)
                    } else {
                        format!("{v:^7}")
                    }
                })
                .collect();
            writeln!(f, "{}", rendered.join("|"))?;
        }
        Ok(())
    }
}
