//! Newtype wrappers for table keys and action values.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::game::{Board, Direction, board::CELLS};

/// Learned values for one state, indexed by [`Direction::index`].
pub type ActionValues = [f64; Direction::COUNT];

/// Encoded board used as a value-table key.
///
/// The 16 cell values in row-major order. The encoding is the identity on cell
/// contents, so distinct boards never collide and the key is stable across
/// processes, which keeps persisted tables reusable.
///
/// # Examples
///
/// ```
/// use tilemind::game::Board;
/// use tilemind::types::{StateKey, encode};
///
/// let board = Board::from_grid([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]).unwrap();
/// let key = encode(&board);
/// assert_eq!(key.cells()[0], 2);
/// assert_eq!(key.cells()[15], 4);
///
/// // Keys print and parse as comma-separated cells
/// let parsed: StateKey = key.to_string().parse().unwrap();
/// assert_eq!(parsed, key);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey([u32; CELLS]);

/// Encode a board as its table key.
pub fn encode(board: &Board) -> StateKey {
    StateKey(board.cells())
}

impl StateKey {
    /// The encoded cells, row-major.
    pub fn cells(&self) -> &[u32; CELLS] {
        &self.0
    }

    /// Parse a key from 16 comma-separated cell values.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidStateKey`] if the text is not 16 integers
    /// forming a valid board.
    pub fn parse(s: &str) -> Result<Self, crate::Error> {
        let invalid = |reason: String| crate::Error::InvalidStateKey {
            input: s.to_string(),
            reason,
        };

        let values = s
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| invalid(e.to_string()))?;

        let board = Board::from_cells(&values).map_err(|e| invalid(e.to_string()))?;
        Ok(encode(&board))
    }

    /// Board this key was encoded from.
    pub fn to_board(&self) -> Result<Board, crate::Error> {
        Board::from_cells(&self.0)
    }
}

impl From<&Board> for StateKey {
    fn from(board: &Board) -> Self {
        encode(board)
    }
}

impl FromStr for StateKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateKey::parse(s)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}
