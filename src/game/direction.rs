//! Move directions

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A direction to slide and merge tiles.
///
/// The declaration order is also the action index order used by the value
/// table: `Up = 0`, `Down = 1`, `Left = 2`, `Right = 3`. Greedy selection breaks
/// ties in favour of the lowest index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Number of directions (and of action values per state).
    pub const COUNT: usize = 4;

    /// All directions in action index order.
    pub const ALL: [Direction; Direction::COUNT] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Action index of this direction.
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// Resolve an action index coming from a dynamic source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDirection`] for any index outside `0..4`.
    pub fn from_index(index: usize) -> Result<Self, Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| Error::InvalidDirection {
                value: index.to_string(),
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// True for directions applied column-wise.
    pub(crate) fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// True for directions that slide toward the high end of a line.
    pub(crate) fn is_reversed(self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            _ => Err(Error::InvalidDirection {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<usize> for Direction {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Direction::from_index(index)
    }
}

impl From<Direction> for usize {
    fn from(direction: Direction) -> Self {
        direction.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_order_matches_all() {
        for (i, direction) in Direction::ALL.iter().enumerate() {
            assert_eq!(direction.index(), i);
            assert_eq!(Direction::from_index(i).unwrap(), *direction);
        }
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let err = Direction::from_index(4).unwrap_err();
        assert!(matches!(err, Error::InvalidDirection { ref value } if value == "4"));
        assert!(Direction::try_from(usize::MAX).is_err());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!(" left ".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("r".parse::<Direction>().unwrap(), Direction::Right);
        assert!("diagonal".parse::<Direction>().is_err());
        assert!("".parse::<Direction>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for direction in Direction::ALL {
            assert_eq!(direction.to_string().parse::<Direction>().unwrap(), direction);
        }
    }
}
