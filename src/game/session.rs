//! Game session: a board plus the randomness that drives it

use rand::{SeedableRng, rngs::StdRng};

use super::{
    board::{Board, MoveOutcome},
    direction::Direction,
};

pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// A running game.
///
/// Owns the live board and its spawn RNG. Observers read through
/// [`Game::current_board`], which returns a copy.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    rng: StdRng,
    rng_seed: Option<u64>,
    moves_made: usize,
}

impl Game {
    /// Start a game with a non-deterministic RNG.
    pub fn new() -> Self {
        Self::from_rng(build_rng(None), None)
    }

    /// Start a game whose spawns are reproducible from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(build_rng(Some(seed)), Some(seed))
    }

    /// Continue from an existing board (e.g. a saved or hand-built position).
    pub fn from_board(board: Board, seed: Option<u64>) -> Self {
        Self {
            board,
            rng: build_rng(seed),
            rng_seed: seed,
            moves_made: 0,
        }
    }

    fn from_rng(mut rng: StdRng, rng_seed: Option<u64>) -> Self {
        let board = Board::new(&mut rng);
        Self {
            board,
            rng,
            rng_seed,
            moves_made: 0,
        }
    }

    /// Snapshot of the board.
    pub fn current_board(&self) -> Board {
        self.board
    }

    /// Apply a move; counts as a turn only when the board changed.
    pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
        let outcome = self.board.apply_move(direction, &mut self.rng);
        if outcome.moved {
            self.moves_made += 1;
        }
        outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.board.is_terminal()
    }

    pub fn score(&self) -> u64 {
        self.board.score()
    }

    /// Effective moves since the last reset.
    pub fn moves_made(&self) -> usize {
        self.moves_made
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    /// Start a fresh game in place.
    ///
    /// The RNG keeps advancing, so successive episodes of a seeded game differ
    /// while the whole sequence stays reproducible.
    pub fn reset(&mut self) {
        self.board = Board::new(&mut self.rng);
        self.moves_made = 0;
    }

    /// Reseed the spawn RNG.
    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng = build_rng(Some(seed));
        self.rng_seed = Some(seed);
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
