//! Non-learning baselines for evaluation.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Result,
    game::{Board, Direction, session::build_rng},
    ports::Learner,
    q_learning::{QTable, greedy_direction, q_table::greedy_among},
    types::{ActionValues, encode},
};

/// Random learner - picks one of the four directions uniformly
pub struct RandomLearner {
    name: String,
    rng: StdRng,
}

impl RandomLearner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rng: build_rng(None),
        }
    }

    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Learner for RandomLearner {
    fn select_action(&mut self, _board: &Board) -> Result<Direction> {
        Ok(Direction::ALL[self.rng.random_range(0..Direction::COUNT)])
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn action_values(&self, _board: &Board) -> Option<ActionValues> {
        Some([1.0 / Direction::COUNT as f64; Direction::COUNT])
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }
}

/// Frozen learner - plays greedily from a fixed table and never learns
///
/// Unlike the training agent it never explores, never inserts rows for
/// unseen boards, and only picks among directions that change the board, so a
/// game always progresses toward a terminal state.
///
/// # Examples
///
/// ```
/// use tilemind::game::{Board, Direction};
/// use tilemind::pipeline::FrozenLearner;
/// use tilemind::ports::Learner;
/// use tilemind::q_learning::QTable;
///
/// let board = Board::from_grid([[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]])?;
/// let mut frozen = FrozenLearner::new("Frozen", QTable::new());
///
/// // Up and Left leave this board unchanged, so the first useful direction wins
/// assert_eq!(frozen.select_action(&board)?, Direction::Down);
/// assert!(frozen.table().is_empty());
/// # Ok::<(), tilemind::Error>(())
/// ```
pub struct FrozenLearner {
    name: String,
    table: QTable,
}

impl FrozenLearner {
    pub fn new(name: impl Into<String>, table: QTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    fn values(&self, board: &Board) -> ActionValues {
        self.table
            .get(&encode(board))
            .copied()
            .unwrap_or([0.0; Direction::COUNT])
    }
}

impl Learner for FrozenLearner {
    fn select_action(&mut self, board: &Board) -> Result<Direction> {
        let values = self.values(board);
        Ok(greedy_among(&values, &board.legal_moves()).unwrap_or_else(|| greedy_direction(&values)))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn action_values(&self, board: &Board) -> Option<ActionValues> {
        self.table.get(&encode(board)).copied()
    }
}
