//! Learner port - abstraction over move-choosing agents
//!
//! Implemented by the Q-learning agent and by the evaluation baselines
//! (random play, frozen greedy play).

use crate::{
    Result,
    game::{Board, Direction},
    q_learning::QTable,
    types::ActionValues,
};

/// Learner trait - unified interface for everything that plays the game
///
/// # Examples
///
/// ```no_run
/// use tilemind::{game::Game, ports::Learner};
///
/// fn play_one_move(learner: &mut dyn Learner, game: &mut Game) -> tilemind::Result<bool> {
///     let before = game.current_board();
///     let action = learner.select_action(&before)?;
///     let outcome = game.apply_move(action);
///     let after = game.current_board();
///     let reward = after.score() as f64 - before.score() as f64;
///     learner.update(&before, action, reward, &after)?;
///     Ok(outcome.moved)
/// }
/// ```
pub trait Learner: Send {
    /// Choose a direction for `board`.
    ///
    /// Any of the four directions may be returned, including one that would
    /// leave the board unchanged.
    fn select_action(&mut self, board: &Board) -> Result<Direction>;

    /// Learn from one transition.
    ///
    /// Called once per step, after the move has been applied. `reward` is the
    /// score delta of that move.
    ///
    /// # Default Implementation
    ///
    /// Does nothing, suitable for non-adaptive learners.
    fn update(
        &mut self,
        _state: &Board,
        _action: Direction,
        _reward: f64,
        _next_state: &Board,
    ) -> Result<()> {
        Ok(())
    }

    /// Get the learner's name.
    ///
    /// Used for identification in summaries and logging.
    fn name(&self) -> &str;

    /// Reset learner state to initial conditions.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    /// Values the learner associates with each direction for `board`, if any.
    fn action_values(&self, _board: &Board) -> Option<ActionValues> {
        None
    }

    /// Seed the learner's internal random number generator.
    ///
    /// Training pipelines call this when given a seed so runs are
    /// reproducible. Stateless learners can ignore it.
    fn set_rng_seed(&mut self, _seed: u64) -> Result<()> {
        Ok(())
    }

    /// The value table to persist, for learners that have one.
    fn value_table(&self) -> Option<&QTable> {
        None
    }

    /// Swap in a previously saved table.
    ///
    /// Returns `false` if the learner has no table to replace.
    fn replace_table(&mut self, _table: QTable) -> bool {
        false
    }

    /// Current exploration rate, for learners that explore.
    fn epsilon(&self) -> Option<f64> {
        None
    }
}
