//! Observer port - abstraction for training observation and data collection
//!
//! Observers receive copies of boards, never a handle to the live game, so
//! they cannot observe a half-applied move.

use serde::Serialize;

use crate::{
    Result,
    game::{Board, Direction},
};

/// One applied step of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepEvent {
    pub episode: usize,
    /// Step index within the episode, starting at 0
    pub step: usize,
    pub board: Board,
    pub action: Direction,
    pub reward: f64,
    pub next_board: Board,
    /// Whether the move changed the board
    pub moved: bool,
}

/// Statistics of a finished episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    /// Sum of tiles on the final board
    pub score: u64,
    pub highest_tile: u32,
    /// Actions taken, including ones that did not move
    pub steps: usize,
    /// Actions that changed the board
    pub moves_made: usize,
    pub total_reward: f64,
    /// The step cap ended the episode before the board was terminal
    pub truncated: bool,
    /// Value-table size after the episode, if the learner has one
    pub table_size: Option<usize>,
    pub epsilon: Option<f64>,
}

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - once
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(event)` - for each step
///    - `on_episode_end(summary)`
/// 3. `on_training_end()` - once, also when stopped early
///
/// # Examples
///
/// ```no_run
/// use tilemind::ports::{EpisodeSummary, Observer};
///
/// struct BestScore(u64);
///
/// impl Observer for BestScore {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> tilemind::Result<()> {
///         self.0 = self.0.max(summary.score);
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each step has been applied and learned from.
    fn on_step(&mut self, _event: &StepEvent) -> Result<()> {
        Ok(())
    }

    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Use this to flush files or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
