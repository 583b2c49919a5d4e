//! Tabular Q-learning
//!
//! The agent keeps one value per direction for every encoded board it has
//! seen and improves them with the one-step update
//!
//! ```text
//! Q(s, a) ← Q(s, a) + α · (r + γ · max_a' Q(s', a') − Q(s, a))
//! ```
//!
//! where `r` is the change in board score caused by the move.
//!
//! ## Usage Example
//!
//! ```no_run
//! use tilemind::game::Game;
//! use tilemind::q_learning::{Hyperparameters, QLearningAgent};
//!
//! let mut agent = QLearningAgent::new(Hyperparameters::default())?.with_seed(7);
//! let mut game = Game::with_seed(7);
//!
//! let before = game.current_board();
//! let action = agent.select_action(&before);
//! game.apply_move(action);
//! let after = game.current_board();
//! agent.update(&before, action, after.score() as f64 - before.score() as f64, &after);
//!
//! agent.save("agent.qtable")?;
//! # Ok::<(), tilemind::Error>(())
//! ```

pub mod agent;
pub mod hyperparameters;
pub mod q_table;
pub mod serialization;

// Public re-exports
pub use agent::QLearningAgent;
pub use hyperparameters::{HyperparameterUpdate, Hyperparameters};
pub use q_table::{QTable, greedy_direction, max_value};
pub use serialization::{FORMAT_ID, SavedQTable};
