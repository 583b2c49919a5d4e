//! Q-learning agent for the 4x4 sliding-tile merge puzzle
//!
//! This crate provides:
//! - The board engine: slide/merge moves, tile spawning, terminal detection
//! - A tabular Q-learning agent over encoded boards, with a versioned
//!   on-disk value table
//! - A training pipeline with pluggable observers, table storage and a
//!   shared game handle for concurrent observation
//! - A command-line front end (`tilemind`)
//!
//! ```
//! use tilemind::game::Game;
//! use tilemind::pipeline::{SharedGame, TrainingConfig, TrainingPipeline};
//! use tilemind::q_learning::{Hyperparameters, QLearningAgent};
//!
//! let mut agent = QLearningAgent::new(Hyperparameters::default())?;
//! let game = SharedGame::new(Game::new());
//!
//! let mut pipeline = TrainingPipeline::new(TrainingConfig {
//!     episodes: 2,
//!     seed: Some(7),
//!     ..TrainingConfig::default()
//! });
//! let result = pipeline.run(&game, &mut agent)?;
//! assert_eq!(result.episodes, 2);
//! assert!(!agent.table().is_empty());
//! # Ok::<(), tilemind::Error>(())
//! ```

pub mod adapters;
pub mod app;
pub mod cli;
pub mod error;
pub mod game;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use error::{Error, Result};
pub use game::{Board, Direction, Game};
pub use q_learning::{QLearningAgent, QTable};
pub use types::{StateKey, encode};
