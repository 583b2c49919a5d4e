//! Training and evaluation pipeline
//!
//! - [`TrainingPipeline`] drives episodes of one learner on one game
//! - [`SharedGame`] lets observers read the board while a trainer thread plays
//! - [`RandomLearner`] and [`FrozenLearner`] are evaluation baselines
//! - Observers report progress, statistics and JSONL records

pub mod learners;
pub mod observers;
pub mod shared;
pub mod training;

// Re-export learner implementations (adapters)
pub use learners::{FrozenLearner, RandomLearner};
// Re-export observer implementations (adapters)
pub use observers::{JsonlObserver, MetricsObserver, ProgressObserver, SessionStats};
pub use shared::{SharedGame, StopFlag, TrainerHandle, spawn_trainer};
pub use training::{ResumeStatus, TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::{Learner, Observer};
