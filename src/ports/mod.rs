//! Ports (trait boundaries) for external dependencies.
//!
//! The training loop only talks to learners, observers and table storage
//! through these traits; concrete implementations live in `q_learning`,
//! `pipeline` and `adapters`.

pub mod learner;
pub mod observer;
pub mod repository;

pub use learner::Learner;
pub use observer::{EpisodeSummary, Observer, StepEvent};
pub use repository::TableRepository;
