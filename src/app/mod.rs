//! Application layer with dependency injection container.
//!
//! The container owns infrastructure (table storage, default seed) and wires
//! it into agents, games and training pipelines.
//!
//! Dependencies point inward: the CLI talks to [`App`], [`App`] hands out
//! domain objects (`QLearningAgent`, `Game`, `TrainingPipeline`) that only
//! know the [`TableRepository`](crate::ports::TableRepository) port, and the
//! adapters (`FileRepository`, `InMemoryRepository`) implement that port.
//!
//! # Usage
//!
//! ## Production
//!
//! ```
//! use tilemind::app::{AgentConfig, App};
//!
//! let app = App::new();
//! let agent = app.create_agent(AgentConfig::default().with_seed(42))?;
//! # Ok::<(), tilemind::Error>(())
//! ```
//!
//! ## Testing
//!
//! ```
//! use tilemind::adapters::InMemoryRepository;
//! use tilemind::app::App;
//!
//! let app = App::for_testing()
//!     .with_repository(InMemoryRepository::new())
//!     .with_default_seed(42)
//!     .build();
//! ```

pub mod config;
pub mod container;

pub use config::AgentConfig;
pub use container::{App, AppBuilder};
