//! Dependency injection container.

use std::{path::Path, sync::Arc};

use log::info;

use super::config::AgentConfig;
use crate::{
    Result,
    adapters::FileRepository,
    game::Game,
    pipeline::{FrozenLearner, TrainingConfig, TrainingPipeline},
    ports::TableRepository,
    q_learning::{QLearningAgent, QTable},
};

/// Application with dependency injection.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use tilemind::app::{AgentConfig, App};
/// use tilemind::pipeline::{SharedGame, TrainingConfig};
///
/// let app = App::new();
/// let mut agent = app.create_agent(AgentConfig::default())?;
/// let game = SharedGame::new(app.create_game(None));
///
/// let mut pipeline = app.training_pipeline(TrainingConfig::default());
/// pipeline.run(&game, &mut agent)?;
///
/// app.save_table(agent.table(), Path::new("trained.qtable"))?;
/// # Ok::<(), tilemind::Error>(())
/// ```
pub struct App {
    /// Repository for value-table persistence
    repository: Arc<dyn TableRepository>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Tables are stored as files; parent directories are created on save.
    pub fn new() -> Self {
        Self {
            repository: default_repository(),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn repository(&self) -> Arc<dyn TableRepository> {
        Arc::clone(&self.repository)
    }

    pub fn default_seed(&self) -> Option<u64> {
        self.default_seed
    }

    /// Create an agent with an empty table.
    ///
    /// The config seed wins over the app default.
    pub fn create_agent(&self, config: AgentConfig) -> Result<QLearningAgent> {
        let agent = QLearningAgent::new(config.hyperparameters)?;
        Ok(match config.seed.or(self.default_seed) {
            Some(seed) => agent.with_seed(seed),
            None => agent,
        })
    }

    /// Create an agent and fill it from the table stored at `path`, if any.
    ///
    /// # Errors
    ///
    /// A stored table that cannot be decoded is an error here; use
    /// [`TrainingPipeline::resume`] to recover from one instead.
    pub fn load_agent(&self, config: AgentConfig, path: &Path) -> Result<QLearningAgent> {
        let mut agent = self.create_agent(config)?;
        if let Some(table) = self.repository.load(path)? {
            info!("Loaded value table with {} states from {}", table.len(), path.display());
            agent.replace_table(table);
        }
        Ok(agent)
    }

    /// Greedy, non-learning player for a stored table.
    ///
    /// A missing table yields a player with an empty table.
    pub fn load_frozen(&self, path: &Path) -> Result<FrozenLearner> {
        let table = self.repository.load(path)?.unwrap_or_default();
        Ok(FrozenLearner::new("Frozen", table))
    }

    pub fn load_table(&self, path: &Path) -> Result<Option<QTable>> {
        self.repository.load(path)
    }

    pub fn save_table(&self, table: &QTable, path: &Path) -> Result<()> {
        self.repository.save(table, path)
    }

    /// New game, seeded from `seed` or the app default.
    pub fn create_game(&self, seed: Option<u64>) -> Game {
        match seed.or(self.default_seed) {
            Some(seed) => Game::with_seed(seed),
            None => Game::new(),
        }
    }

    /// Pipeline that persists through this app's repository.
    ///
    /// The app default seed fills in when `config` has none.
    pub fn training_pipeline(&self, mut config: TrainingConfig) -> TrainingPipeline {
        config.seed = config.seed.or(self.default_seed);
        TrainingPipeline::new(config).with_shared_repository(self.repository())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn default_repository() -> Arc<dyn TableRepository> {
    Arc::new(FileRepository::new().with_create_dirs(true))
}

/// Builder for constructing app with custom dependencies.
///
/// # Examples
///
/// ```
/// use tilemind::adapters::InMemoryRepository;
/// use tilemind::app::AppBuilder;
///
/// let app = AppBuilder::new()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// assert_eq!(app.default_seed(), Some(42));
/// ```
#[derive(Default)]
pub struct AppBuilder {
    repository: Option<Arc<dyn TableRepository>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom table repository.
    pub fn with_repository<R: TableRepository + 'static>(mut self, repo: R) -> Self {
        self.repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for everything this app creates.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app, defaulting to file storage.
    pub fn build(self) -> App {
        App {
            repository: self.repository.unwrap_or_else(default_repository),
            default_seed: self.default_seed,
        }
    }
}
