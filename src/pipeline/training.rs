//! Training pipeline for learnable agents

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    adapters::FileRepository,
    game::{Board, Direction, MoveOutcome},
    pipeline::shared::{SharedGame, StopFlag},
    ports::{EpisodeSummary, Learner, Observer, StepEvent, TableRepository},
    q_learning::QTable,
};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of episodes to play
    pub episodes: usize,

    /// Random seed for the learner and the game
    pub seed: Option<u64>,

    /// Steps after which a non-terminal episode is cut off
    pub max_steps_per_episode: usize,

    /// Persist the table every this many finished episodes (0 = only at the end)
    pub save_every: usize,

    /// Where the value table is loaded from and saved to
    pub table_path: Option<PathBuf>,

    /// Pause after every move
    pub move_delay: Option<Duration>,

    /// Pause after every finished episode, before the board is reset
    pub episode_pause: Option<Duration>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 100,
            seed: None,
            max_steps_per_episode: 10_000,
            save_every: 1,
            table_path: None,
            move_delay: None,
            episode_pause: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps_per_episode == 0 {
            return Err(Error::InvalidConfiguration {
                message: "max_steps_per_episode must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Outcome of loading a persisted table before training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResumeStatus {
    /// A table with this many states was loaded
    Loaded { states: usize },
    /// Nothing was stored yet, or no table path is configured
    Fresh,
    /// The stored table could not be decoded and was replaced by an empty one
    Recovered { reason: String },
}

impl fmt::Display for ResumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumeStatus::Loaded { states } => write!(f, "loaded {states} states"),
            ResumeStatus::Fresh => f.write_str("starting fresh"),
            ResumeStatus::Recovered { reason } => {
                write!(f, "stored table unreadable, starting fresh ({reason})")
            }
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes that ran to a terminal board or the step cap
    pub episodes: usize,

    /// Episodes cut off by the step cap
    pub truncated_episodes: usize,

    /// Actions taken, including ones that did not move the board
    pub total_steps: usize,

    /// Actions that changed the board
    pub total_moves: usize,

    /// Sum of all rewards
    pub total_reward: f64,

    /// Final score of every finished episode
    pub scores: Vec<u64>,

    pub best_score: u64,
    pub best_tile: u32,
    pub mean_score: f64,

    /// Value-table size at the end, if the learner has a table
    pub table_size: Option<usize>,

    pub final_epsilon: Option<f64>,

    /// Number of times the table was persisted
    pub saves: usize,

    /// The run ended because of the stop flag
    pub stopped: bool,

    /// Problems that did not abort the run
    pub warnings: Vec<String>,
}

impl TrainingResult {
    fn record(&mut self, summary: &EpisodeSummary) {
        self.episodes += 1;
        if summary.truncated {
            self.truncated_episodes += 1;
        }
        self.scores.push(summary.score);
        self.best_score = self.best_score.max(summary.score);
        self.best_tile = self.best_tile.max(summary.highest_tile);
        self.mean_score += (summary.score as f64 - self.mean_score) / self.episodes as f64;
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

struct Step {
    board: Board,
    action: Direction,
    outcome: MoveOutcome,
    next_board: Board,
    reward: f64,
    terminal: bool,
}

/// Training pipeline driving one learner on one game
///
/// Each step selects an action for the current board, applies it, rewards the
/// learner with the change in board score and lets it learn, all while
/// holding the game lock. A terminal board (or the step cap) ends the
/// episode: the table is persisted and the board reset.
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
    repository: Arc<dyn TableRepository>,
    stop: StopFlag,
    warnings: Vec<String>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
            repository: Arc::new(FileRepository::new().with_create_dirs(true)),
            stop: StopFlag::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Store tables through `repository` instead of the file system.
    pub fn with_repository<R: TableRepository + 'static>(self, repository: R) -> Self {
        self.with_shared_repository(Arc::new(repository))
    }

    pub fn with_shared_repository(mut self, repository: Arc<dyn TableRepository>) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    /// Load the persisted table into `learner`.
    ///
    /// A missing table is not an error. An undecodable one is replaced by an
    /// empty table; the reason is logged and reported in the next
    /// [`TrainingResult`]. Other I/O errors are returned.
    pub fn resume(&mut self, learner: &mut dyn Learner) -> Result<ResumeStatus> {
        let Some(path) = self.config.table_path.clone() else {
            return Ok(ResumeStatus::Fresh);
        };

        match self.repository.load(&path) {
            Ok(Some(table)) => {
                let states = table.len();
                if learner.replace_table(table) {
                    info!("Loaded value table with {states} states from {}", path.display());
                    Ok(ResumeStatus::Loaded { states })
                } else {
                    Ok(ResumeStatus::Fresh)
                }
            }
            Ok(None) => {
                info!("No value table at {}, starting fresh", path.display());
                Ok(ResumeStatus::Fresh)
            }
            Err(err) if err.is_decode() => {
                let reason = err.to_string();
                warn!(
                    "Discarding unreadable value table at {}: {reason}",
                    path.display()
                );
                learner.replace_table(QTable::new());
                self.warnings
                    .push(format!("{}: {reason}; started from an empty table", path.display()));
                Ok(ResumeStatus::Recovered { reason })
            }
            Err(err) => Err(err),
        }
    }

    /// Run training on `game` with `learner`.
    pub fn run(&mut self, game: &SharedGame, learner: &mut dyn Learner) -> Result<TrainingResult> {
        self.config.validate()?;
        self.seed(game, learner)?;

        let mut result = TrainingResult {
            warnings: std::mem::take(&mut self.warnings),
            ..TrainingResult::default()
        };
        let mut unsaved = false;

        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        for episode in 0..self.config.episodes {
            if self.stop.is_stopped() {
                result.stopped = true;
                break;
            }

            let Some(summary) = self.play_episode(episode, game, learner, &mut result)? else {
                result.stopped = true;
                unsaved = true;
                break;
            };
            unsaved = true;

            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }
            debug!(
                "Episode {} finished: score {}, highest tile {}, {} moves{}",
                episode + 1,
                summary.score,
                summary.highest_tile,
                summary.moves_made,
                if summary.truncated { " (truncated)" } else { "" }
            );
            result.record(&summary);

            if self.config.save_every > 0
                && result.episodes % self.config.save_every == 0
                && self.persist(learner, &mut result)?
            {
                unsaved = false;
            }

            pause(self.config.episode_pause);
            game.reset()?;
        }

        if unsaved {
            self.persist(learner, &mut result)?;
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        result.table_size = learner.value_table().map(QTable::len);
        result.final_epsilon = learner.epsilon();
        Ok(result)
    }

    fn seed(&self, game: &SharedGame, learner: &mut dyn Learner) -> Result<()> {
        if let Some(seed) = self.config.seed {
            learner.set_rng_seed(seed)?;
            game.with_game(|game| {
                game.set_rng_seed(seed.wrapping_add(1));
                game.reset();
            })?;
        }
        Ok(())
    }

    /// Play until a terminal board or the step cap. `None` if stopped first.
    fn play_episode(
        &mut self,
        episode: usize,
        game: &SharedGame,
        learner: &mut dyn Learner,
        result: &mut TrainingResult,
    ) -> Result<Option<EpisodeSummary>> {
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let mut terminal = game.is_terminal()?;
        let mut steps = 0;
        let mut total_reward = 0.0;

        while !terminal && steps < self.config.max_steps_per_episode {
            if self.stop.is_stopped() {
                return Ok(None);
            }

            let step = game.with_game(|game| -> Result<Step> {
                let board = game.current_board();
                let action = learner.select_action(&board)?;
                let outcome = game.apply_move(action);
                let next_board = game.current_board();
                let reward = next_board.score() as f64 - board.score() as f64;
                learner.update(&board, action, reward, &next_board)?;
                Ok(Step {
                    board,
                    action,
                    outcome,
                    next_board,
                    reward,
                    terminal: game.is_terminal(),
                })
            })??;

            let event = StepEvent {
                episode,
                step: steps,
                board: step.board,
                action: step.action,
                reward: step.reward,
                next_board: step.next_board,
                moved: step.outcome.moved,
            };
            for observer in &mut self.observers {
                observer.on_step(&event)?;
            }

            steps += 1;
            total_reward += step.reward;
            result.total_steps += 1;
            result.total_reward += step.reward;
            if step.outcome.moved {
                result.total_moves += 1;
            }
            terminal = step.terminal;

            if !terminal {
                pause(self.config.move_delay);
            }
        }

        let (board, moves_made) = game.with_game(|game| (game.current_board(), game.moves_made()))?;
        Ok(Some(EpisodeSummary {
            episode,
            score: board.score(),
            highest_tile: board.highest_tile(),
            steps,
            moves_made,
            total_reward,
            truncated: !terminal,
            table_size: learner.value_table().map(QTable::len),
            epsilon: learner.epsilon(),
        }))
    }

    /// Save the learner's table if it has one and a path is configured.
    fn persist(&self, learner: &dyn Learner, result: &mut TrainingResult) -> Result<bool> {
        let (Some(path), Some(table)) = (&self.config.table_path, learner.value_table()) else {
            return Ok(false);
        };
        self.repository.save(table, path)?;
        result.saves += 1;
        debug!("Saved value table ({} states) to {}", table.len(), path.display());
        Ok(true)
    }
}

fn pause(duration: Option<Duration>) {
    if let Some(duration) = duration.filter(|d| !d.is_zero()) {
        thread::sleep(duration);
    }
}
