//! Train command - Q-learning on the tile puzzle

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;

use crate::{
    app::{AgentConfig, App},
    cli::{
        config::{RunConfig, millis},
        output::{format_number, print_kv, print_section, print_subsection},
    },
    pipeline::{
        JsonlObserver, MetricsObserver, ProgressObserver, ResumeStatus, SharedGame, TrainingConfig,
        TrainingResult,
    },
    q_learning::HyperparameterUpdate,
};

/// Table written when neither the flags nor the config name one.
pub const DEFAULT_TABLE: &str = "tilemind.qtable";

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent")]
pub struct TrainArgs {
    /// JSON run configuration; flags below override it
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Value table to resume from and save to
    #[arg(long, short = 't')]
    pub table: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Learning rate α (0, 1]
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Discount factor γ [0, 1]
    #[arg(long)]
    pub discount: Option<f64>,

    /// Exploration rate ε [0, 1]
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Multiplier applied to ε after every update
    #[arg(long)]
    pub epsilon_decay: Option<f64>,

    /// Floor for ε under decay
    #[arg(long)]
    pub min_epsilon: Option<f64>,

    /// Cut an episode off after this many steps
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Save the table every N episodes (0 = only at the end)
    #[arg(long)]
    pub save_every: Option<usize>,

    /// Pause between moves, in milliseconds
    #[arg(long)]
    pub move_delay_ms: Option<u64>,

    /// Pause after each finished episode, in milliseconds
    #[arg(long)]
    pub episode_pause_ms: Option<u64>,

    /// Ignore any stored table and start from an empty one
    #[arg(long, default_value_t = false)]
    pub fresh: bool,

    /// Optional file for JSONL episode records
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Include the chosen directions in the JSONL records
    #[arg(long, default_value_t = false)]
    pub record_actions: bool,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,
}

impl TrainArgs {
    /// Flags override the config file, which overrides built-in defaults.
    pub fn resolve(&self) -> Result<(AgentConfig, TrainingConfig)> {
        let run = match &self.config {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RunConfig::default(),
        };

        let mut params = run.agent;
        if let Some(decay) = self.epsilon_decay {
            params.epsilon_decay = decay;
        }
        if let Some(floor) = self.min_epsilon {
            params.min_epsilon = floor;
        }
        let overrides = HyperparameterUpdate {
            learning_rate: self.learning_rate,
            discount_factor: self.discount,
            epsilon: self.epsilon,
        };
        let mut agent = AgentConfig::new(params).with_overrides(overrides);
        agent.seed = self.seed.or(run.seed);
        agent
            .hyperparameters
            .validate()
            .context("Invalid hyperparameters")?;

        let mut training = run.training_config();
        training.seed = agent.seed;
        training.table_path = Some(
            self.table
                .clone()
                .or(training.table_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TABLE)),
        );
        if let Some(episodes) = self.episodes {
            training.episodes = episodes;
        }
        if let Some(max_steps) = self.max_steps {
            training.max_steps_per_episode = max_steps;
        }
        if let Some(save_every) = self.save_every {
            training.save_every = save_every;
        }
        if let Some(ms) = self.move_delay_ms {
            training.move_delay = millis(ms);
        }
        if let Some(ms) = self.episode_pause_ms {
            training.episode_pause = millis(ms);
        }
        training.validate().context("Invalid training settings")?;

        Ok((agent, training))
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    execute_with(&App::new(), args).map(|_| ())
}

/// Run the command against `app`, returning the training result.
pub fn execute_with(app: &App, args: TrainArgs) -> Result<TrainingResult> {
    let (agent_config, training) = args.resolve()?;
    let table_path = training.table_path.clone().unwrap_or_default();

    let mut agent = app.create_agent(agent_config.clone())?;
    let game = SharedGame::new(app.create_game(training.seed));

    let metrics = MetricsObserver::new();
    let mut pipeline = app
        .training_pipeline(training.clone())
        .with_observer(Box::new(metrics.clone()));
    if !args.quiet {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create {}", path.display()))?
            .with_actions(args.record_actions);
        pipeline = pipeline.with_observer(Box::new(observer));
    }

    print_section("Training Q-learning agent");
    let params = &agent_config.hyperparameters;
    print_kv("Table", &table_path.display().to_string());
    print_kv("Episodes", &format_number(training.episodes));
    print_kv(
        "Hyperparameters",
        &format!(
            "α={} γ={} ε={} (decay {}, floor {})",
            params.learning_rate,
            params.discount_factor,
            params.epsilon,
            params.epsilon_decay,
            params.min_epsilon
        ),
    );
    if let Some(seed) = training.seed {
        print_kv("Seed", &seed.to_string());
    }

    let status = if args.fresh {
        ResumeStatus::Fresh
    } else {
        pipeline
            .resume(&mut agent)
            .with_context(|| format!("Failed to load {}", table_path.display()))?
    };
    print_kv("Start", &status.to_string());

    let result = pipeline.run(&game, &mut agent).context("Training failed")?;
    let stats = metrics.summary()?;

    print_subsection("Results");
    print_kv("Episodes", &format_number(result.episodes));
    print_kv("High score", &stats.high_score.to_string());
    print_kv("Improvements", &stats.improvements.to_string());
    print_kv("Mean score", &format!("{:.1}", result.mean_score));
    print_kv("Best tile", &result.best_tile.to_string());
    print_kv("Moves made", &format_number(result.total_moves));
    print_kv("Cumulative reward", &format!("{:.0}", stats.cumulative_reward));
    if result.truncated_episodes > 0 {
        print_kv("Truncated", &format_number(result.truncated_episodes));
    }
    if let Some(states) = result.table_size {
        print_kv("States learned", &format_number(states));
    }
    if let Some(epsilon) = result.final_epsilon {
        print_kv("Final ε", &format!("{epsilon:.4}"));
    }
    if result.stopped {
        warn!("Training stopped before all episodes finished");
    }
    for warning in &result.warnings {
        println!("Warning: {warning}");
    }

    if let Some(path) = &args.summary {
        result
            .save(path)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
        print_kv("Summary", &path.display().to_string());
    }

    Ok(result)
}
