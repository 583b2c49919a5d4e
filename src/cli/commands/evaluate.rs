//! Evaluate command - greedy play with a stored table, no learning

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use serde::Serialize;

use crate::{
    app::App,
    cli::output::{format_number, print_kv, print_section, print_subsection},
    pipeline::{
        FrozenLearner, MetricsObserver, ProgressObserver, RandomLearner, SessionStats, SharedGame,
        TrainingConfig, TrainingPipeline, TrainingResult,
    },
    ports::Learner,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained value table")]
pub struct EvaluateArgs {
    /// Path to the value table
    pub table: PathBuf,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 20)]
    pub episodes: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Cut an episode off after this many steps
    #[arg(long, default_value_t = 10_000)]
    pub max_steps: usize,

    /// Also play the same number of episodes with random moves
    #[arg(long, default_value_t = false)]
    pub baseline: bool,

    /// Export results to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,
}

/// Scores of one evaluated player.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub learner: String,
    pub episodes: usize,
    pub mean_score: f64,
    pub best_score: u64,
    pub best_tile: u32,
    pub mean_moves: f64,
    pub truncated_episodes: usize,
    pub scores: Vec<u64>,
}

impl EvaluationReport {
    fn new(learner: &str, result: &TrainingResult, stats: &SessionStats) -> Self {
        Self {
            learner: learner.to_string(),
            episodes: result.episodes,
            mean_score: result.mean_score,
            best_score: result.best_score,
            best_tile: result.best_tile,
            mean_moves: stats.avg_episode_length(),
            truncated_episodes: result.truncated_episodes,
            scores: result.scores.clone(),
        }
    }

    fn print(&self) {
        print_subsection(&self.learner);
        print_kv("Episodes", &format_number(self.episodes));
        print_kv("Mean score", &format!("{:.1}", self.mean_score));
        print_kv("Best score", &self.best_score.to_string());
        print_kv("Best tile", &self.best_tile.to_string());
        print_kv("Mean moves", &format!("{:.1}", self.mean_moves));
        if self.truncated_episodes > 0 {
            print_kv("Truncated", &format_number(self.truncated_episodes));
        }
    }
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    execute_with(&App::new(), args).map(|_| ())
}

/// Run the command against `app`, returning one report per player.
pub fn execute_with(app: &App, args: EvaluateArgs) -> Result<Vec<EvaluationReport>> {
    let table = app
        .load_table(&args.table)
        .with_context(|| format!("Failed to load {}", args.table.display()))?;
    if table.is_none() {
        warn!(
            "No value table at {}; playing with an empty table",
            args.table.display()
        );
    }
    let mut frozen = FrozenLearner::new("Frozen", table.unwrap_or_default());

    print_section("Evaluating value table");
    print_kv("Table", &args.table.display().to_string());
    print_kv("States", &format_number(frozen.table().len()));

    let config = TrainingConfig {
        episodes: args.episodes,
        seed: args.seed.or(app.default_seed()),
        max_steps_per_episode: args.max_steps,
        table_path: None,
        ..TrainingConfig::default()
    };

    let mut reports = vec![play(app, &config, &mut frozen, args.quiet)?];
    if args.baseline {
        let mut random = RandomLearner::new("Random");
        reports.push(play(app, &config, &mut random, args.quiet)?);
    }

    for report in &reports {
        report.print();
    }

    if let Some(path) = &args.export {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &reports)?;
        print_kv("Exported", &path.display().to_string());
    }

    Ok(reports)
}

fn play(
    app: &App,
    config: &TrainingConfig,
    learner: &mut dyn Learner,
    quiet: bool,
) -> Result<EvaluationReport> {
    let metrics = MetricsObserver::new();
    let mut pipeline =
        TrainingPipeline::new(config.clone()).with_observer(Box::new(metrics.clone()));
    if !quiet {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }

    let game = SharedGame::new(app.create_game(config.seed));
    let result = pipeline
        .run(&game, learner)
        .with_context(|| format!("Evaluation of {} failed", learner.name()))?;
    Ok(EvaluationReport::new(
        learner.name(),
        &result,
        &metrics.summary()?,
    ))
}
