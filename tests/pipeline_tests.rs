//! Tests for the training pipeline

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use tilemind::{
    Direction, Game, Result,
    adapters::InMemoryRepository,
    pipeline::{
        FrozenLearner, MetricsObserver, RandomLearner, SharedGame, StopFlag, TrainingConfig,
        TrainingPipeline,
    },
    ports::{EpisodeSummary, Learner, Observer, StepEvent, TableRepository},
    q_learning::{Hyperparameters, QLearningAgent, QTable},
};

fn config(episodes: usize) -> TrainingConfig {
    TrainingConfig {
        episodes,
        seed: Some(42),
        max_steps_per_episode: 2_000,
        table_path: Some("agent.qtable".into()),
        ..TrainingConfig::default()
    }
}

fn agent() -> QLearningAgent {
    QLearningAgent::new(Hyperparameters::default()).unwrap()
}

/// Records every callback in order.
#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
    steps: Arc<Mutex<Vec<StepEvent>>>,
    summaries: Arc<Mutex<Vec<EpisodeSummary>>>,
}

impl Observer for Recorder {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("start {total_episodes}"));
        Ok(())
    }

    fn on_episode_start(&mut self, episode: usize) -> Result<()> {
        self.events.lock().unwrap().push(format!("episode {episode}"));
        Ok(())
    }

    fn on_step(&mut self, event: &StepEvent) -> Result<()> {
        self.steps.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("end {}", summary.episode));
        self.summaries.lock().unwrap().push(summary.clone());
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.events.lock().unwrap().push("finish".to_string());
        Ok(())
    }
}

#[test]
fn test_basic_training_run() {
    let game = SharedGame::new(Game::new());
    let mut agent = agent();
    let mut pipeline = TrainingPipeline::new(config(5)).with_repository(InMemoryRepository::new());

    let result = pipeline.run(&game, &mut agent).unwrap();

    assert_eq!(result.episodes, 5);
    assert_eq!(result.scores.len(), 5);
    assert_eq!(result.best_score, *result.scores.iter().max().unwrap());
    assert!(result.total_moves <= result.total_steps);
    assert!(result.best_tile >= 4);
    assert_eq!(result.table_size, Some(agent.table().len()));
    assert!(!agent.table().is_empty());
    assert!(!result.stopped);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_observer_callback_order() {
    let recorder = Recorder::default();
    let game = SharedGame::new(Game::new());
    let mut learner = RandomLearner::new("Random");
    let mut pipeline = TrainingPipeline::new(config(2))
        .with_repository(InMemoryRepository::new())
        .with_observer(Box::new(recorder.clone()));

    pipeline.run(&game, &mut learner).unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec!["start 2", "episode 0", "end 0", "episode 1", "end 1", "finish"]
    );
}

#[test]
fn test_rewards_are_score_deltas() {
    let recorder = Recorder::default();
    let game = SharedGame::new(Game::new());
    let mut learner = RandomLearner::new("Random");
    let mut pipeline = TrainingPipeline::new(config(3))
        .with_repository(InMemoryRepository::new())
        .with_observer(Box::new(recorder.clone()));

    let result = pipeline.run(&game, &mut learner).unwrap();

    let steps = recorder.steps.lock().unwrap();
    assert_eq!(steps.len(), result.total_steps);
    for step in steps.iter() {
        let delta = step.next_board.score() as f64 - step.board.score() as f64;
        assert_eq!(step.reward, delta);
        if step.moved {
            assert!(step.reward == 2.0 || step.reward == 4.0);
        } else {
            assert_eq!(step.reward, 0.0);
            assert_eq!(step.board, step.next_board);
        }
    }

    let summaries = recorder.summaries.lock().unwrap();
    for summary in summaries.iter() {
        let episode_reward: f64 = steps
            .iter()
            .filter(|s| s.episode == summary.episode)
            .map(|s| s.reward)
            .sum();
        assert_eq!(summary.total_reward, episode_reward);
        assert!(!summary.truncated);
    }
}

#[test]
fn test_episodes_end_on_terminal_boards() {
    let recorder = Recorder::default();
    let game = SharedGame::new(Game::new());
    let mut learner = RandomLearner::new("Random");
    let mut pipeline = TrainingPipeline::new(config(3))
        .with_repository(InMemoryRepository::new())
        .with_observer(Box::new(recorder.clone()));

    pipeline.run(&game, &mut learner).unwrap();

    let steps = recorder.steps.lock().unwrap();
    for episode in 0..3 {
        let last = steps.iter().rfind(|s| s.episode == episode).unwrap();
        assert!(last.next_board.is_terminal());
        assert!(
            steps
                .iter()
                .filter(|s| s.episode == episode)
                .all(|s| !s.board.is_terminal())
        );
    }
}

#[test]
fn test_step_cap_truncates_episodes() {
    let game = SharedGame::new(Game::new());
    let mut learner = RandomLearner::new("Random");
    let mut pipeline = TrainingPipeline::new(TrainingConfig {
        max_steps_per_episode: 5,
        ..config(4)
    })
    .with_repository(InMemoryRepository::new());

    let result = pipeline.run(&game, &mut learner).unwrap();

    assert_eq!(result.episodes, 4);
    assert_eq!(result.truncated_episodes, 4);
    assert_eq!(result.total_steps, 20);
}

#[test]
fn test_same_seed_same_run() {
    let run = || {
        let game = SharedGame::new(Game::new());
        let mut agent = agent();
        let mut pipeline =
            TrainingPipeline::new(config(4)).with_repository(InMemoryRepository::new());
        let result = pipeline.run(&game, &mut agent).unwrap();
        (result, agent.table().clone())
    };

    let (first, first_table) = run();
    let (second, second_table) = run();

    assert_eq!(first.scores, second.scores);
    assert_eq!(first.total_steps, second.total_steps);
    assert_eq!(first_table, second_table);
}

#[test]
fn test_table_is_saved_to_repository() {
    let repo = InMemoryRepository::new();
    let game = SharedGame::new(Game::new());
    let mut agent = agent();
    let mut pipeline = TrainingPipeline::new(TrainingConfig {
        save_every: 2,
        ..config(5)
    })
    .with_repository(repo.clone());

    let result = pipeline.run(&game, &mut agent).unwrap();

    // Episodes 2 and 4, then the final unsaved one
    assert_eq!(result.saves, 3);
    let stored = repo.load(Path::new("agent.qtable")).unwrap().unwrap();
    assert_eq!(&stored, agent.table());
}

#[test]
fn test_resume_continues_from_stored_table() {
    let repo = InMemoryRepository::new();

    let mut first = agent();
    TrainingPipeline::new(config(3))
        .with_repository(repo.clone())
        .run(&SharedGame::new(Game::new()), &mut first)
        .unwrap();
    let learned = first.table().len();

    let mut second = agent();
    let mut pipeline = TrainingPipeline::new(config(2)).with_repository(repo.clone());
    let status = pipeline.resume(&mut second).unwrap();

    assert_eq!(
        status,
        tilemind::pipeline::ResumeStatus::Loaded { states: learned }
    );
    assert_eq!(second.table(), first.table());

    pipeline
        .run(&SharedGame::new(Game::new()), &mut second)
        .unwrap();
    assert!(second.table().len() >= learned);
}

#[test]
fn test_frozen_player_does_not_touch_its_table() {
    let mut trained = agent();
    TrainingPipeline::new(config(3))
        .with_repository(InMemoryRepository::new())
        .run(&SharedGame::new(Game::new()), &mut trained)
        .unwrap();
    let table: QTable = trained.table().clone();

    let repo = InMemoryRepository::new();
    let mut frozen = FrozenLearner::new("Frozen", table.clone());
    let result = TrainingPipeline::new(config(3))
        .with_repository(repo.clone())
        .run(&SharedGame::new(Game::new()), &mut frozen)
        .unwrap();

    assert_eq!(frozen.table(), &table);
    assert_eq!(result.table_size, None);
    assert_eq!(result.saves, 0);
    assert_eq!(repo.count().unwrap(), 0);
    // Only moves that change the board are chosen, so no step is wasted
    assert_eq!(result.total_moves, result.total_steps);
}

#[test]
fn test_metrics_observer_matches_result() {
    let metrics = MetricsObserver::new();
    let game = SharedGame::new(Game::new());
    let mut agent = agent();
    let result = TrainingPipeline::new(config(4))
        .with_repository(InMemoryRepository::new())
        .with_observer(Box::new(metrics.clone()))
        .run(&game, &mut agent)
        .unwrap();

    let stats = metrics.summary().unwrap();
    assert_eq!(stats.episodes, result.episodes);
    assert_eq!(stats.high_score, result.best_score);
    assert_eq!(stats.steps, result.total_steps);
    assert_eq!(stats.moves_made, result.total_moves);
    assert!((stats.mean_score() - result.mean_score).abs() < 1e-9);
    assert!((stats.cumulative_reward - result.total_reward).abs() < 1e-9);
}

#[test]
fn test_learner_trait_object_reports_values() {
    let mut agent = agent();
    let board = Game::with_seed(1).current_board();
    let learner: &mut dyn Learner = &mut agent;

    let action = learner.select_action(&board).unwrap();
    assert!(Direction::ALL.contains(&action));
    assert_eq!(learner.action_values(&board), Some([0.0; 4]));
    assert_eq!(learner.epsilon(), Some(0.1));
    assert_eq!(learner.value_table().map(QTable::len), Some(1));
}

/// Raises the pipeline's stop flag once `limit` episodes have finished.
struct StopAfter {
    limit: usize,
    stop: StopFlag,
}

impl Observer for StopAfter {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        if summary.episode + 1 >= self.limit {
            self.stop.stop();
        }
        Ok(())
    }
}

#[test]
fn test_observer_can_stop_training() {
    let repo = InMemoryRepository::new();
    let pipeline = TrainingPipeline::new(config(10)).with_repository(repo.clone());
    let stop = pipeline.stop_flag();
    let mut pipeline = pipeline.with_observer(Box::new(StopAfter { limit: 2, stop }));

    let mut learner = RandomLearner::new("Random");
    let result = pipeline
        .run(&SharedGame::new(Game::new()), &mut learner)
        .unwrap();

    assert_eq!(result.episodes, 2);
    assert!(result.stopped);
}
