//! Observer implementations for training pipelines

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    game::Direction,
    ports::{EpisodeSummary, Observer, StepEvent},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    best_score: u64,
    best_tile: u32,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            best_score: 0,
            best_tile: 0,
        }
    }

    fn message(&self) -> String {
        format!("best score {} tile {}", self.best_score, self.best_tile)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.best_score = self.best_score.max(summary.score);
        self.best_tile = self.best_tile.max(summary.highest_tile);

        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Running statistics of a training session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub episodes: usize,
    /// Best final score so far
    pub high_score: u64,
    /// Episodes that set a new high score
    pub improvements: usize,
    pub best_tile: u32,
    /// Sum of every reward handed to the learner
    pub cumulative_reward: f64,
    /// Moves that changed the board, over all episodes
    pub moves_made: usize,
    pub steps: usize,
    pub truncated_episodes: usize,
    pub last_score: u64,
    total_score: u64,
}

impl SessionStats {
    pub fn mean_score(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_score as f64 / self.episodes as f64
        }
    }

    pub fn avg_episode_length(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.moves_made as f64 / self.episodes as f64
        }
    }

    fn record_step(&mut self, event: &StepEvent) {
        self.steps += 1;
        self.cumulative_reward += event.reward;
        if event.moved {
            self.moves_made += 1;
        }
    }

    fn record_episode(&mut self, summary: &EpisodeSummary) {
        self.episodes += 1;
        self.total_score += summary.score;
        self.last_score = summary.score;
        if summary.score > self.high_score {
            self.high_score = summary.score;
            self.improvements += 1;
        }
        self.best_tile = self.best_tile.max(summary.highest_tile);
        if summary.truncated {
            self.truncated_episodes += 1;
        }
    }
}

/// Metrics observer - Tracks session statistics
///
/// Clones share the same statistics, so keep one clone and hand another to
/// the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    stats: Arc<Mutex<SessionStats>>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn stats(&self) -> Result<MutexGuard<'_, SessionStats>> {
        self.stats.lock().map_err(|_| Error::LockPoisoned {
            resource: "session statistics".to_string(),
        })
    }

    /// Copy of the statistics collected so far.
    pub fn summary(&self) -> Result<SessionStats> {
        Ok(self.stats()?.clone())
    }
}

impl Observer for MetricsObserver {
    fn on_step(&mut self, event: &StepEvent) -> Result<()> {
        self.stats()?.record_step(event);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.stats()?.record_episode(summary);
        Ok(())
    }
}

#[derive(Serialize)]
struct EpisodeRecord<'a> {
    #[serde(flatten)]
    summary: &'a EpisodeSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    actions: Vec<Direction>,
}

/// JSONL observer - one JSON object per finished episode
pub struct JsonlObserver {
    writer: BufWriter<File>,
    record_actions: bool,
    actions: Vec<Direction>,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create {}", path.display()),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            record_actions: false,
            actions: Vec::new(),
        })
    }

    /// Also write the sequence of chosen directions for each episode.
    pub fn with_actions(mut self, record_actions: bool) -> Self {
        self.record_actions = record_actions;
        self
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        self.actions.clear();
        Ok(())
    }

    fn on_step(&mut self, event: &StepEvent) -> Result<()> {
        if self.record_actions {
            self.actions.push(event.action);
        }
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        let record = EpisodeRecord {
            summary,
            actions: std::mem::take(&mut self.actions),
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::game::Board;

    fn summary(episode: usize, score: u64, highest_tile: u32) -> EpisodeSummary {
        EpisodeSummary {
            episode,
            score,
            highest_tile,
            steps: 10,
            moves_made: 8,
            total_reward: score as f64,
            truncated: false,
            table_size: Some(5),
            epsilon: Some(0.1),
        }
    }

    fn step(reward: f64, moved: bool) -> StepEvent {
        let board = Board::from_grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        StepEvent {
            episode: 0,
            step: 0,
            board,
            action: Direction::Left,
            reward,
            next_board: board,
            moved,
        }
    }

    #[test]
    fn test_metrics_track_high_score_improvements() {
        let metrics = MetricsObserver::new();
        let mut observer = metrics.clone();

        for (i, score) in [20, 12, 36, 36, 40].into_iter().enumerate() {
            observer.on_episode_end(&summary(i, score, 16)).unwrap();
        }

        let stats = metrics.summary().unwrap();
        assert_eq!(stats.episodes, 5);
        assert_eq!(stats.high_score, 40);
        assert_eq!(stats.improvements, 3);
        assert_eq!(stats.last_score, 40);
        assert!((stats.mean_score() - 28.8).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_count_rewards_and_moves() {
        let mut metrics = MetricsObserver::new();
        metrics.on_step(&step(4.0, true)).unwrap();
        metrics.on_step(&step(0.0, false)).unwrap();
        metrics.on_step(&step(8.0, true)).unwrap();

        let stats = metrics.summary().unwrap();
        assert_eq!(stats.steps, 3);
        assert_eq!(stats.moves_made, 2);
        assert_eq!(stats.cumulative_reward, 12.0);
    }

    #[test]
    fn test_jsonl_writes_one_line_per_episode() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("episodes.jsonl");

        let mut observer = JsonlObserver::new(&path).unwrap().with_actions(true);
        for episode in 0..3 {
            observer.on_episode_start(episode).unwrap();
            observer.on_step(&step(4.0, true)).unwrap();
            observer
                .on_episode_end(&summary(episode, 8 * episode as u64, 4))
                .unwrap();
        }
        observer.on_training_end().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);

        let value: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(value["episode"], 2);
        assert_eq!(value["score"], 16);
        assert_eq!(value["actions"], serde_json::json!(["left"]));
    }
}
