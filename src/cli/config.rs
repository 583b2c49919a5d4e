//! Run configuration files for CLI commands
//!
//! A JSON file supplies defaults; explicit command-line flags override it.
//!
//! ```json
//! {
//!   "seed": 7,
//!   "table": "runs/agent.qtable",
//!   "agent": { "learning_rate": 0.1, "discount_factor": 0.9, "epsilon": 0.2 },
//!   "training": { "episodes": 500, "save_every": 10, "move_delay_ms": 0 }
//! }
//! ```

use std::{path::Path, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, pipeline::TrainingConfig, q_learning::Hyperparameters};

/// Top-level run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Random seed for reproducibility
    pub seed: Option<u64>,

    /// Value-table location
    pub table: Option<PathBuf>,

    pub agent: Hyperparameters,

    pub training: TrainingSection,
}

/// Episode settings; pauses are in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingSection {
    pub episodes: usize,
    pub max_steps_per_episode: usize,
    pub save_every: usize,
    pub move_delay_ms: u64,
    pub episode_pause_ms: u64,
}

impl Default for TrainingSection {
    fn default() -> Self {
        let defaults = TrainingConfig::default();
        Self {
            episodes: defaults.episodes,
            max_steps_per_episode: defaults.max_steps_per_episode,
            save_every: defaults.save_every,
            move_delay_ms: 0,
            episode_pause_ms: 0,
        }
    }
}

impl RunConfig {
    /// Read a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {}", path.display()),
            source,
        })?;
        let config: Self = serde_json::from_reader(file)?;
        config.agent.validate()?;
        Ok(config)
    }

    /// Training settings with the pauses turned into durations.
    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            episodes: self.training.episodes,
            seed: self.seed,
            max_steps_per_episode: self.training.max_steps_per_episode,
            save_every: self.training.save_every,
            table_path: self.table.clone(),
            move_delay: millis(self.training.move_delay_ms),
            episode_pause: millis(self.training.episode_pause_ms),
        }
    }
}

pub(crate) fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("run.json");
        std::fs::write(
            &path,
            r#"{ "seed": 7, "agent": { "epsilon": 0.3 }, "training": { "episode_pause_ms": 2000 } }"#,
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.agent.epsilon, 0.3);
        assert_eq!(config.agent.learning_rate, 0.1);

        let training = config.training_config();
        assert_eq!(training.episodes, TrainingConfig::default().episodes);
        assert_eq!(training.seed, Some(7));
        assert_eq!(training.move_delay, None);
        assert_eq!(training.episode_pause, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_invalid_hyperparameters_are_rejected() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{ "agent": { "learning_rate": 0.0 } }"#).unwrap();
        assert!(matches!(
            RunConfig::load(&path),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{ "episodes": 5 }"#).unwrap();
        assert!(matches!(RunConfig::load(&path), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_misspelled_agent_field_is_rejected() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{ "agent": { "alpha": 0.3 } }"#).unwrap();
        assert!(matches!(RunConfig::load(&path), Err(Error::Serialization(_))));
    }
}
