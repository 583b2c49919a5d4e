//! Configuration types for agent creation.

use serde::{Deserialize, Serialize};

use crate::q_learning::{HyperparameterUpdate, Hyperparameters};

/// Configuration for creating a Q-learning agent.
///
/// # Examples
///
/// ```
/// use tilemind::app::AgentConfig;
/// use tilemind::q_learning::Hyperparameters;
///
/// let config = AgentConfig::new(Hyperparameters::new(0.2, 0.95, 0.5))
///     .with_epsilon_decay(0.999, 0.05)
///     .with_seed(42);
/// assert_eq!(config.hyperparameters.min_epsilon, 0.05);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub hyperparameters: Hyperparameters,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn new(hyperparameters: Hyperparameters) -> Self {
        Self {
            hyperparameters,
            seed: None,
        }
    }

    /// Override α, γ and/or ε, leaving the rest as configured.
    pub fn with_overrides(mut self, update: HyperparameterUpdate) -> Self {
        let params = &mut self.hyperparameters;
        params.learning_rate = update.learning_rate.unwrap_or(params.learning_rate);
        params.discount_factor = update.discount_factor.unwrap_or(params.discount_factor);
        params.epsilon = update.epsilon.unwrap_or(params.epsilon);
        self
    }

    pub fn with_epsilon_decay(mut self, epsilon_decay: f64, min_epsilon: f64) -> Self {
        self.hyperparameters = self
            .hyperparameters
            .with_epsilon_decay(epsilon_decay, min_epsilon);
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
