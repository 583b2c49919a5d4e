//! Learning-rate, discount and exploration settings.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Hyperparameters for the Q-learning agent.
///
/// These are configuration, not learned state, and are never written into a
/// saved table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hyperparameters {
    /// α, step size of the Bellman backup, in (0, 1]
    pub learning_rate: f64,
    /// γ, weight of the best next-state value, in [0, 1]
    pub discount_factor: f64,
    /// ε, probability of a uniformly random action, in [0, 1]
    pub epsilon: f64,
    /// Multiplier applied to ε after every update, in (0, 1]
    pub epsilon_decay: f64,
    /// Floor for ε under decay, in [0, 1]
    pub min_epsilon: f64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            epsilon: 0.1,
            epsilon_decay: 1.0,
            min_epsilon: 0.1,
        }
    }
}

impl Hyperparameters {
    pub fn new(learning_rate: f64, discount_factor: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            discount_factor,
            epsilon,
            ..Self::default()
        }
    }

    pub fn with_epsilon_decay(mut self, epsilon_decay: f64, min_epsilon: f64) -> Self {
        self.epsilon_decay = epsilon_decay;
        self.min_epsilon = min_epsilon;
        self
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        check_range("learning_rate", self.learning_rate, false)?;
        check_range("discount_factor", self.discount_factor, true)?;
        check_range("epsilon", self.epsilon, true)?;
        check_range("epsilon_decay", self.epsilon_decay, false)?;
        check_range("min_epsilon", self.min_epsilon, true)?;
        Ok(())
    }

    /// Apply a partial update, returning the merged settings if they are valid.
    pub fn merged(&self, update: &HyperparameterUpdate) -> Result<Self> {
        let merged = Self {
            learning_rate: update.learning_rate.unwrap_or(self.learning_rate),
            discount_factor: update.discount_factor.unwrap_or(self.discount_factor),
            epsilon: update.epsilon.unwrap_or(self.epsilon),
            ..*self
        };
        merged.validate()?;
        Ok(merged)
    }
}

/// `[0, 1]` when `zero_allowed`, otherwise `(0, 1]`.
fn check_range(name: &str, value: f64, zero_allowed: bool) -> Result<()> {
    let lower_ok = if zero_allowed { value >= 0.0 } else { value > 0.0 };
    if value.is_finite() && lower_ok && value <= 1.0 {
        return Ok(());
    }
    let interval = if zero_allowed { "[0, 1]" } else { "(0, 1]" };
    Err(Error::InvalidConfiguration {
        message: format!("{name} must be in {interval}, got {value}"),
    })
}

/// Partial hyperparameter change; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterUpdate {
    pub learning_rate: Option<f64>,
    pub discount_factor: Option<f64>,
    pub epsilon: Option<f64>,
}

impl HyperparameterUpdate {
    pub fn learning_rate(mut self, value: f64) -> Self {
        self.learning_rate = Some(value);
        self
    }

    pub fn discount_factor(mut self, value: f64) -> Self {
        self.discount_factor = Some(value);
        self
    }

    pub fn epsilon(mut self, value: f64) -> Self {
        self.epsilon = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.learning_rate.is_none() && self.discount_factor.is_none() && self.epsilon.is_none()
    }
}
