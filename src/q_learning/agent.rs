//! Q-learning agent
//!
//! Tabular off-policy TD control: ε-greedy action selection over a lazily
//! grown [`QTable`] and a one-step Bellman backup per transition.

use std::path::Path;

use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Result,
    game::{Board, Direction, session::build_rng},
    ports::Learner,
    q_learning::{
        hyperparameters::{HyperparameterUpdate, Hyperparameters},
        q_table::{QTable, greedy_direction, max_value},
    },
    types::{ActionValues, encode},
};

/// Q-learning agent (off-policy TD control)
///
/// Learns toward `reward + γ · max Q(s', ·)` regardless of which action is
/// taken next.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    table: QTable,
    params: Hyperparameters,
    initial_epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
    updates: u64,
}

impl QLearningAgent {
    /// Create an agent with an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if any hyperparameter is
    /// out of range.
    pub fn new(params: Hyperparameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            table: QTable::new(),
            params,
            initial_epsilon: params.epsilon,
            rng: build_rng(None),
            rng_seed: None,
            updates: 0,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_table(mut self, table: QTable) -> Self {
        self.table = table;
        self
    }

    /// ε-greedy choice for `board`.
    ///
    /// Explores with probability ε (its current value), otherwise exploits the
    /// table, inserting a zero row for a state seen for the first time. Ties
    /// resolve to the first direction in `Up, Down, Left, Right`.
    pub fn select_action(&mut self, board: &Board) -> Direction {
        if self.rng.random::<f64>() < self.params.epsilon {
            Direction::ALL[self.rng.random_range(0..Direction::COUNT)]
        } else {
            self.greedy_action(board)
        }
    }

    /// Exploit only.
    pub fn greedy_action(&mut self, board: &Board) -> Direction {
        greedy_direction(&self.table.get_or_init(encode(board)))
    }

    /// One Bellman backup for the transition `state --action--> next_state`,
    /// followed by one step of ε decay.
    pub fn update(&mut self, state: &Board, action: Direction, reward: f64, next_state: &Board) {
        let next_max = max_value(&self.table.get_or_init(encode(next_state)));
        let target = reward + self.params.discount_factor * next_max;

        let key = encode(state);
        let predicted = self.table.get_or_init(key)[action.index()];
        let value = predicted + self.params.learning_rate * (target - predicted);
        self.table.set(key, action, value);

        self.updates += 1;
        self.decay_epsilon();
    }

    fn decay_epsilon(&mut self) {
        self.params.epsilon =
            (self.params.epsilon * self.params.epsilon_decay).max(self.params.min_epsilon);
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.params.epsilon
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.params
    }

    /// Change α, γ and/or ε. Nothing changes if any new value is invalid.
    pub fn set_hyperparameters(&mut self, update: HyperparameterUpdate) -> Result<()> {
        let merged = self.params.merged(&update)?;
        if let Some(epsilon) = update.epsilon {
            self.initial_epsilon = epsilon;
        }
        self.params = merged;
        Ok(())
    }

    /// Stored row for `board`, if the state has been visited.
    pub fn action_values(&self, board: &Board) -> Option<ActionValues> {
        self.table.get(&encode(board)).copied()
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn replace_table(&mut self, table: QTable) {
        self.table = table;
    }

    /// Number of updates applied since creation or the last reset.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    /// Persist the table to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.table.save_to_file(path)?;
        info!(
            "Saved value table with {} states to {}",
            self.table.len(),
            path.display()
        );
        Ok(())
    }

    /// Replace the table with the one stored at `path`.
    ///
    /// Returns `Ok(false)` and starts from an empty table when no file exists.
    /// A corrupt or incompatible file is an error and leaves the table as it
    /// was.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<bool> {
        let path = path.as_ref();
        match QTable::load_from_file(path)? {
            Some(table) => {
                info!(
                    "Loaded value table with {} states from {}",
                    table.len(),
                    path.display()
                );
                self.table = table;
                Ok(true)
            }
            None => {
                info!("No value table at {}, starting fresh", path.display());
                self.table.clear();
                Ok(false)
            }
        }
    }

    /// Forget everything learned and restore the initial exploration rate.
    pub fn reset(&mut self) {
        self.table.clear();
        self.params.epsilon = self.initial_epsilon;
        self.updates = 0;
        self.rng = build_rng(self.rng_seed);
    }
}

impl Learner for QLearningAgent {
    fn select_action(&mut self, board: &Board) -> Result<Direction> {
        Ok(QLearningAgent::select_action(self, board))
    }

    fn update(
        &mut self,
        state: &Board,
        action: Direction,
        reward: f64,
        next_state: &Board,
    ) -> Result<()> {
        QLearningAgent::update(self, state, action, reward, next_state);
        Ok(())
    }

    fn name(&self) -> &str {
        "Q-learning"
    }

    fn reset(&mut self) -> Result<()> {
        QLearningAgent::reset(self);
        Ok(())
    }

    fn action_values(&self, board: &Board) -> Option<ActionValues> {
        QLearningAgent::action_values(self, board)
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        Ok(())
    }

    fn value_table(&self) -> Option<&QTable> {
        Some(&self.table)
    }

    fn replace_table(&mut self, table: QTable) -> bool {
        self.table = table;
        true
    }

    fn epsilon(&self) -> Option<f64> {
        Some(self.params.epsilon)
    }
}
