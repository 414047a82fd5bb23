//! Configuration of the Q-learning agent.
use super::EpsilonGreedy;
use anyhow::Result;
use junction_core::{error::JunctionError, Phase};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Constructs [`QLearningAgent`](super::QLearningAgent).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct QAgentConfig {
    /// Step size of the temporal-difference update, in `(0, 1]`.
    pub learning_rate: f64,

    /// Discount factor of future rewards, in `(0, 1]`.
    pub discount_factor: f64,

    /// Exploration schedule.
    pub explorer: EpsilonGreedy,

    /// Number of rows of the value table.
    pub state_size: usize,

    /// Phases the agent chooses from, in column order.
    pub action_set: Vec<Phase>,

    /// Seed of the exploration random number generator.
    #[serde(default)]
    pub seed: u64,
}

impl Default for QAgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            explorer: EpsilonGreedy::default(),
            state_size: 100,
            action_set: Phase::DEFAULT_ACTIONS.to_vec(),
            seed: 42,
        }
    }
}

impl QAgentConfig {
    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f64) -> Self {
        self.learning_rate = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the exploration schedule.
    pub fn explorer(mut self, v: EpsilonGreedy) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the number of states.
    pub fn state_size(mut self, v: usize) -> Self {
        self.state_size = v;
        self
    }

    /// Sets the action set.
    pub fn action_set(mut self, v: Vec<Phase>) -> Self {
        self.action_set = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Checks the hyperparameters.
    pub fn validate(&self) -> Result<(), JunctionError> {
        for (name, v) in [
            ("learning_rate", self.learning_rate),
            ("discount_factor", self.discount_factor),
        ]
        .iter()
        {
            if !(*v > 0.0 && *v <= 1.0) {
                return Err(JunctionError::ConfigurationError(format!(
                    "{} must be in (0, 1], got {}",
                    name, v
                )));
            }
        }
        self.explorer.validate()?;
        if self.state_size == 0 {
            return Err(JunctionError::ConfigurationError(
                "state_size must be positive".to_string(),
            ));
        }
        if self.action_set.is_empty() {
            return Err(JunctionError::ConfigurationError(
                "action_set must not be empty".to_string(),
            ));
        }
        let unique: HashSet<&Phase> = self.action_set.iter().collect();
        if unique.len() != self.action_set.len() {
            return Err(JunctionError::ConfigurationError(format!(
                "action_set contains duplicates: {:?}",
                self.action_set
            )));
        }
        Ok(())
    }

    /// Constructs [`QAgentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`QAgentConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
