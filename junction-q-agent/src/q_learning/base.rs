//! Tabular Q-learning agent.
use super::{config::QAgentConfig, explorer::EpsilonGreedy, ValueTable};
use anyhow::Result;
use junction_core::{
    error::JunctionError,
    record::{Record, RecordValue},
    Agent, Phase, Policy, State, Transition,
};
use log::info;
use rand::{rngs::SmallRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::Path,
};

/// Parameters written by [`Agent::save_params`].
#[derive(Debug, Deserialize, Serialize)]
struct Params {
    action_set: Vec<Phase>,
    exploration_rate: f64,
    table: ValueTable,
}

/// Tabular Q-learning agent.
///
/// The table and the exploration rate change only in
/// [`Agent::learn_with_record`]. Choosing an action consumes randomness but
/// does not modify either.
pub struct QLearningAgent {
    learning_rate: f64,
    discount_factor: f64,
    explorer: EpsilonGreedy,
    /// Exploration rate before the first update.
    base_rate: f64,
    action_set: Vec<Phase>,
    table: ValueTable,
    n_updates: usize,
    rng: SmallRng,
}

impl QLearningAgent {
    /// Constructs an agent with a zero table.
    pub fn build(config: QAgentConfig) -> Result<Self, JunctionError> {
        config.validate()?;
        let table = ValueTable::zeros(config.state_size, config.action_set.len());
        info!(
            "Q-learning agent with {} states and {} actions",
            table.n_states(),
            table.n_actions()
        );
        Ok(Self {
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
            base_rate: config.explorer.eps_start,
            explorer: config.explorer,
            action_set: config.action_set,
            table,
            n_updates: 0,
            rng: SmallRng::seed_from_u64(config.seed),
        })
    }

    /// Constructs an agent from parameters saved with [`Agent::save_params`].
    ///
    /// Fails if the saved table or action set does not match `config`.
    pub fn from_params(config: QAgentConfig, path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(&path)?;
        let params: Params = bincode::deserialize_from(BufReader::new(file))?;

        let mut agent = Self::build(config)?;
        if !params.table.is_consistent()
            || params.table.n_states() != agent.table.n_states()
            || params.action_set != agent.action_set
        {
            return Err(JunctionError::ConfigurationError(format!(
                "saved parameters ({} states, actions {:?}) do not match the configuration ({} states, actions {:?})",
                params.table.n_states(),
                params.action_set,
                agent.table.n_states(),
                agent.action_set
            ))
            .into());
        }
        if !(agent.explorer.eps_final..=1.0).contains(&params.exploration_rate) {
            return Err(JunctionError::ConfigurationError(format!(
                "saved exploration rate {} is outside [{}, 1]",
                params.exploration_rate, agent.explorer.eps_final
            ))
            .into());
        }

        agent.table = params.table;
        agent.base_rate = params.exploration_rate;
        info!("Loaded parameters from {:?}", path.as_ref());
        Ok(agent)
    }

    /// Current exploration rate.
    pub fn exploration_rate(&self) -> f64 {
        self.explorer.eps(self.base_rate, self.n_updates)
    }

    /// Number of updates so far.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    /// The value table.
    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    /// Value of an action in a state.
    ///
    /// Panics if `action` is not in the action set.
    pub fn value(&self, state: &State, action: Phase) -> f64 {
        self.table.get(state.index, self.action_index(action))
    }

    fn action_index(&self, action: Phase) -> usize {
        match self.action_set.iter().position(|a| *a == action) {
            Some(ix) => ix,
            None => panic!("{:?} is not in the action set {:?}", action, self.action_set),
        }
    }
}

impl Policy for QLearningAgent {
    fn choose_action(&mut self, state: &State) -> Phase {
        let eps = self.exploration_rate();
        let ix = self
            .explorer
            .action(eps, self.table.row(state.index), &mut self.rng);
        self.action_set[ix]
    }
}

impl Agent for QLearningAgent {
    fn state_size(&self) -> usize {
        self.table.n_states()
    }

    /// Performs the temporal-difference update
    /// `Q[s, a] += α (r + γ max_a' Q[s', a'] - Q[s, a])`, then decays the
    /// exploration rate.
    fn learn_with_record(&mut self, transition: &Transition) -> Record {
        let s = transition.state.index;
        let a = self.action_index(transition.action);

        let target = transition.reward + self.discount_factor * self.table.max(transition.next_state.index);
        let td_error = target - self.table.get(s, a);
        self.table.add(s, a, self.learning_rate * td_error);

        self.n_updates += 1;

        Record::from_slice(&[
            ("td_error", RecordValue::Scalar(td_error as _)),
            ("exploration_rate", RecordValue::Scalar(self.exploration_rate() as _)),
        ])
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let params = Params {
            action_set: self.action_set.clone(),
            exploration_rate: self.exploration_rate(),
            table: self.table.clone(),
        };
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), &params)?;
        info!("Saved parameters in {:?}", path);
        Ok(())
    }
}
