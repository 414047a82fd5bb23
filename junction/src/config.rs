//! Configuration of a run.
use anyhow::Result;
use junction_core::{ControlLoopConfig, ControllerConfig};
use junction_q_agent::QAgentConfig;
use junction_sim::SyntheticSimConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of the agent, the loop, the controller and the simulator.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct JunctionConfig {
    /// Configuration of the Q-learning agent.
    pub agent: QAgentConfig,

    /// Configuration of the control loop.
    pub control_loop: ControlLoopConfig,

    /// Configuration of the signal controller.
    ///
    /// When its topology is empty, the topology of the simulator lanes is used.
    pub controller: ControllerConfig,

    /// Configuration of the synthetic simulator.
    pub simulator: SyntheticSimConfig,
}

impl Default for JunctionConfig {
    fn default() -> Self {
        let simulator = SyntheticSimConfig::default();
        Self {
            agent: QAgentConfig::default(),
            control_loop: ControlLoopConfig::default(),
            controller: ControllerConfig::default().topology(simulator.topology()),
            simulator,
        }
    }
}

impl JunctionConfig {
    /// Sets the number of ticks of a run.
    pub fn step_budget(mut self, v: usize) -> Self {
        self.control_loop.step_budget = v;
        self
    }

    /// Controller configuration with the topology filled in from the simulator.
    pub fn controller_config(&self) -> ControllerConfig {
        match self.controller.topology.is_empty() {
            true => self.controller.clone().topology(self.simulator.topology()),
            false => self.controller.clone(),
        }
    }

    /// Constructs [`JunctionConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`JunctionConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
