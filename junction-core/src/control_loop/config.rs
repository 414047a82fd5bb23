//! Configuration of [`ControlLoop`](super::ControlLoop).
use crate::error::JunctionError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ControlLoop`](super::ControlLoop).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ControlLoopConfig {
    /// The number of ticks of a run.
    pub step_budget: usize,

    /// Interval of storing per-tick records, in ticks.
    pub record_interval: usize,

    /// Interval of flushing stored records, in ticks.
    pub flush_interval: usize,
}

impl Default for ControlLoopConfig {
    fn default() -> Self {
        Self {
            step_budget: 1000,
            record_interval: 1,
            flush_interval: 100,
        }
    }
}

impl ControlLoopConfig {
    /// Sets the number of ticks of a run.
    pub fn step_budget(mut self, v: usize) -> Self {
        self.step_budget = v;
        self
    }

    /// Sets the interval of storing per-tick records.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Sets the interval of flushing records.
    pub fn flush_interval(mut self, v: usize) -> Self {
        self.flush_interval = v;
        self
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), JunctionError> {
        if self.step_budget == 0 {
            return Err(JunctionError::ConfigurationError(
                "step_budget must be positive".to_string(),
            ));
        }
        if self.record_interval == 0 || self.flush_interval == 0 {
            return Err(JunctionError::ConfigurationError(
                "record_interval and flush_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Constructs [`ControlLoopConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ControlLoopConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
