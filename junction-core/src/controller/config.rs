//! Configuration of [`SignalController`](super::SignalController).
use super::Topology;
use crate::error::JunctionError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`SignalController`](super::SignalController).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ControllerConfig {
    /// Lanes, junctions and approach groups under control.
    pub topology: Topology,

    /// Lane offset requested from vehicles obstructing an emergency vehicle.
    pub lane_change_offset: i32,

    /// Duration in seconds of the requested lane change.
    pub lane_change_duration: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            topology: Topology::default(),
            lane_change_offset: 1,
            lane_change_duration: 25.0,
        }
    }
}

impl ControllerConfig {
    /// Sets the topology.
    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Sets the lane offset of lane-change requests.
    pub fn lane_change_offset(mut self, v: i32) -> Self {
        self.lane_change_offset = v;
        self
    }

    /// Sets the duration of lane-change requests.
    pub fn lane_change_duration(mut self, v: f64) -> Self {
        self.lane_change_duration = v;
        self
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), JunctionError> {
        if self.topology.is_empty() {
            return Err(JunctionError::ConfigurationError(
                "topology must map at least one lane".to_string(),
            ));
        }
        if !(self.lane_change_duration > 0.0) {
            return Err(JunctionError::ConfigurationError(format!(
                "lane_change_duration must be positive, got {}",
                self.lane_change_duration
            )));
        }
        Ok(())
    }

    /// Constructs [`ControllerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ControllerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
