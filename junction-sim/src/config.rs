//! Configuration of [`SyntheticSimulator`](super::SyntheticSimulator).
use anyhow::Result;
use junction_core::{error::JunctionError, LaneGroup, Topology};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// A monitored lane.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct LaneSpec {
    /// Lane identifier.
    pub id: String,

    /// Junction the lane leads to.
    pub junction: String,

    /// Lane group the lane belongs to.
    pub group: LaneGroup,

    /// Probability of a vehicle arriving in a tick.
    pub arrival_rate: f64,

    /// Number of vehicles leaving the queue per tick on green.
    pub discharge: usize,

    /// Speed limit of the lane, in m/s.
    pub max_speed: f64,

    /// Whether vehicles can move aside to a neighbouring lane.
    pub has_adjacent_lane: bool,
}

impl LaneSpec {
    /// Constructs a lane with default rates.
    pub fn new(id: impl Into<String>, junction: impl Into<String>, group: LaneGroup) -> Self {
        Self {
            id: id.into(),
            junction: junction.into(),
            group,
            arrival_rate: 0.3,
            discharge: 1,
            max_speed: 13.9,
            has_adjacent_lane: true,
        }
    }

    /// Sets the arrival rate.
    pub fn arrival_rate(mut self, v: f64) -> Self {
        self.arrival_rate = v;
        self
    }

    /// Sets the discharge per green tick.
    pub fn discharge(mut self, v: usize) -> Self {
        self.discharge = v;
        self
    }

    /// Sets the speed limit.
    pub fn max_speed(mut self, v: f64) -> Self {
        self.max_speed = v;
        self
    }

    /// Sets whether a neighbouring lane exists.
    pub fn has_adjacent_lane(mut self, v: bool) -> Self {
        self.has_adjacent_lane = v;
        self
    }
}

/// Configuration of [`SyntheticSimulator`](super::SyntheticSimulator).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SyntheticSimConfig {
    /// Monitored lanes.
    pub lanes: Vec<LaneSpec>,

    /// Probability of an arriving vehicle being an emergency vehicle.
    pub emergency_rate: f64,

    /// Maximum speed of emergency vehicles, in m/s.
    pub emergency_max_speed: f64,

    /// The connection is lost on this call of `advance()`, counted from 1.
    #[serde(default)]
    pub fail_at: Option<usize>,
}

impl Default for SyntheticSimConfig {
    /// Two junctions: `J1` fed by `-E1` and `-E6`, `J2` fed by `E0`, `E1` and `E6`.
    fn default() -> Self {
        Self {
            lanes: vec![
                LaneSpec::new("-E1", "J1", LaneGroup::Main),
                LaneSpec::new("-E6", "J1", LaneGroup::Side)
                    .arrival_rate(0.15)
                    .has_adjacent_lane(false),
                LaneSpec::new("E0", "J2", LaneGroup::Main),
                LaneSpec::new("E1", "J2", LaneGroup::Main),
                LaneSpec::new("E6", "J2", LaneGroup::Side)
                    .arrival_rate(0.15)
                    .has_adjacent_lane(false),
            ],
            emergency_rate: 0.02,
            emergency_max_speed: 20.0,
            fail_at: None,
        }
    }
}

impl SyntheticSimConfig {
    /// Sets the monitored lanes.
    pub fn lanes(mut self, v: Vec<LaneSpec>) -> Self {
        self.lanes = v;
        self
    }

    /// Sets the probability of an arrival being an emergency vehicle.
    pub fn emergency_rate(mut self, v: f64) -> Self {
        self.emergency_rate = v;
        self
    }

    /// Loses the connection on the given call of `advance()`.
    pub fn fail_at(mut self, v: Option<usize>) -> Self {
        self.fail_at = v;
        self
    }

    /// The lane-to-junction bindings of the configured lanes.
    pub fn topology(&self) -> Topology {
        self.lanes
            .iter()
            .fold(Topology::default(), |t, lane| t.lane(lane.id.clone(), lane.junction.clone(), lane.group))
    }

    pub(super) fn validate(&self) -> Result<(), JunctionError> {
        let rate_ok = |v: f64| (0.0..=1.0).contains(&v);
        if !rate_ok(self.emergency_rate) {
            return Err(JunctionError::ConfigurationError(format!(
                "emergency_rate must be in [0, 1], got {}",
                self.emergency_rate
            )));
        }
        for lane in self.lanes.iter() {
            if !rate_ok(lane.arrival_rate) {
                return Err(JunctionError::ConfigurationError(format!(
                    "arrival_rate of lane {} must be in [0, 1], got {}",
                    lane.id, lane.arrival_rate
                )));
            }
        }
        Ok(())
    }

    /// Constructs [`SyntheticSimConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SyntheticSimConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_default_topology() {
        let topology = SyntheticSimConfig::default().topology();
        assert_eq!(topology.junctions(), vec!["J1".to_string(), "J2".to_string()]);
        assert_eq!(topology.junction_of("-E6"), Some("J1"));
        assert_eq!(topology.junction_of("E6"), Some("J2"));
        assert_eq!(topology.group_of("E6"), LaneGroup::Side);
    }

    #[test]
    fn test_serde_synthetic_sim_config() -> Result<()> {
        let config = SyntheticSimConfig::default().emergency_rate(0.1).fail_at(Some(30));
        let dir = TempDir::new("synthetic_sim_config")?;
        let path = dir.path().join("sim.yaml");
        config.save(&path)?;
        assert_eq!(SyntheticSimConfig::load(&path)?, config);
        Ok(())
    }
}
