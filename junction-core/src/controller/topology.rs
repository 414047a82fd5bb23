//! Lane-to-junction topology.
use crate::LaneGroup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a monitored lane enters the network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LaneBinding {
    /// Junction the lane feeds.
    pub junction: String,

    /// Approach group of the lane at that junction.
    pub group: LaneGroup,
}

/// Mapping from lanes to the junctions and approach groups they belong to.
///
/// Supplied as configuration so that the controller does not depend on a
/// particular road network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Topology {
    lanes: BTreeMap<String, LaneBinding>,
}

impl Topology {
    /// Adds a lane.
    pub fn lane(mut self, lane_id: impl Into<String>, junction: impl Into<String>, group: LaneGroup) -> Self {
        self.lanes.insert(
            lane_id.into(),
            LaneBinding {
                junction: junction.into(),
                group,
            },
        );
        self
    }

    /// Returns the binding of a lane, if the lane is part of the topology.
    pub fn binding(&self, lane_id: &str) -> Option<&LaneBinding> {
        self.lanes.get(lane_id)
    }

    /// Junction fed by a lane.
    pub fn junction_of(&self, lane_id: &str) -> Option<&str> {
        self.binding(lane_id).map(|b| b.junction.as_str())
    }

    /// Approach group of a lane. Lanes outside the topology count as [`LaneGroup::Main`].
    pub fn group_of(&self, lane_id: &str) -> LaneGroup {
        self.binding(lane_id)
            .map(|b| b.group)
            .unwrap_or(LaneGroup::Main)
    }

    /// Controlled junctions, sorted and without duplicates.
    pub fn junctions(&self) -> Vec<String> {
        let mut junctions: Vec<String> = self.lanes.values().map(|b| b.junction.clone()).collect();
        junctions.sort();
        junctions.dedup();
        junctions
    }

    /// Returns `true` if no lane is mapped.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Lanes in the topology.
    pub fn lanes(&self) -> impl Iterator<Item = &String> {
        self.lanes.keys()
    }
}
