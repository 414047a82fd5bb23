//! Reduction of lane observations to the agent's state.
use crate::{error::JunctionError, State, TrafficObservation};

/// Reduces a set of [`TrafficObservation`]s to a [`State`].
///
/// The aggregator has no memory: identical observation sets yield identical
/// states. The state index is the total vehicle count clamped to
/// `[0, state_size - 1]`, so unexpectedly heavy traffic maps to the last row
/// instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateAggregator {
    state_size: usize,
}

impl StateAggregator {
    /// Constructs an aggregator producing indices in `[0, state_size)`.
    pub fn new(state_size: usize) -> Result<Self, JunctionError> {
        if state_size == 0 {
            return Err(JunctionError::ConfigurationError(
                "state_size must be positive".to_string(),
            ));
        }
        Ok(Self { state_size })
    }

    /// Size of the index range.
    pub fn state_size(&self) -> usize {
        self.state_size
    }

    /// Aggregates observations into a state.
    pub fn aggregate(&self, observations: &[TrafficObservation]) -> State {
        let (total_vehicles, total_emergency) =
            observations.iter().fold((0, 0), |(n, e), obs| {
                (n + obs.vehicle_count(), e + obs.emergency_vehicle_count())
            });
        let index = total_vehicles.min(self.state_size - 1);

        State::new(total_vehicles, total_emergency, index)
    }
}
