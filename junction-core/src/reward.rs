//! Reward of a tick.
use crate::State;

/// Congestion penalty: minus the number of vehicles standing in the network.
///
/// Only queues are penalised; throughput is not rewarded and emergency delay
/// has no separate term.
pub fn congestion_reward(next_state: &State) -> f64 {
    -(next_state.total_vehicles as f64)
}
