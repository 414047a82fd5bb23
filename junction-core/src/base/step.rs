//! Decision step.
use super::Phase;
use serde::{Deserialize, Serialize};

/// Aggregated traffic state used as the index of the value estimate.
///
/// The raw components are totals over all monitored lanes. `index` is the
/// table row, always in `[0, state_size)` of the aggregator that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub struct State {
    /// Total number of vehicles across monitored lanes.
    pub total_vehicles: usize,

    /// Total number of emergency vehicles across monitored lanes.
    pub total_emergency: usize,

    /// Row of the value table.
    pub index: usize,
}

impl State {
    /// Constructs a state.
    pub fn new(total_vehicles: usize, total_emergency: usize, index: usize) -> Self {
        Self {
            total_vehicles,
            total_emergency,
            index,
        }
    }
}

/// Represents a transition `(s_t, a_t, r_t, s_t+1)`.
///
/// Constructed and consumed within one tick of the control loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// State in which the action was chosen.
    pub state: State,

    /// Chosen action.
    pub action: Phase,

    /// Reward.
    pub reward: f64,

    /// State after the command was applied.
    pub next_state: State,
}

impl Transition {
    /// Constructs a [`Transition`].
    pub fn new(state: State, action: Phase, reward: f64, next_state: State) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
        }
    }
}
