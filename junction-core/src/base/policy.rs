//! Policy.
use super::{Phase, State};

/// A policy on the signal phases.
///
/// Policy is a mapping from an aggregated state to a phase.
/// The mapping can be either of deterministic or stochastic.
pub trait Policy {
    /// Chooses a phase given a state.
    fn choose_action(&mut self, state: &State) -> Phase;
}
