//! Agent.
use super::{Policy, Transition};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a policy that learns online from observed transitions.
pub trait Agent: Policy {
    /// Number of rows of the value estimate, i.e., the size of the state index range.
    fn state_size(&self) -> usize;

    /// Updates the policy from a single transition.
    fn learn(&mut self, transition: &Transition) {
        let _ = self.learn_with_record(transition);
    }

    /// Updates the policy from a single transition and returns some information.
    fn learn_with_record(&mut self, transition: &Transition) -> Record;

    /// Saves the parameters of the agent in the given file.
    fn save_params(&self, path: &Path) -> Result<()>;
}
