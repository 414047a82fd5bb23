//! Action-value table.
use super::explorer::argmax;
use serde::{Deserialize, Serialize};

/// Dense table of action values, one row per state index.
///
/// Dimensions are fixed at construction. Accessing a state or an action
/// outside them panics.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ValueTable {
    n_states: usize,
    n_actions: usize,
    values: Vec<f64>,
}

impl ValueTable {
    /// Constructs a table filled with zeros.
    pub fn zeros(n_states: usize, n_actions: usize) -> Self {
        Self {
            n_states,
            n_actions,
            values: vec![0.0; n_states * n_actions],
        }
    }

    /// Number of rows.
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Number of columns.
    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Action values of a state.
    pub fn row(&self, state: usize) -> &[f64] {
        assert!(
            state < self.n_states,
            "state index {} out of range [0, {})",
            state,
            self.n_states
        );
        let start = state * self.n_actions;
        &self.values[start..start + self.n_actions]
    }

    /// Value of an action in a state.
    pub fn get(&self, state: usize, action: usize) -> f64 {
        assert!(
            action < self.n_actions,
            "action index {} out of range [0, {})",
            action,
            self.n_actions
        );
        self.row(state)[action]
    }

    /// Largest action value of a state.
    pub fn max(&self, state: usize) -> f64 {
        let row = self.row(state);
        row[argmax(row)]
    }

    /// Action with the largest value, the lowest index among ties.
    pub fn best_action(&self, state: usize) -> usize {
        argmax(self.row(state))
    }

    pub(super) fn add(&mut self, state: usize, action: usize, delta: f64) {
        assert!(
            state < self.n_states && action < self.n_actions,
            "entry ({}, {}) out of range [0, {}) x [0, {})",
            state,
            action,
            self.n_states,
            self.n_actions
        );
        self.values[state * self.n_actions + action] += delta;
    }

    /// Returns `true` if the stored values match the dimensions.
    pub(super) fn is_consistent(&self) -> bool {
        self.values.len() == self.n_states * self.n_actions
    }
}
