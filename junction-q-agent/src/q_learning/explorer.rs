//! Exploration schedule of the Q-learning agent.
use junction_core::error::JunctionError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy explorer with a multiplicative decay.
///
/// After `n` updates the exploration rate is
/// `max(eps_final, eps_start * eps_decay^n)`, so it never rises.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Initial exploration rate.
    pub eps_start: f64,

    /// Factor applied to the rate after each update.
    pub eps_decay: f64,

    /// Lower bound of the rate.
    pub eps_final: f64,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self::new()
    }
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new() -> Self {
        Self {
            eps_start: 0.5,
            eps_decay: 0.99,
            eps_final: 0.01,
        }
    }

    /// Set the epsilon value at the start.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps_start = v;
        self
    }

    /// Set the decay factor applied after each update.
    pub fn eps_decay(mut self, v: f64) -> Self {
        self.eps_decay = v;
        self
    }

    /// Set the lower bound of epsilon.
    pub fn eps_final(mut self, v: f64) -> Self {
        self.eps_final = v;
        self
    }

    pub(super) fn validate(&self) -> Result<(), JunctionError> {
        if !(0.0..=1.0).contains(&self.eps_start) {
            return Err(JunctionError::ConfigurationError(format!(
                "eps_start must be in [0, 1], got {}",
                self.eps_start
            )));
        }
        if !(self.eps_decay > 0.0 && self.eps_decay <= 1.0) {
            return Err(JunctionError::ConfigurationError(format!(
                "eps_decay must be in (0, 1], got {}",
                self.eps_decay
            )));
        }
        if !(0.0..=self.eps_start).contains(&self.eps_final) {
            return Err(JunctionError::ConfigurationError(format!(
                "eps_final must be in [0, eps_start], got {}",
                self.eps_final
            )));
        }
        Ok(())
    }

    /// Epsilon after `n` updates starting from `base`.
    pub fn eps(&self, base: f64, n: usize) -> f64 {
        let n = n.min(i32::MAX as usize) as i32;
        (base * self.eps_decay.powi(n)).max(self.eps_final)
    }

    /// Takes an action index based on the action values of a state.
    ///
    /// * `values` - action values, one per action.
    pub fn action(&self, eps: f64, values: &[f64], rng: &mut impl Rng) -> usize {
        if rng.gen::<f64>() < eps {
            rng.gen_range(0..values.len())
        } else {
            argmax(values)
        }
    }
}

/// Index of the largest value, the lowest index among ties.
pub(super) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
