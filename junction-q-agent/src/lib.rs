#![warn(missing_docs)]
//! Tabular Q-learning agent choosing signal phases.
//!
//! [`QLearningAgent`] keeps one row of action values per aggregated traffic
//! state and explores with an epsilon-greedy schedule decayed after every
//! update.
pub mod q_learning;
pub use q_learning::{EpsilonGreedy, QAgentConfig, QLearningAgent, ValueTable};
