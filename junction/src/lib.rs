//! Runs the adaptive signal controller on the synthetic simulator.
//!
//! A run wires a [`QLearningAgent`](junction_q_agent::QLearningAgent), a
//! [`SignalController`](junction_core::SignalController) and a
//! [`SyntheticSimulator`](junction_sim::SyntheticSimulator) into a
//! [`ControlLoop`](junction_core::ControlLoop). Independent runs with
//! different seeds can be executed on separate threads.
mod config;
mod recorder;
mod runner;
pub use config::JunctionConfig;
pub use recorder::LogRecorder;
pub use runner::{run, run_parallel, RunOptions, RunReport};
