//! Q-learning agent.
mod base;
mod config;
pub mod explorer;
mod table;
pub use base::QLearningAgent;
pub use config::QAgentConfig;
pub use explorer::EpsilonGreedy;
pub use table::ValueTable;
