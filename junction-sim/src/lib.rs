#![warn(missing_docs)]
//! A synthetic traffic simulator implementing [`junction_core::Simulator`].
//!
//! Each monitored lane is a queue in front of a signalised junction.
//! Vehicles arrive at random, wait while the junction shows red to their
//! lane group and are discharged a few per tick while it shows green.
//! It stands in for an external microscopic simulator when running the
//! control loop offline.
mod base;
mod config;
pub use base::SyntheticSimulator;
pub use config::{LaneSpec, SyntheticSimConfig};
