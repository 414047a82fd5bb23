#![warn(missing_docs)]
//! Core of the adaptive signal-control decision loop.
//!
//! The crate defines the data sensed from a traffic simulator
//! ([`TrafficObservation`]), the traits at the boundaries of the loop
//! ([`Simulator`], [`Policy`], [`Agent`]) and the pieces wiring them
//! together: [`StateAggregator`], [`SignalController`] and [`ControlLoop`].
//! A learning agent is provided by a separate crate.
pub mod error;
pub mod record;
pub mod dummy;

mod base;
pub use base::{
    Agent, CommandCause, LaneGroup, Phase, PhaseCommand, Policy, Simulator, State,
    TrafficObservation, Transition, VehicleDirective, VehicleKind, VehicleSample,
};

mod aggregator;
pub use aggregator::StateAggregator;

pub mod controller;
pub use controller::{ControllerConfig, SignalController, Topology};

mod reward;
pub use reward::congestion_reward;

mod metrics;
pub use metrics::{EpisodeMetrics, MetricsSummary};

mod control_loop;
pub use control_loop::{ControlLoop, ControlLoopConfig, LoopStatus, RunAborted, StopHandle};
