//! Core functionalities.
mod agent;
mod observation;
mod phase;
mod policy;
mod simulator;
mod step;
pub use agent::Agent;
pub use observation::{TrafficObservation, VehicleKind, VehicleSample};
pub use phase::{CommandCause, LaneGroup, Phase, PhaseCommand, VehicleDirective};
pub use policy::Policy;
pub use simulator::Simulator;
pub use step::{State, Transition};
