//! Emergency-aware translation of agent actions into signal commands.
mod config;
mod topology;
pub use config::ControllerConfig;
pub use topology::{LaneBinding, Topology};

use crate::{
    error::JunctionError, CommandCause, LaneGroup, Phase, PhaseCommand, Simulator,
    TrafficObservation, VehicleDirective,
};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Decides the phase applied at the controlled junctions.
///
/// Rules are evaluated in a fixed order and the first match wins:
///
/// 1. Emergency override. If any lane reports an emergency vehicle, the green
///    phase of the lane group holding the emergency vehicles is forced,
///    whatever the agent chose. Emergency vehicles are sped up to their
///    maximum speed and regular vehicles on their lanes are asked to change lane.
/// 2. No traffic. If no vehicle is present, the free-flow phase
///    [`Phase::AllGreen`] is applied.
/// 3. Otherwise the agent's choice stands.
#[derive(Debug, Clone)]
pub struct SignalController {
    topology: Topology,
    lane_change_offset: i32,
    lane_change_duration: f64,
}

impl SignalController {
    /// Constructs a controller.
    pub fn build(config: ControllerConfig) -> Result<Self, JunctionError> {
        config.validate()?;
        Ok(Self {
            topology: config.topology,
            lane_change_offset: config.lane_change_offset,
            lane_change_duration: config.lane_change_duration,
        })
    }

    /// The topology under control.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Decides the command for a tick.
    pub fn decide(&self, chosen: Phase, observations: &[TrafficObservation]) -> PhaseCommand {
        if let Some(command) = self.emergency_override(observations) {
            return command;
        }

        if observations.iter().all(|obs| obs.vehicle_count() == 0) {
            return PhaseCommand::new(Phase::AllGreen, CommandCause::FreeFlow);
        }

        PhaseCommand::new(chosen, CommandCause::Policy)
    }

    fn emergency_override(&self, observations: &[TrafficObservation]) -> Option<PhaseCommand> {
        let lanes: Vec<&TrafficObservation> =
            observations.iter().filter(|obs| obs.has_emergency()).collect();
        if lanes.is_empty() {
            return None;
        }

        // Group with most emergency vehicles; ties go to the main road.
        let mut per_group = BTreeMap::<LaneGroup, usize>::new();
        for obs in lanes.iter() {
            *per_group.entry(self.topology.group_of(obs.lane_id())).or_default() +=
                obs.emergency_vehicle_count();
        }
        let mut group = LaneGroup::Main;
        let mut most = 0;
        for (g, n) in per_group {
            if n > most {
                group = g;
                most = n;
            }
        }

        let mut directives = vec![];
        for obs in lanes.iter() {
            let mut sampled = 0;
            for v in obs.vehicles().iter().filter(|v| v.is_emergency()) {
                sampled += 1;
                directives.push(VehicleDirective::RaiseSpeed {
                    vehicle_id: v.id.clone(),
                    speed: v.max_speed,
                });
            }
            if obs.emergency_vehicle_count() > sampled {
                warn!(
                    "Lane {}: {} emergency vehicles reported without vehicle samples, speed directive cannot be issued",
                    obs.lane_id(),
                    obs.emergency_vehicle_count() - sampled
                );
            }
            for v in obs.vehicles().iter().filter(|v| !v.is_emergency()) {
                directives.push(VehicleDirective::ChangeLane {
                    vehicle_id: v.id.clone(),
                    lane_offset: self.lane_change_offset,
                    duration: self.lane_change_duration,
                });
            }
        }

        let cause = CommandCause::EmergencyOverride {
            group,
            lanes: lanes.iter().map(|obs| obs.lane_id().to_string()).collect(),
        };
        Some(PhaseCommand::new(Phase::green_for(group), cause).with_directives(directives))
    }

    /// Applies a command to every controlled junction, then issues its directives.
    ///
    /// Rejected directives are logged and skipped. Returns the number of
    /// rejected directives; fatal simulator errors are returned as `Err`.
    pub fn apply<S: Simulator>(
        &self,
        simulator: &mut S,
        command: &PhaseCommand,
    ) -> Result<usize, JunctionError> {
        for junction in self.topology.junctions() {
            match simulator.set_signal_phase(&junction, command) {
                Ok(()) => debug!(
                    "Junction {}: {} ({}, {})",
                    junction,
                    command.signal_state,
                    command.phase,
                    command.cause.label()
                ),
                Err(e) if !e.is_fatal() => warn!("Junction {}: {}", junction, e),
                Err(e) => return Err(e),
            }
        }

        if let CommandCause::EmergencyOverride { group, lanes } = &command.cause {
            info!("Emergency vehicles on {:?}, right-of-way to {:?}", lanes, group);
        }

        let mut rejected = 0;
        for directive in command.directives.iter() {
            let result = match directive {
                VehicleDirective::RaiseSpeed { vehicle_id, speed } => {
                    simulator.set_vehicle_speed(vehicle_id, *speed)
                }
                VehicleDirective::ChangeLane {
                    vehicle_id,
                    lane_offset,
                    duration,
                } => simulator.request_lane_change(vehicle_id, *lane_offset, *duration),
            };
            match result {
                Ok(()) => debug!("Directive applied: {:?}", directive),
                Err(e) if !e.is_fatal() => {
                    warn!("Vehicle {} could not follow directive: {}", directive.vehicle_id(), e);
                    rejected += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(rejected)
    }
}
