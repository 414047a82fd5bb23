//! Simulator.
use super::{PhaseCommand, TrafficObservation};
use crate::error::JunctionError;

/// The external traffic simulator, reached only through sensing and actuation calls.
///
/// All calls are synchronous; a call either completes within the tick or fails.
/// [`JunctionError::SimulatorUnavailable`] from any method is fatal to the run,
/// while [`JunctionError::DirectiveRejected`] from the vehicle-level methods is not.
pub trait Simulator {
    /// Connection parameters.
    type Config: Clone;

    /// Connects to a simulator with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self, JunctionError>
    where
        Self: Sized;

    /// Advances simulated time by one unit.
    fn advance(&mut self) -> Result<(), JunctionError>;

    /// Identifiers of the monitored lanes, in a stable order.
    fn monitored_lanes(&self) -> Vec<String>;

    /// Reads the sensors of a lane.
    fn observe(&mut self, lane_id: &str) -> Result<TrafficObservation, JunctionError>;

    /// Sets the signal state of a junction.
    ///
    /// Best-effort: the caller does not verify the state was applied
    /// beyond the call returning `Ok`.
    fn set_signal_phase(&mut self, junction_id: &str, command: &PhaseCommand) -> Result<(), JunctionError>;

    /// Sets the speed of a vehicle.
    fn set_vehicle_speed(&mut self, vehicle_id: &str, speed: f64) -> Result<(), JunctionError>;

    /// Requests a vehicle to change lane by `lane_offset` within `duration` seconds.
    fn request_lane_change(
        &mut self,
        vehicle_id: &str,
        lane_offset: i32,
        duration: f64,
    ) -> Result<(), JunctionError>;

    /// Closes the connection. Called once when the control loop stops.
    fn close(&mut self) {}

    /// Reads the sensors of all monitored lanes.
    fn observe_all(&mut self) -> Result<Vec<TrafficObservation>, JunctionError> {
        self.monitored_lanes()
            .iter()
            .map(|lane_id| self.observe(lane_id))
            .collect()
    }
}
