//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JunctionError {
    /// The simulator connection was lost or never established.
    ///
    /// Fatal to the current run.
    #[error("Simulator unavailable: {0}")]
    SimulatorUnavailable(String),

    /// A vehicle-level directive was refused by the simulator.
    ///
    /// Recovered locally by the caller; a single vehicle failing to yield
    /// does not abort the controller.
    #[error("Directive for vehicle {vehicle_id} rejected: {reason}")]
    DirectiveRejected {
        /// Target vehicle of the directive.
        vehicle_id: String,

        /// Reason reported by the simulator.
        reason: String,
    },

    /// Invalid hyperparameters or settings, detected at construction.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The control loop has already stopped and cannot be restarted.
    #[error("Control loop has stopped; construct a new instance to run again")]
    LoopStopped,

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

impl JunctionError {
    /// Returns `true` if the error ends the current run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, JunctionError::DirectiveRejected { .. })
    }
}
