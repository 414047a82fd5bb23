//! Signal phases and the commands derived from them.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Group of approaches sharing right-of-way at a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum LaneGroup {
    /// The main road.
    Main,

    /// The side road.
    Side,
}

/// Signal-phase identifiers.
///
/// These are the actions of the agent. Every phase maps to exactly one
/// signal pattern through [`Phase::signal_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Phase {
    /// Green for the main road.
    MainGreen,

    /// Green for the side road.
    SideGreen,

    /// Yellow for the main road.
    MainYellow,

    /// Yellow for the side road.
    SideYellow,

    /// Free flow, green for every approach.
    AllGreen,
}

impl Phase {
    /// The action set used when none is configured.
    pub const DEFAULT_ACTIONS: [Phase; 4] = [
        Phase::MainGreen,
        Phase::SideGreen,
        Phase::MainYellow,
        Phase::SideYellow,
    ];

    /// Signal pattern sent to the simulator, one character per controlled link.
    pub fn signal_state(&self) -> &'static str {
        match self {
            Phase::MainGreen => "GGGgrrrGGGgrrr",
            Phase::SideGreen => "rrrrGGgrrrrGGg",
            Phase::MainYellow => "yyyyrrryyyyrrr",
            Phase::SideYellow => "rrrryyyrrrryyy",
            Phase::AllGreen => "GGGgGGgGGGgGGg",
        }
    }

    /// The green phase granting right-of-way to `group`.
    pub fn green_for(group: LaneGroup) -> Self {
        match group {
            LaneGroup::Main => Phase::MainGreen,
            LaneGroup::Side => Phase::SideGreen,
        }
    }

    /// Returns `true` if vehicles of `group` may enter the junction.
    pub fn grants(&self, group: LaneGroup) -> bool {
        match self {
            Phase::MainGreen => group == LaneGroup::Main,
            Phase::SideGreen => group == LaneGroup::Side,
            Phase::MainYellow | Phase::SideYellow => false,
            Phase::AllGreen => true,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Why a [`PhaseCommand`] was issued.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum CommandCause {
    /// Emergency vehicles forced right-of-way for `group`.
    EmergencyOverride {
        /// Group receiving right-of-way.
        group: LaneGroup,

        /// Lanes on which emergency vehicles were seen.
        lanes: Vec<String>,
    },

    /// No vehicles were present.
    FreeFlow,

    /// The agent's choice stands.
    Policy,
}

impl CommandCause {
    /// Short label used in records and logs.
    pub fn label(&self) -> &'static str {
        match self {
            CommandCause::EmergencyOverride { .. } => "emergency",
            CommandCause::FreeFlow => "free_flow",
            CommandCause::Policy => "policy",
        }
    }
}

/// Best-effort vehicle-level command issued during emergency handling.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum VehicleDirective {
    /// Raise the speed of an emergency vehicle.
    RaiseSpeed {
        /// Target vehicle.
        vehicle_id: String,

        /// Speed to set in m/s.
        speed: f64,
    },

    /// Ask a vehicle obstructing an emergency vehicle to change lane.
    ChangeLane {
        /// Target vehicle.
        vehicle_id: String,

        /// Lane offset relative to the current lane.
        lane_offset: i32,

        /// Duration of the manoeuvre in seconds.
        duration: f64,
    },
}

impl VehicleDirective {
    /// Target vehicle of the directive.
    pub fn vehicle_id(&self) -> &str {
        match self {
            VehicleDirective::RaiseSpeed { vehicle_id, .. } => vehicle_id,
            VehicleDirective::ChangeLane { vehicle_id, .. } => vehicle_id,
        }
    }
}

/// Concrete command applied to the controlled junctions.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PhaseCommand {
    /// The phase in effect.
    pub phase: Phase,

    /// Signal pattern of `phase`.
    pub signal_state: String,

    /// Which rule produced the command.
    pub cause: CommandCause,

    /// Vehicle directives to issue after the signal is set.
    pub directives: Vec<VehicleDirective>,
}

impl PhaseCommand {
    /// Constructs a command without directives.
    pub fn new(phase: Phase, cause: CommandCause) -> Self {
        Self {
            phase,
            signal_state: phase.signal_state().to_string(),
            cause,
            directives: vec![],
        }
    }

    /// Attaches vehicle directives.
    pub fn with_directives(mut self, directives: Vec<VehicleDirective>) -> Self {
        self.directives = directives;
        self
    }
}
