//! Test doubles for the simulator and the agent.
use crate::{
    error::JunctionError, record::Record, Agent, Phase, PhaseCommand, Policy, Simulator, State,
    TrafficObservation, Transition,
};
use anyhow::Result;
use std::{
    path::Path,
    sync::{Arc, Mutex},
};

/// A call received by [`ScriptedSimulator`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `advance()`.
    Advance,

    /// `set_signal_phase()`.
    SetSignal {
        /// Junction.
        junction: String,

        /// Phase of the command.
        phase: Phase,
    },

    /// `set_vehicle_speed()`.
    SetSpeed {
        /// Vehicle.
        vehicle_id: String,

        /// Speed.
        speed: f64,
    },

    /// `request_lane_change()`.
    LaneChange {
        /// Vehicle.
        vehicle_id: String,

        /// Lane offset.
        lane_offset: i32,
    },

    /// `close()`.
    Close,
}

/// Calls received by a [`ScriptedSimulator`], shared with the test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().expect("call log poisoned").push(call);
    }

    /// Returns the calls received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().expect("call log poisoned").clone()
    }
}

/// Configuration of [`ScriptedSimulator`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedSimulatorConfig {
    /// Observations returned at each tick. The last frame repeats.
    pub frames: Vec<Vec<TrafficObservation>>,

    /// `advance()` fails on this call, counted from 1.
    pub fail_at: Option<usize>,

    /// `build()` fails.
    pub refuse_connection: bool,

    /// Vehicle directives are refused.
    pub reject_directives: bool,

    /// Calls received by the simulator.
    pub calls: CallLog,
}

impl ScriptedSimulatorConfig {
    /// Reports the same observations at every tick.
    pub fn constant(observations: Vec<TrafficObservation>) -> Self {
        Self {
            frames: vec![observations],
            ..Self::default()
        }
    }

    /// Fails on the given call of `advance()`.
    pub fn fail_at(mut self, v: usize) -> Self {
        self.fail_at = Some(v);
        self
    }

    /// Refuses the connection.
    pub fn refuse_connection(mut self) -> Self {
        self.refuse_connection = true;
        self
    }

    /// Refuses vehicle directives.
    pub fn reject_directives(mut self) -> Self {
        self.reject_directives = true;
        self
    }
}

/// A simulator replaying scripted observations.
pub struct ScriptedSimulator {
    config: ScriptedSimulatorConfig,
    advances: usize,
}

impl ScriptedSimulator {
    fn frame(&self) -> &[TrafficObservation] {
        match self.config.frames.len() {
            0 => &[],
            n => self.config.frames[self.advances.saturating_sub(1).min(n - 1)].as_slice(),
        }
    }
}

impl Simulator for ScriptedSimulator {
    type Config = ScriptedSimulatorConfig;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self, JunctionError> {
        if config.refuse_connection {
            return Err(JunctionError::SimulatorUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(Self {
            config: config.clone(),
            advances: 0,
        })
    }

    fn advance(&mut self) -> Result<(), JunctionError> {
        self.advances += 1;
        self.config.calls.push(Call::Advance);
        if self.config.fail_at == Some(self.advances) {
            return Err(JunctionError::SimulatorUnavailable(
                "connection lost".to_string(),
            ));
        }
        Ok(())
    }

    fn monitored_lanes(&self) -> Vec<String> {
        self.frame().iter().map(|obs| obs.lane_id().to_string()).collect()
    }

    fn observe(&mut self, lane_id: &str) -> Result<TrafficObservation, JunctionError> {
        self.frame()
            .iter()
            .find(|obs| obs.lane_id() == lane_id)
            .cloned()
            .ok_or_else(|| JunctionError::SimulatorUnavailable(format!("unknown lane {}", lane_id)))
    }

    fn set_signal_phase(&mut self, junction_id: &str, command: &PhaseCommand) -> Result<(), JunctionError> {
        self.config.calls.push(Call::SetSignal {
            junction: junction_id.to_string(),
            phase: command.phase,
        });
        Ok(())
    }

    fn set_vehicle_speed(&mut self, vehicle_id: &str, speed: f64) -> Result<(), JunctionError> {
        self.config.calls.push(Call::SetSpeed {
            vehicle_id: vehicle_id.to_string(),
            speed,
        });
        if self.config.reject_directives {
            return Err(JunctionError::DirectiveRejected {
                vehicle_id: vehicle_id.to_string(),
                reason: "scripted rejection".to_string(),
            });
        }
        Ok(())
    }

    fn request_lane_change(
        &mut self,
        vehicle_id: &str,
        lane_offset: i32,
        _duration: f64,
    ) -> Result<(), JunctionError> {
        self.config.calls.push(Call::LaneChange {
            vehicle_id: vehicle_id.to_string(),
            lane_offset,
        });
        if self.config.reject_directives {
            return Err(JunctionError::DirectiveRejected {
                vehicle_id: vehicle_id.to_string(),
                reason: "scripted rejection".to_string(),
            });
        }
        Ok(())
    }

    fn close(&mut self) {
        self.config.calls.push(Call::Close);
    }
}

/// An agent that always chooses the same phase and remembers what it learned from.
pub struct FixedPhaseAgent {
    phase: Phase,
    state_size: usize,
    transitions: Vec<Transition>,
}

impl FixedPhaseAgent {
    /// Constructs the agent.
    pub fn new(phase: Phase, state_size: usize) -> Self {
        Self {
            phase,
            state_size,
            transitions: vec![],
        }
    }

    /// Transitions passed to `learn`, in order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

impl Policy for FixedPhaseAgent {
    fn choose_action(&mut self, _state: &State) -> Phase {
        self.phase
    }
}

impl Agent for FixedPhaseAgent {
    fn state_size(&self) -> usize {
        self.state_size
    }

    fn learn_with_record(&mut self, transition: &Transition) -> Record {
        self.transitions.push(transition.clone());
        Record::empty()
    }

    fn save_params(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
