use anyhow::Result;
use junction_core::{
    dummy::{Call, FixedPhaseAgent, ScriptedSimulator, ScriptedSimulatorConfig},
    error::JunctionError,
    record::{BufferedRecorder, NullRecorder, Record},
    Agent, ControlLoop, ControlLoopConfig, ControllerConfig, LaneGroup, LoopStatus, Phase,
    Policy, SignalController, State, StopHandle, Topology, TrafficObservation, Transition,
    VehicleSample,
};
use std::path::Path;

/// Requests a stop while choosing the action of the given tick.
struct StoppingAgent {
    inner: FixedPhaseAgent,
    stop: StopHandle,
    stop_at_tick: usize,
    ticks: usize,
}

impl Policy for StoppingAgent {
    fn choose_action(&mut self, state: &State) -> Phase {
        self.ticks += 1;
        if self.ticks == self.stop_at_tick {
            self.stop.stop();
        }
        self.inner.choose_action(state)
    }
}

impl Agent for StoppingAgent {
    fn state_size(&self) -> usize {
        self.inner.state_size()
    }

    fn learn_with_record(&mut self, transition: &Transition) -> Record {
        self.inner.learn_with_record(transition)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        self.inner.save_params(path)
    }
}

fn controller() -> SignalController {
    let topology = Topology::default()
        .lane("A", "J1", LaneGroup::Main)
        .lane("B", "J1", LaneGroup::Side)
        .lane("C", "J2", LaneGroup::Main);
    SignalController::build(ControllerConfig::default().topology(topology)).unwrap()
}

fn control_loop(step_budget: usize, sim_config: ScriptedSimulatorConfig) -> ControlLoop<ScriptedSimulator> {
    let config = ControlLoopConfig::default()
        .step_budget(step_budget)
        .flush_interval(4);
    ControlLoop::build(config, controller(), sim_config).unwrap()
}

#[test]
fn test_constant_queue_gives_linear_reward() {
    let step_budget = 25;
    let sim_config = ScriptedSimulatorConfig::constant(vec![
        TrafficObservation::new("A", 2, 0),
        TrafficObservation::new("B", 0, 0),
        TrafficObservation::new("C", 0, 0),
    ]);
    let mut control_loop = control_loop(step_budget, sim_config);
    let mut agent = FixedPhaseAgent::new(Phase::SideGreen, 100);

    let metrics = control_loop.run(&mut agent, &mut NullRecorder::default()).unwrap();

    assert_eq!(metrics.cumulative_reward(), -2.0 * step_budget as f64);
    assert_eq!(metrics.ticks(), step_budget);
    assert_eq!(agent.transitions().len(), step_budget);
    assert_eq!(control_loop.status(), LoopStatus::Stopped);
}

#[test]
fn test_tick_order_and_transitions() {
    let calls = ScriptedSimulatorConfig::default().calls;
    let sim_config = ScriptedSimulatorConfig {
        frames: vec![vec![TrafficObservation::new("A", 3, 0)]],
        calls: calls.clone(),
        ..ScriptedSimulatorConfig::default()
    };
    let mut control_loop = control_loop(2, sim_config);
    let mut agent = FixedPhaseAgent::new(Phase::MainYellow, 10);

    control_loop.run(&mut agent, &mut NullRecorder::default()).unwrap();

    let expected_tick = vec![
        Call::Advance,
        Call::SetSignal {
            junction: "J1".to_string(),
            phase: Phase::MainYellow,
        },
        Call::SetSignal {
            junction: "J2".to_string(),
            phase: Phase::MainYellow,
        },
    ];
    let mut expected: Vec<Call> = expected_tick.iter().chain(expected_tick.iter()).cloned().collect();
    expected.push(Call::Close);
    assert_eq!(calls.calls(), expected);

    let transition = &agent.transitions()[0];
    assert_eq!(transition.action, Phase::MainYellow);
    assert_eq!(transition.reward, -3.0);
    assert_eq!(transition.state.index, 3);
    assert_eq!(transition.next_state.total_vehicles, 3);
}

#[test]
fn test_empty_network_gives_zero_reward_and_free_flow() {
    let calls = ScriptedSimulatorConfig::default().calls;
    let sim_config = ScriptedSimulatorConfig {
        frames: vec![vec![
            TrafficObservation::new("A", 0, 0),
            TrafficObservation::new("B", 0, 0),
        ]],
        calls: calls.clone(),
        ..ScriptedSimulatorConfig::default()
    };
    let mut control_loop = control_loop(1, sim_config);
    let mut agent = FixedPhaseAgent::new(Phase::SideYellow, 10);

    let metrics = control_loop.run(&mut agent, &mut NullRecorder::default()).unwrap();

    assert_eq!(metrics.cumulative_reward(), 0.0);
    assert!(calls.calls().contains(&Call::SetSignal {
        junction: "J1".to_string(),
        phase: Phase::AllGreen,
    }));
}

#[test]
fn test_simulator_failure_preserves_partial_metrics() {
    let sim_config = ScriptedSimulatorConfig::constant(vec![TrafficObservation::new("A", 2, 0)]).fail_at(4);
    let mut control_loop = control_loop(10, sim_config);
    let mut agent = FixedPhaseAgent::new(Phase::MainGreen, 10);
    let mut recorder = BufferedRecorder::new();

    let aborted = control_loop.run(&mut agent, &mut recorder).unwrap_err();

    assert!(matches!(aborted.error, JunctionError::SimulatorUnavailable(_)));
    assert_eq!(aborted.metrics.ticks(), 3);
    assert_eq!(aborted.metrics.cumulative_reward(), -6.0);
    assert_eq!(control_loop.status(), LoopStatus::Stopped);

    // The summary of the completed ticks is still written.
    let summary = recorder.iter().last().unwrap();
    assert_eq!(summary.get_scalar("cumulative_reward").unwrap(), -6.0);
}

#[test]
fn test_refused_connection_stops_before_any_tick() {
    let sim_config = ScriptedSimulatorConfig::default().refuse_connection();
    let calls = sim_config.calls.clone();
    let mut control_loop = control_loop(10, sim_config);
    let mut agent = FixedPhaseAgent::new(Phase::MainGreen, 10);

    let aborted = control_loop.run(&mut agent, &mut NullRecorder::default()).unwrap_err();

    assert!(matches!(aborted.error, JunctionError::SimulatorUnavailable(_)));
    assert_eq!(aborted.metrics.ticks(), 0);
    assert!(calls.calls().is_empty());
    assert_eq!(control_loop.status(), LoopStatus::Stopped);
}

#[test]
fn test_stopped_loop_cannot_restart() {
    let sim_config = ScriptedSimulatorConfig::constant(vec![TrafficObservation::new("A", 1, 0)]);
    let mut control_loop = control_loop(3, sim_config);
    let mut agent = FixedPhaseAgent::new(Phase::MainGreen, 10);

    assert_eq!(control_loop.status(), LoopStatus::Idle);
    control_loop.run(&mut agent, &mut NullRecorder::default()).unwrap();

    let aborted = control_loop.run(&mut agent, &mut NullRecorder::default()).unwrap_err();
    assert_eq!(aborted.error, JunctionError::LoopStopped);
    assert_eq!(agent.transitions().len(), 3);
}

#[test]
fn test_stop_handle_is_honored_at_tick_boundary() {
    let sim_config = ScriptedSimulatorConfig::constant(vec![TrafficObservation::new("A", 1, 0)]);
    let mut control_loop = control_loop(100, sim_config);
    let mut agent = FixedPhaseAgent::new(Phase::MainGreen, 10);

    control_loop.stop_handle().stop();
    let metrics = control_loop.run(&mut agent, &mut NullRecorder::default()).unwrap();

    assert_eq!(metrics.ticks(), 0);
    assert_eq!(control_loop.status(), LoopStatus::Stopped);
}

#[test]
fn test_rejected_directives_do_not_abort() {
    let lane_b = TrafficObservation::from_vehicles(
        "B",
        vec![
            VehicleSample::regular("car0", 0.0, 13.9, 3.0),
            VehicleSample::emergency("amb0", 0.0, 20.0, 5.0),
        ],
    );
    let sim_config =
        ScriptedSimulatorConfig::constant(vec![TrafficObservation::new("A", 5, 0), lane_b]).reject_directives();
    let calls = sim_config.calls.clone();
    let mut control_loop = control_loop(3, sim_config);
    let mut agent = FixedPhaseAgent::new(Phase::MainGreen, 10);

    let metrics = control_loop.run(&mut agent, &mut NullRecorder::default()).unwrap();

    let summary = metrics.summary();
    assert_eq!(summary.ticks, 3);
    assert_eq!(summary.rejected_directives, 6);
    assert_eq!(summary.emergency_overrides, 3);
    assert_eq!(summary.emergency_sightings, 3);
    assert_eq!(summary.average_emergency_waiting_time, 5.0);
    assert!(calls.calls().contains(&Call::SetSignal {
        junction: "J1".to_string(),
        phase: Phase::SideGreen,
    }));
    assert!(calls.calls().contains(&Call::SetSpeed {
        vehicle_id: "amb0".to_string(),
        speed: 20.0,
    }));
}

#[test]
fn test_records_are_stored_and_flushed() {
    let sim_config = ScriptedSimulatorConfig::constant(vec![TrafficObservation::new("A", 2, 0)]);
    let mut control_loop = control_loop(8, sim_config);
    let mut agent = FixedPhaseAgent::new(Phase::MainGreen, 10);
    let mut recorder = BufferedRecorder::new();

    control_loop.run(&mut agent, &mut recorder).unwrap();

    let flushed = recorder.flushed();
    assert_eq!(flushed.len(), 2);
    assert_eq!(flushed[0].0, 4);
    assert_eq!(flushed[0].1.get_scalar("reward_mean").unwrap(), -2.0);
    assert_eq!(flushed[1].1.get_string("cause").unwrap(), "policy");
}

#[test]
fn test_stop_requested_mid_run_ends_after_current_tick() {
    let sim_config = ScriptedSimulatorConfig::constant(vec![TrafficObservation::new("A", 1, 0)]);
    let calls = sim_config.calls.clone();
    let mut control_loop = control_loop(100, sim_config);
    let mut agent = StoppingAgent {
        inner: FixedPhaseAgent::new(Phase::MainGreen, 10),
        stop: control_loop.stop_handle(),
        stop_at_tick: 3,
        ticks: 0,
    };

    let metrics = control_loop.run(&mut agent, &mut NullRecorder::default()).unwrap();

    // The tick in progress completes, including its update.
    assert_eq!(metrics.ticks(), 3);
    assert_eq!(agent.inner.transitions().len(), 3);
    assert_eq!(metrics.cumulative_reward(), -3.0);
    assert_eq!(control_loop.status(), LoopStatus::Stopped);
    let advances = calls.calls().iter().filter(|c| **c == Call::Advance).count();
    assert_eq!(advances, 3);
    assert_eq!(calls.calls().last(), Some(&Call::Close));
}

#[test]
fn test_count_only_emergency_lane() {
    let sim_config = ScriptedSimulatorConfig::constant(vec![
        TrafficObservation::new("A", 5, 0),
        TrafficObservation::new("B", 3, 1),
    ]);
    let calls = sim_config.calls.clone();
    let mut control_loop = control_loop(2, sim_config);
    let mut agent = FixedPhaseAgent::new(Phase::MainGreen, 10);

    let metrics = control_loop.run(&mut agent, &mut NullRecorder::default()).unwrap();

    let summary = metrics.summary();
    assert_eq!(summary.emergency_overrides, 2);
    assert_eq!(summary.emergency_sightings, 2);
    assert_eq!(summary.unidentified_emergency_sightings, 2);
    assert_eq!(summary.average_emergency_waiting_time, 0.0);
    assert!(calls.calls().contains(&Call::SetSignal {
        junction: "J1".to_string(),
        phase: Phase::SideGreen,
    }));
    assert!(!calls
        .calls()
        .iter()
        .any(|c| matches!(c, Call::SetSpeed { .. } | Call::LaneChange { .. })));
}
