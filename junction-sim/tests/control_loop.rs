use junction_core::{
    dummy::FixedPhaseAgent, error::JunctionError, record::BufferedRecorder, ControlLoop,
    ControlLoopConfig, ControllerConfig, LaneGroup, Phase, SignalController,
};
use junction_sim::{LaneSpec, SyntheticSimConfig, SyntheticSimulator};

fn control_loop(sim_config: SyntheticSimConfig, step_budget: usize) -> ControlLoop<SyntheticSimulator> {
    let controller =
        SignalController::build(ControllerConfig::default().topology(sim_config.topology())).unwrap();
    let config = ControlLoopConfig::default().step_budget(step_budget).flush_interval(50);
    ControlLoop::build(config, controller, sim_config).unwrap().seed(42)
}

#[test]
fn test_run_on_default_network() {
    let mut control_loop = control_loop(SyntheticSimConfig::default(), 200);
    let mut agent = FixedPhaseAgent::new(Phase::MainGreen, 100);
    let mut recorder = BufferedRecorder::new();

    let metrics = control_loop.run(&mut agent, &mut recorder).unwrap();

    assert_eq!(metrics.ticks(), 200);
    assert!(metrics.cumulative_reward() < 0.0);
    let summary = metrics.summary();
    assert_eq!(summary.average_waiting_time.len(), 2);
    assert_eq!(recorder.flushed().len(), 4);
}

#[test]
fn test_emergency_traffic_triggers_overrides() {
    let sim_config = SyntheticSimConfig::default()
        .lanes(vec![
            LaneSpec::new("main", "J1", LaneGroup::Main).arrival_rate(0.0),
            LaneSpec::new("side", "J1", LaneGroup::Side).arrival_rate(0.5),
        ])
        .emergency_rate(1.0);
    let mut control_loop = control_loop(sim_config, 50);
    let mut agent = FixedPhaseAgent::new(Phase::MainGreen, 100);

    let metrics = control_loop.run(&mut agent, &mut BufferedRecorder::new()).unwrap();

    let summary = metrics.summary();
    assert!(summary.emergency_sightings > 0);
    assert!(summary.emergency_overrides > 0);
    // Emergency vehicles clear the side road although the agent never serves it.
    assert!(agent
        .transitions()
        .iter()
        .all(|t| t.next_state.total_vehicles <= 2));
}

#[test]
fn test_connection_loss_aborts_run() {
    let sim_config = SyntheticSimConfig::default().fail_at(Some(11));
    let mut control_loop = control_loop(sim_config, 100);
    let mut agent = FixedPhaseAgent::new(Phase::SideGreen, 100);

    let aborted = control_loop.run(&mut agent, &mut BufferedRecorder::new()).unwrap_err();

    assert!(matches!(aborted.error, JunctionError::SimulatorUnavailable(_)));
    assert_eq!(aborted.metrics.ticks(), 10);
}
