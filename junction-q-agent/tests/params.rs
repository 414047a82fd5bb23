use anyhow::Result;
use junction_core::{Agent, Phase, Policy, State, Transition};
use junction_q_agent::{EpsilonGreedy, QAgentConfig, QLearningAgent};
use tempdir::TempDir;

fn trained_agent(config: QAgentConfig) -> QLearningAgent {
    let mut agent = QLearningAgent::build(config).unwrap();
    for i in 0..40 {
        let n = i % 7;
        let action = Phase::DEFAULT_ACTIONS[i % 4];
        agent.learn(&Transition::new(
            State::new(n, 0, n),
            action,
            -(n as f64),
            State::new(n + 1, 0, n + 1),
        ));
    }
    agent
}

#[test]
fn test_params_round_trip() -> Result<()> {
    let config = QAgentConfig::default().state_size(20);
    let agent = trained_agent(config.clone());

    let dir = TempDir::new("q_agent_params")?;
    let path = dir.path().join("model").join("params.bin");
    agent.save_params(&path)?;

    let loaded = QLearningAgent::from_params(config, &path)?;
    assert_eq!(loaded.table(), agent.table());
    assert_eq!(loaded.exploration_rate(), agent.exploration_rate());
    assert_eq!(loaded.n_updates(), 0);
    Ok(())
}

#[test]
fn test_loaded_agent_acts_greedily_like_saved_one() -> Result<()> {
    let greedy = EpsilonGreedy::new().eps_start(0.0).eps_final(0.0);
    let config = QAgentConfig::default().state_size(20).explorer(greedy);
    let mut agent = trained_agent(config.clone());

    let dir = TempDir::new("q_agent_params")?;
    let path = dir.path().join("params.bin");
    agent.save_params(&path)?;
    let mut loaded = QLearningAgent::from_params(config, &path)?;

    for n in 0..20 {
        let state = State::new(n, 0, n);
        assert_eq!(loaded.choose_action(&state), agent.choose_action(&state));
    }
    Ok(())
}

#[test]
fn test_dimension_mismatch_is_rejected() -> Result<()> {
    let agent = trained_agent(QAgentConfig::default().state_size(20));
    let dir = TempDir::new("q_agent_params")?;
    let path = dir.path().join("params.bin");
    agent.save_params(&path)?;

    assert!(QLearningAgent::from_params(QAgentConfig::default().state_size(30), &path).is_err());

    let fewer_actions = QAgentConfig::default()
        .state_size(20)
        .action_set(vec![Phase::MainGreen, Phase::SideGreen]);
    assert!(QLearningAgent::from_params(fewer_actions, &path).is_err());
    Ok(())
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new("q_agent_params").unwrap();
    let path = dir.path().join("absent.bin");
    assert!(QLearningAgent::from_params(QAgentConfig::default(), &path).is_err());
}
