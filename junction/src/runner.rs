//! Single and parallel runs.
use crate::{JunctionConfig, LogRecorder};
use anyhow::{anyhow, Result};
use crossbeam_channel::unbounded;
use junction_core::{Agent, ControlLoop, MetricsSummary, SignalController};
use junction_q_agent::QLearningAgent;
use junction_sim::SyntheticSimulator;
use log::{info, warn};
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    thread,
};

/// Options of a run that are not part of [`JunctionConfig`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Seed of the run, used by both the agent and the simulator.
    pub seed: u64,

    /// Parameters the agent starts from.
    pub load_params: Option<PathBuf>,

    /// Directory where the agent parameters are saved after the run.
    pub save_dir: Option<PathBuf>,
}

impl RunOptions {
    /// Options with a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Sets the file of parameters to start from.
    pub fn load_params(mut self, v: Option<PathBuf>) -> Self {
        self.load_params = v;
        self
    }

    /// Sets the directory where parameters are saved.
    pub fn save_dir(mut self, v: Option<PathBuf>) -> Self {
        self.save_dir = v;
        self
    }

    /// File the parameters of this run are saved to.
    pub fn params_path(&self) -> Option<PathBuf> {
        self.save_dir
            .as_ref()
            .map(|dir| dir.join(format!("params-{}.bin", self.seed)))
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Seed of the run.
    pub seed: u64,

    /// Metrics of the completed ticks.
    pub summary: MetricsSummary,

    /// Exploration rate of the agent at the end of the run.
    pub exploration_rate: f64,

    /// Error that aborted the run, if any.
    pub error: Option<String>,
}

fn build_agent(config: &JunctionConfig, options: &RunOptions) -> Result<QLearningAgent> {
    let agent_config = config.agent.clone().seed(options.seed);
    match &options.load_params {
        Some(path) => QLearningAgent::from_params(agent_config, path),
        None => Ok(QLearningAgent::build(agent_config)?),
    }
}

/// Runs the control loop once.
///
/// Invalid configuration and parameter files fail the call. A run aborted by
/// the simulator is reported with its partial metrics and the error.
pub fn run(config: &JunctionConfig, options: &RunOptions) -> Result<RunReport> {
    let mut agent = build_agent(config, options)?;
    let controller = SignalController::build(config.controller_config())?;
    let mut control_loop = ControlLoop::<SyntheticSimulator>::build(
        config.control_loop.clone(),
        controller,
        config.simulator.clone(),
    )?
    .seed(options.seed as i64);
    let mut recorder = LogRecorder::new(format!("seed {}", options.seed));

    let (metrics, error) = match control_loop.run(&mut agent, &mut recorder) {
        Ok(metrics) => (metrics, None),
        Err(aborted) => {
            warn!("Run with seed {} aborted: {}", options.seed, aborted.error);
            (aborted.metrics, Some(aborted.error.to_string()))
        }
    };

    if let Some(path) = options.params_path() {
        agent.save_params(&path)?;
    }

    Ok(RunReport {
        seed: options.seed,
        summary: metrics.summary(),
        exploration_rate: agent.exploration_rate(),
        error,
    })
}

/// Runs independent control loops on separate threads, one per seed.
///
/// Every run owns its agent, controller and simulator. Reports are returned
/// in the order of `seeds`.
pub fn run_parallel(
    config: &JunctionConfig,
    seeds: &[u64],
    load_params: Option<&Path>,
    save_dir: Option<&Path>,
) -> Result<Vec<RunReport>> {
    let (sender, receiver) = unbounded();

    let handles = seeds
        .iter()
        .enumerate()
        .map(|(ix, seed)| {
            let sender = sender.clone();
            let config = config.clone();
            let options = RunOptions::with_seed(*seed)
                .load_params(load_params.map(Path::to_path_buf))
                .save_dir(save_dir.map(Path::to_path_buf));
            thread::spawn(move || {
                let report = run(&config, &options);
                // The receiver outlives the threads.
                let _ = sender.send((ix, report));
            })
        })
        .collect::<Vec<_>>();
    drop(sender);
    info!("Started {} runs", handles.len());

    let mut results: Vec<Option<Result<RunReport>>> = seeds.iter().map(|_| None).collect();
    for (ix, result) in receiver.iter() {
        results[ix] = Some(result);
    }

    // Every thread is joined before any error is returned.
    let n_panicked = handles
        .into_iter()
        .map(|handle| handle.join())
        .filter(|joined| joined.is_err())
        .count();
    if n_panicked > 0 {
        return Err(anyhow!("{} run threads panicked", n_panicked));
    }

    results
        .into_iter()
        .zip(seeds.iter())
        .map(|(result, seed)| match result {
            Some(result) => result,
            None => Err(anyhow!("run with seed {} returned no report", seed)),
        })
        .collect()
}
