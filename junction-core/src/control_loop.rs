//! Drive the simulator and the [`Agent`] in lockstep.
mod config;
pub use config::ControlLoopConfig;

use crate::{
    error::JunctionError,
    metrics::EpisodeMetrics,
    record::{AggregateRecorder, Record, RecordValue},
    reward::congestion_reward,
    Agent, SignalController, Simulator, StateAggregator, Transition,
};
use chrono::Local;
use log::{debug, info, warn};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use thiserror::Error;

/// Lifecycle of a [`ControlLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// Constructed, not yet connected to a simulator.
    Idle,

    /// Connected and ticking.
    Running,

    /// Finished or aborted. Terminal.
    Stopped,
}

/// Requests a running [`ControlLoop`] to stop at the next tick boundary.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Requests the loop to stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if a stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A run that ended with an error.
///
/// The metrics accumulated up to the failing tick are preserved.
#[derive(Error, Debug)]
#[error("Control loop aborted: {error}")]
pub struct RunAborted {
    /// The error that ended the run.
    #[source]
    pub error: JunctionError,

    /// Metrics of the completed ticks.
    pub metrics: EpisodeMetrics,
}

impl RunAborted {
    fn before_start(error: JunctionError) -> Self {
        Self {
            error,
            metrics: EpisodeMetrics::default(),
        }
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the decision loop of one run.
///
/// # Tick
///
/// Every tick performs the following steps in this order:
///
/// 1. Advance the simulator by one time unit.
/// 2. Observe all monitored lanes and aggregate them to `state`.
/// 3. `action = agent.choose_action(state)`.
/// 4. `command = controller.decide(action, observations)`, then apply the command.
/// 5. Observe again and aggregate to `next_state`.
/// 6. `reward = congestion_reward(next_state)`.
/// 7. `agent.learn(state, action, reward, next_state)`.
/// 8. Accumulate the tick into [`EpisodeMetrics`].
///
/// ```mermaid
/// graph LR
///     S[Simulator] -->|TrafficObservation| G[StateAggregator]
///     G -->|State| A[Agent]
///     A -->|Phase| C[SignalController]
///     C -->|PhaseCommand| S
///     S -->|next State, reward| A
/// ```
///
/// # Lifecycle
///
/// A loop starts [`LoopStatus::Idle`]. [`ControlLoop::run`] connects to the
/// simulator and moves to [`LoopStatus::Running`]; a failed connection stops
/// the loop before any tick. The loop stops when the step budget is exhausted,
/// when a stop is requested through a [`StopHandle`] (checked once per tick),
/// or when the simulator fails. A stopped loop cannot run again.
pub struct ControlLoop<S: Simulator> {
    /// Configuration of the simulator connection.
    sim_config: S::Config,

    /// Seed passed to the simulator.
    seed: i64,

    controller: SignalController,

    /// The number of ticks of a run.
    step_budget: usize,

    /// Interval of storing per-tick records, in ticks.
    record_interval: usize,

    /// Interval of flushing records, in ticks.
    flush_interval: usize,

    status: LoopStatus,

    stop: StopHandle,
}

impl<S: Simulator> ControlLoop<S> {
    /// Constructs a control loop.
    pub fn build(
        config: ControlLoopConfig,
        controller: SignalController,
        sim_config: S::Config,
    ) -> Result<Self, JunctionError> {
        config.validate()?;
        Ok(Self {
            sim_config,
            seed: 0,
            controller,
            step_budget: config.step_budget,
            record_interval: config.record_interval,
            flush_interval: config.flush_interval,
            status: LoopStatus::Idle,
            stop: StopHandle::default(),
        })
    }

    /// Sets the seed passed to the simulator.
    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    /// Current lifecycle status.
    pub fn status(&self) -> LoopStatus {
        self.status
    }

    /// Returns a handle to request a stop from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Performs one tick and returns its record.
    fn tick<A: Agent>(
        &self,
        simulator: &mut S,
        agent: &mut A,
        aggregator: &StateAggregator,
        metrics: &mut EpisodeMetrics,
    ) -> Result<Record, JunctionError> {
        simulator.advance()?;

        let observations = simulator.observe_all()?;
        let state = aggregator.aggregate(&observations);

        let action = agent.choose_action(&state);

        let command = self.controller.decide(action, &observations);
        let rejected = self.controller.apply(simulator, &command)?;

        let next_observations = simulator.observe_all()?;
        let next_state = aggregator.aggregate(&next_observations);

        let reward = congestion_reward(&next_state);

        let record_agent =
            agent.learn_with_record(&Transition::new(state, action, reward, next_state));

        metrics.accumulate(&observations, self.controller.topology(), reward);
        metrics.count_command(&command, rejected);

        let mut record = Record::from_slice(&[
            ("reward", RecordValue::Scalar(reward as _)),
            ("vehicles", RecordValue::Scalar(state.total_vehicles as _)),
            ("emergency_vehicles", RecordValue::Scalar(state.total_emergency as _)),
            (
                "lane_vehicles",
                RecordValue::Array1(observations.iter().map(|obs| obs.vehicle_count() as f32).collect()),
            ),
            ("action", RecordValue::String(action.to_string())),
            ("phase", RecordValue::String(command.phase.to_string())),
            ("cause", RecordValue::String(command.cause.label().to_string())),
        ]);
        record.merge_inplace(record_agent);

        Ok(record)
    }

    /// Runs the loop until the step budget is exhausted, a stop is requested
    /// or the simulator fails.
    ///
    /// On failure the error is returned together with the metrics of the
    /// completed ticks. In both cases the metrics summary is written to
    /// `recorder` before returning.
    pub fn run<A: Agent>(
        &mut self,
        agent: &mut A,
        recorder: &mut dyn AggregateRecorder,
    ) -> Result<EpisodeMetrics, RunAborted> {
        if self.status != LoopStatus::Idle {
            return Err(RunAborted::before_start(JunctionError::LoopStopped));
        }

        let aggregator = StateAggregator::new(agent.state_size()).map_err(RunAborted::before_start)?;

        let mut simulator = match S::build(&self.sim_config, self.seed) {
            Ok(simulator) => simulator,
            Err(e) => {
                self.status = LoopStatus::Stopped;
                warn!("Failed to connect to the simulator: {}", e);
                return Err(RunAborted::before_start(e));
            }
        };
        self.status = LoopStatus::Running;
        info!(
            "Control loop started: {} ticks, {} junctions",
            self.step_budget,
            self.controller.topology().junctions().len()
        );

        let mut metrics = EpisodeMetrics::new(self.controller.topology());
        let mut ticks: usize = 0;

        let result = loop {
            if ticks == self.step_budget {
                break Ok(());
            }
            if self.stop.is_stop_requested() {
                info!("Stop requested after {} ticks", ticks);
                break Ok(());
            }

            let mut record = match self.tick(&mut simulator, agent, &aggregator, &mut metrics) {
                Ok(record) => record,
                Err(e) => break Err(e),
            };
            ticks += 1;

            if ticks % self.record_interval == 0 {
                record.insert("tick", RecordValue::Scalar(ticks as _));
                debug!("{:?}", record);
                recorder.store(record);
            }

            if ticks % self.flush_interval == 0 {
                recorder.flush(ticks as _);
            }
        };

        simulator.close();
        self.status = LoopStatus::Stopped;

        recorder.flush(ticks as _);
        let mut summary = metrics.to_record();
        summary.insert("finished_at", RecordValue::DateTime(Local::now()));
        recorder.write(summary);

        match result {
            Ok(()) => {
                info!(
                    "Control loop finished after {} ticks, cumulative reward {}",
                    ticks,
                    metrics.cumulative_reward()
                );
                Ok(metrics)
            }
            Err(error) => {
                warn!("Control loop aborted after {} ticks: {}", ticks, error);
                Err(RunAborted { error, metrics })
            }
        }
    }
}
