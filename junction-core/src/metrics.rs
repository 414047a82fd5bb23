//! Accumulated results of one control-loop run.
use crate::{
    controller::Topology,
    record::{Record, RecordValue},
    CommandCause, PhaseCommand, TrafficObservation,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Totals accumulated by the control loop during one run.
///
/// Owned by the loop and handed to the caller when the run ends, including
/// runs aborted by a simulator failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeMetrics {
    cumulative_reward: f64,
    ticks: usize,
    junction_waiting_times: BTreeMap<String, Vec<f64>>,
    junction_speeds: BTreeMap<String, Vec<f64>>,
    emergency_sightings: usize,
    emergency_samples: usize,
    emergency_waiting_time: f64,
    emergency_overrides: usize,
    rejected_directives: usize,
}

/// Averages derived from [`EpisodeMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    /// Sum of the rewards of all ticks.
    pub cumulative_reward: f64,

    /// Number of completed ticks.
    pub ticks: usize,

    /// Average over lane samples of the summed vehicle waiting time, per junction, in seconds.
    pub average_waiting_time: BTreeMap<String, f64>,

    /// Average over lane samples of the mean vehicle speed, per junction, in m/s.
    pub average_speed: BTreeMap<String, f64>,

    /// Number of emergency vehicle sightings, one per vehicle and tick.
    pub emergency_sightings: usize,

    /// Average waiting time of an emergency vehicle sighting, in seconds.
    ///
    /// Only sightings with a per-vehicle sample contribute.
    pub average_emergency_waiting_time: f64,

    /// Number of emergency vehicle sightings reported as a count only.
    ///
    /// No vehicle directive can be issued for these.
    pub unidentified_emergency_sightings: usize,

    /// Number of ticks with an emergency override.
    pub emergency_overrides: usize,

    /// Number of vehicle directives the simulator refused.
    pub rejected_directives: usize,
}

fn mean(vs: &[f64]) -> f64 {
    match vs.len() {
        0 => 0.0,
        n => vs.iter().sum::<f64>() / n as f64,
    }
}

impl EpisodeMetrics {
    /// Constructs empty metrics with one entry per junction of `topology`.
    pub fn new(topology: &Topology) -> Self {
        let mut metrics = Self::default();
        for junction in topology.junctions() {
            metrics.junction_waiting_times.insert(junction.clone(), vec![]);
            metrics.junction_speeds.insert(junction, vec![]);
        }
        metrics
    }

    /// Adds the observations and the reward of one tick.
    ///
    /// Lanes outside `topology` contribute to the emergency counters only.
    pub fn accumulate(&mut self, observations: &[TrafficObservation], topology: &Topology, reward: f64) {
        self.cumulative_reward += reward;
        self.ticks += 1;

        for obs in observations.iter() {
            if let Some(junction) = topology.junction_of(obs.lane_id()) {
                self.junction_waiting_times
                    .entry(junction.to_string())
                    .or_default()
                    .push(obs.total_waiting_time());
                self.junction_speeds
                    .entry(junction.to_string())
                    .or_default()
                    .push(obs.average_speed().unwrap_or(0.0));
            }

            self.emergency_sightings += obs.emergency_vehicle_count();
            for v in obs.vehicles().iter().filter(|v| v.is_emergency()) {
                self.emergency_samples += 1;
                self.emergency_waiting_time += v.waiting_time;
            }
        }
    }

    /// Counts the outcome of applying a command.
    pub fn count_command(&mut self, command: &PhaseCommand, rejected_directives: usize) {
        if let CommandCause::EmergencyOverride { .. } = command.cause {
            self.emergency_overrides += 1;
        }
        self.rejected_directives += rejected_directives;
    }

    /// Sum of the rewards so far.
    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Number of emergency vehicle sightings.
    pub fn emergency_sightings(&self) -> usize {
        self.emergency_sightings
    }

    /// Number of refused vehicle directives.
    pub fn rejected_directives(&self) -> usize {
        self.rejected_directives
    }

    /// Computes the averages.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            cumulative_reward: self.cumulative_reward,
            ticks: self.ticks,
            average_waiting_time: self
                .junction_waiting_times
                .iter()
                .map(|(j, vs)| (j.clone(), mean(vs)))
                .collect(),
            average_speed: self
                .junction_speeds
                .iter()
                .map(|(j, vs)| (j.clone(), mean(vs)))
                .collect(),
            emergency_sightings: self.emergency_sightings,
            average_emergency_waiting_time: match self.emergency_samples {
                0 => 0.0,
                n => self.emergency_waiting_time / n as f64,
            },
            unidentified_emergency_sightings: self
                .emergency_sightings
                .saturating_sub(self.emergency_samples),
            emergency_overrides: self.emergency_overrides,
            rejected_directives: self.rejected_directives,
        }
    }

    /// The summary as a [`Record`].
    pub fn to_record(&self) -> Record {
        let summary = self.summary();
        let mut record = Record::from_slice(&[
            ("cumulative_reward", RecordValue::Scalar(summary.cumulative_reward as _)),
            ("ticks", RecordValue::Scalar(summary.ticks as _)),
            ("emergency_sightings", RecordValue::Scalar(summary.emergency_sightings as _)),
            (
                "emergency_waiting_time_mean",
                RecordValue::Scalar(summary.average_emergency_waiting_time as _),
            ),
            (
                "unidentified_emergency_sightings",
                RecordValue::Scalar(summary.unidentified_emergency_sightings as _),
            ),
            ("emergency_overrides", RecordValue::Scalar(summary.emergency_overrides as _)),
            ("rejected_directives", RecordValue::Scalar(summary.rejected_directives as _)),
        ]);
        for (junction, v) in summary.average_waiting_time.iter() {
            record.insert(format!("waiting_time_mean/{}", junction), RecordValue::Scalar(*v as _));
        }
        for (junction, v) in summary.average_speed.iter() {
            record.insert(format!("speed_mean/{}", junction), RecordValue::Scalar(*v as _));
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LaneGroup, Phase, VehicleSample};

    fn topology() -> Topology {
        Topology::default()
            .lane("-E1", "J1", LaneGroup::Main)
            .lane("E0", "J2", LaneGroup::Main)
            .lane("E6", "J2", LaneGroup::Side)
    }

    #[test]
    fn test_per_junction_averages() {
        let topology = topology();
        let mut metrics = EpisodeMetrics::new(&topology);
        let observations = vec![
            TrafficObservation::from_vehicles(
                "E0",
                vec![
                    VehicleSample::regular("a", 2.0, 13.9, 3.0),
                    VehicleSample::regular("b", 4.0, 13.9, 1.0),
                ],
            ),
            TrafficObservation::from_vehicles("E6", vec![]),
        ];
        metrics.accumulate(&observations, &topology, -2.0);
        metrics.accumulate(&observations, &topology, -2.0);

        let summary = metrics.summary();
        assert_eq!(summary.cumulative_reward, -4.0);
        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.average_waiting_time["J2"], 2.0);
        assert_eq!(summary.average_speed["J2"], 1.5);
        assert_eq!(summary.average_waiting_time["J1"], 0.0);
        assert_eq!(summary.average_speed["J1"], 0.0);
    }

    #[test]
    fn test_emergency_counters() {
        let topology = topology();
        let mut metrics = EpisodeMetrics::new(&topology);
        let observations = vec![TrafficObservation::from_vehicles(
            "unmapped",
            vec![
                VehicleSample::emergency("amb0", 0.0, 20.0, 4.0),
                VehicleSample::emergency("amb1", 0.0, 20.0, 2.0),
            ],
        )];
        metrics.accumulate(&observations, &topology, -2.0);

        let summary = metrics.summary();
        assert_eq!(summary.emergency_sightings, 2);
        assert_eq!(summary.average_emergency_waiting_time, 3.0);
        assert!(!summary.average_waiting_time.contains_key("unmapped"));
    }

    #[test]
    fn test_count_only_emergency_sightings() {
        let topology = topology();
        let mut metrics = EpisodeMetrics::new(&topology);
        let observations = vec![
            TrafficObservation::new("E6", 3, 1),
            TrafficObservation::from_vehicles(
                "E0",
                vec![VehicleSample::emergency("amb0", 0.0, 20.0, 6.0)],
            ),
        ];
        metrics.accumulate(&observations, &topology, -4.0);

        let summary = metrics.summary();
        assert_eq!(summary.emergency_sightings, 2);
        assert_eq!(summary.unidentified_emergency_sightings, 1);
        // The count-only sighting does not dilute the average.
        assert_eq!(summary.average_emergency_waiting_time, 6.0);
        assert_eq!(
            metrics.to_record().get_scalar("unidentified_emergency_sightings").unwrap(),
            1.0
        );
    }

    #[test]
    fn test_count_command() {
        let mut metrics = EpisodeMetrics::default();
        let command = PhaseCommand::new(
            Phase::MainGreen,
            CommandCause::EmergencyOverride {
                group: LaneGroup::Main,
                lanes: vec!["E0".to_string()],
            },
        );
        metrics.count_command(&command, 2);
        metrics.count_command(&PhaseCommand::new(Phase::SideGreen, CommandCause::Policy), 0);

        let summary = metrics.summary();
        assert_eq!(summary.emergency_overrides, 1);
        assert_eq!(summary.rejected_directives, 2);
    }

    #[test]
    fn test_to_record() {
        let topology = topology();
        let mut metrics = EpisodeMetrics::new(&topology);
        metrics.accumulate(&[TrafficObservation::new("E0", 2, 0)], &topology, -2.0);

        let record = metrics.to_record();
        assert_eq!(record.get_scalar("cumulative_reward").unwrap(), -2.0);
        assert_eq!(record.get_scalar("ticks").unwrap(), 1.0);
        assert!(record.get_scalar("speed_mean/J2").is_ok());
    }
}
