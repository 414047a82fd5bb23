//! Synthetic simulator.
use super::{LaneSpec, SyntheticSimConfig};
use junction_core::{
    error::JunctionError, Phase, PhaseCommand, Simulator, TrafficObservation, VehicleKind,
    VehicleSample,
};
use log::{debug, trace};
use std::collections::HashMap;

struct Vehicle {
    id: String,
    kind: VehicleKind,
    speed: f64,
    max_speed: f64,
    waiting_time: f64,
    leaving: bool,
}

impl Vehicle {
    fn sample(&self) -> VehicleSample {
        VehicleSample {
            id: self.id.clone(),
            kind: self.kind,
            speed: self.speed,
            max_speed: self.max_speed,
            waiting_time: self.waiting_time,
        }
    }
}

struct Lane {
    spec: LaneSpec,
    queue: Vec<Vehicle>,
}

/// A queueing simulator of signalised lanes.
///
/// On each `advance()`:
///
/// 1. vehicles that were asked to speed up or to change lane leave the lane,
/// 2. if the junction grants the lane's group, up to `discharge` vehicles
///    leave from the head of the queue,
/// 3. the remaining vehicles stop and their waiting time grows by one second,
/// 4. a vehicle arrives with probability `arrival_rate`, moving at the speed limit.
///
/// Junctions start with [`Phase::MainGreen`].
pub struct SyntheticSimulator {
    lanes: Vec<Lane>,
    signals: HashMap<String, Phase>,
    emergency_rate: f64,
    emergency_max_speed: f64,
    fail_at: Option<usize>,
    n_advances: usize,
    n_arrivals: usize,
    rng: fastrand::Rng,
}

impl SyntheticSimulator {
    /// Number of vehicles currently on monitored lanes.
    pub fn n_vehicles(&self) -> usize {
        self.lanes.iter().map(|lane| lane.queue.len()).sum()
    }

    /// Phase currently shown by a junction.
    pub fn signal(&self, junction_id: &str) -> Option<Phase> {
        self.signals.get(junction_id).copied()
    }

    fn find_vehicle(&mut self, vehicle_id: &str) -> Option<(&LaneSpec, &mut Vehicle)> {
        self.lanes.iter_mut().find_map(|lane| {
            let spec = &lane.spec;
            lane.queue
                .iter_mut()
                .find(|v| v.id == vehicle_id)
                .map(|v| (spec, v))
        })
    }

    fn step_lane(lane: &mut Lane, phase: Phase) {
        lane.queue.retain(|v| !v.leaving);

        if phase.grants(lane.spec.group) {
            let n = lane.spec.discharge.min(lane.queue.len());
            lane.queue.drain(..n);
        }

        for v in lane.queue.iter_mut() {
            v.speed = 0.0;
            v.waiting_time += 1.0;
        }
    }

    fn arrive(&mut self, ix: usize) {
        if self.rng.f64() >= self.lanes[ix].spec.arrival_rate {
            return;
        }
        self.n_arrivals += 1;
        let is_emergency = self.rng.f64() < self.emergency_rate;
        let lane = &mut self.lanes[ix];
        let (kind, id, max_speed) = match is_emergency {
            true => (
                VehicleKind::Emergency,
                format!("emergency.{}", self.n_arrivals),
                self.emergency_max_speed,
            ),
            false => (
                VehicleKind::Regular,
                format!("{}.{}", lane.spec.id, self.n_arrivals),
                lane.spec.max_speed,
            ),
        };
        trace!("{} arrives on {}", id, lane.spec.id);
        lane.queue.push(Vehicle {
            id,
            kind,
            speed: lane.spec.max_speed.min(max_speed),
            max_speed,
            waiting_time: 0.0,
            leaving: false,
        });
    }
}

impl Simulator for SyntheticSimulator {
    type Config = SyntheticSimConfig;

    fn build(config: &Self::Config, seed: i64) -> Result<Self, JunctionError> {
        config.validate()?;
        let rng = fastrand::Rng::new();
        rng.seed(seed as u64);

        let signals = config
            .lanes
            .iter()
            .map(|lane| (lane.junction.clone(), Phase::MainGreen))
            .collect();
        let lanes = config
            .lanes
            .iter()
            .map(|spec| Lane {
                spec: spec.clone(),
                queue: vec![],
            })
            .collect();
        debug!("Synthetic simulator with {} lanes, seed {}", config.lanes.len(), seed);

        Ok(Self {
            lanes,
            signals,
            emergency_rate: config.emergency_rate,
            emergency_max_speed: config.emergency_max_speed,
            fail_at: config.fail_at,
            n_advances: 0,
            n_arrivals: 0,
            rng,
        })
    }

    fn advance(&mut self) -> Result<(), JunctionError> {
        self.n_advances += 1;
        if self.fail_at == Some(self.n_advances) {
            return Err(JunctionError::SimulatorUnavailable(format!(
                "connection lost at step {}",
                self.n_advances
            )));
        }

        for ix in 0..self.lanes.len() {
            let phase = self
                .signals
                .get(&self.lanes[ix].spec.junction)
                .copied()
                .unwrap_or(Phase::MainGreen);
            Self::step_lane(&mut self.lanes[ix], phase);
            self.arrive(ix);
        }
        Ok(())
    }

    fn monitored_lanes(&self) -> Vec<String> {
        self.lanes.iter().map(|lane| lane.spec.id.clone()).collect()
    }

    fn observe(&mut self, lane_id: &str) -> Result<TrafficObservation, JunctionError> {
        let lane = self
            .lanes
            .iter()
            .find(|lane| lane.spec.id == lane_id)
            .ok_or_else(|| JunctionError::SimulatorUnavailable(format!("unknown lane {}", lane_id)))?;
        Ok(TrafficObservation::from_vehicles(
            lane_id,
            lane.queue.iter().map(Vehicle::sample).collect(),
        ))
    }

    fn set_signal_phase(&mut self, junction_id: &str, command: &PhaseCommand) -> Result<(), JunctionError> {
        match self.signals.get_mut(junction_id) {
            Some(phase) => *phase = command.phase,
            None => debug!("No monitored lane leads to junction {}", junction_id),
        }
        Ok(())
    }

    fn set_vehicle_speed(&mut self, vehicle_id: &str, speed: f64) -> Result<(), JunctionError> {
        match self.find_vehicle(vehicle_id) {
            Some((_, vehicle)) => {
                vehicle.speed = speed.min(vehicle.max_speed);
                vehicle.leaving = vehicle.speed > 0.0;
                Ok(())
            }
            None => Err(JunctionError::DirectiveRejected {
                vehicle_id: vehicle_id.to_string(),
                reason: "vehicle is not on a monitored lane".to_string(),
            }),
        }
    }

    fn request_lane_change(
        &mut self,
        vehicle_id: &str,
        _lane_offset: i32,
        _duration: f64,
    ) -> Result<(), JunctionError> {
        let reject = |reason: &str| JunctionError::DirectiveRejected {
            vehicle_id: vehicle_id.to_string(),
            reason: reason.to_string(),
        };
        match self.find_vehicle(vehicle_id) {
            Some((spec, vehicle)) => {
                if !spec.has_adjacent_lane {
                    return Err(reject(&format!("lane {} has no adjacent lane", spec.id)));
                }
                vehicle.leaving = true;
                Ok(())
            }
            None => Err(reject("vehicle is not on a monitored lane")),
        }
    }

    fn close(&mut self) {
        debug!(
            "Synthetic simulator closed after {} steps, {} arrivals",
            self.n_advances, self.n_arrivals
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use junction_core::{CommandCause, LaneGroup};

    fn single_lane(arrival_rate: f64, emergency_rate: f64) -> SyntheticSimConfig {
        SyntheticSimConfig::default()
            .lanes(vec![LaneSpec::new("A", "J1", LaneGroup::Side).arrival_rate(arrival_rate)])
            .emergency_rate(emergency_rate)
    }

    fn command(phase: Phase) -> PhaseCommand {
        PhaseCommand::new(phase, CommandCause::Policy)
    }

    #[test]
    fn test_queue_grows_on_red() {
        let mut sim = SyntheticSimulator::build(&single_lane(1.0, 0.0), 0).unwrap();
        for _ in 0..5 {
            sim.advance().unwrap();
        }

        // MainGreen does not grant the side road.
        let obs = sim.observe("A").unwrap();
        assert_eq!(obs.vehicle_count(), 5);
        assert_eq!(obs.vehicles()[0].waiting_time, 4.0);
        assert_eq!(obs.vehicles()[4].speed, 13.9);
    }

    #[test]
    fn test_green_discharges_queue() {
        let mut sim = SyntheticSimulator::build(&single_lane(1.0, 0.0), 0).unwrap();
        for _ in 0..3 {
            sim.advance().unwrap();
        }
        sim.set_signal_phase("J1", &command(Phase::SideGreen)).unwrap();
        sim.advance().unwrap();

        // One leaves, one arrives.
        assert_eq!(sim.n_vehicles(), 3);
        assert_eq!(sim.signal("J1"), Some(Phase::SideGreen));
    }

    #[test]
    fn test_no_arrivals_without_rate() {
        let mut sim = SyntheticSimulator::build(&single_lane(0.0, 0.0), 0).unwrap();
        for _ in 0..10 {
            sim.advance().unwrap();
        }
        assert_eq!(sim.observe_all().unwrap(), vec![TrafficObservation::new("A", 0, 0)]);
    }

    #[test]
    fn test_emergency_vehicle_leaves_after_speed_raise() {
        let mut sim = SyntheticSimulator::build(&single_lane(1.0, 1.0), 0).unwrap();
        sim.advance().unwrap();
        let obs = sim.observe("A").unwrap();
        assert_eq!(obs.emergency_vehicle_count(), 1);
        let id = obs.vehicles()[0].id.clone();

        sim.set_vehicle_speed(&id, 20.0).unwrap();
        sim.advance().unwrap();
        assert!(sim.observe("A").unwrap().vehicles().iter().all(|v| v.id != id));
    }

    #[test]
    fn test_lane_change_needs_adjacent_lane() {
        let config = SyntheticSimConfig::default().lanes(vec![
            LaneSpec::new("A", "J1", LaneGroup::Side).arrival_rate(1.0),
            LaneSpec::new("B", "J1", LaneGroup::Side)
                .arrival_rate(1.0)
                .has_adjacent_lane(false),
        ]);
        let mut sim = SyntheticSimulator::build(&config.emergency_rate(0.0), 0).unwrap();
        sim.advance().unwrap();
        let a = sim.observe("A").unwrap().vehicles()[0].id.clone();
        let b = sim.observe("B").unwrap().vehicles()[0].id.clone();

        assert!(sim.request_lane_change(&a, 1, 25.0).is_ok());
        assert!(matches!(
            sim.request_lane_change(&b, 1, 25.0),
            Err(JunctionError::DirectiveRejected { .. })
        ));
        assert!(matches!(
            sim.set_vehicle_speed("nobody", 10.0),
            Err(JunctionError::DirectiveRejected { .. })
        ));
    }

    #[test]
    fn test_connection_loss() {
        let mut sim = SyntheticSimulator::build(&single_lane(0.5, 0.0).fail_at(Some(3)), 0).unwrap();
        assert!(sim.advance().is_ok());
        assert!(sim.advance().is_ok());
        assert!(matches!(
            sim.advance(),
            Err(JunctionError::SimulatorUnavailable(_))
        ));
    }

    #[test]
    fn test_same_seed_same_traffic() {
        let config = SyntheticSimConfig::default().emergency_rate(0.2);
        let mut a = SyntheticSimulator::build(&config, 7).unwrap();
        let mut b = SyntheticSimulator::build(&config, 7).unwrap();
        for _ in 0..50 {
            a.advance().unwrap();
            b.advance().unwrap();
            assert_eq!(a.observe_all().unwrap(), b.observe_all().unwrap());
        }
    }

    #[test]
    fn test_invalid_rate_is_rejected() {
        assert!(matches!(
            SyntheticSimulator::build(&single_lane(1.5, 0.0), 0),
            Err(JunctionError::ConfigurationError(_))
        ));
    }
}
