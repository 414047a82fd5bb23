//! Sensed traffic conditions.
use serde::{Deserialize, Serialize};

/// Vehicle classes the controller distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum VehicleKind {
    /// Any vehicle without emergency priority.
    Regular,

    /// A vehicle carrying the emergency tag, e.g. an ambulance.
    Emergency,
}

/// A single vehicle seen on a lane during one tick.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VehicleSample {
    /// Identifier of the vehicle in the simulator.
    pub id: String,

    /// Class of the vehicle.
    pub kind: VehicleKind,

    /// Current speed in m/s.
    pub speed: f64,

    /// Maximum speed allowed for the vehicle in m/s.
    pub max_speed: f64,

    /// Accumulated time in seconds the vehicle has been standing.
    pub waiting_time: f64,
}

impl VehicleSample {
    /// Constructs a regular vehicle.
    pub fn regular(id: impl Into<String>, speed: f64, max_speed: f64, waiting_time: f64) -> Self {
        Self {
            id: id.into(),
            kind: VehicleKind::Regular,
            speed,
            max_speed,
            waiting_time,
        }
    }

    /// Constructs an emergency vehicle.
    pub fn emergency(id: impl Into<String>, speed: f64, max_speed: f64, waiting_time: f64) -> Self {
        Self {
            id: id.into(),
            kind: VehicleKind::Emergency,
            speed,
            max_speed,
            waiting_time,
        }
    }

    /// Returns `true` if the vehicle has emergency priority.
    pub fn is_emergency(&self) -> bool {
        self.kind == VehicleKind::Emergency
    }
}

/// Snapshot of one monitored lane at one simulation tick.
///
/// Produced by the simulator adapter and never modified afterwards.
/// `vehicles` may be empty when the adapter only reports counts; the counts
/// are authoritative in that case.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrafficObservation {
    lane_id: String,
    vehicle_count: usize,
    emergency_vehicle_count: usize,
    average_speed: Option<f64>,
    vehicles: Vec<VehicleSample>,
}

impl TrafficObservation {
    /// Constructs an observation carrying counts only.
    pub fn new(lane_id: impl Into<String>, vehicle_count: usize, emergency_vehicle_count: usize) -> Self {
        Self {
            lane_id: lane_id.into(),
            vehicle_count,
            emergency_vehicle_count,
            average_speed: None,
            vehicles: vec![],
        }
    }

    /// Constructs an observation from per-vehicle samples.
    ///
    /// Counts and the average speed are derived from `vehicles`.
    pub fn from_vehicles(lane_id: impl Into<String>, vehicles: Vec<VehicleSample>) -> Self {
        let vehicle_count = vehicles.len();
        let emergency_vehicle_count = vehicles.iter().filter(|v| v.is_emergency()).count();
        let average_speed = match vehicle_count {
            0 => None,
            n => Some(vehicles.iter().map(|v| v.speed).sum::<f64>() / n as f64),
        };

        Self {
            lane_id: lane_id.into(),
            vehicle_count,
            emergency_vehicle_count,
            average_speed,
            vehicles,
        }
    }

    /// Sets the average speed reported by the sensor.
    pub fn with_average_speed(mut self, v: f64) -> Self {
        self.average_speed = Some(v);
        self
    }

    /// Identifier of the lane.
    pub fn lane_id(&self) -> &str {
        &self.lane_id
    }

    /// Number of vehicles on the lane, emergency vehicles included.
    pub fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    /// Number of emergency vehicles on the lane.
    pub fn emergency_vehicle_count(&self) -> usize {
        self.emergency_vehicle_count
    }

    /// Average speed on the lane, if the sensor reports one.
    pub fn average_speed(&self) -> Option<f64> {
        self.average_speed
    }

    /// Per-vehicle samples, possibly empty.
    pub fn vehicles(&self) -> &[VehicleSample] {
        &self.vehicles
    }

    /// Sum of the waiting times of all sampled vehicles.
    pub fn total_waiting_time(&self) -> f64 {
        self.vehicles.iter().map(|v| v.waiting_time).sum()
    }

    /// Returns `true` if an emergency vehicle is on the lane.
    pub fn has_emergency(&self) -> bool {
        self.emergency_vehicle_count > 0
    }
}
