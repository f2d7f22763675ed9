//! Read-only views handed to renderers once per tick

use super::traffic_light::LightState;
use super::types::{Direction, LightId, Position, RoadId, VehicleId};
use super::vehicle::Speed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightView {
    pub id: LightId,
    pub position: Position,
    pub state: LightState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleView {
    pub id: VehicleId,
    pub position: Position,
    pub direction: Direction,
    pub road: RoadId,
    pub speed: Speed,
}

/// Settled state of the simulation after a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tick: u64,
    /// Ordered by light id
    pub lights: Vec<LightView>,
    pub vehicles: Vec<VehicleView>,
}

impl Snapshot {
    pub fn light(&self, id: LightId) -> Option<&LightView> {
        self.lights.iter().find(|light| light.id == id)
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&VehicleView> {
        self.vehicles.iter().find(|vehicle| vehicle.id == id)
    }
}

/// What a frame callback wants the driver to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}
