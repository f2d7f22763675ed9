//! Vehicle movement logic for the intersection simulation
//!
//! A vehicle moves one unit per tick along its approach unless its governing
//! light holds it at the stop line or the vehicle ahead of it has stopped.

use anyhow::{bail, Context, Result};
use log::warn;
use std::collections::BTreeMap;

use super::topology::RoadTopology;
use super::traffic_light::TrafficLight;
use super::types::{Direction, LightId, Position, RoadId, VehicleId};

/// Discrete per-tick speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Speed {
    #[default]
    Stopped,
    Moving,
}

impl Speed {
    /// Distance covered in one tick
    pub fn units(self) -> i32 {
        match self {
            Speed::Stopped => 0,
            Speed::Moving => 1,
        }
    }
}

/// A vehicle travelling along one approach
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    id: VehicleId,
    position: Position,
    direction: Direction,
    road: RoadId,
    speed: Speed,
}

impl Vehicle {
    /// Place a stopped vehicle on the lane of an approach, `along` units
    /// into it on the axis of travel. `along` must lie inside the world.
    pub fn new(
        id: VehicleId,
        topology: &RoadTopology,
        direction: Direction,
        road: RoadId,
        along: i32,
    ) -> Result<Self> {
        let approach = topology.approach(direction, road).with_context(|| {
            format!("No approach travelling {:?} on road {}", direction, road.0)
        })?;
        let extent = topology.bounds().axis_extent(direction);
        if !(0..=extent).contains(&along) {
            bail!(
                "Vehicle position {} is outside the world (0..={}) travelling {:?}",
                along,
                extent,
                direction
            );
        }

        Ok(Self {
            id,
            position: direction.compose(along, approach.lane),
            direction,
            road,
            speed: Speed::Stopped,
        })
    }

    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn road(&self) -> RoadId {
        self.road
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// How far along its axis of travel the vehicle is
    pub fn progress(&self) -> i32 {
        self.direction.progress(self.direction.axis(self.position))
    }

    fn shares_approach(&self, other: &Vehicle) -> bool {
        self.direction == other.direction && self.road == other.road
    }

    /// Decide the speed for the coming tick.
    ///
    /// `peers` must be the vehicles as they stood at the start of the tick.
    pub fn decide_speed(
        &self,
        lights: &BTreeMap<LightId, TrafficLight>,
        topology: &RoadTopology,
        peers: &[Vehicle],
        follow_distance: i32,
    ) -> Speed {
        if self.held_by_light(lights, topology) || self.queued_behind(peers, follow_distance) {
            Speed::Stopped
        } else {
            Speed::Moving
        }
    }

    fn held_by_light(
        &self,
        lights: &BTreeMap<LightId, TrafficLight>,
        topology: &RoadTopology,
    ) -> bool {
        let Some(light_id) = topology.governing_light(self.direction, self.road, self.position)
        else {
            return false;
        };
        let Some(light) = lights.get(&light_id) else {
            warn!(
                "Governing light {:?} of vehicle {:?} is not in the light set",
                light_id, self.id
            );
            return false;
        };
        let Some(stop_line) = topology.stop_line(light_id, self.direction) else {
            return false;
        };

        self.direction.axis(self.position) == stop_line && light.state().halts(self.direction)
    }

    /// A stopped vehicle exactly one follow distance ahead on the same approach
    fn queued_behind(&self, peers: &[Vehicle], follow_distance: i32) -> bool {
        let own = self.progress();
        peers.iter().any(|peer| {
            peer.id != self.id
                && self.shares_approach(peer)
                && peer.speed == Speed::Stopped
                && peer.progress() - own == follow_distance
        })
    }

    /// Commit a decided speed and move by it
    pub fn drive(&mut self, speed: Speed) {
        self.speed = speed;
        self.advance();
    }

    /// Move by the current speed along the direction of travel
    pub fn advance(&mut self) {
        self.position = self.direction.step(self.position, self.speed.units());
    }
}
