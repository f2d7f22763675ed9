//! Simulation clock that ties everything together
//!
//! Owns the lights and vehicles, advances them one tick at a time and hands
//! out snapshots. Vehicles decide from the state at the start of the tick,
//! so iteration order never changes the outcome.

use anyhow::{bail, Context, Result};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::config::SimConfig;
use super::phase::LightController;
use super::snapshot::{FrameControl, LightView, Snapshot, VehicleView};
use super::topology::RoadTopology;
use super::traffic_light::{LightState, TrafficLight};
use super::types::{Direction, LightId, RoadId, VehicleId};
use super::vehicle::Vehicle;

/// Lifecycle of a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Running,
    Stopped,
}

/// Running totals for a simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub spawned: u64,
    pub despawned: u64,
    pub rejected_spawns: u64,
}

pub struct SimulationClock {
    topology: RoadTopology,
    config: SimConfig,
    state: ClockState,
    tick: u64,
    lights: BTreeMap<LightId, TrafficLight>,
    vehicles: Vec<Vehicle>,
    controller: Option<Box<dyn LightController>>,
    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
    next_id: u64,
    stats: SimStats,
}

impl SimulationClock {
    pub fn new(topology: RoadTopology, config: SimConfig) -> Result<Self> {
        config.validate().context("Invalid simulation config")?;

        let lights = topology
            .lights()
            .iter()
            .map(|p| (p.id, TrafficLight::new(p.id, p.position, p.initial_state)))
            .collect();

        Ok(Self {
            topology,
            config,
            state: ClockState::Idle,
            tick: 0,
            lights,
            vehicles: Vec::new(),
            controller: None,
            rng: None,
            next_id: 0,
            stats: SimStats::default(),
        })
    }

    /// The standard grid with default tuning
    pub fn standard() -> Result<Self> {
        Self::new(RoadTopology::standard()?, SimConfig::default())
    }

    /// Use a seeded RNG for spawn choices
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    /// Let `controller` drive light states at the start of every tick
    pub fn with_controller(mut self, controller: Box<dyn LightController>) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    pub fn topology(&self) -> &RoadTopology {
        &self.topology
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id() == id)
    }

    pub fn lights(&self) -> impl Iterator<Item = &TrafficLight> {
        self.lights.values()
    }

    pub fn light(&self, id: LightId) -> Option<&TrafficLight> {
        self.lights.get(&id)
    }

    pub fn start(&mut self) {
        match self.state {
            ClockState::Idle => {
                info!("Simulation started");
                self.state = ClockState::Running;
            }
            ClockState::Running => {}
            ClockState::Stopped => warn!("Ignoring start: simulation already stopped"),
        }
    }

    /// Halt the clock. No tick runs afterwards, even if it was never started.
    pub fn stop(&mut self) {
        if self.state != ClockState::Stopped {
            info!("Simulation stopped after {} ticks", self.tick);
            self.state = ClockState::Stopped;
        }
    }

    /// Force a light into `state`
    pub fn set_light_state(&mut self, id: LightId, state: LightState) -> Result<()> {
        let light = self
            .lights
            .get_mut(&id)
            .with_context(|| format!("Unknown traffic light {:?}", id))?;
        debug!("Light {:?} set to {:?}", id, state);
        light.set_state(state);
        Ok(())
    }

    fn next_vehicle_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Place a stopped vehicle `along` units into an approach
    pub fn add_vehicle(
        &mut self,
        direction: Direction,
        road: RoadId,
        along: i32,
    ) -> Result<VehicleId> {
        let id = self.next_vehicle_id();
        let vehicle = Vehicle::new(id, &self.topology, direction, road, along)?;
        self.vehicles.push(vehicle);
        Ok(id)
    }

    /// Spawn at the entry point of an approach unless it is occupied
    pub fn try_spawn(&mut self, direction: Direction, road: RoadId) -> Result<Option<VehicleId>> {
        if self.topology.approach(direction, road).is_none() {
            bail!("No approach travelling {:?} on road {}", direction, road.0);
        }
        let spawned = self.spawn_at(direction, road)?;
        Ok(spawned.map(|vehicle| {
            let id = vehicle.id();
            self.vehicles.push(vehicle);
            id
        }))
    }

    /// Choose a random side, then a random lane on it
    fn spawn_random(&mut self) -> Option<Vehicle> {
        let direction = *self.choose_random(&Direction::ALL)?;
        let roads = self.topology.roads_toward(direction);
        let road = *self.choose_random(&roads)?;
        match self.spawn_at(direction, road) {
            Ok(vehicle) => vehicle,
            Err(e) => {
                warn!("Spawn on {:?} road {} failed: {:#}", direction, road.0, e);
                None
            }
        }
    }

    /// Build a vehicle at the entry point of an approach, or `None` if
    /// another vehicle is within the spawn clearance of it
    fn spawn_at(&mut self, direction: Direction, road: RoadId) -> Result<Option<Vehicle>> {
        let approach = self
            .topology
            .approach(direction, road)
            .with_context(|| format!("No approach travelling {:?} on road {}", direction, road.0))?;
        let entry = direction.progress(approach.entry);
        let along = approach.entry;

        let occupied = self.vehicles.iter().any(|vehicle| {
            vehicle.direction() == direction
                && vehicle.road() == road
                && (vehicle.progress() - entry).abs() <= self.config.spawn_clearance
        });
        if occupied {
            trace!("Tick {}: spawn on {:?} road {} rejected", self.tick, direction, road.0);
            self.stats.rejected_spawns += 1;
            return Ok(None);
        }

        let id = self.next_vehicle_id();
        let vehicle = Vehicle::new(id, &self.topology, direction, road, along)?;
        debug!(
            "Tick {}: spawned vehicle {:?} travelling {:?} on road {}",
            self.tick, id, direction, road.0
        );
        self.stats.spawned += 1;
        Ok(Some(vehicle))
    }

    /// Choose a random element from a slice, using seeded RNG if available
    fn choose_random<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        match &mut self.rng {
            Some(rng) => slice.choose(rng),
            None => slice.choose(&mut rand::rng()),
        }
    }

    /// Advance one tick. Returns `None` unless the clock is running.
    pub fn tick(&mut self) -> Option<Snapshot> {
        if self.state != ClockState::Running {
            warn!("Ignoring tick while {:?}", self.state);
            return None;
        }

        self.tick += 1;

        if let Some(controller) = self.controller.as_mut() {
            controller.update(self.tick, &mut self.lights);
        }

        let spawned = if self.tick % self.config.spawn_interval == 0 {
            self.spawn_random()
        } else {
            None
        };

        // Every decision reads the vehicles as they stood before this tick
        let peers = std::mem::take(&mut self.vehicles);
        let mut next = Vec::with_capacity(peers.len() + 1);
        for vehicle in &peers {
            let speed = vehicle.decide_speed(
                &self.lights,
                &self.topology,
                &peers,
                self.config.follow_distance,
            );
            let mut moved = vehicle.clone();
            moved.drive(speed);

            if self.topology.bounds().has_exited(moved.direction(), moved.position()) {
                debug!("Tick {}: vehicle {:?} left the world", self.tick, moved.id());
                self.stats.despawned += 1;
            } else {
                next.push(moved);
            }
        }
        // New vehicles start moving on their first decision next tick
        next.extend(spawned);
        self.vehicles = next;

        Some(self.snapshot())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            lights: self
                .lights
                .values()
                .map(|light| LightView {
                    id: light.id(),
                    position: light.position(),
                    state: light.state(),
                })
                .collect(),
            vehicles: self
                .vehicles
                .iter()
                .map(|vehicle| VehicleView {
                    id: vehicle.id(),
                    position: vehicle.position(),
                    direction: vehicle.direction(),
                    road: vehicle.road(),
                    speed: vehicle.speed(),
                })
                .collect(),
        }
    }

    /// Drive the clock like a per-frame callback would: tick while running,
    /// at most `max_ticks` times, handing each snapshot to `on_frame`.
    ///
    /// Returns the number of ticks run.
    pub fn run<F>(&mut self, max_ticks: u64, mut on_frame: F) -> u64
    where
        F: FnMut(&Snapshot) -> FrameControl,
    {
        let mut ticks = 0;
        while ticks < max_ticks && self.state == ClockState::Running {
            let Some(snapshot) = self.tick() else {
                break;
            };
            ticks += 1;
            if on_frame(&snapshot) == FrameControl::Stop {
                self.stop();
            }
        }
        ticks
    }
}
