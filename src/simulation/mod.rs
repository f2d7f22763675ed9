//! Signalized intersection grid simulation
//!
//! This module contains the agent simulation engine: traffic light state,
//! the road topology tables, per-vehicle stop/go decisions and the clock
//! that spawns, advances and removes vehicles. Rendering lives elsewhere and
//! only ever sees [`Snapshot`]s.

mod clock;
mod config;
pub mod layout;
mod phase;
mod snapshot;
mod topology;
mod traffic_light;
mod types;
mod vehicle;

pub use clock::{ClockState, SimStats, SimulationClock};
pub use config::{SimConfig, FOLLOW_DISTANCE, SPAWN_CLEARANCE, SPAWN_INTERVAL};
pub use phase::{FixedCycle, LightController};
pub use snapshot::{FrameControl, LightView, Snapshot, VehicleView};
pub use topology::{Approach, LightPlacement, RoadTopology, TopologyBuilder, WorldBounds};
pub use traffic_light::{LightState, TrafficLight};
pub use types::{Direction, LightId, Position, RoadId, VehicleId};
pub use vehicle::{Speed, Vehicle};
