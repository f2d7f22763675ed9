//! Light phase control
//!
//! A controller is the one collaborator the clock lets change light states
//! during a run. It is consulted once at the start of every tick.

use log::debug;
use std::collections::BTreeMap;

use super::traffic_light::{LightState, TrafficLight};
use super::types::LightId;

pub trait LightController {
    /// Update light states for tick `tick`
    fn update(&mut self, tick: u64, lights: &mut BTreeMap<LightId, TrafficLight>);
}

/// Cycles every light Green -> Yellow -> Red with fixed durations.
///
/// Each light keeps its own timer so lights that start in different states
/// stay out of step with each other.
#[derive(Debug, Clone)]
pub struct FixedCycle {
    green_ticks: u64,
    yellow_ticks: u64,
    red_ticks: u64,
    /// State each light was last seen in and ticks spent in it
    since: BTreeMap<LightId, (LightState, u64)>,
}

impl FixedCycle {
    /// Durations of zero are raised to one tick
    pub fn new(green_ticks: u64, yellow_ticks: u64, red_ticks: u64) -> Self {
        Self {
            green_ticks: green_ticks.max(1),
            yellow_ticks: yellow_ticks.max(1),
            red_ticks: red_ticks.max(1),
            since: BTreeMap::new(),
        }
    }

    pub fn duration(&self, state: LightState) -> u64 {
        match state {
            LightState::Green => self.green_ticks,
            LightState::Yellow => self.yellow_ticks,
            LightState::Red => self.red_ticks,
        }
    }

    /// Length of one full cycle
    pub fn period(&self) -> u64 {
        self.green_ticks + self.yellow_ticks + self.red_ticks
    }
}

impl Default for FixedCycle {
    fn default() -> Self {
        Self::new(240, 60, 300)
    }
}

impl LightController for FixedCycle {
    fn update(&mut self, tick: u64, lights: &mut BTreeMap<LightId, TrafficLight>) {
        for (id, light) in lights.iter_mut() {
            let state = light.state();
            let limit = self.duration(state);
            let entry = self.since.entry(*id).or_insert((state, 0));
            // Restart the timer if something else changed the light
            if entry.0 != state {
                *entry = (state, 0);
            }
            entry.1 += 1;

            if entry.1 > limit {
                let next = state.next();
                debug!("Tick {}: light {:?} {:?} -> {:?}", tick, id, state, next);
                light.set_state(next);
                *entry = (next, 1);
            }
        }
    }
}
