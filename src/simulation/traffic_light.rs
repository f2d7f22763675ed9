//! Traffic light state
//!
//! A light is a value holder with one mutator. Whether a state halts traffic
//! depends on the direction the vehicle is travelling.

use super::types::{Direction, LightId, Position};

/// The state of a traffic light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightState {
    Red,
    Yellow,
    Green,
}

impl LightState {
    /// Whether a vehicle travelling in `direction` must hold at its stop line.
    ///
    /// Left/Right traffic holds on anything but green. Up/Down traffic holds on
    /// anything but red. The asymmetry is a fixed rule of the simulation.
    pub fn halts(self, direction: Direction) -> bool {
        if direction.is_horizontal() {
            self != LightState::Green
        } else {
            self != LightState::Red
        }
    }

    /// The state that follows this one in a regular cycle
    pub fn next(self) -> LightState {
        match self {
            LightState::Green => LightState::Yellow,
            LightState::Yellow => LightState::Red,
            LightState::Red => LightState::Green,
        }
    }
}

/// A traffic light at a fixed position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficLight {
    id: LightId,
    position: Position,
    state: LightState,
}

impl TrafficLight {
    pub fn new(id: LightId, position: Position, state: LightState) -> Self {
        Self {
            id,
            position,
            state,
        }
    }

    pub fn id(&self) -> LightId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn state(&self) -> LightState {
        self.state
    }

    /// Overwrite the current state
    pub fn set_state(&mut self, state: LightState) {
        self.state = state;
    }
}
