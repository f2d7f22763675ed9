//! The fixed intersection grid
//!
//! Two horizontal roads cross four vertical roads, giving a 4x2 grid of
//! intersections with one light each. Lights are numbered row by row,
//! 1..=4 on the top row and 5..=8 on the bottom row.

use anyhow::Result;

use super::topology::{RoadTopology, TopologyBuilder, WorldBounds};
use super::traffic_light::LightState;
use super::types::{Direction, LightId, Position, RoadId};

pub const WORLD_WIDTH: i32 = 1364;
pub const WORLD_HEIGHT: i32 = 682;

pub const COLUMNS: usize = 4;
pub const ROWS: usize = 2;

pub const LIGHTS: [(Position, LightState); COLUMNS * ROWS] = [
    (Position::new(70, 20), LightState::Green),
    (Position::new(410, 20), LightState::Red),
    (Position::new(750, 20), LightState::Yellow),
    (Position::new(1090, 20), LightState::Green),
    (Position::new(70, 360), LightState::Red),
    (Position::new(410, 360), LightState::Yellow),
    (Position::new(750, 360), LightState::Green),
    (Position::new(1090, 360), LightState::Red),
];

/// Lane y coordinates, one road per intersection row
pub const RIGHT_LANES: [i32; ROWS] = [153, 493];
pub const LEFT_LANES: [i32; ROWS] = [188, 527];

/// Lane x coordinates, one road per intersection column
pub const UP_LANES: [i32; COLUMNS] = [153, 493, 835, 1177];
pub const DOWN_LANES: [i32; COLUMNS] = [190, 530, 872, 1212];

/// Stop lines for horizontal traffic, per intersection column
pub const RIGHT_STOP_LINES: [i32; COLUMNS] = [140, 480, 822, 1164];
pub const LEFT_STOP_LINES: [i32; COLUMNS] = [203, 543, 885, 1225];

/// Stop lines for vertical traffic, per intersection row
pub const DOWN_STOP_LINES: [i32; ROWS] = [140, 480];
pub const UP_STOP_LINES: [i32; ROWS] = [201, 540];

pub fn light_at(row: usize, column: usize) -> LightId {
    LightId((row * COLUMNS + column + 1) as u32)
}

pub fn standard_topology() -> Result<RoadTopology> {
    let mut builder = TopologyBuilder::new(WorldBounds::new(WORLD_WIDTH, WORLD_HEIGHT));

    for (index, (position, state)) in LIGHTS.iter().enumerate() {
        builder.light(LightId(index as u32 + 1), *position, *state);
    }

    for row in 0..ROWS {
        for column in 0..COLUMNS {
            let light = light_at(row, column);
            builder
                .stop_line(light, Direction::Right, RIGHT_STOP_LINES[column])
                .stop_line(light, Direction::Left, LEFT_STOP_LINES[column])
                .stop_line(light, Direction::Down, DOWN_STOP_LINES[row])
                .stop_line(light, Direction::Up, UP_STOP_LINES[row]);
        }
    }

    for row in 0..ROWS {
        let road = RoadId(row as u32 + 1);
        builder.approach(
            Direction::Right,
            road,
            RIGHT_LANES[row],
            0,
            (0..COLUMNS).map(|column| (RIGHT_STOP_LINES[column], light_at(row, column))),
        );
        builder.approach(
            Direction::Left,
            road,
            LEFT_LANES[row],
            WORLD_WIDTH,
            (0..COLUMNS)
                .rev()
                .map(|column| (LEFT_STOP_LINES[column], light_at(row, column))),
        );
    }

    for column in 0..COLUMNS {
        let road = RoadId(column as u32 + 1);
        builder.approach(
            Direction::Down,
            road,
            DOWN_LANES[column],
            0,
            (0..ROWS).map(|row| (DOWN_STOP_LINES[row], light_at(row, column))),
        );
        builder.approach(
            Direction::Up,
            road,
            UP_LANES[column],
            WORLD_HEIGHT,
            (0..ROWS)
                .rev()
                .map(|row| (UP_STOP_LINES[row], light_at(row, column))),
        );
    }

    builder.build()
}
