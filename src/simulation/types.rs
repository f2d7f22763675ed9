//! Core types for the intersection simulation
//!
//! Ids, integer positions and the four axis-aligned travel directions.

/// Identifier of a traffic light. Always positive; "no light" is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub u32);

/// Identifies one of the parallel lanes on an approach (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoadId(pub u32);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub u64);

/// A 2D position in world units. The y axis grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
    ];

    /// Left/Right travel along the x axis
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Coordinate on the axis of travel
    pub fn axis(self, position: Position) -> i32 {
        if self.is_horizontal() {
            position.x
        } else {
            position.y
        }
    }

    /// Coordinate on the axis orthogonal to travel
    pub fn cross_axis(self, position: Position) -> i32 {
        if self.is_horizontal() {
            position.y
        } else {
            position.x
        }
    }

    /// Signed distance travelled along the axis: larger means further along.
    ///
    /// Right/Down move towards increasing coordinates, Left/Up towards
    /// decreasing ones, so the latter are negated.
    pub fn progress(self, axis_value: i32) -> i32 {
        match self {
            Direction::Right | Direction::Down => axis_value,
            Direction::Left | Direction::Up => -axis_value,
        }
    }

    /// Build a position from an axis coordinate and a cross-axis (lane) coordinate
    pub fn compose(self, axis_value: i32, lane: i32) -> Position {
        if self.is_horizontal() {
            Position::new(axis_value, lane)
        } else {
            Position::new(lane, axis_value)
        }
    }

    /// Move `position` by `units` in this direction
    pub fn step(self, position: Position, units: i32) -> Position {
        match self {
            Direction::Right => Position::new(position.x + units, position.y),
            Direction::Left => Position::new(position.x - units, position.y),
            Direction::Down => Position::new(position.x, position.y + units),
            Direction::Up => Position::new(position.x, position.y - units),
        }
    }
}
