//! Road topology lookup tables
//!
//! Each approach (a direction plus a road id) is cut into ordered segments,
//! each governed by one traffic light. A second table maps a light and a
//! travel direction to the stop line a vehicle must not cross while that
//! light halts its direction.

use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, HashMap};

use super::layout;
use super::traffic_light::LightState;
use super::types::{Direction, LightId, Position, RoadId};

/// The visible world. Vehicles are removed once they leave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldBounds {
    pub width: i32,
    pub height: i32,
}

impl WorldBounds {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        (0..=self.width).contains(&position.x) && (0..=self.height).contains(&position.y)
    }

    /// Whether a vehicle travelling in `direction` has moved strictly past
    /// the far edge of the world
    pub fn has_exited(&self, direction: Direction, position: Position) -> bool {
        match direction {
            Direction::Right => position.x > self.width,
            Direction::Left => position.x < 0,
            Direction::Down => position.y > self.height,
            Direction::Up => position.y < 0,
        }
    }

    /// Size of the world along the axis of travel
    pub fn axis_extent(&self, direction: Direction) -> i32 {
        if direction.is_horizontal() {
            self.width
        } else {
            self.height
        }
    }

    fn cross_extent(&self, direction: Direction) -> i32 {
        if direction.is_horizontal() {
            self.height
        } else {
            self.width
        }
    }
}

/// Where a light stands and what it shows when the simulation starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightPlacement {
    pub id: LightId,
    pub position: Position,
    pub initial_state: LightState,
}

/// One directional lane leading through the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approach {
    pub direction: Direction,
    pub road: RoadId,
    /// Cross-axis coordinate of the lane
    pub lane: i32,
    /// Axis coordinate of the spawn point on the world edge
    pub entry: i32,
    /// Segment end (as travel progress, inclusive) -> governing light
    segments: BTreeMap<i32, LightId>,
}

impl Approach {
    pub fn entry_point(&self) -> Position {
        self.direction.compose(self.entry, self.lane)
    }

    /// Light governing the segment that contains `axis_value`.
    ///
    /// A segment runs from just past the previous threshold up to and
    /// including its own, so a position equal to a threshold belongs to the
    /// segment ending there.
    pub fn governing_light(&self, axis_value: i32) -> Option<LightId> {
        let progress = self.direction.progress(axis_value);
        self.segments
            .range(progress..)
            .next()
            .map(|(_, light)| *light)
    }

    /// Segment thresholds in travel order, as axis coordinates
    pub fn segments(&self) -> impl Iterator<Item = (i32, LightId)> + '_ {
        self.segments
            .iter()
            .map(|(progress, light)| (self.direction.progress(*progress), *light))
    }
}

/// Static lookup tables for the intersection grid
#[derive(Debug, Clone)]
pub struct RoadTopology {
    bounds: WorldBounds,
    lights: Vec<LightPlacement>,
    approaches: BTreeMap<(Direction, RoadId), Approach>,
    stop_lines: HashMap<(LightId, Direction), i32>,
}

impl RoadTopology {
    /// The fixed 4x2 grid of signalized intersections
    pub fn standard() -> Result<Self> {
        layout::standard_topology()
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Light placements ordered by id
    pub fn lights(&self) -> &[LightPlacement] {
        &self.lights
    }

    pub fn approach(&self, direction: Direction, road: RoadId) -> Option<&Approach> {
        self.approaches.get(&(direction, road))
    }

    pub fn approaches(&self) -> impl Iterator<Item = &Approach> {
        self.approaches.values()
    }

    /// Road ids of every approach travelling in `direction`, ascending
    pub fn roads_toward(&self, direction: Direction) -> Vec<RoadId> {
        self.approaches
            .keys()
            .filter(|(d, _)| *d == direction)
            .map(|(_, road)| *road)
            .collect()
    }

    /// The light governing a vehicle at `position`, or `None` once it has
    /// passed every light on its approach
    pub fn governing_light(
        &self,
        direction: Direction,
        road: RoadId,
        position: Position,
    ) -> Option<LightId> {
        self.approach(direction, road)?
            .governing_light(direction.axis(position))
    }

    /// Axis coordinate of the stop line `light` imposes on `direction`
    pub fn stop_line(&self, light: LightId, direction: Direction) -> Option<i32> {
        self.stop_lines.get(&(light, direction)).copied()
    }
}

/// Collects topology tables and validates them into a [`RoadTopology`]
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    bounds: WorldBounds,
    lights: Vec<LightPlacement>,
    stop_lines: Vec<(LightId, Direction, i32)>,
    approaches: Vec<ApproachSpec>,
}

#[derive(Debug, Clone)]
struct ApproachSpec {
    direction: Direction,
    road: RoadId,
    lane: i32,
    entry: i32,
    segments: Vec<(i32, LightId)>,
}

impl TopologyBuilder {
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            lights: Vec::new(),
            stop_lines: Vec::new(),
            approaches: Vec::new(),
        }
    }

    pub fn light(
        &mut self,
        id: LightId,
        position: Position,
        initial_state: LightState,
    ) -> &mut Self {
        self.lights.push(LightPlacement {
            id,
            position,
            initial_state,
        });
        self
    }

    pub fn stop_line(
        &mut self,
        light: LightId,
        direction: Direction,
        coordinate: i32,
    ) -> &mut Self {
        self.stop_lines.push((light, direction, coordinate));
        self
    }

    /// Add an approach. `segments` are `(threshold, light)` pairs in travel
    /// order, thresholds given as axis coordinates.
    pub fn approach(
        &mut self,
        direction: Direction,
        road: RoadId,
        lane: i32,
        entry: i32,
        segments: impl IntoIterator<Item = (i32, LightId)>,
    ) -> &mut Self {
        self.approaches.push(ApproachSpec {
            direction,
            road,
            lane,
            entry,
            segments: segments.into_iter().collect(),
        });
        self
    }

    pub fn build(&self) -> Result<RoadTopology> {
        let bounds = self.bounds;
        if bounds.width <= 0 || bounds.height <= 0 {
            bail!("World bounds must be positive, got {}x{}", bounds.width, bounds.height);
        }

        let mut lights = self.lights.clone();
        lights.sort_by_key(|light| light.id);
        for pair in lights.windows(2) {
            if pair[0].id == pair[1].id {
                bail!("Duplicate traffic light {:?}", pair[0].id);
            }
        }
        for light in &lights {
            if light.id.0 == 0 {
                bail!("Traffic light ids must be positive");
            }
            if !bounds.contains(light.position) {
                bail!("Traffic light {:?} at {:?} is outside the world", light.id, light.position);
            }
        }
        let known_light = |id: LightId| lights.binary_search_by_key(&id, |l| l.id).is_ok();

        let mut stop_lines = HashMap::new();
        for &(light, direction, coordinate) in &self.stop_lines {
            if !known_light(light) {
                bail!("Stop line references unknown light {:?}", light);
            }
            if !(0..=bounds.axis_extent(direction)).contains(&coordinate) {
                bail!("Stop line {} of light {:?} is outside the world", coordinate, light);
            }
            if stop_lines.insert((light, direction), coordinate).is_some() {
                bail!("Duplicate stop line for light {:?} travelling {:?}", light, direction);
            }
        }

        let mut approaches = BTreeMap::new();
        for spec in &self.approaches {
            let approach = spec
                .validate(bounds, &stop_lines, &known_light)
                .with_context(|| {
                    format!("Invalid approach {:?} road {:?}", spec.direction, spec.road.0)
                })?;
            if approaches
                .insert((spec.direction, spec.road), approach)
                .is_some()
            {
                bail!("Duplicate approach {:?} road {:?}", spec.direction, spec.road.0);
            }
        }

        Ok(RoadTopology {
            bounds,
            lights,
            approaches,
            stop_lines,
        })
    }
}

impl ApproachSpec {
    fn validate(
        &self,
        bounds: WorldBounds,
        stop_lines: &HashMap<(LightId, Direction), i32>,
        known_light: &impl Fn(LightId) -> bool,
    ) -> Result<Approach> {
        let direction = self.direction;
        if self.road.0 == 0 {
            bail!("Road ids must be positive");
        }
        if !(0..=bounds.cross_extent(direction)).contains(&self.lane) {
            bail!("Lane coordinate {} is outside the world", self.lane);
        }
        let extent = bounds.axis_extent(direction);
        if !(0..=extent).contains(&self.entry) {
            bail!("Entry coordinate {} is outside the world", self.entry);
        }

        let mut segments = BTreeMap::new();
        let mut previous: Option<i32> = None;
        for &(threshold, light) in &self.segments {
            if !known_light(light) {
                bail!("Segment references unknown light {:?}", light);
            }
            if !(0..=extent).contains(&threshold) {
                bail!("Segment threshold {} is outside the world", threshold);
            }
            let end = direction.progress(threshold);
            if previous.is_some_and(|p| end <= p) {
                bail!("Segment threshold {} is out of travel order", threshold);
            }
            let stop = stop_lines.get(&(light, direction)).with_context(|| {
                format!("Light {:?} has no stop line for {:?}", light, direction)
            })?;
            let stop_progress = direction.progress(*stop);
            if stop_progress > end || previous.is_some_and(|p| stop_progress <= p) {
                bail!(
                    "Stop line {} of light {:?} lies outside its segment ending at {}",
                    stop,
                    light,
                    threshold
                );
            }
            segments.insert(end, light);
            previous = Some(end);
        }

        Ok(Approach {
            direction,
            road: self.road,
            lane: self.lane,
            entry: self.entry,
            segments,
        })
    }
}
