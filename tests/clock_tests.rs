//! Clock lifecycle, spawning and despawning

use std::collections::BTreeMap;

use intersection_sim::simulation::layout::WORLD_WIDTH;
use intersection_sim::simulation::{
    ClockState, Direction, FrameControl, LightController, LightId, LightState, Position, RoadId,
    RoadTopology, SimConfig, SimulationClock, Speed, TrafficLight,
};

fn clock() -> SimulationClock {
    SimulationClock::standard().expect("standard clock should build")
}

#[test]
fn test_clock_starts_idle_and_inert() {
    let mut clock = clock();
    assert_eq!(clock.state(), ClockState::Idle);
    assert!(clock.tick().is_none());
    assert_eq!(clock.tick_count(), 0);
}

#[test]
fn test_clock_state_machine() {
    let mut clock = clock();
    clock.start();
    assert_eq!(clock.state(), ClockState::Running);
    clock.start();
    assert_eq!(clock.state(), ClockState::Running);

    let snapshot = clock.tick().expect("running clock ticks");
    assert_eq!(snapshot.tick, 1);

    clock.stop();
    assert_eq!(clock.state(), ClockState::Stopped);
    clock.stop();
    assert_eq!(clock.state(), ClockState::Stopped);

    clock.start();
    assert_eq!(clock.state(), ClockState::Stopped);
    assert!(clock.tick().is_none());
    assert_eq!(clock.tick_count(), 1);
}

#[test]
fn test_stop_before_start_prevents_ticks() {
    let mut clock = clock();
    clock.stop();
    assert_eq!(clock.state(), ClockState::Stopped);
    clock.start();
    assert!(clock.tick().is_none());
}

#[test]
fn test_invalid_config_is_rejected() {
    let topology = RoadTopology::standard().unwrap();
    let config = SimConfig {
        spawn_interval: 0,
        ..SimConfig::default()
    };
    assert!(SimulationClock::new(topology.clone(), config).is_err());

    let config = SimConfig {
        follow_distance: 0,
        ..SimConfig::default()
    };
    assert!(SimulationClock::new(topology, config).is_err());
}

#[test]
fn test_snapshot_lists_lights_in_id_order() {
    let clock = clock();
    let snapshot = clock.snapshot();
    let ids: Vec<u32> = snapshot.lights.iter().map(|light| light.id.0).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(snapshot.light(LightId(2)).unwrap().state, LightState::Red);
    assert_eq!(snapshot.light(LightId(8)).unwrap().position, Position::new(1090, 360));
    assert!(snapshot.vehicles.is_empty());
}

#[test]
fn test_vehicle_holds_at_red_then_proceeds_on_green() {
    let mut clock = clock();
    let id = clock.add_vehicle(Direction::Right, RoadId(1), 480).unwrap();
    clock.set_light_state(LightId(2), LightState::Red).unwrap();
    clock.start();

    let snapshot = clock.tick().unwrap();
    assert_eq!(snapshot.vehicle(id).unwrap().position.x, 480);
    assert_eq!(snapshot.vehicle(id).unwrap().speed, Speed::Stopped);

    clock.set_light_state(LightId(2), LightState::Green).unwrap();
    let snapshot = clock.tick().unwrap();
    assert_eq!(snapshot.vehicle(id).unwrap().position.x, 481);
    assert_eq!(snapshot.vehicle(id).unwrap().speed, Speed::Moving);
}

/// Two Right vehicles exactly one follow distance apart on open road, the
/// rear one stopped. Only vehicles ahead are considered, so the front one is
/// not held by the stopped vehicle behind it and pulls away.
#[test]
fn test_stopped_rear_vehicle_does_not_hold_front_vehicle() {
    let mut clock = clock();
    let rear = clock.add_vehicle(Direction::Right, RoadId(1), 100).unwrap();
    let front = clock.add_vehicle(Direction::Right, RoadId(1), 170).unwrap();
    assert_eq!(clock.vehicle(rear).unwrap().speed(), Speed::Stopped);
    clock.start();

    let snapshot = clock.tick().unwrap();
    let front_view = snapshot.vehicle(front).unwrap();
    assert_eq!(front_view.speed, Speed::Moving);
    assert_eq!(front_view.position.x, 171);
    // The rear vehicle saw a stopped vehicle exactly 70 ahead and waited
    let rear_view = snapshot.vehicle(rear).unwrap();
    assert_eq!(rear_view.speed, Speed::Stopped);
    assert_eq!(rear_view.position.x, 100);

    let snapshot = clock.tick().unwrap();
    assert_eq!(snapshot.vehicle(rear).unwrap().position.x, 101);
    assert_eq!(snapshot.vehicle(front).unwrap().position.x, 172);
}

#[test]
fn test_set_light_state_unknown_light() {
    let mut clock = clock();
    assert!(clock.set_light_state(LightId(42), LightState::Green).is_err());
}

#[test]
fn test_add_vehicle_rejects_unknown_approach() {
    let mut clock = clock();
    assert!(clock.add_vehicle(Direction::Left, RoadId(3), 100).is_err());
    assert!(clock.vehicles().is_empty());
}

#[test]
fn test_add_vehicle_rejects_position_outside_world() {
    let mut clock = clock();
    assert!(clock.add_vehicle(Direction::Right, RoadId(1), i32::MAX).is_err());
    assert!(clock.add_vehicle(Direction::Left, RoadId(1), i32::MIN).is_err());
    assert!(clock.add_vehicle(Direction::Down, RoadId(2), -1).is_err());
    assert!(clock.add_vehicle(Direction::Up, RoadId(3), 683).is_err());
    assert!(clock.vehicles().is_empty());

    // The clock keeps running normally after the rejections
    clock.start();
    assert!(clock.try_spawn(Direction::Left, RoadId(1)).unwrap().is_some());
    assert!(clock.tick().is_some());
}

#[test]
fn test_vehicle_despawns_after_leaving_world() {
    let mut clock = clock();
    let edge = clock.add_vehicle(Direction::Right, RoadId(1), WORLD_WIDTH).unwrap();
    let inside = clock.add_vehicle(Direction::Right, RoadId(2), WORLD_WIDTH - 1).unwrap();
    let left = clock.add_vehicle(Direction::Left, RoadId(1), 0).unwrap();
    let up = clock.add_vehicle(Direction::Up, RoadId(4), 0).unwrap();
    clock.start();

    let snapshot = clock.tick().unwrap();
    assert!(snapshot.vehicle(edge).is_none());
    assert!(snapshot.vehicle(left).is_none());
    assert!(snapshot.vehicle(up).is_none());
    assert_eq!(snapshot.vehicle(inside).unwrap().position.x, WORLD_WIDTH);
    assert_eq!(clock.stats().despawned, 3);

    let snapshot = clock.tick().unwrap();
    assert!(snapshot.vehicles.is_empty());
    assert_eq!(clock.stats().despawned, 4);
}

#[test]
fn test_try_spawn_places_vehicle_at_entry() {
    let mut clock = clock();
    let id = clock
        .try_spawn(Direction::Down, RoadId(3))
        .unwrap()
        .expect("empty approach accepts a spawn");
    let vehicle = clock.vehicle(id).unwrap();
    assert_eq!(vehicle.position(), Position::new(872, 0));
    assert_eq!(vehicle.direction(), Direction::Down);
    assert_eq!(vehicle.speed(), Speed::Stopped);
    assert_eq!(clock.stats().spawned, 1);
}

#[test]
fn test_try_spawn_respects_clearance() {
    let mut clock = clock();
    assert!(clock.try_spawn(Direction::Right, RoadId(1)).unwrap().is_some());
    assert!(clock.try_spawn(Direction::Right, RoadId(1)).unwrap().is_none());
    assert_eq!(clock.stats().rejected_spawns, 1);

    // Other lanes are unaffected
    assert!(clock.try_spawn(Direction::Right, RoadId(2)).unwrap().is_some());
    assert!(clock.try_spawn(Direction::Left, RoadId(1)).unwrap().is_some());
    assert_eq!(clock.vehicles().len(), 3);
}

#[test]
fn test_clearance_window_boundary() {
    let mut clock = clock();
    clock.add_vehicle(Direction::Up, RoadId(1), 682 - 70).unwrap();
    assert!(clock.try_spawn(Direction::Up, RoadId(1)).unwrap().is_none());

    let mut clock = self::clock();
    clock.add_vehicle(Direction::Up, RoadId(1), 682 - 71).unwrap();
    assert!(clock.try_spawn(Direction::Up, RoadId(1)).unwrap().is_some());
}

#[test]
fn test_try_spawn_rejects_unknown_approach() {
    let mut clock = clock();
    assert!(clock.try_spawn(Direction::Down, RoadId(9)).is_err());
}

#[test]
fn test_spawns_on_interval_and_waits_a_tick() {
    let mut clock = clock().with_seed(11);
    clock.start();

    let ran = clock.run(79, |_| FrameControl::Continue);
    assert_eq!(ran, 79);
    assert!(clock.vehicles().is_empty());

    let snapshot = clock.tick().unwrap();
    assert_eq!(snapshot.tick, 80);
    assert_eq!(snapshot.vehicles.len(), 1);
    let spawned = snapshot.vehicles[0];
    assert_eq!(spawned.speed, Speed::Stopped);
    let entry = clock
        .topology()
        .approach(spawned.direction, spawned.road)
        .unwrap()
        .entry_point();
    assert_eq!(spawned.position, entry);

    let snapshot = clock.tick().unwrap();
    let moved = snapshot.vehicle(spawned.id).unwrap();
    assert_eq!(moved.speed, Speed::Moving);
    assert_eq!(moved.position, spawned.direction.step(entry, 1));
}

#[test]
fn test_run_stops_from_callback() {
    let mut clock = clock();
    clock.start();
    let ran = clock.run(100, |snapshot| {
        if snapshot.tick == 5 {
            FrameControl::Stop
        } else {
            FrameControl::Continue
        }
    });
    assert_eq!(ran, 5);
    assert_eq!(clock.state(), ClockState::Stopped);
    assert!(clock.tick().is_none());
    assert_eq!(clock.tick_count(), 5);
}

#[test]
fn test_run_does_nothing_until_started() {
    let mut clock = clock();
    assert_eq!(clock.run(10, |_| FrameControl::Continue), 0);
    assert_eq!(clock.tick_count(), 0);
}

/// Turns light 2 green on a given tick
struct GreenAt(u64);

impl LightController for GreenAt {
    fn update(&mut self, tick: u64, lights: &mut BTreeMap<LightId, TrafficLight>) {
        if tick == self.0 {
            if let Some(light) = lights.get_mut(&LightId(2)) {
                light.set_state(LightState::Green);
            }
        }
    }
}

#[test]
fn test_controller_changes_lights_before_decisions() {
    let mut clock = clock().with_controller(Box::new(GreenAt(3)));
    let id = clock.add_vehicle(Direction::Right, RoadId(1), 480).unwrap();
    clock.start();

    clock.tick();
    clock.tick();
    assert_eq!(clock.vehicle(id).unwrap().position().x, 480);

    let snapshot = clock.tick().unwrap();
    assert_eq!(snapshot.light(LightId(2)).unwrap().state, LightState::Green);
    assert_eq!(snapshot.vehicle(id).unwrap().position.x, 481);
}

#[test]
fn test_seeded_runs_are_identical() {
    let mut first = clock().with_seed(2024);
    let mut second = clock().with_seed(2024);
    first.start();
    second.start();

    for _ in 0..3000 {
        assert_eq!(first.tick(), second.tick());
    }
    assert_eq!(first.stats(), second.stats());
    assert!(first.stats().spawned > 0);
}

#[test]
fn test_fixed_spawn_sequence_is_deterministic() {
    let sequence = [
        (Direction::Right, 1),
        (Direction::Up, 3),
        (Direction::Left, 2),
        (Direction::Down, 4),
        (Direction::Right, 1),
    ];

    let run = || {
        let config = SimConfig {
            spawn_interval: u64::MAX,
            ..SimConfig::default()
        };
        let mut clock = SimulationClock::new(RoadTopology::standard().unwrap(), config).unwrap();
        clock.start();
        let mut snapshots = Vec::new();
        for (direction, road) in sequence {
            clock.try_spawn(direction, RoadId(road)).unwrap();
            for _ in 0..40 {
                snapshots.push(clock.tick().unwrap());
            }
        }
        snapshots
    };

    assert_eq!(run(), run());
}
