//! Simulation tuning constants

use anyhow::{bail, Result};

/// Ticks between spawn attempts
pub const SPAWN_INTERVAL: u64 = 80;

/// Spacing at which a vehicle queues behind a stopped vehicle ahead
pub const FOLLOW_DISTANCE: i32 = 70;

/// A spawn is rejected while any vehicle on the approach is this close to the entry point
pub const SPAWN_CLEARANCE: i32 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub spawn_interval: u64,
    pub follow_distance: i32,
    pub spawn_clearance: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spawn_interval: SPAWN_INTERVAL,
            follow_distance: FOLLOW_DISTANCE,
            spawn_clearance: SPAWN_CLEARANCE,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if self.spawn_interval == 0 {
            bail!("Spawn interval must be at least one tick");
        }
        if self.follow_distance <= 0 {
            bail!("Follow distance must be positive, got {}", self.follow_distance);
        }
        if self.spawn_clearance < 0 {
            bail!("Spawn clearance cannot be negative, got {}", self.spawn_clearance);
        }
        Ok(())
    }
}
