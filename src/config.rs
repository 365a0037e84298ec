// src/config.rs
use bevy::prelude::*;
use std::time::Duration;

use crate::tasks::SimContext;

pub const OUT_OF_BOUNDS_DISTANCE: f32 = 100.0;
pub const MIN_CHAIN_DISTANCE: f32 = 0.5;
pub const CHAIN_SPAWN_OFFSET: f32 = 1.0;
pub const EFFECT_PROBE_RADIUS: f32 = 1.0;
pub const PHYSICS_CONTACT_RADIUS: f32 = 0.5;
pub const HIT_EFFECT_LIFETIME_SECS: f32 = 2.0;
pub const CHAIN_EFFECT_LIFETIME_SECS: f32 = 1.0;
pub const DEFAULT_PROJECTILE_DAMAGE: f32 = 10.0;
pub const DEFAULT_POOL_CAPACITY: usize = 256;

#[derive(Resource, Debug, Clone)]
pub struct CombatConfig {
    /// Physics-mode projectiles farther than this from their spawn point are released.
    pub out_of_bounds_distance: f32,
    pub min_chain_distance: f32,
    pub chain_spawn_offset: f32,
    pub effect_probe_radius: f32,
    pub physics_contact_radius: f32,
    pub hit_effect_lifetime: Duration,
    pub chain_effect_lifetime: Duration,
    /// `None` lets the pool grow without bound.
    pub pool_capacity: Option<usize>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            out_of_bounds_distance: OUT_OF_BOUNDS_DISTANCE,
            min_chain_distance: MIN_CHAIN_DISTANCE,
            chain_spawn_offset: CHAIN_SPAWN_OFFSET,
            effect_probe_radius: EFFECT_PROBE_RADIUS,
            physics_contact_radius: PHYSICS_CONTACT_RADIUS,
            hit_effect_lifetime: Duration::from_secs_f32(HIT_EFFECT_LIFETIME_SECS),
            chain_effect_lifetime: Duration::from_secs_f32(CHAIN_EFFECT_LIFETIME_SECS),
            pool_capacity: Some(DEFAULT_POOL_CAPACITY),
        }
    }
}

/// Global time multiplier. Zero pauses every projectile without losing progress.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimulationSpeed {
    pub multiplier: f32,
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SimulationSpeed {
    pub fn is_paused(&self) -> bool {
        self.multiplier == 0.0
    }

    /// Tick context for a frame of `delta` real time at this speed.
    pub fn context(&self, delta: Duration) -> SimContext {
        SimContext::new(delta, self.multiplier)
    }
}
