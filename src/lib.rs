//! Combat core for a tower-defense game: pooled projectiles, chain bounces, status effects and
//! the lifetime countdown bounding each flight.
//!
//! The core is engine-agnostic behind [`target::Battlefield`], [`skills::SkillDefinitionStore`],
//! [`visual_effects::VisualLibrary`] and [`visual_effects::EffectSink`]. [`CombatPlugin`] wires
//! it into a Bevy app.

use bevy::prelude::*;

pub mod arena;
pub mod chain;
pub mod combat;
pub mod components;
pub mod config;
pub mod enemy;
pub mod error;
pub mod lifetime;
pub mod pool;
pub mod projectile;
pub mod skills;
pub mod status_effects;
pub mod support;
pub mod target;
pub mod tasks;
pub mod visual_effects;

use arena::ProjectilePlugin;
use enemy::EnemyPlugin;
use skills::SkillsPlugin;
use status_effects::StatusEffectsPlugin;
use support::SupportPlugin;
use visual_effects::VisualEffectsPlugin;

/// Frame ordering of the combat systems.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatSet {
    Movement,
    Status,
    Launch,
    Projectiles,
    Cleanup,
}

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                CombatSet::Movement,
                CombatSet::Status,
                CombatSet::Launch,
                CombatSet::Projectiles,
                CombatSet::Cleanup,
            )
                .chain(),
        )
        .add_plugins((
            SkillsPlugin,
            SupportPlugin,
            VisualEffectsPlugin,
            StatusEffectsPlugin,
            EnemyPlugin,
            ProjectilePlugin,
        ));
    }
}
