// src/visual_effects.rs
use bevy::prelude::*;
use bevy::utils::HashMap;
use std::time::Duration;

use crate::config::SimulationSpeed;
use crate::pool::PoolHandle;
use crate::skills::{
    SkillId, ARCANE_VOLLEY, BURN_SUPPORT, CHAIN_LIGHTNING_SUPPORT, FOCUS_MARK_SUPPORT, FROST_SHARD,
    FROST_SUPPORT, MAGIC_BOLT,
};
use crate::support::SupportId;
use crate::CombatSet;

/// Opaque handle to a renderable effect resolved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub struct VisualId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Default)]
pub struct MainSkillVisuals {
    pub projectile: Option<VisualId>,
    pub hit: Option<VisualId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Default)]
pub struct SupportVisuals {
    pub cc: Option<VisualId>,
    pub dot: Option<VisualId>,
    pub mark: Option<VisualId>,
    pub chain: Option<VisualId>,
}

pub trait VisualLibrary {
    fn main_skill_visuals(&self, id: SkillId) -> Option<MainSkillVisuals>;
    fn support_visuals(&self, id: SupportId) -> Option<SupportVisuals>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualSpawn {
    pub visual: VisualId,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub lifetime: Duration,
}

/// Fire-and-forget visual output. Spawned effects expire on their own.
pub trait EffectSink {
    fn spawn_transient(&mut self, spawn: VisualSpawn);

    /// Attaches a visual that follows the projectile until it is released.
    fn attach(&mut self, _projectile: PoolHandle, _visual: VisualId, _rotation: Quat) {}
}

#[derive(Resource, Default, Reflect)]
#[reflect(Resource)]
pub struct EffectCatalog {
    pub main_skills: HashMap<SkillId, MainSkillVisuals>,
    pub supports: HashMap<SupportId, SupportVisuals>,
}

impl VisualLibrary for EffectCatalog {
    fn main_skill_visuals(&self, id: SkillId) -> Option<MainSkillVisuals> {
        self.main_skills.get(&id).copied()
    }

    fn support_visuals(&self, id: SupportId) -> Option<SupportVisuals> {
        self.supports.get(&id).copied()
    }
}

impl EffectCatalog {
    pub fn with_defaults() -> Self {
        let mut catalog = Self::default();
        populate_defaults(&mut catalog);
        catalog
    }
}

fn populate_defaults(catalog: &mut EffectCatalog) {
    catalog.main_skills.insert(
        MAGIC_BOLT,
        MainSkillVisuals { projectile: Some(VisualId(1)), hit: Some(VisualId(2)) },
    );
    catalog.main_skills.insert(
        ARCANE_VOLLEY,
        MainSkillVisuals { projectile: Some(VisualId(3)), hit: Some(VisualId(2)) },
    );
    // frost shard has no dedicated hit burst yet
    catalog.main_skills.insert(FROST_SHARD, MainSkillVisuals { projectile: Some(VisualId(4)), hit: None });

    catalog.supports.insert(FROST_SUPPORT, SupportVisuals { cc: Some(VisualId(101)), ..default() });
    catalog.supports.insert(BURN_SUPPORT, SupportVisuals { dot: Some(VisualId(102)), ..default() });
    catalog.supports.insert(FOCUS_MARK_SUPPORT, SupportVisuals { mark: Some(VisualId(103)), ..default() });
    catalog.supports.insert(CHAIN_LIGHTNING_SUPPORT, SupportVisuals { chain: Some(VisualId(104)), ..default() });
}

fn populate_effect_catalog(mut catalog: ResMut<EffectCatalog>) {
    if catalog.main_skills.is_empty() && catalog.supports.is_empty() {
        populate_defaults(&mut catalog);
    }
}

#[derive(Component, Debug)]
pub struct TransientEffect {
    pub visual: VisualId,
    pub timer: Timer,
}

#[derive(Component, Debug)]
pub struct ProjectileVisual {
    pub projectile: PoolHandle,
    pub visual: VisualId,
}

impl EffectSink for Commands<'_, '_> {
    fn spawn_transient(&mut self, spawn: VisualSpawn) {
        self.spawn((
            SpatialBundle::from_transform(Transform {
                translation: spawn.position,
                rotation: spawn.rotation,
                scale: spawn.scale,
            }),
            TransientEffect { visual: spawn.visual, timer: Timer::new(spawn.lifetime, TimerMode::Once) },
            Name::new("TransientEffect"),
        ));
    }

    fn attach(&mut self, projectile: PoolHandle, visual: VisualId, rotation: Quat) {
        self.spawn((
            SpatialBundle::from_transform(Transform::from_rotation(rotation)),
            ProjectileVisual { projectile, visual },
            Name::new("ProjectileVisual"),
        ));
    }
}

fn transient_effect_despawn_system(
    mut commands: Commands,
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut query: Query<(Entity, &mut TransientEffect)>,
) {
    if speed.is_paused() {
        return;
    }
    let delta = speed.context(time.delta()).scaled_delta();
    for (entity, mut effect) in query.iter_mut() {
        effect.timer.tick(delta);
        if effect.timer.finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

pub struct VisualEffectsPlugin;

impl Plugin for VisualEffectsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<VisualId>()
            .register_type::<MainSkillVisuals>()
            .register_type::<SupportVisuals>()
            .register_type::<EffectCatalog>()
            .init_resource::<EffectCatalog>()
            .init_resource::<SimulationSpeed>()
            .add_systems(Startup, populate_effect_catalog)
            .add_systems(Update, transient_effect_despawn_system.in_set(CombatSet::Cleanup));
    }
}
