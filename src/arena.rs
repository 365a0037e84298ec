// src/arena.rs
//! Bevy systems that drive the projectile runner from events and the frame clock.

use bevy::prelude::*;
use std::sync::{Arc, Mutex};

use crate::combat::{CombatEnv, ProjectileHandle, ProjectileSystem};
use crate::config::{CombatConfig, SimulationSpeed};
use crate::enemy::EnemyField;
use crate::projectile::{ArrivalCallback, EffectLaunchParams, LaunchParams, Termination};
use crate::skills::SkillDatabase;
use crate::visual_effects::{EffectCatalog, ProjectileVisual};
use crate::CombatSet;

#[derive(Event, Debug, Clone, Copy)]
pub enum LaunchProjectile {
    Skill(LaunchParams),
    /// `tag` is echoed back in the matching [`ProjectileArrived`].
    Effect { params: EffectLaunchParams, tag: u32 },
    Basic { origin: Vec3, target: Vec3, speed: f32, lifetime: f32 },
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ProjectileArrived {
    pub tag: u32,
    pub position: Vec3,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileResolved {
    pub handle: ProjectileHandle,
    pub termination: Termination,
}

/// Arrival callbacks run inside the runner, so they queue here and are turned into events
/// by a later system.
#[derive(Resource, Default, Clone)]
pub struct ArrivalQueue(Arc<Mutex<Vec<ProjectileArrived>>>);

impl ArrivalQueue {
    pub fn callback(&self, tag: u32) -> ArrivalCallback {
        let queue = Arc::clone(&self.0);
        Box::new(move |position| match queue.lock() {
            Ok(mut pending) => pending.push(ProjectileArrived { tag, position }),
            Err(_) => error!("Arrival queue poisoned, dropping arrival {}", tag),
        })
    }

    fn drain(&self) -> Vec<ProjectileArrived> {
        match self.0.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => Vec::new(),
        }
    }
}

fn launch_projectile_system(
    mut commands: Commands,
    mut requests: EventReader<LaunchProjectile>,
    mut system: ResMut<ProjectileSystem>,
    mut field: EnemyField,
    skills: Res<SkillDatabase>,
    catalog: Res<EffectCatalog>,
    arrivals: Res<ArrivalQueue>,
) {
    let mut env = CombatEnv::new(&mut field, &*skills, &*catalog, &mut commands);
    for request in requests.read() {
        let launched = match *request {
            LaunchProjectile::Skill(params) => system.launch(params, &mut env),
            LaunchProjectile::Effect { params, tag } => {
                system.launch_effect(params, Some(arrivals.callback(tag)), &mut env)
            }
            LaunchProjectile::Basic { origin, target, speed, lifetime } => {
                system.launch_basic(origin, target, speed, lifetime)
            }
        };
        if let Err(err) = launched {
            warn!("Launch request dropped: {}", err);
        }
    }
}

fn projectile_tick_system(
    mut commands: Commands,
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut system: ResMut<ProjectileSystem>,
    mut field: EnemyField,
    skills: Res<SkillDatabase>,
    catalog: Res<EffectCatalog>,
    mut resolved: EventWriter<ProjectileResolved>,
) {
    let ctx = speed.context(time.delta());
    let mut env = CombatEnv::new(&mut field, &*skills, &*catalog, &mut commands);
    for (handle, termination) in system.tick(&ctx, &mut env) {
        resolved.send(ProjectileResolved { handle, termination });
    }
}

fn projectile_visual_sync_system(
    mut commands: Commands,
    system: Res<ProjectileSystem>,
    mut visuals: Query<(Entity, &ProjectileVisual, &mut Transform)>,
) {
    for (entity, visual, mut transform) in visuals.iter_mut() {
        match system.instance(visual.projectile) {
            Some(instance) if instance.skill_visuals().projectile == Some(visual.visual) => {
                transform.translation = instance.position();
                transform.rotation = instance.rotation();
            }
            _ => commands.entity(entity).despawn_recursive(),
        }
    }
}

fn forward_arrivals_system(queue: Res<ArrivalQueue>, mut arrived: EventWriter<ProjectileArrived>) {
    for arrival in queue.drain() {
        arrived.send(arrival);
    }
}

/// Releases every projectile in flight, e.g. when a stage ends.
pub fn despawn_all_projectiles(mut system: ResMut<ProjectileSystem>) {
    system.despawn_all();
}

pub struct ProjectilePlugin;

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        let config = app.world.get_resource::<CombatConfig>().cloned().unwrap_or_default();
        if !app.world.contains_resource::<ProjectileSystem>() {
            app.insert_resource(ProjectileSystem::new(config.clone()));
        }
        app.insert_resource(config)
            .init_resource::<SimulationSpeed>()
            .init_resource::<SkillDatabase>()
            .init_resource::<EffectCatalog>()
            .init_resource::<ArrivalQueue>()
            .add_event::<LaunchProjectile>()
            .add_event::<ProjectileArrived>()
            .add_event::<ProjectileResolved>()
            .add_systems(Update, launch_projectile_system.in_set(CombatSet::Launch))
            .add_systems(
                Update,
                (projectile_tick_system, projectile_visual_sync_system, forward_arrivals_system)
                    .chain()
                    .in_set(CombatSet::Projectiles),
            );
    }
}
