use bevy::ecs::system::RunSystemOnce;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy::utils::HashMap;
use rand::Rng;
use std::time::Duration;

use library_defense::arena::{despawn_all_projectiles, LaunchProjectile, ProjectileArrived, ProjectileResolved};
use library_defense::combat::ProjectileSystem;
use library_defense::components::{Lane, Tower};
use library_defense::enemy::{despawn_all_enemies, spawn_enemy, spawn_surface, Enemy, EnemyDefeated, EnemyKind};
use library_defense::projectile::{EffectLaunchParams, LaunchParams, Termination};
use library_defense::skills::{
    SkillDatabase, SkillDefinitionStore, BURN_SUPPORT, CHAIN_LIGHTNING_SUPPORT, FOCUS_MARK_SUPPORT, FROST_SHARD,
    FROST_SUPPORT, MAGIC_BOLT,
};
use library_defense::support::SupportId;
use library_defense::target::{SurfaceKind, Targetable};
use library_defense::{CombatPlugin, CombatSet};

const FRAMES: u32 = 1200;
const FRAME_SECS: f32 = 1.0 / 60.0;
const LANE_LENGTH: f32 = 40.0;
const MONSTER_COUNT: usize = 12;
const TOWER_POSITION: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const TOWER_RANGE: f32 = 30.0;
const TOWER_FIRE_INTERVAL_SECS: f32 = 0.4;
/// Every n-th shot is a frost shard lobbed as a visual-only effect.
const EFFECT_SHOT_EVERY: u32 = 5;

const SUPPORT_ROTATION: [SupportId; 4] = [CHAIN_LIGHTNING_SUPPORT, FROST_SUPPORT, BURN_SUPPORT, FOCUS_MARK_SUPPORT];

#[derive(Resource, Default)]
struct HarnessStats {
    shots: u32,
    terminations: HashMap<Termination, u32>,
    defeated: u32,
    arrivals: u32,
}

fn main() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(LogPlugin { filter: "wgpu=error,library_defense=debug".into(), ..default() })
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(FRAME_SECS)))
        .add_plugins(CombatPlugin)
        .init_resource::<HarnessStats>()
        .add_systems(Startup, setup_stage)
        .add_systems(Update, tower_fire_system.before(CombatSet::Launch).after(CombatSet::Status))
        .add_systems(Update, record_outcomes_system.after(CombatSet::Cleanup));

    app.finish();
    app.cleanup();
    for _ in 0..FRAMES {
        app.update();
    }

    app.world.run_system_once(despawn_all_projectiles);
    app.world.run_system_once(despawn_all_enemies);
    report(&app);
}

fn setup_stage(mut commands: Commands) {
    let mut rng = rand::thread_rng();
    let lane = Lane::default();
    for index in 0..MONSTER_COUNT {
        let x = LANE_LENGTH * 0.5 + index as f32 * 1.8 + rng.gen_range(0.0..1.0);
        let z = rng.gen_range(-2.5..2.5);
        spawn_enemy(&mut commands, EnemyKind::Monster, Vec3::new(x, 0.0, z), lane);
    }
    spawn_enemy(&mut commands, EnemyKind::Boss, Vec3::new(LANE_LENGTH, 0.0, 0.0), lane);

    spawn_surface(&mut commands, SurfaceKind::Ground, Vec3::new(0.0, -2.0, 0.0), Vec3::new(200.0, 0.5, 200.0));
    spawn_surface(&mut commands, SurfaceKind::Obstacle, Vec3::new(12.0, 1.0, 6.0), Vec3::new(1.0, 2.0, 1.0));

    commands.spawn((
        SpatialBundle::from_transform(Transform::from_translation(TOWER_POSITION)),
        Tower {
            fire_timer: Timer::from_seconds(TOWER_FIRE_INTERVAL_SECS, TimerMode::Repeating),
            range: TOWER_RANGE,
        },
        Name::new("Tower"),
    ));
    info!("Stage ready: {} monsters, 1 boss", MONSTER_COUNT);
}

fn tower_fire_system(
    time: Res<Time>,
    skills: Res<SkillDatabase>,
    mut stats: ResMut<HarnessStats>,
    mut towers: Query<(&Transform, &mut Tower)>,
    enemies: Query<&Enemy>,
    mut launches: EventWriter<LaunchProjectile>,
) {
    for (transform, mut tower) in towers.iter_mut() {
        tower.fire_timer.tick(time.delta());
        if !tower.fire_timer.just_finished() {
            continue;
        }
        let origin = transform.translation;
        let Some(target) = enemies
            .iter()
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| enemy.position())
            .filter(|position| position.distance(origin) <= tower.range)
            .min_by(|a, b| a.distance(origin).total_cmp(&b.distance(origin)))
        else {
            continue;
        };

        stats.shots += 1;
        let support = SUPPORT_ROTATION[stats.shots as usize % SUPPORT_ROTATION.len()];
        if stats.shots % EFFECT_SHOT_EVERY == 0 {
            let Some(shard) = skills.main_skill(FROST_SHARD) else { continue };
            launches.send(LaunchProjectile::Effect {
                params: EffectLaunchParams {
                    origin,
                    target,
                    speed: shard.projectile_speed,
                    lifetime: shard.projectile_lifetime,
                    damage: shard.base_damage,
                    support: FROST_SUPPORT,
                },
                tag: stats.shots,
            });
            continue;
        }

        let Some(bolt) = skills.main_skill(MAGIC_BOLT) else { continue };
        let (damage, speed) = match skills.support_modifier(support) {
            Some(modifier) => (modifier.scale_damage(bolt.base_damage), modifier.scale_speed(bolt.projectile_speed)),
            None => (bolt.base_damage, bolt.projectile_speed),
        };
        launches.send(LaunchProjectile::Skill(LaunchParams {
            origin,
            target,
            speed,
            lifetime: bolt.projectile_lifetime,
            damage,
            skill: MAGIC_BOLT,
            support,
        }));
    }
}

fn record_outcomes_system(
    mut stats: ResMut<HarnessStats>,
    mut resolved: EventReader<ProjectileResolved>,
    mut defeated: EventReader<EnemyDefeated>,
    mut arrived: EventReader<ProjectileArrived>,
) {
    for event in resolved.read() {
        *stats.terminations.entry(event.termination).or_insert(0) += 1;
    }
    stats.defeated += defeated.read().count() as u32;
    for arrival in arrived.read() {
        debug!("Effect shot {} landed at {}", arrival.tag, arrival.position);
        stats.arrivals += 1;
    }
}

fn report(app: &App) {
    let Some(stats) = app.world.get_resource::<HarnessStats>() else { return };
    let Some(system) = app.world.get_resource::<ProjectileSystem>() else { return };
    let pool = system.stats();
    info!(
        "Simulated {:.1}s: {} shots, {} enemies defeated, {} effect arrivals",
        FRAMES as f32 * FRAME_SECS,
        stats.shots,
        stats.defeated,
        stats.arrivals
    );
    let mut terminations: Vec<_> = stats.terminations.iter().collect();
    terminations.sort_by_key(|(_, count)| std::cmp::Reverse(**count));
    for (termination, count) in terminations {
        info!("  {:?}: {}", termination, count);
    }
    info!(
        "Pool: {} acquired, {} released, {} slots allocated, {} outstanding",
        pool.acquired,
        pool.released,
        pool.allocated,
        pool.outstanding()
    );
}
