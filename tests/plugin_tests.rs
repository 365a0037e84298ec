use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use library_defense::arena::{despawn_all_projectiles, LaunchProjectile, ProjectileArrived};
use library_defense::combat::ProjectileSystem;
use library_defense::components::Lane;
use library_defense::config::SimulationSpeed;
use library_defense::enemy::{despawn_all_enemies, Enemy, EnemyKind};
use library_defense::projectile::{EffectLaunchParams, LaunchParams};
use library_defense::skills::{CHAIN_LIGHTNING_SUPPORT, FROST_SUPPORT, MAGIC_BOLT};
use library_defense::support::{CcType, SupportId};
use library_defense::visual_effects::{ProjectileVisual, TransientEffect};
use library_defense::CombatPlugin;
use std::time::Duration;

#[derive(Resource, Default)]
struct Arrivals(Vec<ProjectileArrived>);

fn collect_arrivals(mut reader: EventReader<ProjectileArrived>, mut arrivals: ResMut<Arrivals>) {
    arrivals.0.extend(reader.read().copied());
}

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(1.0 / 60.0)))
        .add_plugins(CombatPlugin)
        .init_resource::<Arrivals>()
        .add_systems(Last, collect_arrivals);
    app.update();
    app
}

fn spawn_standing_enemy(app: &mut App, position: Vec3, health: f32) -> Entity {
    app.world
        .spawn((
            SpatialBundle::from_transform(Transform::from_translation(position)),
            Enemy::new(EnemyKind::Monster, position).with_health(health),
            Lane { direction: Vec3::ZERO },
        ))
        .id()
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn bolt(target: Vec3, support: SupportId) -> LaunchParams {
    LaunchParams { origin: Vec3::ZERO, target, speed: 20.0, lifetime: 3.0, damage: 25.0, skill: MAGIC_BOLT, support }
}

#[test]
fn test_launch_event_damages_enemy() {
    let mut app = test_app();
    let enemy = spawn_standing_enemy(&mut app, Vec3::new(10.0, 0.0, 0.0), 100.0);
    app.world.send_event(LaunchProjectile::Skill(bolt(Vec3::new(10.0, 0.0, 0.0), FROST_SUPPORT)));
    run(&mut app, 60);

    let enemy = app.world.get::<Enemy>(enemy).unwrap();
    assert_eq!(enemy.health.current, 75.0);
    assert!(enemy.statuses.has_cc(CcType::Slow));
    let stats = app.world.resource::<ProjectileSystem>().stats();
    assert_eq!((stats.acquired, stats.released), (1, 1));
}

#[test]
fn test_chain_clears_a_pack() {
    let mut app = test_app();
    for x in [10.0, 13.0, 16.0, 19.0] {
        spawn_standing_enemy(&mut app, Vec3::new(x, 0.0, 0.0), 20.0);
    }
    let params = LaunchParams { damage: 100.0, ..bolt(Vec3::new(10.0, 0.0, 0.0), CHAIN_LIGHTNING_SUPPORT) };
    app.world.send_event(LaunchProjectile::Skill(params));
    run(&mut app, 120);

    let remaining = app.world.query::<&Enemy>().iter(&app.world).count();
    assert_eq!(remaining, 0);
    assert_eq!(app.world.resource::<ProjectileSystem>().active_count(), 0);
}

#[test]
fn test_effect_arrival_becomes_event() {
    let mut app = test_app();
    let params = EffectLaunchParams {
        origin: Vec3::ZERO,
        target: Vec3::new(0.0, 0.0, 5.0),
        speed: 10.0,
        lifetime: 3.0,
        damage: 0.0,
        support: SupportId::NONE,
    };
    app.world.send_event(LaunchProjectile::Effect { params, tag: 7 });
    run(&mut app, 60);

    let arrivals = &app.world.resource::<Arrivals>().0;
    assert_eq!(arrivals.len(), 1);
    assert_eq!(arrivals[0].tag, 7);
    assert_eq!(arrivals[0].position, Vec3::new(0.0, 0.0, 5.0));
}

#[test]
fn test_simulation_speed_zero_freezes_projectiles() {
    let mut app = test_app();
    app.world.send_event(LaunchProjectile::Skill(bolt(Vec3::new(50.0, 0.0, 0.0), SupportId::NONE)));
    run(&mut app, 5);
    let position = |app: &App| app.world.resource::<ProjectileSystem>().iter().next().map(|(_, p)| p.position());
    let before = position(&app).unwrap();

    app.world.resource_mut::<SimulationSpeed>().multiplier = 0.0;
    run(&mut app, 240);
    assert_eq!(position(&app), Some(before));

    app.world.resource_mut::<SimulationSpeed>().multiplier = 1.0;
    run(&mut app, 5);
    assert!(position(&app).unwrap().x > before.x);
}

#[test]
fn test_visuals_follow_and_expire() {
    let mut app = test_app();
    spawn_standing_enemy(&mut app, Vec3::new(6.0, 0.0, 0.0), 500.0);
    app.world.send_event(LaunchProjectile::Skill(bolt(Vec3::new(6.0, 0.0, 0.0), SupportId::NONE)));
    run(&mut app, 3);

    let attached = app.world.query::<&ProjectileVisual>().iter(&app.world).count();
    assert_eq!(attached, 1);

    run(&mut app, 40);
    assert_eq!(app.world.query::<&ProjectileVisual>().iter(&app.world).count(), 0);
    // the hit burst lives for two seconds
    assert_eq!(app.world.query::<&TransientEffect>().iter(&app.world).count(), 1);
    run(&mut app, 150);
    assert_eq!(app.world.query::<&TransientEffect>().iter(&app.world).count(), 0);
}

#[test]
fn test_stage_teardown_clears_field() {
    let mut app = test_app();
    for x in [20.0, 30.0] {
        spawn_standing_enemy(&mut app, Vec3::new(x, 0.0, 0.0), 500.0);
    }
    app.world.send_event(LaunchProjectile::Skill(bolt(Vec3::new(40.0, 0.0, 40.0), SupportId::NONE)));
    run(&mut app, 3);
    assert_eq!(app.world.resource::<ProjectileSystem>().active_count(), 1);

    app.world.run_system_once(despawn_all_projectiles);
    app.world.run_system_once(despawn_all_enemies);
    run(&mut app, 1);
    assert_eq!(app.world.resource::<ProjectileSystem>().active_count(), 0);
    assert_eq!(app.world.query::<&Enemy>().iter(&app.world).count(), 0);
    assert_eq!(app.world.query::<&ProjectileVisual>().iter(&app.world).count(), 0);
}
