// src/enemy.rs
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::{Health, Lane};
use crate::config::SimulationSpeed;
use crate::status_effects::StatusTracker;
use crate::support::{CcType, DotType, MarkType};
use crate::target::{Battlefield, SpatialQuery, SurfaceKind, Targetable};
use crate::visual_effects::VisualId;
use crate::CombatSet;

pub const MONSTER_HEALTH: f32 = 120.0;
pub const MONSTER_SPEED: f32 = 1.5;
pub const BOSS_HEALTH: f32 = 900.0;
pub const BOSS_SPEED: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum EnemyKind {
    #[default]
    Monster,
    Boss,
}

pub struct EnemyStats {
    pub health: f32,
    pub speed: f32,
}

impl EnemyStats {
    pub fn get_for_kind(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Monster => EnemyStats { health: MONSTER_HEALTH, speed: MONSTER_SPEED },
            EnemyKind::Boss => EnemyStats { health: BOSS_HEALTH, speed: BOSS_SPEED },
        }
    }
}

/// A damageable walker. `position` is authoritative; the transform follows it.
#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub health: Health,
    pub speed: f32,
    pub position: Vec3,
    pub statuses: StatusTracker,
}

impl Enemy {
    pub fn new(kind: EnemyKind, position: Vec3) -> Self {
        let stats = EnemyStats::get_for_kind(kind);
        Self { kind, health: Health::new(stats.health), speed: stats.speed, position, statuses: StatusTracker::default() }
    }

    pub fn with_health(mut self, health: f32) -> Self {
        self.health = Health::new(health);
        self
    }
}

impl Targetable for Enemy {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    fn apply_damage(&mut self, amount: f32) {
        self.health.take(amount * self.statuses.damage_taken_multiplier());
    }

    fn apply_cc(&mut self, kind: CcType, duration: f32, slow_amount: f32, _visual: Option<VisualId>) {
        self.statuses.add_cc(kind, duration, slow_amount);
    }

    fn apply_dot(
        &mut self,
        kind: DotType,
        damage_per_tick: f32,
        tick_interval: f32,
        duration: f32,
        _visual: Option<VisualId>,
    ) {
        self.statuses.add_dot(kind, damage_per_tick, tick_interval, duration);
    }

    fn apply_mark(&mut self, kind: MarkType, duration: f32, damage_multiplier: f32, _visual: Option<VisualId>) {
        self.statuses.add_mark(kind, duration, damage_multiplier);
    }
}

/// Static collider that ends any projectile touching it.
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct Surface {
    pub kind: SurfaceKind,
    pub half_extents: Vec3,
}

impl Surface {
    pub fn touches(&self, center: Vec3, point: Vec3, radius: f32) -> bool {
        let closest = point.clamp(center - self.half_extents, center + self.half_extents);
        closest.distance_squared(point) <= radius * radius
    }
}

#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyDefeated {
    pub entity: Entity,
    pub kind: EnemyKind,
    pub position: Vec3,
}

/// Battlefield view over live enemies and surface colliders.
#[derive(SystemParam)]
pub struct EnemyField<'w, 's> {
    enemies: Query<'w, 's, (Entity, &'static mut Enemy)>,
    surfaces: Query<'w, 's, (&'static Surface, &'static Transform)>,
}

impl SpatialQuery for EnemyField<'_, '_> {
    fn query_radius(&self, point: Vec3, radius: f32) -> Vec<Entity> {
        let radius_sq = radius * radius;
        self.enemies
            .iter()
            .filter(|(_, enemy)| enemy.position.distance_squared(point) <= radius_sq)
            .map(|(entity, _)| entity)
            .collect()
    }

    fn surface_contact(&self, point: Vec3, radius: f32) -> Option<SurfaceKind> {
        self.surfaces
            .iter()
            .find(|(surface, transform)| surface.touches(transform.translation, point, radius))
            .map(|(surface, _)| surface.kind)
    }
}

impl Battlefield for EnemyField<'_, '_> {
    type Target = Enemy;

    fn target(&self, entity: Entity) -> Option<&Enemy> {
        self.enemies.get(entity).ok().map(|(_, enemy)| enemy)
    }

    fn target_mut(&mut self, entity: Entity) -> Option<&mut Enemy> {
        self.enemies.get_mut(entity).ok().map(|(_, enemy)| enemy.into_inner())
    }
}

pub fn spawn_enemy(commands: &mut Commands, kind: EnemyKind, position: Vec3, lane: Lane) -> Entity {
    commands
        .spawn((
            SpatialBundle::from_transform(Transform::from_translation(position)),
            Enemy::new(kind, position),
            lane,
            Name::new(format!("{:?}", kind)),
        ))
        .id()
}

pub fn spawn_surface(commands: &mut Commands, kind: SurfaceKind, center: Vec3, half_extents: Vec3) -> Entity {
    commands
        .spawn((
            SpatialBundle::from_transform(Transform::from_translation(center)),
            Surface { kind, half_extents },
            Name::new(format!("{:?}", kind)),
        ))
        .id()
}

fn enemy_march_system(time: Res<Time>, speed: Res<SimulationSpeed>, mut enemies: Query<(&mut Enemy, &Lane)>) {
    if speed.is_paused() {
        return;
    }
    let dt = speed.context(time.delta()).scaled_secs();
    for (mut enemy, lane) in enemies.iter_mut() {
        if !enemy.is_alive() {
            continue;
        }
        let step = enemy.speed * enemy.statuses.movement_factor() * dt;
        if step > 0.0 {
            enemy.position += lane.direction * step;
        }
    }
}

fn enemy_transform_sync_system(mut enemies: Query<(&Enemy, &mut Transform), Changed<Enemy>>) {
    for (enemy, mut transform) in enemies.iter_mut() {
        transform.translation = enemy.position;
    }
}

fn enemy_death_system(
    mut commands: Commands,
    enemies: Query<(Entity, &Enemy)>,
    mut defeated: EventWriter<EnemyDefeated>,
) {
    for (entity, enemy) in enemies.iter() {
        if enemy.is_alive() {
            continue;
        }
        info!("{:?} {:?} defeated at {}", enemy.kind, entity, enemy.position);
        defeated.send(EnemyDefeated { entity, kind: enemy.kind, position: enemy.position });
        commands.entity(entity).despawn_recursive();
    }
}

pub fn despawn_all_enemies(mut commands: Commands, enemies: Query<Entity, With<Enemy>>) {
    for entity in enemies.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<EnemyKind>()
            .register_type::<Surface>()
            .register_type::<Lane>()
            .init_resource::<SimulationSpeed>()
            .add_event::<EnemyDefeated>()
            .add_systems(Update, (enemy_march_system, enemy_transform_sync_system).chain().in_set(CombatSet::Movement))
            .add_systems(Update, enemy_death_system.in_set(CombatSet::Cleanup));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_mark_amplifies_damage() {
        let mut enemy = Enemy::new(EnemyKind::Monster, Vec3::ZERO).with_health(100.0);
        enemy.apply_mark(MarkType::Focus, 5.0, 1.25, None);
        enemy.apply_damage(40.0);
        assert_eq!(enemy.health.current, 50.0);
    }

    #[test]
    fn surface_touch_uses_closest_point() {
        let wall = Surface { kind: SurfaceKind::Obstacle, half_extents: Vec3::new(0.5, 2.0, 2.0) };
        assert!(wall.touches(Vec3::new(5.0, 0.0, 0.0), Vec3::new(4.2, 0.0, 0.0), 0.5));
        assert!(!wall.touches(Vec3::new(5.0, 0.0, 0.0), Vec3::new(3.8, 0.0, 0.0), 0.5));
    }
}
