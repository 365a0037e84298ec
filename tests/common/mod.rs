#![allow(dead_code)]

use bevy::prelude::*;
use library_defense::combat::{CombatEnv, ProjectileHandle, ProjectileSystem};
use library_defense::projectile::Termination;
use library_defense::skills::SkillDatabase;
use library_defense::support::{CcType, DotType, MarkType};
use library_defense::target::{Battlefield, SpatialQuery, SurfaceKind, Targetable};
use library_defense::tasks::SimContext;
use library_defense::visual_effects::{EffectCatalog, EffectSink, VisualId, VisualSpawn};

pub const DT: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Cc { kind: CcType, duration: f32, slow: f32, visual: Option<VisualId> },
    Dot { kind: DotType, per_tick: f32, interval: f32, duration: f32, visual: Option<VisualId> },
    Mark { kind: MarkType, duration: f32, multiplier: f32, visual: Option<VisualId> },
    Damage(f32),
}

/// Target that records every capability call made on it.
#[derive(Debug, Clone)]
pub struct Dummy {
    pub position: Vec3,
    pub health: f32,
    pub chainable: bool,
    pub calls: Vec<Call>,
}

impl Dummy {
    pub fn at(position: Vec3) -> Self {
        Self { position, health: 1000.0, chainable: true, calls: Vec::new() }
    }

    pub fn damage_taken(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Damage(amount) => Some(*amount),
                _ => None,
            })
            .collect()
    }
}

impl Targetable for Dummy {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    fn apply_damage(&mut self, amount: f32) {
        self.health -= amount;
        self.calls.push(Call::Damage(amount));
    }

    fn apply_cc(&mut self, kind: CcType, duration: f32, slow: f32, visual: Option<VisualId>) {
        self.calls.push(Call::Cc { kind, duration, slow, visual });
    }

    fn apply_dot(&mut self, kind: DotType, per_tick: f32, interval: f32, duration: f32, visual: Option<VisualId>) {
        self.calls.push(Call::Dot { kind, per_tick, interval, duration, visual });
    }

    fn apply_mark(&mut self, kind: MarkType, duration: f32, multiplier: f32, visual: Option<VisualId>) {
        self.calls.push(Call::Mark { kind, duration, multiplier, visual });
    }

    fn allows_chain(&self) -> bool {
        self.chainable
    }
}

struct Wall {
    center: Vec3,
    half_extents: Vec3,
    kind: SurfaceKind,
}

/// In-memory battlefield. Query results come back in insertion order.
#[derive(Default)]
pub struct TestField {
    targets: Vec<(Entity, Dummy)>,
    walls: Vec<Wall>,
}

impl TestField {
    pub fn add(&mut self, dummy: Dummy) -> Entity {
        let entity = Entity::from_raw(self.targets.len() as u32 + 1);
        self.targets.push((entity, dummy));
        entity
    }

    pub fn add_at(&mut self, position: Vec3) -> Entity {
        self.add(Dummy::at(position))
    }

    pub fn add_wall(&mut self, kind: SurfaceKind, center: Vec3, half_extents: Vec3) {
        self.walls.push(Wall { center, half_extents, kind });
    }

    pub fn dummy(&self, entity: Entity) -> &Dummy {
        self.targets
            .iter()
            .find(|(id, _)| *id == entity)
            .map(|(_, dummy)| dummy)
            .expect("unknown dummy")
    }

    pub fn dummy_mut(&mut self, entity: Entity) -> &mut Dummy {
        self.targets
            .iter_mut()
            .find(|(id, _)| *id == entity)
            .map(|(_, dummy)| dummy)
            .expect("unknown dummy")
    }
}

impl SpatialQuery for TestField {
    fn query_radius(&self, point: Vec3, radius: f32) -> Vec<Entity> {
        self.targets
            .iter()
            .filter(|(_, dummy)| dummy.position.distance(point) <= radius)
            .map(|(entity, _)| *entity)
            .collect()
    }

    fn surface_contact(&self, point: Vec3, radius: f32) -> Option<SurfaceKind> {
        self.walls
            .iter()
            .find(|wall| {
                let closest = point.clamp(wall.center - wall.half_extents, wall.center + wall.half_extents);
                closest.distance(point) <= radius
            })
            .map(|wall| wall.kind)
    }
}

impl Battlefield for TestField {
    type Target = Dummy;

    fn target(&self, entity: Entity) -> Option<&Dummy> {
        self.targets.iter().find(|(id, _)| *id == entity).map(|(_, dummy)| dummy)
    }

    fn target_mut(&mut self, entity: Entity) -> Option<&mut Dummy> {
        self.targets.iter_mut().find(|(id, _)| *id == entity).map(|(_, dummy)| dummy)
    }
}

#[derive(Default)]
pub struct RecordingEffects {
    pub transients: Vec<VisualSpawn>,
    pub attached: Vec<(ProjectileHandle, VisualId, Quat)>,
}

impl EffectSink for RecordingEffects {
    fn spawn_transient(&mut self, spawn: VisualSpawn) {
        self.transients.push(spawn);
    }

    fn attach(&mut self, projectile: ProjectileHandle, visual: VisualId, rotation: Quat) {
        self.attached.push((projectile, visual, rotation));
    }
}

/// Bundles the collaborators a test drives the runner with.
pub struct Harness {
    pub system: ProjectileSystem,
    pub field: TestField,
    pub store: SkillDatabase,
    pub catalog: EffectCatalog,
    pub effects: RecordingEffects,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            system: ProjectileSystem::default(),
            field: TestField::default(),
            store: SkillDatabase::with_defaults(),
            catalog: EffectCatalog::with_defaults(),
            effects: RecordingEffects::default(),
        }
    }
}

impl Harness {
    pub fn env(&mut self) -> (&mut ProjectileSystem, CombatEnv<'_, TestField, SkillDatabase, EffectCatalog, RecordingEffects>) {
        (
            &mut self.system,
            CombatEnv::new(&mut self.field, &self.store, &self.catalog, &mut self.effects),
        )
    }

    pub fn tick_with(&mut self, ctx: &SimContext) -> Vec<(ProjectileHandle, Termination)> {
        let (system, mut env) = self.env();
        system.tick(ctx, &mut env)
    }

    pub fn tick(&mut self) -> Vec<(ProjectileHandle, Termination)> {
        self.tick_with(&SimContext::from_secs(DT))
    }

    /// Ticks until `handle` resolves. Returns the termination and how many ticks it took.
    pub fn run_until_resolved(&mut self, handle: ProjectileHandle, max_ticks: usize) -> Option<(Termination, usize)> {
        for tick in 1..=max_ticks {
            if let Some((_, termination)) = self.tick().into_iter().find(|(released, _)| *released == handle) {
                return Some((termination, tick));
            }
        }
        None
    }
}
