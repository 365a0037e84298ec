//! Capabilities the combat core needs from the world it runs in.

use bevy::prelude::*;

use crate::support::{CcType, DotType, MarkType};
use crate::visual_effects::VisualId;

/// Anything a projectile can damage.
pub trait Targetable {
    fn position(&self) -> Vec3;
    fn is_alive(&self) -> bool;
    fn apply_damage(&mut self, amount: f32);
    fn apply_cc(&mut self, kind: CcType, duration: f32, slow_amount: f32, visual: Option<VisualId>);
    fn apply_dot(
        &mut self,
        kind: DotType,
        damage_per_tick: f32,
        tick_interval: f32,
        duration: f32,
        visual: Option<VisualId>,
    );
    fn apply_mark(&mut self, kind: MarkType, duration: f32, damage_multiplier: f32, visual: Option<VisualId>);

    /// Targets that return `false` end a chain when struck.
    fn allows_chain(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum SurfaceKind {
    Obstacle,
    Ground,
}

pub trait SpatialQuery {
    /// Damageable entities whose position lies within `radius` of `point`.
    fn query_radius(&self, point: Vec3, radius: f32) -> Vec<Entity>;

    fn surface_contact(&self, _point: Vec3, _radius: f32) -> Option<SurfaceKind> {
        None
    }
}

/// Resolves entity handles returned by [`SpatialQuery`] into target capabilities.
pub trait Battlefield: SpatialQuery {
    type Target: Targetable;

    fn target(&self, entity: Entity) -> Option<&Self::Target>;
    fn target_mut(&mut self, entity: Entity) -> Option<&mut Self::Target>;
}

/// What a projectile touched this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    Target(Entity),
    Surface(SurfaceKind),
}
