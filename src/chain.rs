use bevy::prelude::*;
use bevy::utils::HashSet;

use crate::target::{Battlefield, Targetable};

/// Bookkeeping for one chain sequence, owned by a single projectile.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainState {
    max_hops: u32,
    hops: u32,
    damage: f32,
    range: f32,
    damage_reduction: f32,
    hit: HashSet<Entity>,
}

impl ChainState {
    pub fn new(max_hops: u32, range: f32, damage_reduction: f32, initial_damage: f32) -> Self {
        Self {
            max_hops,
            hops: 0,
            damage: initial_damage,
            range: range.max(0.0),
            damage_reduction: damage_reduction.clamp(0.0, 1.0),
            hit: HashSet::default(),
        }
    }

    pub fn max_hops(&self) -> u32 {
        self.max_hops
    }

    pub fn hops(&self) -> u32 {
        self.hops
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn can_hop(&self) -> bool {
        self.hops < self.max_hops
    }

    pub fn has_hit(&self, entity: Entity) -> bool {
        self.hit.contains(&entity)
    }

    pub fn hit_count(&self) -> usize {
        self.hit.len()
    }

    pub fn hit_targets(&self) -> impl Iterator<Item = &Entity> {
        self.hit.iter()
    }

    /// Records a struck target. Returns `false` if it was already in the exclusion set.
    pub fn record_hit(&mut self, entity: Entity) -> bool {
        self.hit.insert(entity)
    }

    /// Consumes one hop and decays the running damage. Returns the damage for the next hit.
    pub fn advance(&mut self) -> f32 {
        debug_assert!(self.can_hop(), "chain advanced past its hop budget");
        self.damage *= 1.0 - self.damage_reduction;
        self.hops += 1;
        self.damage
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainCandidate {
    pub entity: Entity,
    pub position: Vec3,
    pub distance: f32,
}

/// Picks the nearest live target around `from` that the chain may still jump to.
///
/// Skips the target just hit, anything already in the exclusion set, and anything closer than
/// `min_distance`. Among equally near candidates the first one returned by the query wins.
pub fn find_next_chain_target<B: Battlefield + ?Sized>(
    battlefield: &B,
    from: Vec3,
    just_hit: Entity,
    chain: &ChainState,
    min_distance: f32,
) -> Option<ChainCandidate> {
    let mut best: Option<ChainCandidate> = None;
    for entity in battlefield.query_radius(from, chain.range) {
        if entity == just_hit || chain.has_hit(entity) {
            continue;
        }
        let Some(target) = battlefield.target(entity) else { continue };
        if !target.is_alive() {
            continue;
        }
        let position = target.position();
        let distance = from.distance(position);
        if distance < min_distance {
            continue;
        }
        if best.map_or(true, |current| distance < current.distance) {
            best = Some(ChainCandidate { entity, position, distance });
        }
    }
    best
}
