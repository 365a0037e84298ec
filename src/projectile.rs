// src/projectile.rs
use bevy::prelude::*;
use std::time::Duration;

use crate::chain::{find_next_chain_target, ChainState};
use crate::config::{CombatConfig, DEFAULT_PROJECTILE_DAMAGE};
use crate::lifetime::{LifetimeStatus, LifetimeSupervisor};
use crate::pool::Poolable;
use crate::skills::{MainSkillDefinition, SkillDefinitionStore, SkillId};
use crate::status_effects::dispatch_status_effect;
use crate::support::{SupportId, SupportModifierDefinition};
use crate::target::{Battlefield, SurfaceKind, Targetable};
use crate::tasks::{clamped_duration, Interpolation, SimContext, SimTask, TaskPoll};
use crate::visual_effects::{EffectSink, MainSkillVisuals, SupportVisuals, VisualLibrary, VisualSpawn};

/// Invoked once when an effect-mode projectile arrives, times out, or ends on a target.
pub type ArrivalCallback = Box<dyn FnOnce(Vec3) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MovementMode {
    /// Rigid-body style: velocity is driven along the launch direction every tick.
    #[default]
    Physics,
    /// Visual-only: position is interpolated from origin to target.
    Effect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    Timeout,
    OutOfBounds,
    Obstacle,
    Ground,
    TargetHit,
    Arrived,
    Despawned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectileState {
    #[default]
    Idle,
    Launched(MovementMode),
    Resolved(Termination),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchParams {
    pub origin: Vec3,
    pub target: Vec3,
    pub speed: f32,
    pub lifetime: f32,
    pub damage: f32,
    pub skill: SkillId,
    pub support: SupportId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectLaunchParams {
    pub origin: Vec3,
    pub target: Vec3,
    pub speed: f32,
    pub lifetime: f32,
    pub damage: f32,
    pub support: SupportId,
}

/// What one tick of movement produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Not in flight, or paused this tick.
    Held,
    /// Still in flight after sweeping `from -> to`.
    Moved { from: Vec3, to: Vec3 },
    /// The flight ends with `termination` unless something on `from -> to` is struck first.
    /// `to` stops where the flight was still valid: at the out-of-bounds limit, or where the
    /// lifetime ran out.
    Ending { from: Vec3, to: Vec3, termination: Termination },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    /// Nothing happened: the target is gone, dead, or was already struck by this chain.
    Ignored,
    /// The projectile re-launched itself toward `next`.
    Bounced { next: Entity },
    Resolved(Termination),
}

pub struct ProjectileInstance {
    state: ProjectileState,
    mode: MovementMode,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    origin: Vec3,
    target_position: Vec3,
    direction: Vec3,
    speed: f32,
    lifetime: f32,
    damage: f32,
    elapsed: f32,
    skill_id: SkillId,
    support_id: SupportId,
    skill: Option<MainSkillDefinition>,
    support: Option<SupportModifierDefinition>,
    skill_visuals: MainSkillVisuals,
    support_visuals: SupportVisuals,
    chain: Option<ChainState>,
    interpolation: Option<Interpolation>,
    supervisor: LifetimeSupervisor,
    on_arrive: Option<ArrivalCallback>,
}

impl Default for ProjectileInstance {
    fn default() -> Self {
        Self {
            state: ProjectileState::Idle,
            mode: MovementMode::Physics,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            origin: Vec3::ZERO,
            target_position: Vec3::ZERO,
            direction: Vec3::ZERO,
            speed: 0.0,
            lifetime: 0.0,
            damage: DEFAULT_PROJECTILE_DAMAGE,
            elapsed: 0.0,
            skill_id: SkillId::NONE,
            support_id: SupportId::NONE,
            skill: None,
            support: None,
            skill_visuals: MainSkillVisuals::default(),
            support_visuals: SupportVisuals::default(),
            chain: None,
            interpolation: None,
            supervisor: LifetimeSupervisor::default(),
            on_arrive: None,
        }
    }
}

impl Poolable for ProjectileInstance {
    fn on_spawn(&mut self) {
        self.state = ProjectileState::Idle;
        self.mode = MovementMode::Physics;
        self.direction = Vec3::ZERO;
        self.velocity = Vec3::ZERO;
        self.elapsed = 0.0;
        self.on_arrive = None;
    }

    fn on_despawn(&mut self) {
        self.supervisor.cancel();
        *self = Self::default();
    }
}

/// Orientation whose forward axis (-Z) points along `direction`.
pub fn facing(direction: Vec3) -> Quat {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(Vec3::NEG_Z, direction)
}

impl ProjectileInstance {
    /// Launches in physics mode. Calling this on an instance that is already in flight
    /// re-initializes it; a chain that has already hopped keeps its bookkeeping.
    pub fn launch<S, V>(&mut self, params: LaunchParams, store: &S, visuals: &V)
    where
        S: SkillDefinitionStore + ?Sized,
        V: VisualLibrary + ?Sized,
    {
        self.mode = MovementMode::Physics;
        self.speed = params.speed;
        self.lifetime = params.lifetime;
        self.damage = params.damage;
        self.load_definitions(params.skill, params.support, store, visuals);
        self.init_chain(params.damage);
        self.begin_flight(params.origin, params.target);
        debug!(
            "Projectile launched (physics) from {} to {}, damage={:.1}, chain={}/{}",
            params.origin,
            params.target,
            params.damage,
            self.chain.as_ref().map_or(0, ChainState::hops),
            self.chain.as_ref().map_or(0, ChainState::max_hops),
        );
    }

    /// Legacy launch without skill data, dealing the instance's default damage.
    pub fn launch_basic(&mut self, origin: Vec3, target: Vec3, speed: f32, lifetime: f32) {
        self.mode = MovementMode::Physics;
        self.speed = speed;
        self.lifetime = lifetime;
        self.skill_id = SkillId::NONE;
        self.support_id = SupportId::NONE;
        self.skill = None;
        self.support = None;
        self.skill_visuals = MainSkillVisuals::default();
        self.support_visuals = SupportVisuals::default();
        self.chain = None;
        self.begin_flight(origin, target);
    }

    pub fn launch_effect<S, V>(
        &mut self,
        params: EffectLaunchParams,
        on_arrive: Option<ArrivalCallback>,
        store: &S,
        visuals: &V,
    ) where
        S: SkillDefinitionStore + ?Sized,
        V: VisualLibrary + ?Sized,
    {
        self.mode = MovementMode::Effect;
        self.speed = params.speed;
        self.lifetime = params.lifetime;
        self.damage = params.damage;
        self.on_arrive = on_arrive;
        self.load_definitions(SkillId::NONE, params.support, store, visuals);
        self.init_chain(params.damage);
        self.begin_flight(params.origin, params.target);
        debug!("Projectile launched (effect) from {} to {}", params.origin, params.target);
    }

    fn load_definitions<S, V>(&mut self, skill_id: SkillId, support_id: SupportId, store: &S, visuals: &V)
    where
        S: SkillDefinitionStore + ?Sized,
        V: VisualLibrary + ?Sized,
    {
        self.skill_id = skill_id;
        self.support_id = support_id;
        self.skill = store.main_skill(skill_id).cloned();
        self.support = store.support_modifier(support_id).cloned();
        self.skill_visuals = self
            .skill
            .as_ref()
            .and_then(|_| visuals.main_skill_visuals(skill_id))
            .unwrap_or_default();
        self.support_visuals = self
            .support
            .as_ref()
            .and_then(|_| visuals.support_visuals(support_id))
            .unwrap_or_default();
        if skill_id.is_valid() && self.skill.is_none() {
            debug!("Main skill {:?} unresolved, launching without skill data", skill_id);
        }
        if support_id.is_valid() && self.support.is_none() {
            debug!("Support modifier {:?} unresolved, launching without modifier", support_id);
        }
    }

    fn init_chain(&mut self, damage: f32) {
        if self.chain.as_ref().is_some_and(|chain| chain.hops() > 0) {
            return;
        }
        self.chain = self
            .support
            .as_ref()
            .and_then(SupportModifierDefinition::chain_params)
            .filter(|(hops, _, _)| *hops > 0)
            .map(|(hops, range, reduction)| ChainState::new(hops, range, reduction, damage));
    }

    /// Enters `Launched` toward `target` from `origin`, restarting the lifetime countdown.
    fn begin_flight(&mut self, origin: Vec3, target: Vec3) {
        self.origin = origin;
        self.position = origin;
        self.target_position = target;
        self.direction = (target - origin).normalize_or_zero();
        self.rotation = facing(self.direction);
        self.velocity = Vec3::ZERO;
        self.elapsed = 0.0;
        let lifetime = clamped_duration(self.lifetime);
        let token = self.supervisor.start(lifetime);
        self.interpolation = match self.mode {
            MovementMode::Physics => None,
            MovementMode::Effect => {
                Some(Interpolation::new(origin, target, self.speed, lifetime.as_secs_f32(), token))
            }
        };
        self.state = ProjectileState::Launched(self.mode);
    }

    /// Runs one tick of movement and lifetime.
    ///
    /// Nothing resolves here. An out-of-bounds exit, a lifetime cutoff or an effect-mode
    /// arrival comes back as [`Step::Ending`] and is applied with [`finish`](Self::finish) once
    /// the swept segment has been checked for contacts.
    pub fn advance(&mut self, ctx: &SimContext, config: &CombatConfig) -> Step {
        let ProjectileState::Launched(mode) = self.state else {
            return Step::Held;
        };
        let from = self.position;
        if ctx.is_paused() {
            if mode == MovementMode::Physics {
                self.velocity = Vec3::ZERO;
            }
            return Step::Held;
        }

        match mode {
            MovementMode::Physics => self.advance_physics(ctx, config, from),
            MovementMode::Effect => {
                if let Some(lerp) = self.interpolation.as_mut() {
                    let poll = lerp.poll(ctx);
                    self.position = lerp.position();
                    self.elapsed = lerp.elapsed();
                    if let TaskPoll::Ready(_) = poll {
                        return Step::Ending { from, to: self.position, termination: Termination::Arrived };
                    }
                }
                if self.supervisor.poll(ctx) == LifetimeStatus::Expired {
                    return Step::Ending { from, to: self.position, termination: Termination::Timeout };
                }
                Step::Moved { from, to: self.position }
            }
        }
    }

    fn advance_physics(&mut self, ctx: &SimContext, config: &CombatConfig, from: Vec3) -> Step {
        let budget = self.supervisor.remaining().map(|remaining| remaining.as_secs_f32() * self.speed);
        self.velocity = self.direction * self.speed;
        if self.direction != Vec3::ZERO {
            self.rotation = facing(self.direction);
        }
        let dt = ctx.scaled_secs();
        self.position += self.velocity * dt;
        self.elapsed += dt;
        let travelled = from.distance(self.position);

        let mut ending = None;
        if self.origin.distance(self.position) > config.out_of_bounds_distance {
            let inside = (config.out_of_bounds_distance - self.origin.distance(from)).max(0.0);
            ending = Some((inside.min(travelled), Termination::OutOfBounds));
        }
        if self.supervisor.poll(ctx) == LifetimeStatus::Expired {
            let reach = budget.unwrap_or(0.0).min(travelled);
            if ending.map_or(true, |(limit, _)| reach < limit) {
                ending = Some((reach, Termination::Timeout));
            }
        }

        match ending {
            Some((reach, termination)) => Step::Ending { from, to: from + self.direction * reach, termination },
            None => Step::Moved { from, to: self.position },
        }
    }

    /// Applies a termination reported by [`advance`](Self::advance). Effect-mode arrivals and
    /// cutoffs report the target position to the arrival callback.
    pub fn finish(&mut self, termination: Termination) -> Option<Termination> {
        if !self.is_launched() {
            return None;
        }
        if self.mode == MovementMode::Effect && matches!(termination, Termination::Arrived | Termination::Timeout) {
            self.fire_arrival(self.target_position);
        }
        Some(self.resolve(termination))
    }

    /// Obstacle and ground contact end the flight unconditionally, whatever the chain state.
    pub fn resolve_surface(&mut self, kind: SurfaceKind) -> Option<Termination> {
        if !self.is_launched() {
            return None;
        }
        let termination = match kind {
            SurfaceKind::Obstacle => Termination::Obstacle,
            SurfaceKind::Ground => Termination::Ground,
        };
        Some(self.resolve(termination))
    }

    /// Handles contact with a damageable entity.
    ///
    /// Status effects land before damage. When a chain continues, the instance re-launches
    /// itself toward the next target within this call.
    pub fn resolve_target<B, E>(
        &mut self,
        entity: Entity,
        battlefield: &mut B,
        effects: &mut E,
        config: &CombatConfig,
    ) -> ContactOutcome
    where
        B: Battlefield + ?Sized,
        E: EffectSink + ?Sized,
    {
        if !self.is_launched() {
            return ContactOutcome::Ignored;
        }
        if self.chain.as_ref().is_some_and(|chain| chain.has_hit(entity)) {
            return ContactOutcome::Ignored;
        }
        let Some(target) = battlefield.target_mut(entity) else {
            return ContactOutcome::Ignored;
        };
        if !target.is_alive() {
            return ContactOutcome::Ignored;
        }

        let contact = target.position();
        if let Some(support) = self.support.as_ref() {
            if !support.status_effect.is_chain() {
                dispatch_status_effect(&support.status_effect, &self.support_visuals, target);
            }
        }
        target.apply_damage(self.current_damage());
        let allows_chain = target.allows_chain();

        if let Some(hit) = self.skill_visuals.hit {
            effects.spawn_transient(VisualSpawn {
                visual: hit,
                position: contact,
                rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
                lifetime: config.hit_effect_lifetime,
            });
        }

        if let Some(next) = self.continue_chain(entity, contact, allows_chain, battlefield, effects, config) {
            return ContactOutcome::Bounced { next };
        }

        if self.mode == MovementMode::Effect {
            self.fire_arrival(contact);
        }
        ContactOutcome::Resolved(self.resolve(Termination::TargetHit))
    }

    fn continue_chain<B, E>(
        &mut self,
        struck: Entity,
        contact: Vec3,
        allows_chain: bool,
        battlefield: &B,
        effects: &mut E,
        config: &CombatConfig,
    ) -> Option<Entity>
    where
        B: Battlefield + ?Sized,
        E: EffectSink + ?Sized,
    {
        let chain = self.chain.as_mut()?;
        chain.record_hit(struck);
        if !allows_chain || !chain.can_hop() {
            return None;
        }
        let Some(next) = find_next_chain_target(battlefield, contact, struck, chain, config.min_chain_distance)
        else {
            debug!("Chain ended after {} hops: no target in range", chain.hops());
            return None;
        };

        let damage = chain.advance();
        debug!(
            "Chain {}/{}: bouncing to {:?}, damage={:.2}",
            chain.hops(),
            chain.max_hops(),
            next.entity,
            damage
        );

        if let Some(visual) = self.support_visuals.chain {
            let hop = next.position - contact;
            effects.spawn_transient(VisualSpawn {
                visual,
                position: (contact + next.position) / 2.0,
                rotation: facing(hop),
                scale: Vec3::new(1.0, 1.0, hop.length()),
                lifetime: config.chain_effect_lifetime,
            });
        }

        let spawn = contact + (next.position - contact).normalize_or_zero() * config.chain_spawn_offset;
        self.damage = damage;
        self.begin_flight(spawn, next.position);
        Some(next.entity)
    }

    /// Ends the flight without touching anything, e.g. when the stage is torn down.
    pub fn despawn(&mut self) -> Option<Termination> {
        if !self.is_launched() {
            return None;
        }
        Some(self.resolve(Termination::Despawned))
    }

    fn resolve(&mut self, termination: Termination) -> Termination {
        self.supervisor.cancel();
        self.interpolation = None;
        self.velocity = Vec3::ZERO;
        self.state = ProjectileState::Resolved(termination);
        termination
    }

    fn fire_arrival(&mut self, position: Vec3) {
        if let Some(callback) = self.on_arrive.take() {
            callback(position);
        }
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    pub fn is_launched(&self) -> bool {
        matches!(self.state, ProjectileState::Launched(_))
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn target_position(&self) -> Vec3 {
        self.target_position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn remaining_lifetime(&self) -> Option<Duration> {
        self.supervisor.remaining()
    }

    pub fn base_damage(&self) -> f32 {
        self.damage
    }

    /// Damage the next hit deals: the decayed chain damage while chaining, else the launch damage.
    pub fn current_damage(&self) -> f32 {
        self.chain.as_ref().map_or(self.damage, ChainState::damage)
    }

    pub fn skill_id(&self) -> SkillId {
        self.skill_id
    }

    pub fn support_id(&self) -> SupportId {
        self.support_id
    }

    pub fn skill(&self) -> Option<&MainSkillDefinition> {
        self.skill.as_ref()
    }

    pub fn support(&self) -> Option<&SupportModifierDefinition> {
        self.support.as_ref()
    }

    pub fn skill_visuals(&self) -> MainSkillVisuals {
        self.skill_visuals
    }

    pub fn chain(&self) -> Option<&ChainState> {
        self.chain.as_ref()
    }

    pub fn has_arrival_callback(&self) -> bool {
        self.on_arrive.is_some()
    }

    /// Radius of the sphere probed for contacts this tick.
    pub fn contact_radius(&self, config: &CombatConfig) -> f32 {
        match self.mode {
            MovementMode::Physics => config.physics_contact_radius,
            MovementMode::Effect => config.effect_probe_radius,
        }
    }
}
