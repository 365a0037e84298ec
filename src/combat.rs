//! The projectile runner: owns the pool, launches instances, and ticks them against a
//! battlefield.

use bevy::prelude::*;

use crate::config::CombatConfig;
use crate::error::CombatError;
use crate::pool::{Pool, PoolHandle, PoolStats};
use crate::projectile::{
    ArrivalCallback, ContactOutcome, EffectLaunchParams, LaunchParams, ProjectileInstance, Step, Termination,
};
use crate::skills::SkillDefinitionStore;
use crate::target::{Battlefield, Contact, Targetable};
use crate::tasks::SimContext;
use crate::visual_effects::{EffectSink, VisualLibrary};

pub type ProjectileHandle = PoolHandle;

/// Everything outside the combat core a launch or tick needs to reach.
pub struct CombatEnv<'a, B: ?Sized, S: ?Sized, V: ?Sized, E: ?Sized> {
    pub battlefield: &'a mut B,
    pub store: &'a S,
    pub visuals: &'a V,
    pub effects: &'a mut E,
}

impl<'a, B: ?Sized, S: ?Sized, V: ?Sized, E: ?Sized> CombatEnv<'a, B, S, V, E> {
    pub fn new(battlefield: &'a mut B, store: &'a S, visuals: &'a V, effects: &'a mut E) -> Self {
        Self { battlefield, store, visuals, effects }
    }
}

#[derive(Resource)]
pub struct ProjectileSystem {
    pool: Pool<ProjectileInstance>,
    config: CombatConfig,
}

impl Default for ProjectileSystem {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl ProjectileSystem {
    pub fn new(config: CombatConfig) -> Self {
        Self { pool: Pool::new(config.pool_capacity), config }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn launch<B, S, V, E>(
        &mut self,
        params: LaunchParams,
        env: &mut CombatEnv<'_, B, S, V, E>,
    ) -> Result<ProjectileHandle, CombatError>
    where
        B: ?Sized,
        S: SkillDefinitionStore + ?Sized,
        V: VisualLibrary + ?Sized,
        E: EffectSink + ?Sized,
    {
        let handle = self.pool.acquire()?;
        let instance = self.pool.get_mut(handle).ok_or(CombatError::StaleHandle(handle))?;
        instance.launch(params, env.store, env.visuals);
        if let Some(visual) = instance.skill_visuals().projectile {
            env.effects.attach(handle, visual, instance.rotation());
        }
        Ok(handle)
    }

    /// Re-initializes an instance that is already in flight.
    ///
    /// The attached visual is kept when the projectile visual is unchanged. Otherwise the new
    /// one is attached and the host drops the stale one.
    pub fn relaunch<B, S, V, E>(
        &mut self,
        handle: ProjectileHandle,
        params: LaunchParams,
        env: &mut CombatEnv<'_, B, S, V, E>,
    ) -> Result<(), CombatError>
    where
        B: ?Sized,
        S: SkillDefinitionStore + ?Sized,
        V: VisualLibrary + ?Sized,
        E: EffectSink + ?Sized,
    {
        let instance = self.pool.get_mut(handle).ok_or(CombatError::StaleHandle(handle))?;
        if !instance.is_launched() {
            return Err(CombatError::NotLaunched(handle));
        }
        let previous = instance.skill_visuals().projectile;
        instance.launch(params, env.store, env.visuals);
        match instance.skill_visuals().projectile {
            Some(visual) if Some(visual) != previous => env.effects.attach(handle, visual, instance.rotation()),
            _ => {}
        }
        Ok(())
    }

    pub fn launch_effect<B, S, V, E>(
        &mut self,
        params: EffectLaunchParams,
        on_arrive: Option<ArrivalCallback>,
        env: &mut CombatEnv<'_, B, S, V, E>,
    ) -> Result<ProjectileHandle, CombatError>
    where
        B: ?Sized,
        S: SkillDefinitionStore + ?Sized,
        V: VisualLibrary + ?Sized,
        E: ?Sized,
    {
        let handle = self.pool.acquire()?;
        let instance = self.pool.get_mut(handle).ok_or(CombatError::StaleHandle(handle))?;
        instance.launch_effect(params, on_arrive, env.store, env.visuals);
        Ok(handle)
    }

    pub fn launch_basic(
        &mut self,
        origin: Vec3,
        target: Vec3,
        speed: f32,
        lifetime: f32,
    ) -> Result<ProjectileHandle, CombatError> {
        let handle = self.pool.acquire()?;
        let instance = self.pool.get_mut(handle).ok_or(CombatError::StaleHandle(handle))?;
        instance.launch_basic(origin, target, speed, lifetime);
        Ok(handle)
    }

    /// Advances every live projectile by one step and releases the ones that resolved.
    ///
    /// Contacts are probed along the path travelled this tick, so fast projectiles do not
    /// skip over thin targets. A flight that leaves bounds or runs out of lifetime this tick
    /// still strikes whatever lies on the part of the path it was allowed to cover. Released
    /// handles are returned with their termination.
    pub fn tick<B, S, V, E>(
        &mut self,
        ctx: &SimContext,
        env: &mut CombatEnv<'_, B, S, V, E>,
    ) -> Vec<(ProjectileHandle, Termination)>
    where
        B: Battlefield + ?Sized,
        S: ?Sized,
        V: ?Sized,
        E: EffectSink + ?Sized,
    {
        let mut resolved = Vec::new();
        for handle in self.pool.handles() {
            let Some(instance) = self.pool.get_mut(handle) else { continue };
            let (from, to, ending) = match instance.advance(ctx, &self.config) {
                Step::Held => continue,
                Step::Moved { from, to } => (from, to, None),
                Step::Ending { from, to, termination } => (from, to, Some(termination)),
            };
            let outcome = match probe_path(instance, from, to, &*env.battlefield, &self.config) {
                Some(contact) => apply_contact(instance, contact, env, &self.config),
                None => ContactOutcome::Ignored,
            };
            let termination = match outcome {
                ContactOutcome::Resolved(termination) => Some(termination),
                ContactOutcome::Bounced { .. } => None,
                ContactOutcome::Ignored => ending.and_then(|termination| instance.finish(termination)),
            };
            if let Some(termination) = termination {
                resolved.push((handle, termination));
            }
        }

        for &(handle, termination) in &resolved {
            self.release(handle, termination);
        }
        resolved
    }

    /// Feeds a contact detected by the host's own collision pass into an instance.
    pub fn resolve_contact<B, S, V, E>(
        &mut self,
        handle: ProjectileHandle,
        contact: Contact,
        env: &mut CombatEnv<'_, B, S, V, E>,
    ) -> Result<ContactOutcome, CombatError>
    where
        B: Battlefield + ?Sized,
        S: ?Sized,
        V: ?Sized,
        E: EffectSink + ?Sized,
    {
        let instance = self.pool.get_mut(handle).ok_or(CombatError::StaleHandle(handle))?;
        let outcome = apply_contact(instance, contact, env, &self.config);
        if let ContactOutcome::Resolved(termination) = outcome {
            self.release(handle, termination);
        }
        Ok(outcome)
    }

    pub fn despawn(&mut self, handle: ProjectileHandle) -> Result<(), CombatError> {
        let instance = self.pool.get_mut(handle).ok_or(CombatError::StaleHandle(handle))?;
        let termination = instance.despawn().unwrap_or(Termination::Despawned);
        self.pool.release(handle)?;
        debug!("Projectile {:?} released: {:?}", handle, termination);
        Ok(())
    }

    /// Releases every live projectile. Returns how many were released.
    pub fn despawn_all(&mut self) -> usize {
        let handles = self.pool.handles();
        for &handle in &handles {
            if let Some(instance) = self.pool.get_mut(handle) {
                instance.despawn();
            }
            self.release(handle, Termination::Despawned);
        }
        if !handles.is_empty() {
            info!("Despawned {} projectiles", handles.len());
        }
        handles.len()
    }

    fn release(&mut self, handle: ProjectileHandle, termination: Termination) {
        let result = self.pool.release(handle);
        debug_assert!(result.is_ok(), "projectile {handle:?} released twice");
        match result {
            Ok(()) => debug!("Projectile {:?} released: {:?}", handle, termination),
            Err(err) => warn!("Dropping release of {:?}: {}", handle, err),
        }
    }

    pub fn instance(&self, handle: ProjectileHandle) -> Option<&ProjectileInstance> {
        self.pool.get(handle)
    }

    pub fn is_live(&self, handle: ProjectileHandle) -> bool {
        self.pool.contains(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProjectileHandle, &ProjectileInstance)> {
        self.pool.iter()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_len()
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

fn apply_contact<B, S, V, E>(
    instance: &mut ProjectileInstance,
    contact: Contact,
    env: &mut CombatEnv<'_, B, S, V, E>,
    config: &CombatConfig,
) -> ContactOutcome
where
    B: Battlefield + ?Sized,
    S: ?Sized,
    V: ?Sized,
    E: EffectSink + ?Sized,
{
    match contact {
        Contact::Surface(kind) => {
            instance.resolve_surface(kind).map_or(ContactOutcome::Ignored, ContactOutcome::Resolved)
        }
        Contact::Target(entity) => instance.resolve_target(entity, env.battlefield, env.effects, config),
    }
}

/// Samples the segment `from -> to`, one contact radius at a time, and returns the first
/// contact found. Surfaces win over targets at the same sample.
fn probe_path<B: Battlefield + ?Sized>(
    instance: &ProjectileInstance,
    from: Vec3,
    to: Vec3,
    battlefield: &B,
    config: &CombatConfig,
) -> Option<Contact> {
    let radius = instance.contact_radius(config).max(f32::EPSILON);
    let samples = (from.distance(to) / radius).ceil();
    let steps = if samples.is_finite() { samples.max(1.0) as usize } else { 1 };
    (1..=steps).find_map(|step| probe_point(instance, from.lerp(to, step as f32 / steps as f32), radius, battlefield))
}

fn probe_point<B: Battlefield + ?Sized>(
    instance: &ProjectileInstance,
    point: Vec3,
    radius: f32,
    battlefield: &B,
) -> Option<Contact> {
    if let Some(kind) = battlefield.surface_contact(point, radius) {
        return Some(Contact::Surface(kind));
    }
    battlefield
        .query_radius(point, radius)
        .into_iter()
        .filter(|entity| !instance.chain().is_some_and(|chain| chain.has_hit(*entity)))
        .filter_map(|entity| {
            let target = battlefield.target(entity)?;
            target.is_alive().then(|| (entity, point.distance(target.position())))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| Contact::Target(entity))
}
