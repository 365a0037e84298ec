mod common;

use bevy::prelude::*;
use bevy::utils::HashSet;
use common::Harness;
use library_defense::projectile::{ArrivalCallback, EffectLaunchParams, LaunchParams};
use library_defense::skills::{SkillId, CHAIN_LIGHTNING_SUPPORT, FROST_SUPPORT, MAGIC_BOLT};
use library_defense::support::SupportId;
use library_defense::tasks::SimContext;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SUPPORTS: [SupportId; 3] = [SupportId::NONE, FROST_SUPPORT, CHAIN_LIGHTNING_SUPPORT];

fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(rng.gen_range(-extent..extent), 0.0, rng.gen_range(-extent..extent))
}

#[test]
fn test_every_launch_is_released_exactly_once() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut harness = Harness::default();
    for _ in 0..40 {
        harness.field.add_at(random_point(&mut rng, 30.0));
    }

    let arrivals = Arc::new(AtomicUsize::new(0));
    let mut launched = HashSet::default();
    let mut effect_launches = 0;
    for _ in 0..200 {
        let origin = random_point(&mut rng, 40.0);
        let target = random_point(&mut rng, 40.0);
        let speed = rng.gen_range(1.0..40.0);
        let lifetime = rng.gen_range(0.2..4.0);
        let support = SUPPORTS[rng.gen_range(0..SUPPORTS.len())];
        let (system, mut env) = harness.env();
        let handle = if rng.gen_bool(0.3) {
            effect_launches += 1;
            let counter = Arc::clone(&arrivals);
            let callback: ArrivalCallback = Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            let params = EffectLaunchParams { origin, target, speed, lifetime, damage: 10.0, support };
            system.launch_effect(params, Some(callback), &mut env).unwrap()
        } else {
            let params = LaunchParams { origin, target, speed, lifetime, damage: 30.0, skill: MAGIC_BOLT, support };
            system.launch(params, &mut env).unwrap()
        };
        assert!(launched.insert(handle));
    }

    let mut released = HashSet::default();
    // generous: every chain hop restarts a four second lifetime at most
    for tick in 0..3000 {
        let ctx = if tick % 7 == 3 {
            SimContext::paused(Duration::from_secs_f32(common::DT))
        } else {
            SimContext::from_secs(common::DT)
        };
        for (handle, _) in harness.tick_with(&ctx) {
            assert!(released.insert(handle), "{handle:?} released twice");
        }
    }

    assert_eq!(released, launched);
    let stats = harness.system.stats();
    assert_eq!(stats.acquired, 200);
    assert_eq!(stats.released, 200);
    assert_eq!(stats.outstanding(), 0);
    assert_eq!(harness.system.active_count(), 0);
    assert_eq!(arrivals.load(Ordering::SeqCst), effect_launches);
}

#[test]
fn test_released_slots_come_back_clean() {
    let mut harness = Harness::default();
    harness.field.add_at(Vec3::new(4.0, 0.0, 0.0));
    harness.field.add_at(Vec3::new(8.0, 0.0, 0.0));
    let (system, mut env) = harness.env();
    let params = LaunchParams {
        origin: Vec3::ZERO,
        target: Vec3::new(4.0, 0.0, 0.0),
        speed: 20.0,
        lifetime: 3.0,
        damage: 50.0,
        skill: MAGIC_BOLT,
        support: CHAIN_LIGHTNING_SUPPORT,
    };
    let first = system.launch(params, &mut env).unwrap();
    harness.run_until_resolved(first, 600).unwrap();

    let second = harness.system.launch_basic(Vec3::ZERO, Vec3::Z, 1.0, 1.0).unwrap();
    assert_eq!(first.index(), second.index());
    let instance = harness.system.instance(second).unwrap();
    assert!(instance.chain().is_none());
    assert!(instance.support().is_none());
    assert_eq!(instance.skill_id(), SkillId::NONE);
    assert_eq!(instance.current_damage(), 10.0);
    assert!(!instance.has_arrival_callback());
}
