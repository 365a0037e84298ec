mod common;

use bevy::prelude::*;
use common::{Call, Dummy};
use library_defense::skills::{
    DamageType, ElementType, MainSkillDefinition, SkillDatabase, SkillDefinitionStore, SkillId, SkillShape,
    ARCANE_VOLLEY, CHAIN_LIGHTNING_SUPPORT, FROST_SHARD, FROST_SUPPORT, MAGIC_BOLT, SWIFT_SUPPORT,
};
use library_defense::status_effects::dispatch_status_effect;
use library_defense::support::{
    CcType, DotType, MarkType, StatusEffect, StatusEffectKind, SupportCategory, SupportId,
};
use library_defense::visual_effects::{EffectCatalog, SupportVisuals, VisualId, VisualLibrary};

#[test]
fn test_store_rejects_lookups_before_ready() {
    let mut database = SkillDatabase::default();
    database.insert_main_skill(MainSkillDefinition { id: SkillId(7), base_damage: 3.0, ..default() });
    assert!(database.main_skill(SkillId(7)).is_none());

    database.mark_ready();
    assert_eq!(database.main_skill(SkillId(7)).unwrap().base_damage, 3.0);
}

#[test]
fn test_store_rejects_non_positive_ids() {
    let mut database = SkillDatabase::default();
    database.insert_main_skill(MainSkillDefinition { id: SkillId(0), ..default() });
    database.mark_ready();
    assert!(database.main_skill(SkillId(0)).is_none());
    assert!(database.main_skill(SkillId(-4)).is_none());
    assert!(database.support_modifier(SupportId(0)).is_none());
}

#[test]
fn test_default_definitions() {
    let database = SkillDatabase::with_defaults();
    let bolt = database.main_skill(MAGIC_BOLT).unwrap();
    assert_eq!(bolt.shape, SkillShape::Projectile);
    assert_eq!(bolt.element, ElementType::Arcane);
    assert!(database.main_skill(ARCANE_VOLLEY).unwrap().is_homing);
    assert_eq!(database.main_skill(FROST_SHARD).unwrap().element, ElementType::Ice);

    let chain = database.support_modifier(CHAIN_LIGHTNING_SUPPORT).unwrap();
    assert_eq!(chain.category, SupportCategory::Chain);
    assert_eq!(chain.chain_params(), Some((3, 8.0, 0.25)));
    assert_eq!(chain.status_effect.kind(), StatusEffectKind::Chain);

    let swift = database.support_modifier(SWIFT_SUPPORT).unwrap();
    assert_eq!(swift.scale_speed(20.0), 30.0);
    assert_eq!(swift.scale_damage(20.0), 20.0);
    assert!(swift.chain_params().is_none());
}

#[test]
fn test_table_codes() {
    assert_eq!(SkillShape::from_code(1014), SkillShape::Shield);
    assert_eq!(SkillShape::from_code(42), SkillShape::Projectile);
    assert_eq!(ElementType::from_code(2003), ElementType::Lightning);
    assert_eq!(DamageType::from_code(3002), DamageType::Pure);
    assert_eq!(StatusEffectKind::from_code(4004), StatusEffectKind::Chain);
    assert_eq!(CcType::from_code(5004), CcType::Freeze);
    assert_eq!(DotType::from_code(6003), DotType::Bleed);
    assert_eq!(MarkType::from_code(7007), MarkType::Focus);
    assert_eq!(MarkType::from_code(7999), MarkType::None);
    assert_eq!(SupportCategory::from_code(8003), SupportCategory::StatusEffect);
}

#[test]
fn test_cc_passes_slow_only_for_slow() {
    let visuals = SupportVisuals { cc: Some(VisualId(9)), ..default() };
    let mut target = Dummy::at(Vec3::ZERO);
    let stun = StatusEffect::CrowdControl { kind: CcType::Stun, duration: 1.0, slow_amount: 0.7 };
    let slow = StatusEffect::CrowdControl { kind: CcType::Slow, duration: 1.0, slow_amount: 0.7 };
    assert!(dispatch_status_effect(&stun, &visuals, &mut target));
    assert!(dispatch_status_effect(&slow, &visuals, &mut target));
    assert_eq!(
        target.calls,
        vec![
            Call::Cc { kind: CcType::Stun, duration: 1.0, slow: 0.0, visual: Some(VisualId(9)) },
            Call::Cc { kind: CcType::Slow, duration: 1.0, slow: 0.7, visual: Some(VisualId(9)) },
        ]
    );
}

#[test]
fn test_chain_and_none_payloads_are_no_ops() {
    let mut target = Dummy::at(Vec3::ZERO);
    let chain = StatusEffect::Chain { hops: 3, range: 8.0, damage_reduction: 0.25 };
    assert!(!dispatch_status_effect(&chain, &SupportVisuals::default(), &mut target));
    assert!(!dispatch_status_effect(&StatusEffect::None, &SupportVisuals::default(), &mut target));
    assert!(target.calls.is_empty());
}

#[test]
fn test_missing_visual_is_not_an_error() {
    let mut target = Dummy::at(Vec3::ZERO);
    let mark = StatusEffect::Mark { kind: MarkType::Ice, duration: 2.0, damage_multiplier: 1.1 };
    assert!(dispatch_status_effect(&mark, &SupportVisuals::default(), &mut target));
    assert_eq!(
        target.calls,
        vec![Call::Mark { kind: MarkType::Ice, duration: 2.0, multiplier: 1.1, visual: None }]
    );
}

#[test]
fn test_effect_catalog_defaults() {
    let catalog = EffectCatalog::with_defaults();
    assert_eq!(catalog.main_skill_visuals(MAGIC_BOLT).unwrap().hit, Some(VisualId(2)));
    assert_eq!(catalog.main_skill_visuals(FROST_SHARD).unwrap().hit, None);
    assert_eq!(catalog.support_visuals(FROST_SUPPORT).unwrap().cc, Some(VisualId(101)));
    assert_eq!(catalog.support_visuals(CHAIN_LIGHTNING_SUPPORT).unwrap().chain, Some(VisualId(104)));
    assert!(catalog.support_visuals(SWIFT_SUPPORT).is_none());
}
