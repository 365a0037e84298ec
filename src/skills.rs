// src/skills.rs
use bevy::prelude::*;
use bevy::utils::HashMap;

use crate::support::{
    CcType, DotType, MarkType, StatusEffect, SupportCategory, SupportId, SupportModifierDefinition,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub struct SkillId(pub i32);

impl SkillId {
    pub const NONE: SkillId = SkillId(0);

    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

/// Damage-shape category of a main skill. Table codes start at 1000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum SkillShape {
    #[default]
    Projectile,
    Aoe,
    Dot,
    Buff,
    Debuff,
    Heal,
    Summon,
    Teleport,
    Dash,
    Flicker,
    Channeling,
    Trap,
    Mine,
    Aura,
    Shield,
}

impl SkillShape {
    pub fn from_code(code: i32) -> Self {
        match code {
            1000 => Self::Projectile,
            1001 => Self::Aoe,
            1002 => Self::Dot,
            1003 => Self::Buff,
            1004 => Self::Debuff,
            1005 => Self::Heal,
            1006 => Self::Summon,
            1007 => Self::Teleport,
            1008 => Self::Dash,
            1009 => Self::Flicker,
            1010 => Self::Channeling,
            1011 => Self::Trap,
            1012 => Self::Mine,
            1013 => Self::Aura,
            1014 => Self::Shield,
            _ => Self::Projectile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum ElementType {
    #[default]
    None,
    Fire,
    Ice,
    Lightning,
    Poison,
    Holy,
    Dark,
    Nature,
    Arcane,
}

impl ElementType {
    pub fn from_code(code: i32) -> Self {
        match code {
            2001 => Self::Fire,
            2002 => Self::Ice,
            2003 => Self::Lightning,
            2004 => Self::Poison,
            2005 => Self::Holy,
            2006 => Self::Dark,
            2007 => Self::Nature,
            2008 => Self::Arcane,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum DamageType {
    #[default]
    Physical,
    Magical,
    Pure,
    Hybrid,
}

impl DamageType {
    pub fn from_code(code: i32) -> Self {
        match code {
            3001 => Self::Magical,
            3002 => Self::Pure,
            3003 => Self::Hybrid,
            _ => Self::Physical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Default)]
pub struct MainSkillDefinition {
    pub id: SkillId,
    pub name: String,
    pub description: String,
    pub shape: SkillShape,
    pub element: ElementType,
    pub damage_type: DamageType,
    pub base_damage: f32,
    pub cooldown: f32,
    pub mana_cost: f32,
    pub cast_time: f32,
    pub range: f32,
    pub projectile_speed: f32,
    pub projectile_count: u32,
    pub projectile_lifetime: f32,
    pub pierce_count: u32,
    /// Carried by the data tables but not applied in flight: projectiles keep their launch direction.
    pub is_homing: bool,
    pub aoe_radius: f32,
    pub aoe_angle: f32,
    pub channel_duration: f32,
    pub channel_tick_interval: f32,
    pub interruptible: bool,
}

/// Read-only lookup of skill and support definitions.
///
/// Ids at or below zero, and any lookup made before the store is ready, resolve to `None`.
pub trait SkillDefinitionStore {
    fn main_skill(&self, id: SkillId) -> Option<&MainSkillDefinition>;
    fn support_modifier(&self, id: SupportId) -> Option<&SupportModifierDefinition>;
}

#[derive(Resource, Default, Reflect)]
#[reflect(Resource)]
pub struct SkillDatabase {
    pub main_skills: HashMap<SkillId, MainSkillDefinition>,
    pub support_modifiers: HashMap<SupportId, SupportModifierDefinition>,
    pub ready: bool,
}

impl SkillDatabase {
    pub fn insert_main_skill(&mut self, definition: MainSkillDefinition) {
        self.main_skills.insert(definition.id, definition);
    }

    pub fn insert_support_modifier(&mut self, definition: SupportModifierDefinition) {
        self.support_modifiers.insert(definition.id, definition);
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
        info!(
            "Skill database ready: {} main skills, {} support modifiers",
            self.main_skills.len(),
            self.support_modifiers.len()
        );
    }

    pub fn with_defaults() -> Self {
        let mut database = Self::default();
        populate_defaults(&mut database);
        database.mark_ready();
        database
    }
}

impl SkillDefinitionStore for SkillDatabase {
    fn main_skill(&self, id: SkillId) -> Option<&MainSkillDefinition> {
        if !self.ready || !id.is_valid() {
            return None;
        }
        self.main_skills.get(&id)
    }

    fn support_modifier(&self, id: SupportId) -> Option<&SupportModifierDefinition> {
        if !self.ready || !id.is_valid() {
            return None;
        }
        self.support_modifiers.get(&id)
    }
}

pub const MAGIC_BOLT: SkillId = SkillId(10001);
pub const ARCANE_VOLLEY: SkillId = SkillId(10002);
pub const FROST_SHARD: SkillId = SkillId(10003);

pub const FROST_SUPPORT: SupportId = SupportId(20001);
pub const BURN_SUPPORT: SupportId = SupportId(20002);
pub const FOCUS_MARK_SUPPORT: SupportId = SupportId(20003);
pub const CHAIN_LIGHTNING_SUPPORT: SupportId = SupportId(20004);
pub const SWIFT_SUPPORT: SupportId = SupportId(20005);

fn populate_defaults(database: &mut SkillDatabase) {
    database.insert_main_skill(MainSkillDefinition {
        id: MAGIC_BOLT,
        name: "Magic Bolt".to_string(),
        description: "Fires a straight bolt of arcane energy.".to_string(),
        shape: SkillShape::Projectile,
        element: ElementType::Arcane,
        damage_type: DamageType::Magical,
        base_damage: 25.0,
        cooldown: 1.5,
        mana_cost: 5.0,
        range: 30.0,
        projectile_speed: 20.0,
        projectile_count: 1,
        projectile_lifetime: 3.0,
        ..default()
    });
    database.insert_main_skill(MainSkillDefinition {
        id: ARCANE_VOLLEY,
        name: "Arcane Volley".to_string(),
        description: "Looses three seeking shards. Seeking is cosmetic; shards fly straight.".to_string(),
        shape: SkillShape::Projectile,
        element: ElementType::Arcane,
        damage_type: DamageType::Magical,
        base_damage: 12.0,
        cooldown: 2.5,
        mana_cost: 8.0,
        range: 25.0,
        projectile_speed: 18.0,
        projectile_count: 3,
        projectile_lifetime: 2.5,
        is_homing: true,
        ..default()
    });
    database.insert_main_skill(MainSkillDefinition {
        id: FROST_SHARD,
        name: "Frost Shard".to_string(),
        description: "A slow shard of ice that pierces one foe.".to_string(),
        shape: SkillShape::Projectile,
        element: ElementType::Ice,
        damage_type: DamageType::Magical,
        base_damage: 18.0,
        cooldown: 2.0,
        mana_cost: 6.0,
        range: 20.0,
        projectile_speed: 12.0,
        projectile_count: 1,
        projectile_lifetime: 3.0,
        pierce_count: 1,
        ..default()
    });

    database.insert_support_modifier(SupportModifierDefinition {
        id: FROST_SUPPORT,
        name: "Frostbite".to_string(),
        description: "Hits slow the target by 40% for 2 seconds.".to_string(),
        category: SupportCategory::StatusEffect,
        status_effect: StatusEffect::CrowdControl { kind: CcType::Slow, duration: 2.0, slow_amount: 0.4 },
        ..default()
    });
    database.insert_support_modifier(SupportModifierDefinition {
        id: BURN_SUPPORT,
        name: "Kindling".to_string(),
        description: "Hits burn for 4 damage every 0.5 seconds over 3 seconds.".to_string(),
        category: SupportCategory::StatusEffect,
        status_effect: StatusEffect::DamageOverTime {
            kind: DotType::Burn,
            damage_per_tick: 4.0,
            tick_interval: 0.5,
            duration: 3.0,
        },
        ..default()
    });
    database.insert_support_modifier(SupportModifierDefinition {
        id: FOCUS_MARK_SUPPORT,
        name: "Focus Sigil".to_string(),
        description: "Marks the target, increasing damage taken by 25% for 5 seconds.".to_string(),
        category: SupportCategory::StatusEffect,
        status_effect: StatusEffect::Mark { kind: MarkType::Focus, duration: 5.0, damage_multiplier: 1.25 },
        ..default()
    });
    database.insert_support_modifier(SupportModifierDefinition {
        id: CHAIN_LIGHTNING_SUPPORT,
        name: "Chain Lightning".to_string(),
        description: "Bolts jump to 3 nearby enemies, losing 25% damage per jump.".to_string(),
        category: SupportCategory::Chain,
        damage_mult: 0.9,
        status_effect: StatusEffect::Chain { hops: 3, range: 8.0, damage_reduction: 0.25 },
        ..default()
    });
    database.insert_support_modifier(SupportModifierDefinition {
        id: SWIFT_SUPPORT,
        name: "Swift Casting".to_string(),
        description: "Projectiles fly 50% faster.".to_string(),
        category: SupportCategory::Projectile,
        speed_mult: 1.5,
        ..default()
    });
}

pub struct SkillsPlugin;

impl Plugin for SkillsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SkillId>()
            .register_type::<SkillShape>()
            .register_type::<ElementType>()
            .register_type::<DamageType>()
            .register_type::<MainSkillDefinition>()
            .register_type::<SkillDatabase>()
            .init_resource::<SkillDatabase>()
            .add_systems(Startup, populate_skill_database);
    }
}

fn populate_skill_database(mut database: ResMut<SkillDatabase>) {
    if database.ready {
        return;
    }
    populate_defaults(&mut database);
    database.mark_ready();
}
