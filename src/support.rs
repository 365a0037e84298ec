use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub struct SupportId(pub i32);

impl SupportId {
    pub const NONE: SupportId = SupportId(0);

    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum SupportCategory {
    #[default]
    Projectile,
    Aoe,
    StatusEffect,
    Chain,
}

impl SupportCategory {
    pub fn from_code(code: i32) -> Self {
        match code {
            8002 => Self::Aoe,
            8003 => Self::StatusEffect,
            8004 => Self::Chain,
            _ => Self::Projectile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum CcType {
    #[default]
    None,
    Stun,
    Slow,
    Root,
    Freeze,
    Knockback,
    Silence,
}

impl CcType {
    pub fn from_code(code: i32) -> Self {
        match code {
            5001 => Self::Stun,
            5002 => Self::Slow,
            5003 => Self::Root,
            5004 => Self::Freeze,
            5005 => Self::Knockback,
            5006 => Self::Silence,
            _ => Self::None,
        }
    }

    /// Whether the effect stops movement outright rather than scaling it.
    pub fn immobilizes(&self) -> bool {
        matches!(self, Self::Stun | Self::Root | Self::Freeze)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum DotType {
    #[default]
    None,
    Burn,
    Poison,
    Bleed,
    Corrosion,
    Curse,
}

impl DotType {
    pub fn from_code(code: i32) -> Self {
        match code {
            6001 => Self::Burn,
            6002 => Self::Poison,
            6003 => Self::Bleed,
            6004 => Self::Corrosion,
            6005 => Self::Curse,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum MarkType {
    #[default]
    None,
    Flame,
    Ice,
    Lightning,
    Poison,
    Holy,
    Curse,
    Focus,
}

impl MarkType {
    pub fn from_code(code: i32) -> Self {
        match code {
            7001 => Self::Flame,
            7002 => Self::Ice,
            7003 => Self::Lightning,
            7004 => Self::Poison,
            7005 => Self::Holy,
            7006 => Self::Curse,
            7007 => Self::Focus,
            _ => Self::None,
        }
    }
}

/// Status-effect payload of a support modifier. A modifier carries exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Default)]
pub enum StatusEffect {
    #[default]
    None,
    CrowdControl {
        kind: CcType,
        duration: f32,
        slow_amount: f32,
    },
    DamageOverTime {
        kind: DotType,
        damage_per_tick: f32,
        tick_interval: f32,
        duration: f32,
    },
    Mark {
        kind: MarkType,
        duration: f32,
        damage_multiplier: f32,
    },
    Chain {
        hops: u32,
        range: f32,
        /// Fraction of damage lost per hop, in `[0, 1)`.
        damage_reduction: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusEffectKind {
    None,
    CrowdControl,
    DamageOverTime,
    Mark,
    Chain,
}

impl StatusEffectKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            4001 => Self::CrowdControl,
            4002 => Self::DamageOverTime,
            4003 => Self::Mark,
            4004 => Self::Chain,
            _ => Self::None,
        }
    }
}

impl StatusEffect {
    pub fn kind(&self) -> StatusEffectKind {
        match self {
            StatusEffect::None => StatusEffectKind::None,
            StatusEffect::CrowdControl { .. } => StatusEffectKind::CrowdControl,
            StatusEffect::DamageOverTime { .. } => StatusEffectKind::DamageOverTime,
            StatusEffect::Mark { .. } => StatusEffectKind::Mark,
            StatusEffect::Chain { .. } => StatusEffectKind::Chain,
        }
    }

    pub fn is_chain(&self) -> bool {
        matches!(self, StatusEffect::Chain { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct SupportModifierDefinition {
    pub id: SupportId,
    pub name: String,
    pub description: String,
    pub category: SupportCategory,
    pub add_projectiles: u32,
    pub add_pierce: u32,
    pub damage_mult: f32,
    pub speed_mult: f32,
    pub aoe_mult: f32,
    pub cooldown_mult: f32,
    pub mana_mult: f32,
    pub attack_speed_mult: f32,
    pub cast_time_mult: f32,
    pub status_effect: StatusEffect,
}

impl Default for SupportModifierDefinition {
    fn default() -> Self {
        Self {
            id: SupportId::NONE,
            name: String::new(),
            description: String::new(),
            category: SupportCategory::Projectile,
            add_projectiles: 0,
            add_pierce: 0,
            damage_mult: 1.0,
            speed_mult: 1.0,
            aoe_mult: 1.0,
            cooldown_mult: 1.0,
            mana_mult: 1.0,
            attack_speed_mult: 1.0,
            cast_time_mult: 1.0,
            status_effect: StatusEffect::None,
        }
    }
}

impl SupportModifierDefinition {
    pub fn scale_damage(&self, base: f32) -> f32 {
        base * self.damage_mult
    }

    pub fn scale_speed(&self, base: f32) -> f32 {
        base * self.speed_mult
    }

    pub fn chain_params(&self) -> Option<(u32, f32, f32)> {
        match self.status_effect {
            StatusEffect::Chain { hops, range, damage_reduction } => Some((hops, range, damage_reduction)),
            _ => None,
        }
    }
}

pub struct SupportPlugin;

impl Plugin for SupportPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SupportId>()
            .register_type::<SupportCategory>()
            .register_type::<CcType>()
            .register_type::<DotType>()
            .register_type::<MarkType>()
            .register_type::<StatusEffect>()
            .register_type::<SupportModifierDefinition>();
    }
}
