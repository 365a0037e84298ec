use bevy::prelude::*;
use std::time::Duration;

use crate::config::SimulationSpeed;
use crate::enemy::Enemy;
use crate::support::{CcType, DotType, MarkType, StatusEffect};
use crate::target::Targetable;
use crate::tasks::clamped_duration;
use crate::visual_effects::SupportVisuals;
use crate::CombatSet;

const MIN_DOT_TICK_INTERVAL_SECS: f32 = 0.05;

/// Applies a support modifier's status-effect payload to a struck target.
///
/// Chain payloads are resolved by the projectile itself and are a no-op here, as is `None`.
/// Returns whether a capability call was made.
pub fn dispatch_status_effect<T: Targetable + ?Sized>(
    effect: &StatusEffect,
    visuals: &SupportVisuals,
    target: &mut T,
) -> bool {
    match *effect {
        StatusEffect::CrowdControl { kind, duration, slow_amount } => {
            let slow = if kind == CcType::Slow { slow_amount } else { 0.0 };
            target.apply_cc(kind, duration, slow, visuals.cc);
            true
        }
        StatusEffect::DamageOverTime { kind, damage_per_tick, tick_interval, duration } => {
            target.apply_dot(kind, damage_per_tick, tick_interval, duration, visuals.dot);
            true
        }
        StatusEffect::Mark { kind, duration, damage_multiplier } => {
            target.apply_mark(kind, duration, damage_multiplier, visuals.mark);
            true
        }
        StatusEffect::Chain { .. } | StatusEffect::None => false,
    }
}

#[derive(Debug, Clone)]
struct ActiveCc {
    kind: CcType,
    slow_amount: f32,
    timer: Timer,
}

#[derive(Debug, Clone)]
struct ActiveDot {
    kind: DotType,
    damage_per_tick: f32,
    tick: Timer,
    duration: Timer,
}

#[derive(Debug, Clone)]
struct ActiveMark {
    kind: MarkType,
    damage_multiplier: f32,
    timer: Timer,
}

/// Status effects currently running on one target. Reapplying a kind refreshes it.
#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
    crowd_control: Vec<ActiveCc>,
    dots: Vec<ActiveDot>,
    marks: Vec<ActiveMark>,
}

impl StatusTracker {
    pub fn add_cc(&mut self, kind: CcType, duration: f32, slow_amount: f32) {
        if kind == CcType::None || duration <= 0.0 {
            return;
        }
        self.crowd_control.retain(|cc| cc.kind != kind);
        self.crowd_control.push(ActiveCc {
            kind,
            slow_amount: slow_amount.clamp(0.0, 1.0),
            timer: Timer::new(clamped_duration(duration), TimerMode::Once),
        });
    }

    pub fn add_dot(
        &mut self,
        kind: DotType,
        damage_per_tick: f32,
        tick_interval: f32,
        duration: f32,
    ) {
        if kind == DotType::None || duration <= 0.0 {
            return;
        }
        self.dots.retain(|dot| dot.kind != kind);
        self.dots.push(ActiveDot {
            kind,
            damage_per_tick,
            tick: Timer::new(clamped_duration(tick_interval.max(MIN_DOT_TICK_INTERVAL_SECS)), TimerMode::Repeating),
            duration: Timer::new(clamped_duration(duration), TimerMode::Once),
        });
    }

    pub fn add_mark(&mut self, kind: MarkType, duration: f32, damage_multiplier: f32) {
        if kind == MarkType::None || duration <= 0.0 {
            return;
        }
        self.marks.retain(|mark| mark.kind != kind);
        self.marks.push(ActiveMark {
            kind,
            damage_multiplier,
            timer: Timer::new(clamped_duration(duration), TimerMode::Once),
        });
    }

    /// Advances every effect and returns the damage-over-time dealt during `delta`.
    pub fn tick(&mut self, delta: Duration) -> f32 {
        let mut damage = 0.0;
        for dot in self.dots.iter_mut() {
            dot.duration.tick(delta);
            dot.tick.tick(delta);
            damage += dot.damage_per_tick * dot.tick.times_finished_this_tick() as f32;
        }
        self.dots.retain(|dot| !dot.duration.finished());

        for cc in self.crowd_control.iter_mut() {
            cc.timer.tick(delta);
        }
        self.crowd_control.retain(|cc| !cc.timer.finished());

        for mark in self.marks.iter_mut() {
            mark.timer.tick(delta);
        }
        self.marks.retain(|mark| !mark.timer.finished());
        damage
    }

    /// Multiplier on movement speed: zero while immobilized, otherwise the strongest slow.
    pub fn movement_factor(&self) -> f32 {
        if self.crowd_control.iter().any(|cc| cc.kind.immobilizes()) {
            return 0.0;
        }
        self.crowd_control
            .iter()
            .filter(|cc| cc.kind == CcType::Slow)
            .map(|cc| 1.0 - cc.slow_amount)
            .fold(1.0, f32::min)
    }

    /// Strongest mark multiplier on incoming damage, or 1 when unmarked.
    pub fn damage_taken_multiplier(&self) -> f32 {
        self.marks.iter().map(|mark| mark.damage_multiplier).fold(1.0, f32::max)
    }

    pub fn has_cc(&self, kind: CcType) -> bool {
        self.crowd_control.iter().any(|cc| cc.kind == kind)
    }

    pub fn has_dot(&self, kind: DotType) -> bool {
        self.dots.iter().any(|dot| dot.kind == kind)
    }

    pub fn has_mark(&self, kind: MarkType) -> bool {
        self.marks.iter().any(|mark| mark.kind == kind)
    }

    pub fn has_focus_mark(&self) -> bool {
        self.has_mark(MarkType::Focus)
    }
}

fn enemy_status_effect_system(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut enemies: Query<&mut Enemy>,
) {
    if speed.is_paused() {
        return;
    }
    let delta = speed.context(time.delta()).scaled_delta();
    for mut enemy in enemies.iter_mut() {
        if !enemy.is_alive() {
            continue;
        }
        let damage = enemy.statuses.tick(delta);
        if damage > 0.0 {
            enemy.apply_damage(damage);
        }
    }
}

pub struct StatusEffectsPlugin;

impl Plugin for StatusEffectsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationSpeed>()
            .add_systems(Update, enemy_status_effect_system.in_set(CombatSet::Status));
    }
}
