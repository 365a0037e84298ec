use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Subtracts `amount`, never going below zero.
    pub fn take(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

/// Direction an enemy walks toward the library.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Lane {
    pub direction: Vec3,
}

impl Default for Lane {
    fn default() -> Self {
        Self { direction: Vec3::NEG_X }
    }
}

/// Marks the tower entity that fires at the lane.
#[derive(Component, Debug)]
pub struct Tower {
    pub fire_timer: Timer,
    pub range: f32,
}
