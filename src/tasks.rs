//! Cooperative, tick-driven tasks.
//!
//! A task is polled once per simulation tick with an explicit [`SimContext`]. It never blocks;
//! it reports where it is suspended instead. Cancellation goes through a shared
//! [`CancellationToken`] and is observed at the next poll.

use bevy::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on a time multiplier. Larger or infinite scales are clamped to it.
pub const MAX_TIME_SCALE: f32 = 1000.0;
/// Longest span a task can wait or step, about 31 years.
pub const MAX_TASK_SECS: f32 = 1.0e9;

/// Converts seconds to a [`Duration`] without panicking: negative and NaN become zero,
/// anything above [`MAX_TASK_SECS`] (infinity included) is clamped to it.
pub fn clamped_duration(secs: f32) -> Duration {
    if secs.is_nan() {
        return Duration::ZERO;
    }
    Duration::from_secs_f32(secs.clamp(0.0, MAX_TASK_SECS))
}

/// Per-tick simulation input, threaded through every suspension point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimContext {
    pub delta: Duration,
    pub time_scale: f32,
}

impl SimContext {
    pub fn new(delta: Duration, time_scale: f32) -> Self {
        let time_scale = if time_scale.is_nan() { 0.0 } else { time_scale.clamp(0.0, MAX_TIME_SCALE) };
        Self { delta, time_scale }
    }

    pub fn from_secs(delta_secs: f32) -> Self {
        Self::new(clamped_duration(delta_secs), 1.0)
    }

    pub fn paused(delta: Duration) -> Self {
        Self::new(delta, 0.0)
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }

    pub fn scaled_delta(&self) -> Duration {
        if self.is_paused() {
            Duration::ZERO
        } else {
            clamped_duration(self.delta.as_secs_f32() * self.time_scale)
        }
    }

    pub fn scaled_secs(&self) -> f32 {
        self.scaled_delta().as_secs_f32()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspension {
    NextTick,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskPoll<T> {
    Pending(Suspension),
    Ready(T),
    Cancelled,
}

impl<T> TaskPoll<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskPoll::Pending(_))
    }
}

pub trait SimTask {
    type Output;

    fn poll(&mut self, ctx: &SimContext) -> TaskPoll<Self::Output>;
}

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Waits until `duration` of scaled simulation time has elapsed.
#[derive(Debug)]
pub struct Countdown {
    timer: Timer,
    token: CancellationToken,
}

impl Countdown {
    pub fn new(duration: Duration, token: CancellationToken) -> Self {
        Self { timer: Timer::new(duration, TimerMode::Once), token }
    }

    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }
}

impl SimTask for Countdown {
    type Output = ();

    fn poll(&mut self, ctx: &SimContext) -> TaskPoll<()> {
        if self.token.is_cancelled() {
            return TaskPoll::Cancelled;
        }
        if ctx.is_paused() {
            return TaskPoll::Pending(Suspension::Paused);
        }
        self.timer.tick(ctx.scaled_delta());
        if self.timer.finished() {
            TaskPoll::Ready(())
        } else {
            TaskPoll::Pending(Suspension::NextTick)
        }
    }
}

/// Linear interpolation from `origin` to `target` at a fixed speed, bounded by a lifetime.
///
/// Resolves with the target position once progress reaches 1 or the lifetime runs out,
/// whichever comes first.
#[derive(Debug)]
pub struct Interpolation {
    origin: Vec3,
    target: Vec3,
    speed: f32,
    lifetime: f32,
    elapsed: f32,
    position: Vec3,
    token: CancellationToken,
}

impl Interpolation {
    pub fn new(origin: Vec3, target: Vec3, speed: f32, lifetime: f32, token: CancellationToken) -> Self {
        Self { origin, target, speed, lifetime, elapsed: 0.0, position: origin, token }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn progress(&self) -> f32 {
        let distance = self.origin.distance(self.target);
        if distance <= f32::EPSILON {
            return 1.0;
        }
        (self.elapsed * self.speed / distance).clamp(0.0, 1.0)
    }
}

impl SimTask for Interpolation {
    type Output = Vec3;

    fn poll(&mut self, ctx: &SimContext) -> TaskPoll<Vec3> {
        if self.token.is_cancelled() {
            return TaskPoll::Cancelled;
        }
        if ctx.is_paused() {
            return TaskPoll::Pending(Suspension::Paused);
        }
        self.elapsed += ctx.scaled_secs();
        let t = self.progress();
        self.position = self.origin.lerp(self.target, t);
        if t >= 1.0 || self.elapsed >= self.lifetime {
            TaskPoll::Ready(self.target)
        } else {
            TaskPoll::Pending(Suspension::NextTick)
        }
    }
}
