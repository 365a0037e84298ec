use std::time::Duration;

use crate::tasks::{CancellationToken, Countdown, SimContext, SimTask, TaskPoll};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifetimeStatus {
    Idle,
    Running,
    Expired,
}

/// Owns the cancellable countdown bounding a launched projectile.
///
/// Each `start` cancels whatever countdown was running before, so at most one countdown is
/// alive per instance. Expiry is reported once; the countdown is dropped as it fires.
#[derive(Debug, Default)]
pub struct LifetimeSupervisor {
    countdown: Option<Countdown>,
    token: Option<CancellationToken>,
}

impl LifetimeSupervisor {
    pub fn start(&mut self, lifetime: Duration) -> CancellationToken {
        self.cancel();
        let token = CancellationToken::new();
        self.countdown = Some(Countdown::new(lifetime, token.clone()));
        self.token = Some(token.clone());
        token
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        self.countdown = None;
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.countdown.as_ref().map(Countdown::remaining)
    }

    pub fn poll(&mut self, ctx: &SimContext) -> LifetimeStatus {
        let Some(countdown) = self.countdown.as_mut() else {
            return LifetimeStatus::Idle;
        };
        match countdown.poll(ctx) {
            TaskPoll::Pending(_) => LifetimeStatus::Running,
            TaskPoll::Ready(()) => {
                self.countdown = None;
                self.token = None;
                LifetimeStatus::Expired
            }
            TaskPoll::Cancelled => {
                self.countdown = None;
                self.token = None;
                LifetimeStatus::Idle
            }
        }
    }
}
