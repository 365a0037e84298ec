use thiserror::Error;

use crate::pool::PoolHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("projectile pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: usize },
    #[error("stale or already released projectile handle {0:?}")]
    StaleHandle(PoolHandle),
    #[error("projectile {0:?} is not launched")]
    NotLaunched(PoolHandle),
}
