//! Index-addressed object pool with generation-checked handles.

use crate::error::CombatError;

/// Lifecycle hooks run by [`Pool`] on acquire and release.
pub trait Poolable: Default {
    fn on_spawn(&mut self) {}
    /// Must clear every per-use field. The slot is reused as-is afterwards.
    fn on_despawn(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

impl PoolHandle {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    generation: u32,
    in_use: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub acquired: u64,
    pub released: u64,
    pub allocated: usize,
}

impl PoolStats {
    pub fn outstanding(&self) -> u64 {
        self.acquired - self.released
    }
}

#[derive(Debug)]
pub struct Pool<T: Poolable> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    capacity: Option<usize>,
    acquired: u64,
    released: u64,
}

impl<T: Poolable> Default for Pool<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T: Poolable> Pool<T> {
    pub fn new(capacity: Option<usize>) -> Self {
        Self { slots: Vec::new(), free: Vec::new(), capacity, acquired: 0, released: 0 }
    }

    pub fn acquire(&mut self) -> Result<PoolHandle, CombatError> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                if let Some(capacity) = self.capacity {
                    if self.slots.len() >= capacity {
                        return Err(CombatError::PoolExhausted { capacity });
                    }
                }
                self.slots.push(Slot { value: T::default(), generation: 0, in_use: false });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.in_use = true;
        slot.value.on_spawn();
        self.acquired += 1;
        Ok(PoolHandle { index, generation: slot.generation })
    }

    /// Returns the slot to the free list. A handle can be released once; afterwards it is stale.
    pub fn release(&mut self, handle: PoolHandle) -> Result<(), CombatError> {
        let slot = self
            .slots
            .get_mut(handle.index())
            .filter(|slot| slot.in_use && slot.generation == handle.generation)
            .ok_or(CombatError::StaleHandle(handle))?;
        slot.value.on_despawn();
        slot.in_use = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.released += 1;
        Ok(())
    }

    pub fn contains(&self, handle: PoolHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.in_use && slot.generation == handle.generation)
            .map(|slot| &slot.value)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.in_use && slot.generation == handle.generation)
            .map(|slot| &mut slot.value)
    }

    pub fn handles(&self) -> Vec<PoolHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.in_use)
            .map(|(index, slot)| PoolHandle { index: index as u32, generation: slot.generation })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.slots.iter().enumerate().filter(|(_, slot)| slot.in_use).map(|(index, slot)| {
            (PoolHandle { index: index as u32, generation: slot.generation }, &slot.value)
        })
    }

    pub fn active_len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats { acquired: self.acquired, released: self.released, allocated: self.slots.len() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Shell {
        payload: Option<u32>,
        spawned: u32,
    }

    impl Poolable for Shell {
        fn on_spawn(&mut self) {
            self.spawned += 1;
        }

        fn on_despawn(&mut self) {
            self.payload = None;
        }
    }

    #[test]
    fn released_slot_is_reused_with_new_generation() {
        let mut pool = Pool::<Shell>::new(Some(1));
        let first = pool.acquire().unwrap();
        pool.get_mut(first).unwrap().payload = Some(7);
        pool.release(first).unwrap();

        let second = pool.acquire().unwrap();
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());
        assert!(pool.get(first).is_none());
        assert_eq!(pool.get(second).unwrap().payload, None);
        assert_eq!(pool.get(second).unwrap().spawned, 2);
    }

    #[test]
    fn double_release_is_rejected() {
        let mut pool = Pool::<Shell>::default();
        let handle = pool.acquire().unwrap();
        pool.release(handle).unwrap();
        assert_eq!(pool.release(handle), Err(CombatError::StaleHandle(handle)));
        assert_eq!(pool.stats().outstanding(), 0);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut pool = Pool::<Shell>::new(Some(1));
        pool.acquire().unwrap();
        assert_eq!(pool.acquire(), Err(CombatError::PoolExhausted { capacity: 1 }));
    }
}
