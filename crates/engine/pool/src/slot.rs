//! Generic recyclable slot pool
//!
//! Slots move through `Free -> InUse -> PendingReset -> Free`. Releasing a
//! slot only marks it; the payload is cleared by [`SlotPool::sweep`], which
//! the owner runs once per tick. A slot that is re-acquired before the sweep
//! skips the clear entirely.

use crate::{Error, Result};
use std::fmt;
use tracing::{debug, trace};

/// Number of slots reserved whenever a pool runs out of room
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Index of a slot inside its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotHandle(u32);

impl SlotHandle {
    /// Wrap a raw slot index
    pub const fn new(index: u32) -> Self {
        SlotHandle(index)
    }

    /// Slot index as `usize`
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw slot index
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SlotHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotState {
    /// Available, payload is in its zero-state
    #[default]
    Free,
    /// Handed out to an owner
    InUse,
    /// Released; payload is cleared on the next sweep
    PendingReset,
}

/// Payload stored in a pool slot
pub trait SlotPayload {
    /// Bring the payload back to its zero-state
    fn reset(&mut self);
}

/// What happens to the payload when a `PendingReset` slot is re-acquired
/// before the sweep has run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReusePolicy {
    /// Cancel the pending reset and hand the old payload back untouched
    #[default]
    KeepStale,
    /// Clear the payload synchronously before handing the slot out
    ResetOnReuse,
}

#[derive(Debug, Clone)]
struct Slot<P> {
    state: SlotState,
    payload: P,
}

/// Recyclable index allocator with deferred reset
#[derive(Debug, Clone)]
pub struct SlotPool<P> {
    slots: Vec<Slot<P>>,
    /// Zero-state payload cloned into freshly grown slots
    blank: P,
    block_size: usize,
    capacity: usize,
    policy: ReusePolicy,
    /// Set by acquire/release, cleared by sweep
    dirty: bool,
}

impl<P: SlotPayload + Clone> SlotPool<P> {
    /// Create a pool with the default block size
    pub fn new(blank: P) -> Self {
        Self::with_block_size(blank, DEFAULT_BLOCK_SIZE)
    }

    /// Create a pool that grows by `block_size` slots at a time
    pub fn with_block_size(blank: P, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        SlotPool {
            slots: Vec::with_capacity(block_size),
            blank,
            block_size,
            capacity: block_size,
            policy: ReusePolicy::default(),
            dirty: false,
        }
    }

    /// Set the reuse policy (builder pattern)
    pub fn with_policy(mut self, policy: ReusePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get the reuse policy
    pub fn policy(&self) -> ReusePolicy {
        self.policy
    }

    /// Hand out the first slot that is not in use, growing the pool if all
    /// slots are taken
    pub fn acquire(&mut self) -> SlotHandle {
        self.dirty = true;

        if let Some(index) = self
            .slots
            .iter()
            .position(|slot| slot.state != SlotState::InUse)
        {
            let slot = &mut self.slots[index];
            if slot.state == SlotState::PendingReset && self.policy == ReusePolicy::ResetOnReuse {
                slot.payload.reset();
            }
            slot.state = SlotState::InUse;
            trace!(slot = index, "Reused pool slot");
            return SlotHandle(index as u32);
        }

        if self.slots.len() >= self.capacity {
            self.capacity += self.block_size;
            self.slots.reserve_exact(self.capacity - self.slots.len());
            debug!(capacity = self.capacity, "Slot pool grown by one block");
        }

        self.slots.push(Slot {
            state: SlotState::InUse,
            payload: self.blank.clone(),
        });
        SlotHandle((self.slots.len() - 1) as u32)
    }

    /// Put a `PendingReset` slot back in use without clearing it
    ///
    /// Used by owners that look slots up by content rather than taking the
    /// first free one. Slots already in use are left as they are.
    pub fn reclaim(&mut self, handle: SlotHandle) -> Result<()> {
        let policy = self.policy;
        let slot = self.slot_mut(handle)?;
        if slot.state == SlotState::PendingReset && policy == ReusePolicy::ResetOnReuse {
            slot.payload.reset();
        }
        slot.state = SlotState::InUse;
        self.dirty = true;
        Ok(())
    }

    /// Release a slot; its payload is cleared on the next sweep
    pub fn release(&mut self, handle: SlotHandle) -> Result<()> {
        let slot = self.slot_mut(handle)?;
        if slot.state != SlotState::InUse {
            return Err(Error::NotInUse(handle.raw()));
        }
        slot.state = SlotState::PendingReset;
        self.dirty = true;
        Ok(())
    }

    /// Release a slot that was never written to, skipping the deferred reset
    ///
    /// Only an `InUse` slot can be released this way; a `PendingReset`
    /// slot still holds data and must go through [`SlotPool::sweep`].
    pub fn release_unused(&mut self, handle: SlotHandle) -> Result<()> {
        let slot = self.slot_mut(handle)?;
        if slot.state != SlotState::InUse {
            return Err(Error::NotInUse(handle.raw()));
        }
        slot.state = SlotState::Free;
        Ok(())
    }

    /// Clear every `PendingReset` slot, if anything changed since the last
    /// sweep. Returns the number of slots cleared.
    pub fn sweep(&mut self) -> usize {
        if !self.dirty {
            return 0;
        }
        self.dirty = false;

        let mut cleared = 0;
        for slot in &mut self.slots {
            if slot.state == SlotState::PendingReset {
                slot.payload.reset();
                slot.state = SlotState::Free;
                cleared += 1;
            }
        }
        if cleared > 0 {
            debug!(cleared, "Swept pending slots");
        }
        cleared
    }

    /// Check whether the next sweep has work to look at
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Get the state of a slot
    pub fn state(&self, handle: SlotHandle) -> Option<SlotState> {
        self.slots.get(handle.index()).map(|slot| slot.state)
    }

    /// Get the payload of a slot
    pub fn get(&self, handle: SlotHandle) -> Option<&P> {
        self.slots.get(handle.index()).map(|slot| &slot.payload)
    }

    /// Get a mutable reference to the payload of a slot
    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut P> {
        self.slots.get_mut(handle.index()).map(|slot| &mut slot.payload)
    }

    /// Number of slots ever handed out
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no slot was ever handed out
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots reserved (always a multiple of the block size)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently in use
    pub fn in_use(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state == SlotState::InUse)
            .count()
    }

    /// Iterate over all slots with their state and payload
    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, SlotState, &P)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (SlotHandle(i as u32), slot.state, &slot.payload))
    }

    /// Iterate mutably over all slots with their state and payload
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotHandle, SlotState, &mut P)> {
        self.slots
            .iter_mut()
            .enumerate()
            .map(|(i, slot)| (SlotHandle(i as u32), slot.state, &mut slot.payload))
    }

    fn slot_mut(&mut self, handle: SlotHandle) -> Result<&mut Slot<P>> {
        let len = self.slots.len();
        self.slots.get_mut(handle.index()).ok_or(Error::UnknownSlot {
            handle: handle.raw(),
            len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Scratch(u32);

    impl SlotPayload for Scratch {
        fn reset(&mut self) {
            self.0 = 0;
        }
    }

    #[test]
    fn test_acquire_marks_in_use() {
        let mut pool = SlotPool::new(Scratch::default());
        let a = pool.acquire();
        let b = pool.acquire();

        assert_ne!(a, b);
        assert_eq!(pool.state(a), Some(SlotState::InUse));
        assert_eq!(pool.state(b), Some(SlotState::InUse));
        assert!(pool.is_dirty());
    }

    #[test]
    fn test_release_then_sweep_frees_and_clears() {
        let mut pool = SlotPool::new(Scratch::default());
        let handle = pool.acquire();
        pool.get_mut(handle).unwrap().0 = 42;

        pool.release(handle).unwrap();
        assert_eq!(pool.state(handle), Some(SlotState::PendingReset));
        assert_eq!(pool.get(handle), Some(&Scratch(42)));

        assert_eq!(pool.sweep(), 1);
        assert_eq!(pool.state(handle), Some(SlotState::Free));
        assert_eq!(pool.get(handle), Some(&Scratch(0)));
    }

    #[test]
    fn test_reacquire_before_sweep_keeps_stale_payload() {
        let mut pool = SlotPool::new(Scratch::default());
        let first = pool.acquire();
        pool.get_mut(first).unwrap().0 = 7;

        pool.release(first).unwrap();
        let second = pool.acquire();

        assert_eq!(first, second);
        assert_eq!(pool.state(second), Some(SlotState::InUse));
        assert_eq!(pool.get(second), Some(&Scratch(7)));

        // The cancelled reset must not fire later
        pool.sweep();
        assert_eq!(pool.get(second), Some(&Scratch(7)));
    }

    #[test]
    fn test_reset_on_reuse_policy() {
        let mut pool =
            SlotPool::new(Scratch::default()).with_policy(ReusePolicy::ResetOnReuse);
        let first = pool.acquire();
        pool.get_mut(first).unwrap().0 = 7;
        pool.release(first).unwrap();

        let second = pool.acquire();
        assert_eq!(first, second);
        assert_eq!(pool.get(second), Some(&Scratch(0)));
    }

    #[test]
    fn test_grows_by_block() {
        let mut pool = SlotPool::with_block_size(Scratch::default(), 4);
        assert_eq!(pool.capacity(), 4);

        for _ in 0..4 {
            pool.acquire();
        }
        assert_eq!(pool.capacity(), 4);

        let fifth = pool.acquire();
        assert_eq!(fifth.index(), 4);
        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn test_release_unused_skips_reset() {
        let mut pool = SlotPool::new(Scratch::default());
        let handle = pool.acquire();
        pool.release_unused(handle).unwrap();

        assert_eq!(pool.state(handle), Some(SlotState::Free));
        assert_eq!(pool.sweep(), 0);

        assert!(matches!(pool.release_unused(handle), Err(Error::NotInUse(0))));
    }

    #[test]
    fn test_sweep_only_when_dirty() {
        let mut pool = SlotPool::new(Scratch::default());
        let handle = pool.acquire();
        pool.release(handle).unwrap();
        assert_eq!(pool.sweep(), 1);

        assert!(!pool.is_dirty());
        assert_eq!(pool.sweep(), 0);
    }

    #[test]
    fn test_release_errors() {
        let mut pool = SlotPool::new(Scratch::default());
        let handle = pool.acquire();
        pool.release(handle).unwrap();

        assert_eq!(pool.release(handle), Err(Error::NotInUse(0)));
        assert!(matches!(
            pool.release(SlotHandle::new(9)),
            Err(Error::UnknownSlot { handle: 9, len: 1 })
        ));
    }

    #[test]
    fn test_reclaim_pending_slot() {
        let mut pool = SlotPool::new(Scratch::default());
        let a = pool.acquire();
        let _b = pool.acquire();
        pool.get_mut(a).unwrap().0 = 3;
        pool.release(a).unwrap();

        pool.reclaim(a).unwrap();
        assert_eq!(pool.state(a), Some(SlotState::InUse));
        assert_eq!(pool.get(a), Some(&Scratch(3)));
        assert_eq!(pool.in_use(), 2);
    }
}
