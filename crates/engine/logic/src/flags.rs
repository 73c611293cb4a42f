//! Flag storage
//!
//! The 16-bit flag ID space is split by a threshold fixed at start-up: IDs
//! below `global_flags` address a persistent global bit array, the rest
//! address the temporary context of the current map. Temporary contexts are
//! recycled through a [`SlotPool`], so deactivating a map only schedules its
//! flags to be cleared.

use crate::{Error, Result};
use pool::{ReusePolicy, SlotHandle, SlotPayload, SlotPool, SlotState, DEFAULT_BLOCK_SIZE};
use tracing::{debug, warn};

/// Identifier of a boolean flag
pub type FlagId = u16;

/// Size of the flag ID space
pub const FLAG_ID_SPACE: usize = 1 << 16;

/// Operation applied to a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagOp {
    Enable,
    Disable,
    Toggle,
}

#[inline]
fn read_bit(words: &[u64], bit: usize) -> bool {
    (words[bit / 64] >> (bit % 64)) & 1 == 1
}

#[inline]
fn apply_bit(words: &mut [u64], bit: usize, op: FlagOp) {
    let mask = 1u64 << (bit % 64);
    let word = &mut words[bit / 64];
    match op {
        FlagOp::Enable => *word |= mask,
        FlagOp::Disable => *word &= !mask,
        FlagOp::Toggle => *word ^= mask,
    }
}

/// Bit array backing one map's temporary flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryFlags {
    words: Vec<u64>,
}

impl TemporaryFlags {
    fn new(bits: usize) -> Self {
        TemporaryFlags {
            words: vec![0; bits.div_ceil(64).max(1)],
        }
    }

    /// Check whether any flag is set
    pub fn any(&self) -> bool {
        self.words.iter().any(|w| *w != 0)
    }
}

impl SlotPayload for TemporaryFlags {
    fn reset(&mut self) {
        self.words.fill(0);
    }
}

/// Global and per-map boolean flags
#[derive(Debug, Clone)]
pub struct FlagStore {
    global_flags: u16,
    globals: Vec<u64>,
    contexts: SlotPool<TemporaryFlags>,
    current: Option<SlotHandle>,
}

impl FlagStore {
    /// Create a store with `global_flags` persistent flags
    pub fn new(global_flags: u16) -> Self {
        Self::with_block_size(global_flags, DEFAULT_BLOCK_SIZE)
    }

    /// Create a store whose context pool grows by `block_size` contexts
    pub fn with_block_size(global_flags: u16, block_size: usize) -> Self {
        let temporary_bits = FLAG_ID_SPACE - global_flags as usize;
        FlagStore {
            global_flags,
            globals: vec![0; (global_flags as usize).div_ceil(64).max(1)],
            // A context handed to another map must not show the previous
            // map's flags
            contexts: SlotPool::with_block_size(TemporaryFlags::new(temporary_bits), block_size)
                .with_policy(ReusePolicy::ResetOnReuse),
            current: None,
        }
    }

    /// Get the global/temporary threshold
    pub fn global_flags(&self) -> u16 {
        self.global_flags
    }

    /// Check whether an ID addresses the global array
    pub fn is_global(&self, id: FlagId) -> bool {
        id < self.global_flags
    }

    /// Read a flag
    ///
    /// Temporary flags read as `false` while no context is current.
    pub fn get(&self, id: FlagId) -> bool {
        if self.is_global(id) {
            return read_bit(&self.globals, id as usize);
        }
        self.current_flags()
            .map(|flags| read_bit(&flags.words, (id - self.global_flags) as usize))
            .unwrap_or(false)
    }

    /// Apply an operation to a flag
    pub fn set(&mut self, id: FlagId, op: FlagOp) {
        if self.is_global(id) {
            apply_bit(&mut self.globals, id as usize, op);
            return;
        }
        let bit = (id - self.global_flags) as usize;
        match self.current.and_then(|handle| self.contexts.get_mut(handle)) {
            Some(flags) => apply_bit(&mut flags.words, bit, op),
            None => warn!(id, ?op, "Temporary flag written with no current context"),
        }
    }

    /// Take a temporary context for a newly activated map
    pub fn acquire_context(&mut self) -> SlotHandle {
        let handle = self.contexts.acquire();
        debug!(%handle, "Acquired temporary flag context");
        handle
    }

    /// Release a map's context; its flags are cleared on the next sweep
    pub fn release_context(&mut self, handle: SlotHandle) -> Result<()> {
        self.contexts.release(handle)?;
        self.forget_if_current(handle);
        Ok(())
    }

    /// Release a context that was never written to
    pub fn release_unused_context(&mut self, handle: SlotHandle) -> Result<()> {
        self.contexts.release_unused(handle)?;
        self.forget_if_current(handle);
        Ok(())
    }

    /// Clear released contexts; returns the number cleared
    pub fn sweep_contexts(&mut self) -> usize {
        self.contexts.sweep()
    }

    /// Get a context's lifecycle state
    pub fn context_state(&self, handle: SlotHandle) -> Option<SlotState> {
        self.contexts.state(handle)
    }

    /// Make `handle` the context temporary flag IDs resolve to
    ///
    /// The context must be held by a map; released contexts are refused.
    pub fn set_current_context(&mut self, handle: SlotHandle) -> Result<()> {
        match self.contexts.state(handle) {
            Some(SlotState::InUse) => {}
            Some(_) => return Err(Error::Pool(pool::Error::NotInUse(handle.raw()))),
            None => {
                return Err(Error::Pool(pool::Error::UnknownSlot {
                    handle: handle.raw(),
                    len: self.contexts.len(),
                }))
            }
        }
        if self.current != Some(handle) {
            debug!(%handle, "Switched temporary flag context");
        }
        self.current = Some(handle);
        Ok(())
    }

    /// Detach the current context
    pub fn clear_current_context(&mut self) {
        self.current = None;
    }

    /// Get the current context
    pub fn current_context(&self) -> Option<SlotHandle> {
        self.current
    }

    /// Check whether the context pool has released contexts to clear
    pub fn contexts_dirty(&self) -> bool {
        self.contexts.is_dirty()
    }

    /// Number of contexts held by active maps
    pub fn contexts_in_use(&self) -> usize {
        self.contexts.in_use()
    }

    fn current_flags(&self) -> Option<&TemporaryFlags> {
        self.current.and_then(|handle| self.contexts.get(handle))
    }

    fn forget_if_current(&mut self, handle: SlotHandle) {
        if self.current == Some(handle) {
            self.current = None;
        }
    }
}
