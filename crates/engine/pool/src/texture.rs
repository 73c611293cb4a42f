//! Texture atlas slot pool
//!
//! Each slot is one layer of the texture array. Slots are bound by content
//! key (the numeric texture ID) and reference counted by the maps that use
//! them, so two active maps sharing a texture share one layer.

use crate::slot::{SlotHandle, SlotPayload, SlotPool, SlotState};
use crate::{Error, Result};
use tracing::{debug, trace};

/// Numeric texture identifier; `0` means "no texture"
pub type TextureKey = u32;

/// Payload of one atlas layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSlot {
    key: TextureKey,
    dependants: u32,
    needs_upload: bool,
}

impl TextureSlot {
    /// Texture bound to this layer (`0` when unbound)
    pub fn key(&self) -> TextureKey {
        self.key
    }

    /// Number of maps referencing this layer
    pub fn dependants(&self) -> u32 {
        self.dependants
    }

    /// Check whether the image still has to be loaded into the atlas
    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }
}

impl SlotPayload for TextureSlot {
    fn reset(&mut self) {
        *self = TextureSlot::default();
    }
}

/// Loads images into the texture atlas
///
/// Implemented by the renderer; PNG decoding and GL calls live there.
pub trait TextureUploader {
    /// Grow the atlas to `layers` layers, keeping existing contents
    fn resize(&mut self, layers: usize);

    /// Load texture `key` into atlas layer `layer`
    fn upload(&mut self, layer: SlotHandle, key: TextureKey);
}

/// Reference-counted pool of texture atlas layers
#[derive(Debug, Clone)]
pub struct TexturePool {
    slots: SlotPool<TextureSlot>,
    atlas_layers: usize,
    pending_flush: bool,
}

impl TexturePool {
    /// Create a pool whose atlas starts with `block_size` layers
    pub fn new(block_size: usize) -> Self {
        let slots = SlotPool::with_block_size(TextureSlot::default(), block_size);
        TexturePool {
            atlas_layers: slots.capacity(),
            slots,
            pending_flush: false,
        }
    }

    /// Bind `key` to a layer and return it
    ///
    /// A layer already holding `key` is shared (its reference count grows);
    /// a released layer still holding `key` is taken back without reloading.
    /// Returns `None` for key `0`.
    pub fn acquire(&mut self, key: TextureKey) -> Option<SlotHandle> {
        if key == 0 {
            return None;
        }
        self.pending_flush = true;

        let bound = self
            .slots
            .iter()
            .find(|(_, state, slot)| *state != SlotState::Free && slot.key == key)
            .map(|(handle, state, _)| (handle, state));

        let handle = match bound {
            Some((handle, SlotState::InUse)) => {
                let slot = self.slots.get_mut(handle)?;
                slot.dependants += 1;
                trace!(%handle, key, dependants = slot.dependants, "Shared texture layer");
                return Some(handle);
            }
            Some((handle, _)) => {
                self.slots.reclaim(handle).ok()?;
                let slot = self.slots.get_mut(handle)?;
                slot.dependants = 1;
                trace!(%handle, key, "Reclaimed released texture layer");
                handle
            }
            None => {
                let handle = self.slots.acquire();
                let slot = self.slots.get_mut(handle)?;
                *slot = TextureSlot {
                    key,
                    dependants: 1,
                    needs_upload: true,
                };
                debug!(%handle, key, "Bound texture to atlas layer");
                handle
            }
        };
        Some(handle)
    }

    /// Drop one reference; the layer is released when nothing uses it
    pub fn release(&mut self, handle: SlotHandle) -> Result<()> {
        let len = self.slots.len();
        if self.slots.state(handle) != Some(SlotState::InUse) {
            return match self.slots.state(handle) {
                None => Err(Error::UnknownSlot {
                    handle: handle.raw(),
                    len,
                }),
                Some(_) => Err(Error::NotInUse(handle.raw())),
            };
        }

        let remaining = match self.slots.get_mut(handle) {
            Some(slot) => {
                slot.dependants = slot.dependants.saturating_sub(1);
                slot.dependants
            }
            None => 0,
        };
        if remaining == 0 {
            self.slots.release(handle)?;
        }
        Ok(())
    }

    /// Clear released layers; returns the number of layers freed
    pub fn sweep(&mut self) -> usize {
        self.slots.sweep()
    }

    /// Bring the atlas up to date: grow it to the pool capacity and load
    /// every newly bound texture. Returns the number of uploads issued.
    pub fn flush(&mut self, uploader: &mut dyn TextureUploader) -> usize {
        if !self.pending_flush {
            return 0;
        }
        self.pending_flush = false;

        if self.slots.capacity() > self.atlas_layers {
            self.atlas_layers = self.slots.capacity();
            uploader.resize(self.atlas_layers);
            debug!(layers = self.atlas_layers, "Texture atlas resized");
        }

        let mut uploaded = 0;
        for (handle, state, slot) in self.slots.iter_mut() {
            if state == SlotState::InUse && slot.needs_upload {
                uploader.upload(handle, slot.key);
                slot.needs_upload = false;
                uploaded += 1;
            }
        }
        uploaded
    }

    /// Check whether acquire calls happened since the last flush
    pub fn needs_flush(&self) -> bool {
        self.pending_flush
    }

    /// Get a layer's payload
    pub fn get(&self, handle: SlotHandle) -> Option<&TextureSlot> {
        self.slots.get(handle)
    }

    /// Get a layer's state
    pub fn state(&self, handle: SlotHandle) -> Option<SlotState> {
        self.slots.state(handle)
    }

    /// Number of maps referencing a layer
    pub fn refcount(&self, handle: SlotHandle) -> Option<u32> {
        self.slots.get(handle).map(TextureSlot::dependants)
    }

    /// Number of layers in the atlas
    pub fn atlas_layers(&self) -> usize {
        self.atlas_layers
    }

    /// Number of layers ever bound
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no layer was ever bound
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
