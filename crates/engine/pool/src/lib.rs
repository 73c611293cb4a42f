//! Pool crate - Recyclable resource slots for Tessera maps
//!
//! Every active map borrows a handful of per-map resources: a temporary
//! flag context, a uniform block and some texture atlas layers. All three
//! follow the same lifecycle, provided here by [`SlotPool`]:
//!
//! ```text
//!   acquire            release            sweep
//! Free ──────▶ InUse ─────────▶ PendingReset ──────▶ Free
//!                ▲                   │
//!                └───── acquire ─────┘   (reset cancelled)
//! ```
//!
//! Clearing is deferred to [`SlotPool::sweep`], which the engine runs once
//! per tick, so maps that are deactivated and reactivated within one tick
//! never pay for a reset.
//!
//! # Example
//!
//! ```rust
//! use pool::{SlotPool, SlotPayload, SlotState};
//!
//! #[derive(Clone, Default)]
//! struct Counter(u32);
//!
//! impl SlotPayload for Counter {
//!     fn reset(&mut self) {
//!         self.0 = 0;
//!     }
//! }
//!
//! let mut pool = SlotPool::new(Counter::default());
//! let slot = pool.acquire();
//! pool.get_mut(slot).unwrap().0 = 5;
//!
//! pool.release(slot).unwrap();
//! assert_eq!(pool.state(slot), Some(SlotState::PendingReset));
//!
//! pool.sweep();
//! assert_eq!(pool.get(slot).unwrap().0, 0);
//! ```

mod error;
mod slot;
mod texture;
mod uniform;

pub use error::{Error, Result};
pub use slot::{ReusePolicy, SlotHandle, SlotPayload, SlotPool, SlotState, DEFAULT_BLOCK_SIZE};
pub use texture::{TextureKey, TexturePool, TextureSlot, TextureUploader};
pub use uniform::{ubo_pool, UboPool, UniformBlock, UNIFORM_ARRAY_LEN};

// Re-export glam for convenience
pub use glam;
