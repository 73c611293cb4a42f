//! World crate - Engine context for Tessera
//!
//! [`World`] owns the engine-wide state: the flag store, the plot number,
//! the clock map timers read, the action table and the per-map resource
//! pools. Maps borrow resources while active:
//!
//! ```text
//!            activate_map                 deactivate_map
//! MapData ────────────────▶ ActiveMap ────────────────────▶ MapData
//!                           ├── temporary flag context
//!                           ├── uniform block
//!                           └── texture atlas layers
//!
//! per tick:  process_scope(main, others, nearest)   rules of selected maps
//!            update(dt, uploader)                   sweep pools, upload textures
//! ```
//!
//! # Example
//!
//! ```rust
//! use logic::{BasicAction, Operand, RuleSource};
//! use pool::{SlotHandle, TextureKey, TextureUploader};
//! use system::EngineConfig;
//! use world::{MapData, World};
//!
//! struct NoGpu;
//!
//! impl TextureUploader for NoGpu {
//!     fn resize(&mut self, _layers: usize) {}
//!     fn upload(&mut self, _layer: SlotHandle, _key: TextureKey) {}
//! }
//!
//! let mut world = World::new(EngineConfig::default()).unwrap();
//! let rule = RuleSource::new("!p")
//!     .bind('p', Operand::Plot(0))
//!     .then(BasicAction::SetPlot.id(), &1u16.to_le_bytes())
//!     .compile()
//!     .unwrap();
//!
//! let mut map = world.activate_map(MapData::new(1).with_rules(vec![rule]));
//! world.process_logic(&mut map).unwrap();
//! world.update(1.0 / 60.0, &mut NoGpu);
//!
//! assert_eq!(world.plot(), 1);
//! ```

mod error;
mod map;
mod world;

pub use error::{Error, Result};
pub use map::{ActiveMap, MapData, MapId};
pub use world::{UpdateReport, World};
