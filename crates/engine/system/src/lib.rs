//! System crate - Clock, paths and configuration for Tessera
//!
//! # Modules
//!
//! - [`timer`]: Tick sources driving map timers
//! - [`path`]: Resource root layout (maps, shaders, textures)
//! - [`config`]: Engine configuration from TOML and the environment
//!
//! # Example
//!
//! ```rust
//! use system::{EngineConfig, ManualClock, TickSource};
//!
//! let config = EngineConfig::from_toml("global_flags = 256").unwrap();
//! assert_eq!(config.global_flags, 256);
//!
//! let mut clock = ManualClock::new(0.5);
//! clock.tick();
//! assert_eq!(clock.now(), 0.5);
//! ```

pub mod config;
pub mod path;
pub mod timer;

pub use config::{ConfigError, EngineConfig, LogicScope};
pub use path::ResourcePaths;
pub use timer::{FrameTimer, ManualClock, TickSource};
