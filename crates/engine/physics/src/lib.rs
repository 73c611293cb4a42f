//! Physics crate - Collision groups for Tessera map logic
//!
//! The engine does no physics simulation. What map rules need is a yes/no
//! answer to "does anything in this group touch anything in that group",
//! which [`CollisionMap`] provides as a [`logic::Predicate`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  CollisionMap                                 │
//! │  ├── colliders: Vec<Aabb>  (tile rectangles) │
//! │  ├── groups: Vec<ElementGroup>  (indices)    │
//! │  └── rules: Vec<CollisionRule>  (group pair) │
//! ├──────────────────────────────────────────────┤
//! │  Predicate(n) operand ──▶ CollisionMap::test │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use physics::{Aabb, CollisionMap, CollisionRule, ElementGroup};
//!
//! let map = CollisionMap::new()
//!     .with_colliders(vec![Aabb::from_rect(0, 0, 10, 10), Aabb::from_rect(5, 5, 10, 10)])
//!     .with_groups(vec![ElementGroup::new([0]), ElementGroup::new([1])])
//!     .with_rules(vec![CollisionRule::new(0, 1)]);
//!
//! assert!(map.test(0));
//! ```

pub mod collision;
mod error;
mod group;
pub mod io;

pub use collision::Aabb;
pub use error::{Error, Result};
pub use group::{CollisionMap, CollisionRule, ElementGroup};
pub use io::{decode_collision_rules, decode_groups, encode_collision_rules, encode_groups};

// Re-export glam for convenience
pub use glam;
