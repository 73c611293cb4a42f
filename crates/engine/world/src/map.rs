//! Map data and activated maps

use crate::Result;
use logic::{Rule, Timer};
use physics::{Aabb, CollisionMap};
use pool::{SlotHandle, TextureKey};

/// Identifier of a map within the game's resources
pub type MapId = u16;

/// Everything the logic core needs from a loaded map
#[derive(Debug, Clone, Default)]
pub struct MapData {
    pub id: MapId,
    /// Rules in evaluation order
    pub rules: Vec<Rule>,
    pub timers: Vec<Timer>,
    pub collision: CollisionMap,
    /// Textures the map draws with; key `0` means "no texture"
    pub textures: Vec<TextureKey>,
}

impl MapData {
    /// Create an empty map
    pub fn new(id: MapId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Set rules (builder pattern)
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    /// Set timers (builder pattern)
    pub fn with_timers(mut self, timers: Vec<Timer>) -> Self {
        self.timers = timers;
        self
    }

    /// Set collision data (builder pattern)
    pub fn with_collision(mut self, collision: CollisionMap) -> Self {
        self.collision = collision;
        self
    }

    /// Set texture keys (builder pattern)
    pub fn with_textures(mut self, textures: Vec<TextureKey>) -> Self {
        self.textures = textures;
        self
    }

    /// Build a map from its binary rule, group and collision rule sections
    pub fn from_sections(
        id: MapId,
        colliders: Vec<Aabb>,
        rules: &[u8],
        groups: &[u8],
        collision_rules: &[u8],
    ) -> Result<Self> {
        let collision = CollisionMap::new()
            .with_colliders(colliders)
            .with_groups(physics::decode_groups(groups)?)
            .with_rules(physics::decode_collision_rules(collision_rules)?);
        Ok(Self::new(id)
            .with_rules(logic::decode_rules(rules)?)
            .with_collision(collision))
    }
}

/// A map holding engine resources
///
/// Created by [`World::activate_map`](crate::World::activate_map) and
/// handed back through [`World::deactivate_map`](crate::World::deactivate_map).
#[derive(Debug)]
pub struct ActiveMap {
    pub(crate) data: MapData,
    pub(crate) context: SlotHandle,
    pub(crate) ubo: SlotHandle,
    pub(crate) texture_layers: Vec<SlotHandle>,
}

impl ActiveMap {
    /// Get the map ID
    pub fn id(&self) -> MapId {
        self.data.id
    }

    /// Get the map data
    pub fn data(&self) -> &MapData {
        &self.data
    }

    /// Get the timers
    pub fn timers(&self) -> &[Timer] {
        &self.data.timers
    }

    /// Get the collision data, for moving elements between ticks
    pub fn collision_mut(&mut self) -> &mut CollisionMap {
        &mut self.data.collision
    }

    /// Get the temporary flag context
    pub fn context(&self) -> SlotHandle {
        self.context
    }

    /// Get the uniform block slot
    pub fn ubo(&self) -> SlotHandle {
        self.ubo
    }

    /// Get the atlas layers bound to the map's textures
    pub fn texture_layers(&self) -> &[SlotHandle] {
        &self.texture_layers
    }
}
