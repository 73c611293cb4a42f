//! Uniform block payloads for the UBO pool
//!
//! Every active map owns one uniform block describing per-element draw
//! parameters. The GPU buffer itself is owned by the renderer; this is the
//! CPU shadow that the renderer uploads when [`UniformBlock::needs_upload`]
//! is set.

use crate::slot::{ReusePolicy, SlotPayload, SlotPool};
use glam::{Vec2, Vec4};

/// Number of elements addressable through one uniform block
pub const UNIFORM_ARRAY_LEN: usize = 255;

/// CPU shadow of one map's uniform buffer
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlock {
    pub colors: Vec<Vec4>,
    pub move_coords: Vec<Vec2>,
    pub extension: Vec<Vec2>,
    pub texture_offset: Vec<Vec2>,
    pub rotation_offset: Vec<Vec2>,
    pub rotate_sin: Vec<f32>,
    /// Defaults to `1.0` so unrotated elements need no write
    pub rotate_cos: Vec<f32>,
    needs_upload: bool,
}

impl Default for UniformBlock {
    fn default() -> Self {
        UniformBlock {
            colors: vec![Vec4::ZERO; UNIFORM_ARRAY_LEN],
            move_coords: vec![Vec2::ZERO; UNIFORM_ARRAY_LEN],
            extension: vec![Vec2::ZERO; UNIFORM_ARRAY_LEN],
            texture_offset: vec![Vec2::ZERO; UNIFORM_ARRAY_LEN],
            rotation_offset: vec![Vec2::ZERO; UNIFORM_ARRAY_LEN],
            rotate_sin: vec![0.0; UNIFORM_ARRAY_LEN],
            rotate_cos: vec![1.0; UNIFORM_ARRAY_LEN],
            needs_upload: true,
        }
    }
}

impl UniformBlock {
    /// Create a block in its default state
    pub fn new() -> Self {
        UniformBlock::default()
    }

    /// Check whether the block differs from what the GPU last received
    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    /// Flag the block for upload after writing to its fields
    pub fn mark_modified(&mut self) {
        self.needs_upload = true;
    }

    /// Clear the upload flag once the renderer has consumed the block
    pub fn mark_uploaded(&mut self) {
        self.needs_upload = false;
    }

    /// Check whether every field holds its default value
    pub fn is_default(&self) -> bool {
        self.colors.iter().all(|c| *c == Vec4::ZERO)
            && self.move_coords.iter().all(|v| *v == Vec2::ZERO)
            && self.extension.iter().all(|v| *v == Vec2::ZERO)
            && self.texture_offset.iter().all(|v| *v == Vec2::ZERO)
            && self.rotation_offset.iter().all(|v| *v == Vec2::ZERO)
            && self.rotate_sin.iter().all(|v| *v == 0.0)
            && self.rotate_cos.iter().all(|v| *v == 1.0)
    }
}

impl SlotPayload for UniformBlock {
    fn reset(&mut self) {
        self.colors.fill(Vec4::ZERO);
        self.move_coords.fill(Vec2::ZERO);
        self.extension.fill(Vec2::ZERO);
        self.texture_offset.fill(Vec2::ZERO);
        self.rotation_offset.fill(Vec2::ZERO);
        self.rotate_sin.fill(0.0);
        self.rotate_cos.fill(1.0);
        self.needs_upload = true;
    }
}

/// Pool of uniform blocks, one per active map
pub type UboPool = SlotPool<UniformBlock>;

/// Create a UBO pool
///
/// Re-acquired blocks are reset synchronously: a block left over from a
/// different map would otherwise draw that map's element offsets.
pub fn ubo_pool(block_size: usize) -> UboPool {
    SlotPool::with_block_size(UniformBlock::default(), block_size)
        .with_policy(ReusePolicy::ResetOnReuse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_block() {
        let block = UniformBlock::new();
        assert!(block.is_default());
        assert_eq!(block.rotate_cos.len(), UNIFORM_ARRAY_LEN);
        assert!(block.needs_upload());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut block = UniformBlock::new();
        block.colors[3] = Vec4::ONE;
        block.rotate_cos[10] = 0.5;
        block.mark_uploaded();
        assert!(!block.is_default());

        block.reset();
        assert!(block.is_default());
        assert!(block.needs_upload());
    }

    #[test]
    fn test_ubo_pool_resets_reused_block() {
        let mut pool = ubo_pool(8);
        let handle = pool.acquire();
        pool.get_mut(handle).unwrap().move_coords[0] = Vec2::new(3.0, 4.0);
        pool.release(handle).unwrap();

        let again = pool.acquire();
        assert_eq!(handle, again);
        assert!(pool.get(again).unwrap().is_default());
    }
}
