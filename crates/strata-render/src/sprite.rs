//! Sprite submissions.
//!
//! Sprites arrive as pre-built quads: four [`SpriteVertex`] per sprite, laid
//! out back to back in storage owned by the submitter. The queue keeps a
//! [`VertexSpan`] into that storage and never copies the vertices.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use strata_core::geometry::ScissorRect;

use crate::Color;

/// Vertices per sprite quad.
pub const VERTICES_PER_SPRITE: usize = 4;

/// Position, color and texture coordinate of one sprite corner.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: Vec3,
    pub color: Color,
    pub uv: Vec2,
}

static_assertions::assert_eq_size!(SpriteVertex, [f32; 9]);

impl SpriteVertex {
    pub const fn new(position: Vec3, color: Color, uv: Vec2) -> Self {
        Self {
            position,
            color,
            uv,
        }
    }
}

/// Shared view into externally owned sprite vertices.
///
/// Cloning a span clones the `Arc`, not the vertices.
#[derive(Debug, Clone)]
pub struct VertexSpan {
    storage: Arc<[SpriteVertex]>,
    start: usize,
}

impl VertexSpan {
    /// View over the whole storage.
    pub fn new(storage: Arc<[SpriteVertex]>) -> Self {
        Self { storage, start: 0 }
    }

    /// View starting at vertex `start` of the storage (clamped to its end).
    pub fn starting_at(storage: Arc<[SpriteVertex]>, start: usize) -> Self {
        let start = start.min(storage.len());
        Self { storage, start }
    }

    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.storage[self.start..]
    }

    pub fn len(&self) -> usize {
        self.storage.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both spans view the same storage allocation.
    pub fn shares_storage(&self, other: &VertexSpan) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }
}

/// A run of sprites sharing material, overlay and scissor.
#[derive(Debug, Clone)]
pub struct SpriteChain {
    pub vertices: VertexSpan,
    pub sprite_count: usize,
    pub scissor_rect: ScissorRect,
}

impl SpriteChain {
    /// Vertices belonging to this chain (exactly `4 * sprite_count`).
    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices.vertices()[..self.sprite_count * VERTICES_PER_SPRITE]
    }

    /// Position used to depth-sort the chain: its first vertex.
    pub fn anchor(&self) -> Vec3 {
        self.vertices
            .vertices()
            .first()
            .map_or(Vec3::ZERO, |v| v.position)
    }
}
