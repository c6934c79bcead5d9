//! Mesh submissions: buffer references and per-instance records.
//!
//! The queue never reads vertex or index data. A mesh is identified by the
//! buffers it draws from and its primitive topology; every submission of the
//! same triple becomes one more instance of the same batch.

use glam::Mat4;
use strata_core::geometry::{Aabb, BoundingSphere, ScissorRect};

use crate::resource::{BufferHandle, BufferId};

/// Primitive topology of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveMode {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

/// Geometry a mesh draw reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshData {
    /// `None` for non-indexed draws.
    pub index_buffer: Option<BufferHandle>,
    pub vertex_buffer: BufferHandle,
    pub primitive_mode: PrimitiveMode,
}

impl MeshData {
    pub const fn new(
        index_buffer: Option<BufferHandle>,
        vertex_buffer: BufferHandle,
        primitive_mode: PrimitiveMode,
    ) -> Self {
        Self {
            index_buffer,
            vertex_buffer,
            primitive_mode,
        }
    }

    /// Non-indexed triangle list.
    pub const fn triangles(vertex_buffer: BufferHandle) -> Self {
        Self::new(None, vertex_buffer, PrimitiveMode::TriangleList)
    }

    pub fn uses_index_buffer(&self, buffer: BufferId) -> bool {
        self.index_buffer.is_some_and(|b| b.id == buffer)
    }

    pub fn uses_vertex_buffer(&self, buffer: BufferId) -> bool {
        self.vertex_buffer.id == buffer
    }
}

/// One placement of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshInstance {
    pub transform: Mat4,
    pub scissor_rect: ScissorRect,
    /// Computed once at submission, independent of any viewer.
    pub bounding_sphere: BoundingSphere,
}

impl MeshInstance {
    pub fn new(aabb: &Aabb, transform: Mat4, scissor_rect: ScissorRect) -> Self {
        Self {
            transform,
            scissor_rect,
            bounding_sphere: BoundingSphere::from_transformed_aabb(aabb, &transform),
        }
    }
}
