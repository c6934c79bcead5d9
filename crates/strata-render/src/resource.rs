//! Interfaces to the resources the queue references but never owns.
//!
//! Materials, pipelines, shaders, textures and buffers live in an external
//! resource system. The queue only compares their identities and asks a
//! material a handful of questions while classifying a draw.

/// Declares a copyable opaque identity.
macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Identity of the object behind `ptr` (pointer equality).
            pub fn from_ptr<T: ?Sized>(ptr: *const T) -> Self {
                Self(ptr.cast::<()>() as usize as u64)
            }

            pub const fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

resource_id!(
    /// Identity of a material.
    MaterialId
);
resource_id!(
    /// Identity of a material pipeline (render state + shader permutation).
    PipelineId
);
resource_id!(
    /// Identity of a shader program.
    ShaderId
);
resource_id!(
    /// Identity of a texture.
    TextureId
);
resource_id!(
    /// Identity of an index or vertex buffer object.
    BufferId
);
resource_id!(
    /// Identity of the GPU storage a buffer object views.
    StorageId
);

/// An index or vertex buffer as seen by the queue.
///
/// Several buffer objects may view the same storage; batching groups by
/// storage while invalidation matches the buffer object itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    pub id: BufferId,
    pub storage: StorageId,
}

impl BufferHandle {
    pub const fn new(id: BufferId, storage: StorageId) -> Self {
        Self { id, storage }
    }
}

/// The pipeline a material renders with.
pub trait MaterialPipeline: Send + Sync {
    fn id(&self) -> PipelineId;

    /// Shader the pipeline was compiled from. Pipelines sharing a shader are
    /// ordered next to each other.
    fn underlying_shader(&self) -> ShaderId;
}

/// The narrow view of a material the queue needs for classification.
pub trait Material: Send + Sync {
    fn id(&self) -> MaterialId;

    fn pipeline(&self) -> &dyn MaterialPipeline;

    fn shader(&self) -> ShaderId;

    fn diffuse_texture(&self) -> Option<TextureId>;

    /// Whether draws using this material need back-to-front ordering.
    fn is_depth_sort_enabled(&self) -> bool;
}

/// Caller-defined draw logic the queue forwards untouched.
///
/// Drawables are kept per layer in submission order and invoked by the
/// consumer after the structured draws of that layer.
pub trait Drawable: Send + Sync {
    fn draw(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ptr_identity() {
        let a = Box::new(1_u32);
        let b = Box::new(1_u32);
        assert_eq!(TextureId::from_ptr(&*a), TextureId::from_ptr(&*a));
        assert_ne!(TextureId::from_ptr(&*a), TextureId::from_ptr(&*b));
    }

    #[test]
    fn test_buffer_handle_equality_includes_storage() {
        let a = BufferHandle::new(BufferId(1), StorageId(10));
        let b = BufferHandle::new(BufferId(1), StorageId(11));
        assert_ne!(a, b);
    }
}
