//! Strata Render
//!
//! Per-frame render submission queue. Draw requests (meshes, sprite chains,
//! billboards and caller-defined drawables) are grouped into layers and
//! batch bins, then ordered with packed 64-bit sort keys: opaque draws by
//! pipeline, material, shader, texture and buffer; translucent draws back to
//! front for the current viewer.
//!
//! The queue never owns or dereferences GPU resources. It sees materials,
//! pipelines and buffers through the narrow interfaces in [`resource`] and
//! relies on the `on_*_invalidated` callbacks to forget them.

pub mod billboard;
pub mod classification;
mod color;
pub mod config;
mod error;
pub mod layer;
pub mod light;
pub mod mesh;
mod queue;
pub mod resource;
pub mod sort_key;
pub mod sprite;
mod stats;
pub mod strided;
pub mod viewer;

pub use billboard::{
    BillboardAttributes, BillboardColors, BillboardData, BillboardRotations, BillboardSizes,
};
pub use classification::{ClassificationIndex, KeyFields};
pub use color::Color;
pub use config::RenderQueueConfig;
pub use error::QueueError;
pub use layer::{
    BillboardBatch, DepthSorted, DepthSortedBillboard, DepthSortedMesh, DepthSortedSprites, Layer,
    LayerContents, MeshBatch, OpaqueBatch, SpriteBatch, SpriteGroup,
};
pub use light::{DirectionalLight, LightIndex, LightKind, LightList, PointLight, SpotLight};
pub use mesh::{MeshData, MeshInstance, PrimitiveMode};
pub use queue::{QueueState, RenderQueue};
pub use resource::{
    BufferHandle, BufferId, Drawable, Material, MaterialId, MaterialPipeline, PipelineId, ShaderId,
    StorageId, TextureId,
};
pub use sort_key::SortKey;
pub use sprite::{SpriteChain, SpriteVertex, VertexSpan};
pub use stats::QueueStats;
pub use strided::StridedView;
pub use viewer::{Camera, ProjectionMode, ProjectionType, Viewer};

pub use strata_core::geometry::{Aabb, BoundingSphere, ScissorRect};
