//! Mock resource system.

use std::sync::Arc;

use parking_lot::Mutex;
use strata_render::{
    BufferHandle, BufferId, Material, MaterialId, MaterialPipeline, PipelineId, ShaderId,
    StorageId, TextureId,
};

/// Records a resource allocation for verification in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceCall {
    CreateShader { id: ShaderId },
    CreatePipeline { id: PipelineId, shader: ShaderId },
    CreateMaterial { id: MaterialId, pipeline: PipelineId },
    CreateTexture { id: TextureId },
    CreateBuffer { id: BufferId, storage: StorageId },
}

/// A pipeline with a fixed identity and underlying shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockPipeline {
    pub id: PipelineId,
    pub shader: ShaderId,
}

impl MaterialPipeline for MockPipeline {
    fn id(&self) -> PipelineId {
        self.id
    }

    fn underlying_shader(&self) -> ShaderId {
        self.shader
    }
}

/// A material answering the queue's classification queries with fixed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockMaterial {
    pub id: MaterialId,
    pub pipeline: MockPipeline,
    pub shader: ShaderId,
    pub diffuse_texture: Option<TextureId>,
    pub depth_sorted: bool,
}

impl Material for MockMaterial {
    fn id(&self) -> MaterialId {
        self.id
    }

    fn pipeline(&self) -> &dyn MaterialPipeline {
        &self.pipeline
    }

    fn shader(&self) -> ShaderId {
        self.shader
    }

    fn diffuse_texture(&self) -> Option<TextureId> {
        self.diffuse_texture
    }

    fn is_depth_sort_enabled(&self) -> bool {
        self.depth_sorted
    }
}

/// Allocates mock resources with unique identities.
///
/// All identity kinds share one counter, so no two resources ever compare
/// equal by raw value either.
pub struct MockResources {
    calls: Mutex<Vec<ResourceCall>>,
    next_id: Mutex<u64>,
}

impl MockResources {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
        }
    }

    fn next_raw(&self) -> u64 {
        let mut next = self.next_id.lock();
        let raw = *next;
        *next += 1;
        raw
    }

    fn record(&self, call: ResourceCall) {
        self.calls.lock().push(call);
    }

    pub fn shader(&self) -> ShaderId {
        let id = ShaderId::new(self.next_raw());
        self.record(ResourceCall::CreateShader { id });
        id
    }

    /// A pipeline compiled from a fresh shader.
    pub fn pipeline(&self) -> MockPipeline {
        let shader = self.shader();
        self.pipeline_with_shader(shader)
    }

    pub fn pipeline_with_shader(&self, shader: ShaderId) -> MockPipeline {
        let id = PipelineId::new(self.next_raw());
        self.record(ResourceCall::CreatePipeline { id, shader });
        MockPipeline { id, shader }
    }

    /// Starts a material rendered with `pipeline`.
    pub fn material(&self, pipeline: &MockPipeline) -> MockMaterialBuilder<'_> {
        MockMaterialBuilder {
            resources: self,
            pipeline: *pipeline,
            shader: pipeline.shader,
            diffuse_texture: None,
            depth_sorted: false,
        }
    }

    pub fn texture(&self) -> TextureId {
        let id = TextureId::new(self.next_raw());
        self.record(ResourceCall::CreateTexture { id });
        id
    }

    /// A buffer object with its own storage.
    pub fn buffer(&self) -> BufferHandle {
        let storage = StorageId::new(self.next_raw());
        self.buffer_in(storage)
    }

    /// A buffer object viewing existing `storage`.
    pub fn buffer_in(&self, storage: StorageId) -> BufferHandle {
        let id = BufferId::new(self.next_raw());
        self.record(ResourceCall::CreateBuffer { id, storage });
        BufferHandle::new(id, storage)
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<ResourceCall> {
        self.calls.lock().clone()
    }

    pub fn count_material_creates(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, ResourceCall::CreateMaterial { .. }))
            .count()
    }

    pub fn count_pipeline_creates(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, ResourceCall::CreatePipeline { .. }))
            .count()
    }

    pub fn count_buffer_creates(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, ResourceCall::CreateBuffer { .. }))
            .count()
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

impl Default for MockResources {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder returned by [`MockResources::material`].
pub struct MockMaterialBuilder<'a> {
    resources: &'a MockResources,
    pipeline: MockPipeline,
    shader: ShaderId,
    diffuse_texture: Option<TextureId>,
    depth_sorted: bool,
}

impl MockMaterialBuilder<'_> {
    pub fn diffuse(mut self, texture: TextureId) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    pub fn shader(mut self, shader: ShaderId) -> Self {
        self.shader = shader;
        self
    }

    /// Draws with this material are ordered back to front.
    pub fn depth_sorted(mut self) -> Self {
        self.depth_sorted = true;
        self
    }

    pub fn build_mock(self) -> MockMaterial {
        let id = MaterialId::new(self.resources.next_raw());
        self.resources.record(ResourceCall::CreateMaterial {
            id,
            pipeline: self.pipeline.id,
        });
        MockMaterial {
            id,
            pipeline: self.pipeline,
            shader: self.shader,
            diffuse_texture: self.diffuse_texture,
            depth_sorted: self.depth_sorted,
        }
    }

    pub fn build(self) -> Arc<dyn Material> {
        Arc::new(self.build_mock())
    }
}
