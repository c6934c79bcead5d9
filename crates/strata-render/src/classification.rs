//! Per-sort slot assignment for sort-key fields.
//!
//! Every resource identity that contributes to a key gets a small dense slot,
//! assigned in the order identities are first seen during one
//! [`RenderQueue::sort`](crate::RenderQueue::sort). The index is owned by the
//! queue and reset at the start of every sort, so slots never carry over from
//! one frame to the next.
//!
//! Keys are only compared within one layer, so every field except the layer
//! slot starts over for each layer ([`ClassificationIndex::begin_layer`]).
//! A field saturates only when a single layer holds more distinct identities
//! than the field can encode.

use bitflags::bitflags;
use strata_core::alloc::DenseIndex;
use strata_core::geometry::ScissorRect;

use crate::resource::{MaterialId, PipelineId, ShaderId, StorageId, TextureId};
use crate::sort_key::{bits, field_max};

bitflags! {
    /// Key fields whose slot count exceeded the field width.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyFields: u8 {
        const LAYER    = 1 << 0;
        const PIPELINE = 1 << 1;
        const MATERIAL = 1 << 2;
        const SHADER   = 1 << 3;
        const TEXTURE  = 1 << 4;
        /// Buffer storage or sprite overlay.
        const BUFFER   = 1 << 5;
        const SCISSOR  = 1 << 6;
    }
}

#[derive(Debug, Default)]
pub struct ClassificationIndex {
    layers: DenseIndex<i32>,
    pipelines: DenseIndex<PipelineId>,
    materials: DenseIndex<MaterialId>,
    shaders: DenseIndex<ShaderId>,
    textures: DenseIndex<Option<TextureId>>,
    buffers: DenseIndex<StorageId>,
    overlays: DenseIndex<Option<TextureId>>,
    scissors: DenseIndex<ScissorRect>,
    saturated: KeyFields,
}

impl ClassificationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every slot and saturation flag.
    pub fn reset(&mut self) {
        self.layers.clear();
        self.pipelines.clear();
        self.materials.clear();
        self.shaders.clear();
        self.textures.clear();
        self.buffers.clear();
        self.overlays.clear();
        self.scissors.clear();
        self.saturated = KeyFields::empty();
    }

    /// Forgets every slot except the layer slots. Saturation flags are kept
    /// until the next [`reset`](Self::reset).
    pub fn begin_layer(&mut self) {
        self.pipelines.clear();
        self.materials.clear();
        self.shaders.clear();
        self.textures.clear();
        self.buffers.clear();
        self.overlays.clear();
        self.scissors.clear();
    }

    pub fn layer_slot(&mut self, order: i32) -> u32 {
        let slot = self.layers.slot_of(order);
        self.clamp(slot, bits::LAYER, KeyFields::LAYER)
    }

    pub fn pipeline_slot(&mut self, pipeline: PipelineId) -> u32 {
        let slot = self.pipelines.slot_of(pipeline);
        self.clamp(slot, bits::PIPELINE, KeyFields::PIPELINE)
    }

    pub fn material_slot(&mut self, material: MaterialId) -> u32 {
        let slot = self.materials.slot_of(material);
        self.clamp(slot, bits::MATERIAL, KeyFields::MATERIAL)
    }

    pub fn shader_slot(&mut self, shader: ShaderId) -> u32 {
        let slot = self.shaders.slot_of(shader);
        self.clamp(slot, bits::SHADER, KeyFields::SHADER)
    }

    /// `None` (no diffuse texture) is a slot of its own.
    pub fn texture_slot(&mut self, texture: Option<TextureId>) -> u32 {
        let slot = self.textures.slot_of(texture);
        self.clamp(slot, bits::TEXTURE, KeyFields::TEXTURE)
    }

    pub fn buffer_slot(&mut self, storage: StorageId) -> u32 {
        let slot = self.buffers.slot_of(storage);
        self.clamp(slot, bits::BUFFER, KeyFields::BUFFER)
    }

    /// Sprite overlays share the buffer field of the key.
    pub fn overlay_slot(&mut self, overlay: Option<TextureId>) -> u32 {
        let slot = self.overlays.slot_of(overlay);
        self.clamp(slot, bits::BUFFER, KeyFields::BUFFER)
    }

    pub fn scissor_slot(&mut self, scissor: ScissorRect) -> u32 {
        let slot = self.scissors.slot_of(scissor);
        self.clamp(slot, bits::SCISSOR, KeyFields::SCISSOR)
    }

    /// Fields that ran out of slots since the last reset.
    pub fn saturated(&self) -> KeyFields {
        self.saturated
    }

    /// Slots past the end of a field share its last value.
    fn clamp(&mut self, slot: u32, width: u32, field: KeyFields) -> u32 {
        let max = field_max(width);
        if slot > max {
            self.saturated |= field;
            max
        } else {
            slot
        }
    }
}
