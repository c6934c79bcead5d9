//! The render queue facade.
//!
//! One frame goes through three phases:
//!
//! 1. Submission: `add_*` calls route every draw into its layer, either into
//!    an opaque bin or into a depth-sorted list depending on the material.
//! 2. [`RenderQueue::sort`] computes sort keys for the opaque bins and orders
//!    the depth-sorted lists back to front for a viewer.
//! 3. The consumer walks [`RenderQueue::layers`], then calls
//!    [`RenderQueue::clear`] before the next frame's submissions.
//!
//! # Example
//!
//! ```ignore
//! use strata_render::*;
//!
//! let mut queue = RenderQueue::new();
//! queue.add_mesh(0, &material, mesh, &aabb, transform, ScissorRect::default())?;
//! queue.sort(&camera);
//!
//! for (order, layer) in queue.layers() {
//!     for batch in layer.opaque_meshes() {
//!         // bind batch.material, draw batch.items
//!     }
//! }
//! queue.clear(false);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Mat4;
use strata_core::geometry::{Aabb, ScissorRect};
use strata_core::profiling::profile_function;
use tracing::{debug, error, trace, warn};

use crate::billboard::BillboardAttributes;
use crate::classification::ClassificationIndex;
use crate::config::RenderQueueConfig;
use crate::error::QueueError;
use crate::layer::Layer;
use crate::light::{DirectionalLight, LightList, PointLight, SpotLight};
use crate::mesh::{MeshData, MeshInstance};
use crate::resource::{BufferId, Drawable, Material, MaterialId, TextureId};
use crate::sprite::{SpriteChain, VERTICES_PER_SPRITE, VertexSpan};
use crate::stats::QueueStats;
use crate::viewer::Viewer;

/// Where the queue is in its per-frame cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueState {
    /// Accepting submissions.
    Unsorted,
    /// Held only for the duration of [`RenderQueue::sort`], which borrows the
    /// queue mutably, so callers never read it from [`RenderQueue::state`].
    Sorting,
    /// Ready to be walked; submissions are rejected until the next clear.
    Sorted,
}

pub struct RenderQueue {
    config: RenderQueueConfig,
    layers: BTreeMap<i32, Layer>,
    lights: LightList,
    classification: ClassificationIndex,
    epoch: u64,
    state: QueueState,
    submitted: usize,
    stats: QueueStats,
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::with_config(RenderQueueConfig::default())
    }

    pub fn with_config(config: RenderQueueConfig) -> Self {
        Self {
            config,
            layers: BTreeMap::new(),
            lights: LightList::new(),
            classification: ClassificationIndex::new(),
            epoch: 0,
            state: QueueState::Unsorted,
            submitted: 0,
            stats: QueueStats::default(),
        }
    }

    pub fn config(&self) -> &RenderQueueConfig {
        &self.config
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    /// Number of non-full clears so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Queues one mesh instance.
    ///
    /// The bounding sphere is computed here, once, from `aabb` placed by
    /// `transform`.
    pub fn add_mesh(
        &mut self,
        order: i32,
        material: &Arc<dyn Material>,
        mesh: MeshData,
        aabb: &Aabb,
        transform: Mat4,
        scissor_rect: ScissorRect,
    ) -> Result<(), QueueError> {
        self.begin_submission(order)?;

        let instance = MeshInstance::new(aabb, transform, scissor_rect);
        let epoch = self.epoch;
        self.layer_mut(order)
            .push_mesh(material, mesh, instance, epoch);
        self.submitted += 1;
        Ok(())
    }

    /// Queues `sprite_count` quads read from `vertices`. The vertices are
    /// shared, not copied.
    pub fn add_sprites(
        &mut self,
        order: i32,
        material: &Arc<dyn Material>,
        vertices: VertexSpan,
        sprite_count: usize,
        scissor_rect: ScissorRect,
        overlay: Option<TextureId>,
    ) -> Result<(), QueueError> {
        self.begin_submission(order)?;

        let needed = sprite_count.saturating_mul(VERTICES_PER_SPRITE);
        if vertices.len() < needed {
            return reject(
                order,
                QueueError::SpriteSpanTooShort {
                    sprites: sprite_count,
                    needed,
                    available: vertices.len(),
                },
            );
        }
        if sprite_count == 0 {
            return Ok(());
        }

        let chain = SpriteChain {
            vertices,
            sprite_count,
            scissor_rect,
        };
        let epoch = self.epoch;
        self.layer_mut(order)
            .push_sprites(material, overlay, chain, epoch);
        self.submitted += sprite_count;
        Ok(())
    }

    /// Queues `count` billboards.
    ///
    /// Every spelling of size, rotation and color in `attributes` is
    /// normalized to a [`BillboardData`](crate::BillboardData) record here.
    pub fn add_billboards(
        &mut self,
        order: i32,
        material: &Arc<dyn Material>,
        count: usize,
        scissor_rect: ScissorRect,
        attributes: &BillboardAttributes<'_>,
    ) -> Result<(), QueueError> {
        self.begin_submission(order)?;

        if let Err(err) = attributes.validate(count) {
            return reject(order, err);
        }
        if count == 0 {
            return Ok(());
        }

        let epoch = self.epoch;
        self.layer_mut(order)
            .push_billboards(material, scissor_rect, attributes.records(count), epoch);
        self.submitted += count;
        Ok(())
    }

    /// Queues caller-defined draw logic, kept in submission order.
    pub fn add_drawable(&mut self, order: i32, drawable: Arc<dyn Drawable>) -> Result<(), QueueError> {
        self.begin_submission(order)?;

        self.layer_mut(order).push_drawable(drawable);
        self.submitted += 1;
        Ok(())
    }

    pub fn add_directional_light(&mut self, light: DirectionalLight) {
        self.lights.directional.push(light);
    }

    pub fn add_point_light(&mut self, light: PointLight) {
        self.lights.point.push(light);
    }

    pub fn add_spot_light(&mut self, light: SpotLight) {
        self.lights.spot.push(light);
    }

    pub fn lights(&self) -> &LightList {
        &self.lights
    }

    /// Orders every layer for `viewer`.
    ///
    /// Opaque bins get batch keys; depth-sorted lists are ordered back to
    /// front. Sorting again before the next clear re-sorts for the new viewer.
    pub fn sort(&mut self, viewer: &dyn Viewer) {
        profile_function!();
        self.state = QueueState::Sorting;

        self.classification.reset();
        for (&order, layer) in self.layers.iter_mut() {
            if layer.is_empty() {
                continue;
            }
            let slot = self.classification.layer_slot(order);
            self.classification.begin_layer();
            register_resources(layer, &mut self.classification);
            layer.sort(&mut self.classification, slot, viewer);
        }

        let saturated = self.classification.saturated();
        if !saturated.is_empty() && self.config.report_saturation {
            warn!(
                ?saturated,
                "Sort key fields ran out of slots; batching is coarser this frame"
            );
        }

        self.stats.saturated_fields = saturated.bits().count_ones();
        self.recount_stats();
        trace!(stats = ?self.stats, "Sorted render queue");

        self.state = QueueState::Sorted;
    }

    /// Rebuilds the per-layer counters of [`stats`](Self::stats), keeping the
    /// submission and saturation counts of the last sort.
    fn recount_stats(&mut self) {
        let mut stats = QueueStats {
            submitted_draws: self.submitted,
            saturated_fields: self.stats.saturated_fields,
            ..QueueStats::default()
        };
        for layer in self.layers.values() {
            stats.add_layer(layer);
        }
        self.stats = stats;
    }

    /// Called after an invalidation; keeps a sorted queue's stats in step with
    /// what [`layers`](Self::layers) now yields.
    fn after_invalidation(&mut self) {
        if self.state == QueueState::Sorted {
            self.recount_stats();
        }
    }

    /// Ends the frame.
    ///
    /// With `full` every layer is released. Otherwise layers and bins are
    /// emptied but kept, and those idle for the configured number of epochs
    /// are evicted.
    pub fn clear(&mut self, full: bool) {
        profile_function!();

        self.lights.clear();
        self.state = QueueState::Unsorted;
        self.submitted = 0;
        self.stats = QueueStats::default();

        if full {
            debug!(layers = self.layers.len(), "Released all render layers");
            self.layers.clear();
            return;
        }

        let epoch = self.epoch;
        let config = self.config;
        let mut evicted_bins = 0;
        self.layers.retain(|&order, layer| {
            let idle = epoch.saturating_sub(layer.last_touched());
            if idle >= config.layer_eviction_epochs {
                debug!(order, idle, "Evicted render layer");
                return false;
            }
            evicted_bins += layer.clear(epoch, config.bin_eviction_epochs);
            true
        });
        if evicted_bins > 0 {
            debug!(evicted_bins, "Evicted idle batch bins");
        }

        self.epoch += 1;
    }

    /// Drops every mesh drawn from `buffer` as its index buffer.
    pub fn on_index_buffer_invalidated(&mut self, buffer: BufferId) {
        profile_function!();
        for layer in self.layers.values_mut() {
            layer.invalidate_index_buffer(buffer);
        }
        self.after_invalidation();
    }

    /// Drops every mesh drawn from `buffer` as its vertex buffer.
    pub fn on_vertex_buffer_invalidated(&mut self, buffer: BufferId) {
        profile_function!();
        for layer in self.layers.values_mut() {
            layer.invalidate_vertex_buffer(buffer);
        }
        self.after_invalidation();
    }

    /// Drops every draw and bin using `material`.
    pub fn on_material_invalidated(&mut self, material: MaterialId) {
        profile_function!();
        for layer in self.layers.values_mut() {
            layer.invalidate_material(material);
        }
        self.after_invalidation();
    }

    /// Drops every sprite chain using `texture` as its overlay.
    pub fn on_texture_invalidated(&mut self, texture: TextureId) {
        profile_function!();
        for layer in self.layers.values_mut() {
            layer.invalidate_texture(texture);
        }
        self.after_invalidation();
    }

    /// Layers in ascending render order.
    pub fn layers(&self) -> impl Iterator<Item = (i32, &Layer)> {
        self.layers.iter().map(|(&order, layer)| (order, layer))
    }

    pub fn layer(&self, order: i32) -> Option<&Layer> {
        self.layers.get(&order)
    }

    /// Layers currently allocated, including empty ones kept for reuse.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Statistics of the last sort; zeroed by [`clear`](Self::clear).
    ///
    /// Batch and instance counts follow invalidations made after the sort.
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    fn begin_submission(&self, order: i32) -> Result<(), QueueError> {
        match self.state {
            QueueState::Unsorted => Ok(()),
            QueueState::Sorting | QueueState::Sorted => {
                reject(order, QueueError::SubmitWhileSorted { order })
            }
        }
    }

    fn layer_mut(&mut self, order: i32) -> &mut Layer {
        let epoch = self.epoch;
        let layer = self.layers.entry(order).or_insert_with(|| {
            debug!(order, "Created render layer");
            Layer::new(epoch)
        });
        layer.touch(epoch);
        layer
    }
}

/// Gives the layer's pipelines sharing a shader, and its materials sharing a
/// texture, neighbouring slots.
fn register_resources(layer: &Layer, index: &mut ClassificationIndex) {
    let mut pipelines = Vec::new();
    let mut materials = Vec::new();
    for material in layer.opaque_materials() {
        let pipeline = material.pipeline();
        pipelines.push((pipeline.underlying_shader(), pipeline.id()));
        materials.push((material.diffuse_texture(), material.id()));
    }

    pipelines.sort_unstable();
    pipelines.dedup();
    materials.sort_unstable();
    materials.dedup();

    for &(shader, pipeline) in &pipelines {
        index.shader_slot(shader);
        index.pipeline_slot(pipeline);
    }
    for &(texture, material) in &materials {
        index.texture_slot(texture);
        index.material_slot(material);
    }
}

fn reject(order: i32, err: QueueError) -> Result<(), QueueError> {
    error!(order, error = %err, "Rejected render submission");
    Err(err)
}
