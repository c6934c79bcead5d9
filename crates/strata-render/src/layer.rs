//! Per-layer storage.
//!
//! A [`Layer`] holds everything submitted to one render order:
//!
//! - three opaque bin families (`pipeline -> material -> group -> items`),
//!   one per drawable kind;
//! - three flat depth-sorted lists for materials that ask for back-to-front
//!   ordering;
//! - the caller-defined drawables, in submission order.
//!
//! Bins survive [`clear`](crate::RenderQueue::clear): their item vectors are
//! emptied with capacity retained, and only bins idle for a configurable
//! number of epochs are dropped from their parent map.

use std::hash::Hash;
use std::sync::Arc;

use bitflags::bitflags;
use glam::Vec3;
use strata_core::alloc::HashMap;
use strata_core::geometry::ScissorRect;

use crate::billboard::BillboardData;
use crate::classification::ClassificationIndex;
use crate::mesh::{MeshData, MeshInstance};
use crate::resource::{BufferId, Drawable, Material, MaterialId, PipelineId, TextureId};
use crate::sort_key::{OpaqueSlots, SortKey};
use crate::sprite::SpriteChain;
use crate::viewer::Viewer;

bitflags! {
    /// Kinds of content written to a layer since the last clear.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayerContents: u8 {
        const MESHES                  = 1 << 0;
        const SPRITES                 = 1 << 1;
        const BILLBOARDS              = 1 << 2;
        const DEPTH_SORTED_MESHES     = 1 << 3;
        const DEPTH_SORTED_SPRITES    = 1 << 4;
        const DEPTH_SORTED_BILLBOARDS = 1 << 5;
        const DRAWABLES               = 1 << 6;
    }
}

/// Opaque sprite chains are grouped by overlay texture and scissor rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteGroup {
    pub overlay: Option<TextureId>,
    pub scissor_rect: ScissorRect,
}

/// One run of compatible opaque draws, as seen by the consumer.
pub struct OpaqueBatch<'a, K, V> {
    pub key: SortKey,
    pub material: &'a Arc<dyn Material>,
    pub group: &'a K,
    pub items: &'a [V],
}

pub type MeshBatch<'a> = OpaqueBatch<'a, MeshData, MeshInstance>;
pub type SpriteBatch<'a> = OpaqueBatch<'a, SpriteGroup, SpriteChain>;
/// Billboards are grouped by scissor rect.
pub type BillboardBatch<'a> = OpaqueBatch<'a, ScissorRect, BillboardData>;

/// An entry of a depth-sorted list. `key` is refreshed by every sort.
#[derive(Clone)]
pub struct DepthSorted<T> {
    pub key: SortKey,
    pub material: Arc<dyn Material>,
    pub payload: T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthSortedMesh {
    pub mesh: MeshData,
    pub instance: MeshInstance,
}

#[derive(Debug, Clone)]
pub struct DepthSortedSprites {
    pub overlay: Option<TextureId>,
    pub chain: SpriteChain,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthSortedBillboard {
    pub billboard: BillboardData,
    pub scissor_rect: ScissorRect,
}

/// Point a depth-sorted entry is measured from.
pub(crate) trait Anchored {
    fn anchor(&self) -> Vec3;
}

impl Anchored for DepthSortedMesh {
    fn anchor(&self) -> Vec3 {
        self.instance.bounding_sphere.center
    }
}

impl Anchored for DepthSortedSprites {
    fn anchor(&self) -> Vec3 {
        self.chain.anchor()
    }
}

impl Anchored for DepthSortedBillboard {
    fn anchor(&self) -> Vec3 {
        self.billboard.center
    }
}

struct Group<V> {
    items: Vec<V>,
    last_touched: u64,
}

struct MaterialBin<K, V> {
    /// Released when the bin is emptied, so an idle bin does not keep its
    /// material alive until eviction.
    material: Option<Arc<dyn Material>>,
    groups: HashMap<K, Group<V>>,
    last_touched: u64,
}

struct PipelineBin<K, V> {
    materials: HashMap<MaterialId, MaterialBin<K, V>>,
    last_touched: u64,
}

#[derive(Debug, Clone, Copy)]
struct OrderEntry<K> {
    key: SortKey,
    pipeline: PipelineId,
    material: MaterialId,
    group: K,
}

/// `pipeline -> material -> group -> items` for one drawable kind.
pub(crate) struct BinFamily<K, V> {
    pipelines: HashMap<PipelineId, PipelineBin<K, V>>,
    order: Vec<OrderEntry<K>>,
}

impl<K: Copy + Eq + Hash, V> Default for BinFamily<K, V> {
    fn default() -> Self {
        Self {
            pipelines: HashMap::default(),
            order: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash, V> BinFamily<K, V> {
    /// Item vector for `(material, group)`, creating bins as needed.
    fn items_mut(&mut self, material: &Arc<dyn Material>, group: K, epoch: u64) -> &mut Vec<V> {
        let pipeline = self
            .pipelines
            .entry(material.pipeline().id())
            .or_insert_with(|| PipelineBin {
                materials: HashMap::default(),
                last_touched: epoch,
            });
        pipeline.last_touched = epoch;

        let bin = pipeline
            .materials
            .entry(material.id())
            .or_insert_with(|| MaterialBin {
                material: None,
                groups: HashMap::default(),
                last_touched: epoch,
            });
        bin.last_touched = epoch;
        bin.material.get_or_insert_with(|| Arc::clone(material));

        let group = bin.groups.entry(group).or_insert_with(|| Group {
            items: Vec::new(),
            last_touched: epoch,
        });
        group.last_touched = epoch;
        &mut group.items
    }

    /// Empties the bins touched in `epoch` and drops those idle for
    /// `eviction` epochs. Returns the number of bins dropped.
    fn clear(&mut self, epoch: u64, eviction: u64) -> usize {
        let idle = |last_touched: u64| epoch.saturating_sub(last_touched) >= eviction;
        let mut evicted = 0;

        self.pipelines.retain(|_, pipeline| {
            pipeline.materials.retain(|_, bin| {
                if idle(bin.last_touched) {
                    evicted += 1;
                    return false;
                }
                if bin.last_touched == epoch {
                    bin.material = None;
                    bin.groups.retain(|_, group| {
                        group.items.clear();
                        !idle(group.last_touched)
                    });
                }
                true
            });

            if pipeline.materials.is_empty() && idle(pipeline.last_touched) {
                evicted += 1;
                false
            } else {
                true
            }
        });

        self.order.clear();
        evicted
    }

    fn retain_groups(&mut self, mut keep: impl FnMut(&K) -> bool) {
        for pipeline in self.pipelines.values_mut() {
            for bin in pipeline.materials.values_mut() {
                bin.groups.retain(|group, _| keep(group));
            }
        }
    }

    fn remove_material(&mut self, material: MaterialId) {
        for pipeline in self.pipelines.values_mut() {
            pipeline.materials.remove(&material);
        }
    }

    /// Materials with at least one pending item.
    pub(crate) fn active_materials(&self) -> impl Iterator<Item = &Arc<dyn Material>> {
        self.pipelines
            .values()
            .flat_map(|pipeline| pipeline.materials.values())
            .filter(|bin| bin.groups.values().any(|g| !g.items.is_empty()))
            .filter_map(|bin| bin.material.as_ref())
    }

    /// Computes a key for every non-empty group and orders them.
    ///
    /// `group_slots` returns the buffer and scissor slots of a group.
    fn sort(
        &mut self,
        index: &mut ClassificationIndex,
        layer: u32,
        mut group_slots: impl FnMut(&mut ClassificationIndex, &K) -> (u32, u32),
    ) {
        self.order.clear();

        for (&pipeline_id, pipeline) in self.pipelines.iter() {
            for (&material_id, bin) in pipeline.materials.iter() {
                let Some(material) = &bin.material else {
                    continue;
                };
                let pipeline_slot = index.pipeline_slot(pipeline_id);
                let material_slot = index.material_slot(material_id);
                let shader_slot = index.shader_slot(material.shader());
                let texture_slot = index.texture_slot(material.diffuse_texture());

                for (group, entry) in bin.groups.iter() {
                    if entry.items.is_empty() {
                        continue;
                    }
                    let (buffer, scissor) = group_slots(index, group);
                    let key = SortKey::opaque(OpaqueSlots {
                        layer,
                        pipeline: pipeline_slot,
                        material: material_slot,
                        shader: shader_slot,
                        texture: texture_slot,
                        buffer,
                        scissor,
                        depth: 0,
                    });
                    self.order.push(OrderEntry {
                        key,
                        pipeline: pipeline_id,
                        material: material_id,
                        group: *group,
                    });
                }
            }
        }

        self.order.sort_unstable_by_key(|entry| entry.key);
    }

    /// Batches in key order. Entries invalidated after the sort are skipped.
    fn batches(&self) -> impl Iterator<Item = OpaqueBatch<'_, K, V>> {
        self.order.iter().filter_map(|entry| {
            let bin = self
                .pipelines
                .get(&entry.pipeline)?
                .materials
                .get(&entry.material)?;
            let material = bin.material.as_ref()?;
            let (group, items) = bin.groups.get_key_value(&entry.group)?;
            (!items.items.is_empty()).then_some(OpaqueBatch {
                key: entry.key,
                material,
                group,
                items: &items.items,
            })
        })
    }

    fn bin_count(&self) -> usize {
        self.pipelines
            .values()
            .map(|pipeline| 1 + pipeline.materials.len())
            .sum()
    }
}

fn sort_by_depth<T: Anchored>(entries: &mut [DepthSorted<T>], layer: u32, viewer: &dyn Viewer) {
    for entry in entries.iter_mut() {
        entry.key = SortKey::depth_sorted(layer, viewer.depth_of(entry.payload.anchor()));
    }
    entries.sort_unstable_by_key(|entry| entry.key);
}

/// Everything submitted to one render order.
pub struct Layer {
    meshes: BinFamily<MeshData, MeshInstance>,
    sprites: BinFamily<SpriteGroup, SpriteChain>,
    billboards: BinFamily<ScissorRect, BillboardData>,
    depth_sorted_meshes: Vec<DepthSorted<DepthSortedMesh>>,
    depth_sorted_sprites: Vec<DepthSorted<DepthSortedSprites>>,
    depth_sorted_billboards: Vec<DepthSorted<DepthSortedBillboard>>,
    drawables: Vec<Arc<dyn Drawable>>,
    contents: LayerContents,
    last_touched: u64,
}

impl Layer {
    pub(crate) fn new(epoch: u64) -> Self {
        Self {
            meshes: BinFamily::default(),
            sprites: BinFamily::default(),
            billboards: BinFamily::default(),
            depth_sorted_meshes: Vec::new(),
            depth_sorted_sprites: Vec::new(),
            depth_sorted_billboards: Vec::new(),
            drawables: Vec::new(),
            contents: LayerContents::empty(),
            last_touched: epoch,
        }
    }

    pub(crate) fn touch(&mut self, epoch: u64) {
        self.last_touched = epoch;
    }

    pub(crate) fn push_mesh(
        &mut self,
        material: &Arc<dyn Material>,
        mesh: MeshData,
        instance: MeshInstance,
        epoch: u64,
    ) {
        if material.is_depth_sort_enabled() {
            self.contents |= LayerContents::DEPTH_SORTED_MESHES;
            self.depth_sorted_meshes.push(DepthSorted {
                key: SortKey::default(),
                material: Arc::clone(material),
                payload: DepthSortedMesh { mesh, instance },
            });
        } else {
            self.contents |= LayerContents::MESHES;
            self.meshes.items_mut(material, mesh, epoch).push(instance);
        }
    }

    pub(crate) fn push_sprites(
        &mut self,
        material: &Arc<dyn Material>,
        overlay: Option<TextureId>,
        chain: SpriteChain,
        epoch: u64,
    ) {
        if material.is_depth_sort_enabled() {
            self.contents |= LayerContents::DEPTH_SORTED_SPRITES;
            self.depth_sorted_sprites.push(DepthSorted {
                key: SortKey::default(),
                material: Arc::clone(material),
                payload: DepthSortedSprites { overlay, chain },
            });
        } else {
            self.contents |= LayerContents::SPRITES;
            let group = SpriteGroup {
                overlay,
                scissor_rect: chain.scissor_rect,
            };
            self.sprites.items_mut(material, group, epoch).push(chain);
        }
    }

    pub(crate) fn push_billboards(
        &mut self,
        material: &Arc<dyn Material>,
        scissor_rect: ScissorRect,
        billboards: impl Iterator<Item = BillboardData>,
        epoch: u64,
    ) {
        if material.is_depth_sort_enabled() {
            self.contents |= LayerContents::DEPTH_SORTED_BILLBOARDS;
            self.depth_sorted_billboards
                .extend(billboards.map(|billboard| DepthSorted {
                    key: SortKey::default(),
                    material: Arc::clone(material),
                    payload: DepthSortedBillboard {
                        billboard,
                        scissor_rect,
                    },
                }));
        } else {
            self.contents |= LayerContents::BILLBOARDS;
            self.billboards
                .items_mut(material, scissor_rect, epoch)
                .extend(billboards);
        }
    }

    pub(crate) fn push_drawable(&mut self, drawable: Arc<dyn Drawable>) {
        self.contents |= LayerContents::DRAWABLES;
        self.drawables.push(drawable);
    }

    /// Empties the layer for the next epoch. Returns the number of bins
    /// evicted.
    pub(crate) fn clear(&mut self, epoch: u64, bin_eviction: u64) -> usize {
        let evicted = self.meshes.clear(epoch, bin_eviction)
            + self.sprites.clear(epoch, bin_eviction)
            + self.billboards.clear(epoch, bin_eviction);

        self.depth_sorted_meshes.clear();
        self.depth_sorted_sprites.clear();
        self.depth_sorted_billboards.clear();
        self.drawables.clear();
        self.contents = LayerContents::empty();
        evicted
    }

    pub(crate) fn sort(&mut self, index: &mut ClassificationIndex, layer: u32, viewer: &dyn Viewer) {
        if self.contents.contains(LayerContents::MESHES) {
            self.meshes.sort(index, layer, |index, mesh| {
                (index.buffer_slot(mesh.vertex_buffer.storage), 0)
            });
        }
        if self.contents.contains(LayerContents::SPRITES) {
            self.sprites.sort(index, layer, |index, group| {
                (
                    index.overlay_slot(group.overlay),
                    index.scissor_slot(group.scissor_rect),
                )
            });
        }
        if self.contents.contains(LayerContents::BILLBOARDS) {
            self.billboards.sort(index, layer, |index, scissor| {
                (0, index.scissor_slot(*scissor))
            });
        }

        sort_by_depth(&mut self.depth_sorted_meshes, layer, viewer);
        sort_by_depth(&mut self.depth_sorted_sprites, layer, viewer);
        sort_by_depth(&mut self.depth_sorted_billboards, layer, viewer);
    }

    pub(crate) fn invalidate_index_buffer(&mut self, buffer: BufferId) {
        self.meshes.retain_groups(|mesh| !mesh.uses_index_buffer(buffer));
        self.depth_sorted_meshes
            .retain(|entry| !entry.payload.mesh.uses_index_buffer(buffer));
    }

    pub(crate) fn invalidate_vertex_buffer(&mut self, buffer: BufferId) {
        self.meshes.retain_groups(|mesh| !mesh.uses_vertex_buffer(buffer));
        self.depth_sorted_meshes
            .retain(|entry| !entry.payload.mesh.uses_vertex_buffer(buffer));
    }

    pub(crate) fn invalidate_material(&mut self, material: MaterialId) {
        self.meshes.remove_material(material);
        self.sprites.remove_material(material);
        self.billboards.remove_material(material);
        self.depth_sorted_meshes
            .retain(|entry| entry.material.id() != material);
        self.depth_sorted_sprites
            .retain(|entry| entry.material.id() != material);
        self.depth_sorted_billboards
            .retain(|entry| entry.material.id() != material);
    }

    pub(crate) fn invalidate_texture(&mut self, texture: TextureId) {
        self.sprites
            .retain_groups(|group| group.overlay != Some(texture));
        self.depth_sorted_sprites
            .retain(|entry| entry.payload.overlay != Some(texture));
    }

    /// Materials with opaque content, across all three kinds.
    pub(crate) fn opaque_materials(&self) -> impl Iterator<Item = &Arc<dyn Material>> {
        self.meshes
            .active_materials()
            .chain(self.sprites.active_materials())
            .chain(self.billboards.active_materials())
    }

    pub(crate) fn last_touched(&self) -> u64 {
        self.last_touched
    }

    /// What was submitted since the last clear.
    pub fn contents(&self) -> LayerContents {
        self.contents
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Opaque mesh batches in ascending key order.
    pub fn opaque_meshes(&self) -> impl Iterator<Item = MeshBatch<'_>> {
        self.meshes.batches()
    }

    pub fn opaque_sprites(&self) -> impl Iterator<Item = SpriteBatch<'_>> {
        self.sprites.batches()
    }

    pub fn opaque_billboards(&self) -> impl Iterator<Item = BillboardBatch<'_>> {
        self.billboards.batches()
    }

    /// Translucent meshes, farthest first.
    pub fn depth_sorted_meshes(&self) -> &[DepthSorted<DepthSortedMesh>] {
        &self.depth_sorted_meshes
    }

    pub fn depth_sorted_sprites(&self) -> &[DepthSorted<DepthSortedSprites>] {
        &self.depth_sorted_sprites
    }

    pub fn depth_sorted_billboards(&self) -> &[DepthSorted<DepthSortedBillboard>] {
        &self.depth_sorted_billboards
    }

    pub fn drawables(&self) -> &[Arc<dyn Drawable>] {
        &self.drawables
    }

    /// Pipeline and material bins currently allocated, empty or not.
    pub fn bin_count(&self) -> usize {
        self.meshes.bin_count() + self.sprites.bin_count() + self.billboards.bin_count()
    }
}
