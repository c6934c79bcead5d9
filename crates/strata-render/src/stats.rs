use crate::layer::Layer;

/// Counts gathered by the last [`RenderQueue::sort`](crate::RenderQueue::sort).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Layers holding content this frame.
    pub layer_count: usize,
    /// Opaque batches per kind (one per distinct sort key group).
    pub mesh_batches: usize,
    pub sprite_batches: usize,
    pub billboard_batches: usize,
    /// Opaque draws per kind.
    pub mesh_instances: usize,
    pub sprites: usize,
    pub billboards: usize,
    /// Depth-sorted draws per kind.
    pub depth_sorted_meshes: usize,
    pub depth_sorted_sprites: usize,
    pub depth_sorted_billboards: usize,
    pub drawables: usize,
    /// Draws accepted by the submission API since the last clear.
    pub submitted_draws: usize,
    /// Key fields that ran out of slots.
    pub saturated_fields: u32,
}

impl QueueStats {
    /// Every draw reachable through layer iteration.
    pub fn total_draws(&self) -> usize {
        self.mesh_instances
            + self.sprites
            + self.billboards
            + self.depth_sorted_meshes
            + self.depth_sorted_sprites
            + self.depth_sorted_billboards
            + self.drawables
    }

    pub(crate) fn add_layer(&mut self, layer: &Layer) {
        if layer.is_empty() {
            return;
        }
        self.layer_count += 1;

        for batch in layer.opaque_meshes() {
            self.mesh_batches += 1;
            self.mesh_instances += batch.items.len();
        }
        for batch in layer.opaque_sprites() {
            self.sprite_batches += 1;
            self.sprites += batch.items.iter().map(|c| c.sprite_count).sum::<usize>();
        }
        for batch in layer.opaque_billboards() {
            self.billboard_batches += 1;
            self.billboards += batch.items.len();
        }

        self.depth_sorted_meshes += layer.depth_sorted_meshes().len();
        self.depth_sorted_sprites += layer
            .depth_sorted_sprites()
            .iter()
            .map(|entry| entry.payload.chain.sprite_count)
            .sum::<usize>();
        self.depth_sorted_billboards += layer.depth_sorted_billboards().len();
        self.drawables += layer.drawables().len();
    }
}
