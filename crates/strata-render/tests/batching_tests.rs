//! Opaque batching: grouping, key order and statistics.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use strata_render::{
    Aabb, BillboardAttributes, BillboardColors, BillboardRotations, BillboardSizes, BufferHandle,
    Color, KeyFields, Material, MaterialPipeline, MeshData, RenderQueue, ScissorRect,
    SpriteVertex, StridedView, VertexSpan,
};
use strata_test_utils::{MockDrawable, MockResources, MockViewer};

fn unit_box() -> Aabb {
    Aabb::from_center_extents(Vec3::ZERO, Vec3::ONE)
}

fn viewer() -> MockViewer {
    MockViewer::perspective(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
}

fn add_mesh(queue: &mut RenderQueue, order: i32, material: &Arc<dyn Material>, buffer: BufferHandle) {
    queue
        .add_mesh(
            order,
            material,
            MeshData::triangles(buffer),
            &unit_box(),
            Mat4::IDENTITY,
            ScissorRect::default(),
        )
        .unwrap();
}

fn sprite_span(count: usize) -> VertexSpan {
    let vertex = SpriteVertex::new(Vec3::ZERO, Color::WHITE, Vec2::ZERO);
    VertexSpan::new(vec![vertex; count * 4].into())
}

/// Whether every distinct value occupies a single run.
fn is_contiguous<T: PartialEq>(sequence: &[T]) -> bool {
    sequence.iter().enumerate().all(|(i, value)| {
        let last = sequence.iter().rposition(|v| v == value).unwrap();
        sequence[i..=last].iter().all(|v| v == value)
    })
}

#[test]
fn test_same_buffer_instances_are_adjacent() {
    let resources = MockResources::new();
    let pipeline = resources.pipeline();
    let material = resources.material(&pipeline).build();
    let a = resources.buffer();
    let b = resources.buffer();

    let mut queue = RenderQueue::new();
    add_mesh(&mut queue, 0, &material, a);
    add_mesh(&mut queue, 0, &material, b);
    add_mesh(&mut queue, 0, &material, a);
    queue.sort(&viewer());

    let layer = queue.layer(0).unwrap();
    let draws: Vec<_> = layer
        .opaque_meshes()
        .flat_map(|batch| batch.items.iter().map(move |_| batch.group.vertex_buffer))
        .collect();

    assert_eq!(draws.len(), 3);
    assert!(is_contiguous(&draws));
    assert_eq!(draws.iter().filter(|&&buffer| buffer == a).count(), 2);
}

#[test]
fn test_identical_classification_forms_contiguous_runs() {
    let resources = MockResources::new();
    let pipelines: Vec<_> = (0..3).map(|_| resources.pipeline()).collect();
    let textures: Vec<_> = (0..2).map(|_| resources.texture()).collect();
    let materials: Vec<_> = (0..6)
        .map(|i| {
            resources
                .material(&pipelines[i % 3])
                .diffuse(textures[i % 2])
                .build()
        })
        .collect();
    let buffers: Vec<_> = (0..4).map(|_| resources.buffer()).collect();

    let mut queue = RenderQueue::new();
    let mut seed = 0x2545_f491_u32;
    for _ in 0..200 {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let material = &materials[(seed >> 8) as usize % materials.len()];
        let buffer = buffers[(seed >> 20) as usize % buffers.len()];
        add_mesh(&mut queue, 0, material, buffer);
    }
    queue.sort(&viewer());

    let layer = queue.layer(0).unwrap();
    let batches: Vec<_> = layer.opaque_meshes().collect();
    assert!(batches.windows(2).all(|w| w[0].key <= w[1].key));

    let draws: Vec<_> = batches
        .iter()
        .flat_map(|batch| {
            let identity = (batch.material.id(), batch.group.vertex_buffer.storage);
            batch.items.iter().map(move |_| identity)
        })
        .collect();
    assert_eq!(draws.len(), 200);
    assert!(is_contiguous(&draws));

    let pipeline_runs: Vec<_> = batches
        .iter()
        .map(|batch| batch.material.pipeline().id())
        .collect();
    assert!(is_contiguous(&pipeline_runs));
}

#[test]
fn test_pipelines_sharing_a_shader_are_neighbours() {
    let resources = MockResources::new();
    let shared = resources.shader();
    let other = resources.shader();
    let first = resources.pipeline_with_shader(shared);
    let middle = resources.pipeline_with_shader(other);
    let last = resources.pipeline_with_shader(shared);

    let buffer = resources.buffer();
    let mut queue = RenderQueue::new();
    for pipeline in [&middle, &last, &first] {
        let material = resources.material(pipeline).build();
        add_mesh(&mut queue, 0, &material, buffer);
    }
    queue.sort(&viewer());

    let order: Vec<_> = queue
        .layer(0)
        .unwrap()
        .opaque_meshes()
        .map(|batch| batch.material.pipeline().id())
        .collect();
    assert_eq!(order, vec![first.id, last.id, middle.id]);
}

#[test]
fn test_shared_storage_shares_a_buffer_slot() {
    let resources = MockResources::new();
    let pipeline = resources.pipeline();
    let material = resources.material(&pipeline).build();
    let a = resources.buffer();
    let view = resources.buffer_in(a.storage);
    let b = resources.buffer();

    let mut queue = RenderQueue::new();
    add_mesh(&mut queue, 0, &material, a);
    add_mesh(&mut queue, 0, &material, b);
    add_mesh(&mut queue, 0, &material, view);
    queue.sort(&viewer());

    let batches: Vec<_> = queue.layer(0).unwrap().opaque_meshes().collect();
    assert_eq!(batches.len(), 3);

    let slot_of = |buffer: BufferHandle| {
        batches
            .iter()
            .find(|batch| batch.group.vertex_buffer == buffer)
            .map(|batch| batch.key.buffer())
            .unwrap()
    };
    assert_eq!(slot_of(a), slot_of(view));
    assert_ne!(slot_of(a), slot_of(b));
}

#[test]
fn test_sprite_chains_group_by_overlay() {
    let resources = MockResources::new();
    let pipeline = resources.pipeline();
    let material = resources.material(&pipeline).build();
    let overlay = resources.texture();

    let mut queue = RenderQueue::new();
    queue
        .add_sprites(0, &material, sprite_span(2), 2, ScissorRect::default(), None)
        .unwrap();
    queue
        .add_sprites(0, &material, sprite_span(1), 1, ScissorRect::default(), Some(overlay))
        .unwrap();
    queue
        .add_sprites(0, &material, sprite_span(3), 3, ScissorRect::default(), None)
        .unwrap();
    queue.sort(&viewer());

    let batches: Vec<_> = queue.layer(0).unwrap().opaque_sprites().collect();
    assert_eq!(batches.len(), 2);

    let plain = batches
        .iter()
        .find(|batch| batch.group.overlay.is_none())
        .unwrap();
    assert_eq!(plain.items.len(), 2);
    assert_eq!(queue.stats().sprites, 6);
    assert_eq!(queue.stats().sprite_batches, 2);
}

#[test]
fn test_billboards_merge_per_scissor() {
    let resources = MockResources::new();
    let pipeline = resources.pipeline();
    let material = resources.material(&pipeline).build();

    let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
    let size = 1.0_f32;
    let attributes = BillboardAttributes::new(
        StridedView::packed(&positions),
        BillboardSizes::Scalar(StridedView::uniform(&size)),
    );
    let clipped = ScissorRect::new(0, 0, 64, 64);

    let mut queue = RenderQueue::new();
    queue
        .add_billboards(0, &material, 3, ScissorRect::default(), &attributes)
        .unwrap();
    queue
        .add_billboards(0, &material, 2, ScissorRect::default(), &attributes)
        .unwrap();
    queue
        .add_billboards(0, &material, 1, clipped, &attributes)
        .unwrap();
    queue.sort(&viewer());

    let batches: Vec<_> = queue.layer(0).unwrap().opaque_billboards().collect();
    assert_eq!(batches.len(), 2);
    let unclipped = batches
        .iter()
        .find(|batch| *batch.group == ScissorRect::default())
        .unwrap();
    assert_eq!(unclipped.items.len(), 5);
    assert_ne!(batches[0].key.scissor(), batches[1].key.scissor());
}

#[test]
fn test_stats_account_for_every_draw() {
    let resources = MockResources::new();
    let pipeline = resources.pipeline();
    let opaque = resources.material(&pipeline).build();
    let glass = resources.material(&pipeline).depth_sorted().build();
    let buffer = resources.buffer();

    let positions = [Vec3::ZERO, Vec3::Z];
    let size = Vec2::ONE;
    let attributes = BillboardAttributes::new(
        StridedView::packed(&positions),
        BillboardSizes::Extent(StridedView::uniform(&size)),
    );

    let mut queue = RenderQueue::new();
    add_mesh(&mut queue, 0, &opaque, buffer);
    add_mesh(&mut queue, 1, &glass, buffer);
    queue
        .add_sprites(0, &opaque, sprite_span(4), 4, ScissorRect::default(), None)
        .unwrap();
    queue
        .add_sprites(2, &glass, sprite_span(2), 2, ScissorRect::default(), None)
        .unwrap();
    queue
        .add_billboards(0, &opaque, 2, ScissorRect::default(), &attributes)
        .unwrap();
    queue
        .add_billboards(1, &glass, 2, ScissorRect::default(), &attributes)
        .unwrap();
    queue.add_drawable(3, MockDrawable::new("hud")).unwrap();
    queue.sort(&viewer());

    let stats = queue.stats();
    assert_eq!(stats.layer_count, 4);
    assert_eq!(stats.mesh_instances, 1);
    assert_eq!(stats.depth_sorted_meshes, 1);
    assert_eq!(stats.sprites, 4);
    assert_eq!(stats.depth_sorted_sprites, 2);
    assert_eq!(stats.billboards, 2);
    assert_eq!(stats.depth_sorted_billboards, 2);
    assert_eq!(stats.drawables, 1);
    assert_eq!(stats.submitted_draws, 13);
    assert_eq!(stats.total_draws(), stats.submitted_draws);
    assert_eq!(stats.saturated_fields, 0);
}

#[test]
fn test_saturation_keeps_every_draw() {
    strata_test_utils::init_test_logging();
    let resources = MockResources::new();
    let pipeline = resources.pipeline();
    let buffer = resources.buffer();

    let mut queue = RenderQueue::new();
    for _ in 0..300 {
        let material = resources.material(&pipeline).build();
        add_mesh(&mut queue, 7, &material, buffer);
    }
    queue.sort(&viewer());

    let stats = *queue.stats();
    assert_eq!(stats.saturated_fields, KeyFields::MATERIAL.bits().count_ones());
    assert_eq!(stats.mesh_batches, 300);
    assert_eq!(stats.total_draws(), 300);

    let layer = queue.layer(7).unwrap();
    assert!(layer.opaque_meshes().all(|batch| batch.key.layer() == 0));
    assert_eq!(
        layer
            .opaque_meshes()
            .filter(|batch| batch.key.material() == 255)
            .count(),
        45
    );
}

#[test]
fn test_material_slots_are_counted_per_layer() {
    let resources = MockResources::new();
    let pipeline = resources.pipeline();
    let buffer = resources.buffer();

    let mut queue = RenderQueue::new();
    for order in [0, 1] {
        for _ in 0..150 {
            let material = resources.material(&pipeline).build();
            add_mesh(&mut queue, order, &material, buffer);
        }
    }
    queue.sort(&viewer());

    assert_eq!(queue.stats().saturated_fields, 0);
    for order in [0, 1] {
        let mut slots: Vec<u32> = queue
            .layer(order)
            .unwrap()
            .opaque_meshes()
            .map(|batch| batch.key.material())
            .collect();
        slots.dedup();
        assert_eq!(slots.len(), 150, "layer {order}");
        assert_eq!(slots, (0..150).collect::<Vec<u32>>());
    }
}

#[test]
fn test_angle_and_alpha_billboards_are_normalized() {
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();

    let position = Vec3::new(1.0, 2.0, 3.0);
    let size = 0.5_f32;
    let angle = 0.0_f32;
    let alpha = 0.5_f32;
    let attributes = BillboardAttributes::new(
        StridedView::uniform(&position),
        BillboardSizes::Scalar(StridedView::uniform(&size)),
    )
    .with_rotations(BillboardRotations::Angle(StridedView::uniform(&angle)))
    .with_colors(BillboardColors::Alpha(StridedView::uniform(&alpha)));

    let mut queue = RenderQueue::new();
    queue
        .add_billboards(0, &material, 1, ScissorRect::default(), &attributes)
        .unwrap();
    queue.sort(&viewer());

    let batch = queue.layer(0).unwrap().opaque_billboards().next().unwrap();
    let record = batch.items[0];
    assert_eq!(record.sin_cos, Vec2::new(0.0, 1.0));
    assert_eq!(record.size, Vec2::splat(0.5));
    assert_eq!(record.color, Color::rgba(1.0, 1.0, 1.0, 0.5));
    assert_eq!(record.center, position);
}
