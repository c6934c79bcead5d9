//! Frame lifecycle: state guard, clearing, epochs and eviction.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use strata_render::{
    Aabb, BillboardAttributes, BillboardSizes, Color, Drawable, Material, MeshData, PointLight,
    QueueError, QueueState, RenderQueue, RenderQueueConfig, ScissorRect, SpriteVertex,
    StridedView, VertexSpan,
};
use strata_test_utils::{DrawLog, MockDrawable, MockResources, MockViewer};

fn viewer() -> MockViewer {
    MockViewer::perspective(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
}

fn add_mesh(queue: &mut RenderQueue, order: i32, material: &Arc<dyn Material>) -> Result<(), QueueError> {
    let resources = MockResources::new();
    queue.add_mesh(
        order,
        material,
        MeshData::triangles(resources.buffer()),
        &Aabb::from_center_extents(Vec3::ZERO, Vec3::ONE),
        Mat4::IDENTITY,
        ScissorRect::default(),
    )
}

#[test]
fn test_submit_after_sort_is_rejected_until_clear() {
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();

    let mut queue = RenderQueue::new();
    add_mesh(&mut queue, 0, &material).unwrap();
    queue.sort(&viewer());
    assert_eq!(queue.state(), QueueState::Sorted);

    assert_eq!(
        add_mesh(&mut queue, 2, &material),
        Err(QueueError::SubmitWhileSorted { order: 2 })
    );
    assert!(queue.layer(2).is_none());
    assert_eq!(queue.stats().mesh_instances, 1);

    queue.clear(false);
    assert_eq!(queue.state(), QueueState::Unsorted);
    assert!(add_mesh(&mut queue, 2, &material).is_ok());
}

#[test]
fn test_sort_twice_reorders_for_new_viewer() {
    let resources = MockResources::new();
    let glass = resources.material(&resources.pipeline()).depth_sorted().build();

    let mut queue = RenderQueue::new();
    for z in [-5.0, 5.0] {
        queue
            .add_mesh(
                0,
                &glass,
                MeshData::triangles(resources.buffer()),
                &Aabb::from_center_extents(Vec3::ZERO, Vec3::ONE),
                Mat4::from_translation(Vec3::new(0.0, 0.0, z)),
                ScissorRect::default(),
            )
            .unwrap();
    }

    let front = MockViewer::perspective(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO);
    let back = MockViewer::perspective(Vec3::new(0.0, 0.0, -20.0), Vec3::ZERO);
    let farthest_z = |queue: &RenderQueue| {
        queue.layer(0).unwrap().depth_sorted_meshes()[0]
            .payload
            .instance
            .bounding_sphere
            .center
            .z
    };

    queue.sort(&front);
    assert_eq!(farthest_z(&queue), -5.0);
    queue.sort(&back);
    assert_eq!(farthest_z(&queue), 5.0);
}

#[test]
fn test_full_clear_releases_layers() {
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();

    let mut queue = RenderQueue::new();
    for order in 0..4 {
        add_mesh(&mut queue, order, &material).unwrap();
    }
    queue.sort(&viewer());
    queue.clear(true);

    assert_eq!(queue.layer_count(), 0);
    assert_eq!(queue.epoch(), 0);
    assert_eq!(queue.layers().count(), 0);
}

#[test]
fn test_clear_keeps_empty_layers_for_reuse() {
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();

    let mut queue = RenderQueue::new();
    add_mesh(&mut queue, 3, &material).unwrap();
    queue.sort(&viewer());
    queue.clear(false);

    assert_eq!(queue.epoch(), 1);
    let layer = queue.layer(3).unwrap();
    assert!(layer.is_empty());
    assert_eq!(layer.opaque_meshes().count(), 0);
    assert_eq!(layer.bin_count(), 2);
}

#[test]
fn test_layer_used_every_frame_is_never_evicted() {
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();

    let mut queue = RenderQueue::new();
    for _ in 0..150 {
        add_mesh(&mut queue, 0, &material).unwrap();
        queue.sort(&viewer());
        queue.clear(false);
    }
    assert!(queue.layer(0).is_some());
    assert_eq!(queue.epoch(), 150);
}

#[test]
fn test_idle_layer_evicted_after_default_epochs() {
    strata_test_utils::init_test_logging();
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();

    let mut queue = RenderQueue::new();
    add_mesh(&mut queue, 9, &material).unwrap();
    for _ in 0..100 {
        queue.clear(false);
    }
    assert!(queue.layer(9).is_some());

    queue.clear(false);
    assert!(queue.layer(9).is_none());
}

#[test]
fn test_layer_eviction_is_configurable() {
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();

    let config = RenderQueueConfig::default().with_layer_eviction_epochs(3);
    let mut queue = RenderQueue::with_config(config);
    add_mesh(&mut queue, 0, &material).unwrap();
    add_mesh(&mut queue, 1, &material).unwrap();
    queue.clear(false);

    // Layer 1 stays busy, layer 0 goes idle.
    for _ in 0..3 {
        add_mesh(&mut queue, 1, &material).unwrap();
        queue.clear(false);
    }
    assert!(queue.layer(0).is_none());
    assert!(queue.layer(1).is_some());
}

#[test]
fn test_idle_material_bin_is_evicted() {
    let resources = MockResources::new();
    let pipeline = resources.pipeline();
    let busy = resources.material(&pipeline).build();
    let idle = resources.material(&pipeline).build();

    let config = RenderQueueConfig::default().with_bin_eviction_epochs(2);
    let mut queue = RenderQueue::with_config(config);
    add_mesh(&mut queue, 0, &busy).unwrap();
    add_mesh(&mut queue, 0, &idle).unwrap();
    assert_eq!(queue.layer(0).unwrap().bin_count(), 3);

    queue.clear(false);
    add_mesh(&mut queue, 0, &busy).unwrap();
    queue.clear(false);
    assert_eq!(queue.layer(0).unwrap().bin_count(), 3);

    add_mesh(&mut queue, 0, &busy).unwrap();
    queue.clear(false);
    assert_eq!(queue.layer(0).unwrap().bin_count(), 2);
}

#[test]
fn test_kept_bins_release_their_material() {
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();

    let mut queue = RenderQueue::new();
    add_mesh(&mut queue, 0, &material).unwrap();
    queue.sort(&viewer());
    assert!(Arc::strong_count(&material) > 1);

    for _ in 0..50 {
        queue.clear(false);
    }
    let layer = queue.layer(0).unwrap();
    assert_eq!(layer.bin_count(), 2);
    assert_eq!(Arc::strong_count(&material), 1);

    add_mesh(&mut queue, 0, &material).unwrap();
    queue.sort(&viewer());
    assert_eq!(queue.layer(0).unwrap().opaque_meshes().count(), 1);
}

#[test]
fn test_drawables_run_in_submission_order() {
    let log = DrawLog::new();
    let mut queue = RenderQueue::new();
    for label in ["background", "scene", "overlay"] {
        queue
            .add_drawable(0, MockDrawable::logged(label, &log))
            .unwrap();
    }
    queue.sort(&viewer());

    for drawable in queue.layer(0).unwrap().drawables() {
        drawable.draw();
    }
    assert_eq!(log.entries(), vec!["background", "scene", "overlay"]);

    queue.clear(false);
    assert!(queue.layer(0).unwrap().drawables().is_empty());
}

#[test]
fn test_lights_are_per_frame() {
    let mut queue = RenderQueue::new();
    queue.add_point_light(PointLight {
        position: Vec3::ZERO,
        radius: 5.0,
        color: Color::WHITE,
        ambient_factor: 0.1,
        diffuse_factor: 1.0,
    });
    assert_eq!(queue.lights().len(), 1);

    queue.sort(&viewer());
    queue.clear(false);
    assert!(queue.lights().is_empty());
}

#[test]
fn test_rejected_sprites_create_no_layer() {
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();
    let vertex = SpriteVertex::new(Vec3::ZERO, Color::WHITE, Vec2::ZERO);
    let span = VertexSpan::new(vec![vertex; 7].into());

    let mut queue = RenderQueue::new();
    let result = queue.add_sprites(4, &material, span, 2, ScissorRect::default(), None);

    assert_eq!(
        result,
        Err(QueueError::SpriteSpanTooShort {
            sprites: 2,
            needed: 8,
            available: 7,
        })
    );
    assert!(queue.layer(4).is_none());
}

#[test]
fn test_rejected_billboards_create_no_layer() {
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();
    let positions = [Vec3::ZERO, Vec3::X];
    let sizes = [1.0_f32];
    let attributes = BillboardAttributes::new(
        StridedView::packed(&positions),
        BillboardSizes::Scalar(StridedView::packed(&sizes)),
    );

    let mut queue = RenderQueue::new();
    let result = queue.add_billboards(-2, &material, 2, ScissorRect::default(), &attributes);

    assert_eq!(
        result,
        Err(QueueError::AttributeTooShort {
            attribute: "sizes",
            available: 1,
            count: 2,
        })
    );
    assert!(queue.layer(-2).is_none());
}

#[test]
fn test_zero_count_submissions_are_accepted_and_empty() {
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();
    let span = VertexSpan::new(Vec::new().into());

    let mut queue = RenderQueue::new();
    queue
        .add_sprites(0, &material, span, 0, ScissorRect::default(), None)
        .unwrap();
    queue.sort(&viewer());

    assert_eq!(queue.stats().total_draws(), 0);
    assert_eq!(queue.stats().layer_count, 0);
}

#[test]
fn test_stats_reset_on_clear() {
    let resources = MockResources::new();
    let material = resources.material(&resources.pipeline()).build();

    let mut queue = RenderQueue::new();
    add_mesh(&mut queue, 0, &material).unwrap();
    queue.sort(&viewer());
    assert_eq!(queue.stats().mesh_instances, 1);

    queue.clear(false);
    assert_eq!(queue.stats().total_draws(), 0);
    assert_eq!(queue.stats().submitted_draws, 0);
}
