//! Test utilities for the Strata render queue.
//!
//! The queue only observes the identity of materials, pipelines, textures and
//! buffers. This crate provides mock collaborators with fresh identities,
//! plus call recording so tests can check what the consumer would do.
//!
//! # Overview
//!
//! - [`MockResources`] - allocates pipelines, materials, textures and buffers
//!   and records every allocation
//! - [`MockMaterial`] / [`MockPipeline`] - fixed answers to the queries the
//!   queue makes during classification
//! - [`MockDrawable`] - counts its draws and appends to a shared [`DrawLog`]
//! - [`MockViewer`] - a viewer with a hand-set eye, near plane and projection
//!
//! # Example
//!
//! ```rust
//! use strata_render::Material;
//! use strata_test_utils::MockResources;
//!
//! let resources = MockResources::new();
//! let pipeline = resources.pipeline();
//! let opaque = resources.material(&pipeline).build();
//! let glass = resources.material(&pipeline).depth_sorted().build();
//!
//! assert_ne!(opaque.id(), glass.id());
//! assert_eq!(resources.count_material_creates(), 2);
//! ```
//!
//! # Interior Mutability
//!
//! Mocks take `&self` and record through `parking_lot::Mutex`, which keeps
//! them `Send + Sync` as the queue's interfaces require.

pub mod mock_drawable;
pub mod mock_resources;
pub mod mock_viewer;

pub use mock_drawable::*;
pub use mock_resources::*;
pub use mock_viewer::*;

/// Routes queue logs to the test output.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// `RUST_LOG` still takes precedence when set.
pub fn init_test_logging() {
    if std::env::var_os("RUST_LOG").is_some() {
        strata_core::logging::init();
    } else {
        strata_core::logging::init_with_filter("strata_render=trace");
    }
}
