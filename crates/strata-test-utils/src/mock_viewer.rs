//! Mock viewer with hand-set geometry.

use glam::{Mat4, Vec3};
use strata_core::geometry::Frustum;
use strata_render::{ProjectionType, Viewer};

/// A viewer at a fixed eye, looking down `-Z` by default.
#[derive(Debug, Clone)]
pub struct MockViewer {
    pub projection_type: ProjectionType,
    pub eye: Vec3,
    pub frustum: Frustum,
}

impl MockViewer {
    /// Perspective viewer at `eye` looking at `target`.
    pub fn perspective(eye: Vec3, target: Vec3) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 1000.0);
        Self {
            projection_type: ProjectionType::Perspective,
            eye,
            frustum: Frustum::from_view_projection(projection * view),
        }
    }

    /// Orthogonal viewer at `eye` looking at `target`, near plane one unit
    /// in front of the eye.
    pub fn orthogonal(eye: Vec3, target: Vec3) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let projection = Mat4::orthographic_rh(-50.0, 50.0, -50.0, 50.0, 1.0, 1000.0);
        Self {
            projection_type: ProjectionType::Orthogonal,
            eye,
            frustum: Frustum::from_view_projection(projection * view),
        }
    }
}

impl Viewer for MockViewer {
    fn projection_type(&self) -> ProjectionType {
        self.projection_type
    }

    fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    fn eye_position(&self) -> Vec3 {
        self.eye
    }
}
