//! Viewers the queue depth-sorts against.
//!
//! The queue only needs three things from a viewer: whether its projection is
//! orthographic or perspective, its frustum (for the near plane) and its eye
//! position. [`Camera`] is a ready-made implementation.
//!
//! # Example
//!
//! ```ignore
//! use strata_render::*;
//! use glam::Vec3;
//!
//! let mut camera = Camera::perspective(60.0, 16.0 / 9.0, 0.1, 100.0);
//! camera.look_at(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, Vec3::Y);
//!
//! queue.sort(&camera);
//! ```

use glam::{Mat4, Vec3};
use strata_core::geometry::{BoundingSphere, Frustum, Plane};

/// How a viewer projects the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionType {
    Orthogonal,
    Perspective,
}

/// Anything the queue can depth-sort against.
pub trait Viewer {
    fn projection_type(&self) -> ProjectionType;

    fn frustum(&self) -> &Frustum;

    fn eye_position(&self) -> Vec3;

    /// Back-to-front ordering distance of `point`; larger is farther.
    ///
    /// Orthogonal viewers use the signed distance to the near plane,
    /// perspective viewers the squared distance to the eye.
    fn depth_of(&self, point: Vec3) -> f32 {
        match self.projection_type() {
            ProjectionType::Orthogonal => self.frustum().near_plane().distance(point),
            ProjectionType::Perspective => self.eye_position().distance_squared(point),
        }
    }
}

impl<V: Viewer + ?Sized> Viewer for &V {
    fn projection_type(&self) -> ProjectionType {
        (**self).projection_type()
    }

    fn frustum(&self) -> &Frustum {
        (**self).frustum()
    }

    fn eye_position(&self) -> Vec3 {
        (**self).eye_position()
    }
}

/// Projection parameters of a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
    Perspective {
        fov_y_radians: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    },
}

impl ProjectionMode {
    pub fn projection_type(&self) -> ProjectionType {
        match self {
            ProjectionMode::Orthographic { .. } => ProjectionType::Orthogonal,
            ProjectionMode::Perspective { .. } => ProjectionType::Perspective,
        }
    }

    fn matrix(&self) -> Mat4 {
        match *self {
            ProjectionMode::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
            ProjectionMode::Perspective {
                fov_y_radians,
                aspect_ratio,
                near,
                far,
            } => Mat4::perspective_rh(fov_y_radians, aspect_ratio, near, far),
        }
    }
}

/// A look-at camera with cached matrices and frustum.
///
/// Every setter recomputes the cached state, so the getters take `&self`.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    projection: ProjectionMode,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    view_projection_matrix: Mat4,
    frustum: Frustum,
}

impl Camera {
    /// Orthographic camera centred on the view axis.
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        Self::with_projection(
            Vec3::new(0.0, 0.0, 1.0),
            ProjectionMode::Orthographic {
                left: -half_width,
                right: half_width,
                bottom: -half_height,
                top: half_height,
                near,
                far,
            },
        )
    }

    /// Perspective camera; `fov_y_degrees` is the vertical field of view.
    pub fn perspective(fov_y_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self::with_projection(
            Vec3::new(0.0, 5.0, 10.0),
            ProjectionMode::Perspective {
                fov_y_radians: fov_y_degrees.to_radians(),
                aspect_ratio,
                near,
                far,
            },
        )
    }

    fn with_projection(position: Vec3, projection: ProjectionMode) -> Self {
        let mut camera = Self {
            position,
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::from_view_projection(Mat4::IDENTITY),
        };
        camera.update_matrices();
        camera
    }

    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.position = eye;
        self.target = target;
        self.up = up;
        self.update_matrices();
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_matrices();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Normalized direction from position to target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    pub fn set_projection(&mut self, projection: ProjectionMode) {
        self.projection = projection;
        self.update_matrices();
    }

    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    /// Only affects perspective cameras.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if let ProjectionMode::Perspective {
            fov_y_radians,
            near,
            far,
            ..
        } = self.projection
        {
            self.projection = ProjectionMode::Perspective {
                fov_y_radians,
                aspect_ratio,
                near,
                far,
            };
            self.update_matrices();
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }

    pub fn near_plane(&self) -> Plane {
        self.frustum.near_plane()
    }

    /// Whether any part of `sphere` is inside the view volume.
    pub fn is_visible(&self, sphere: &BoundingSphere) -> bool {
        self.frustum.intersects_sphere(sphere)
    }

    fn update_matrices(&mut self) {
        self.view_matrix = Mat4::look_at_rh(self.position, self.target, self.up);
        self.projection_matrix = self.projection.matrix();
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_view_projection(self.view_projection_matrix);
    }
}

impl Viewer for Camera {
    fn projection_type(&self) -> ProjectionType {
        self.projection.projection_type()
    }

    fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    fn eye_position(&self) -> Vec3 {
        self.position
    }
}
