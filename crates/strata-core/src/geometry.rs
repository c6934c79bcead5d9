//! Geometry primitives shared by submitters and the render queue.

use glam::{Mat4, Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

impl<T> Rect<T> {
    pub const fn new(x: T, y: T, width: T, height: T) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Scissor rectangle in framebuffer pixels.
pub type ScissorRect = Rect<i32>;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Squared radius of the sphere enclosing the box.
    pub fn squared_radius(&self) -> f32 {
        ((self.max - self.min) * 0.5).length_squared()
    }
}

/// Sphere stored with a squared radius; comparisons never need the root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub squared_radius: f32,
}

impl BoundingSphere {
    pub const fn new(center: Vec3, squared_radius: f32) -> Self {
        Self {
            center,
            squared_radius,
        }
    }

    /// View-independent sphere of a box placed by `transform`.
    ///
    /// The center follows the transform; the radius is the untransformed
    /// box radius.
    pub fn from_transformed_aabb(aabb: &Aabb, transform: &Mat4) -> Self {
        Self {
            center: transform.transform_point3(aabb.center()),
            squared_radius: aabb.squared_radius(),
        }
    }

    pub fn radius(&self) -> f32 {
        self.squared_radius.sqrt()
    }

    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let reach = self.radius() + other.radius();
        self.center.distance_squared(other.center) <= reach * reach
    }
}

/// Plane `normal · p + d = 0` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

static_assertions::assert_eq_size!(Plane, [f32; 4]);

impl Plane {
    pub const fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Plane through `point` facing `normal`.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            d: -normal.dot(point),
        }
    }

    fn from_coefficients(v: Vec4) -> Self {
        let normal = v.truncate();
        let inv_len = normal.length().recip();
        Self {
            normal: normal * inv_len,
            d: v.w * inv_len,
        }
    }

    /// Signed distance from the plane; positive on the side the normal faces.
    #[inline]
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrustumPlane {
    Left = 0,
    Right = 1,
    Bottom = 2,
    Top = 3,
    Near = 4,
    Far = 5,
}

/// Six inward-facing planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the planes of a view-projection matrix (Gribb-Hartmann).
    ///
    /// Assumes a `[0, 1]` clip-space depth range, as produced by
    /// `Mat4::perspective_rh` and `Mat4::orthographic_rh`.
    pub fn from_view_projection(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];
        Self {
            planes: [
                Plane::from_coefficients(rows[3] + rows[0]),
                Plane::from_coefficients(rows[3] - rows[0]),
                Plane::from_coefficients(rows[3] + rows[1]),
                Plane::from_coefficients(rows[3] - rows[1]),
                Plane::from_coefficients(rows[2]),
                Plane::from_coefficients(rows[3] - rows[2]),
            ],
        }
    }

    pub fn plane(&self, which: FrustumPlane) -> Plane {
        self.planes[which as usize]
    }

    pub fn near_plane(&self) -> Plane {
        self.plane(FrustumPlane::Near)
    }

    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        let radius = sphere.radius();
        self.planes
            .iter()
            .all(|plane| plane.distance(sphere.center) >= -radius)
    }
}
