/// Fast mathematical operations using SIMD-accelerated `glam` types.
///
/// This module re-exports all types and functions from the [`glam`] crate.
/// Positions, sizes, rotations and transforms submitted to the render queue
/// are expressed with these types.
///
/// # Examples
///
/// ```
/// use strata_core::math::{Mat4, Vec3};
///
/// let transform = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
/// let center = transform.transform_point3(Vec3::ZERO);
/// assert_eq!(center.z, -5.0);
/// ```
///
/// [`glam`]: https://docs.rs/glam
pub mod fast {
    pub use glam::*;
}

pub use fast::*;

/// Returns `(sin, cos)` of an angle in radians as a [`Vec2`].
///
/// Rotations are stored in this form so consumers never evaluate
/// trigonometric functions per vertex.
#[inline]
pub fn sin_cos(angle_radians: f32) -> Vec2 {
    let (sin, cos) = angle_radians.sin_cos();
    Vec2::new(sin, cos)
}
