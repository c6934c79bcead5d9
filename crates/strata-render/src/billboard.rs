//! Billboard submissions.
//!
//! A billboard batch is described by one [`StridedView`] per attribute. Sizes,
//! rotations and colors each come in two spellings; the queue normalizes all
//! of them to a [`BillboardData`] record before storing it.
//!
//! | Attribute | Spellings | Stored as |
//! |-----------|-----------|-----------|
//! | size | scalar, 2D extent | 2D extent |
//! | rotation | angle (radians), `(sin, cos)` pair | `(sin, cos)` pair |
//! | color | RGBA, alpha only | RGBA ([`Color::ALPHA_BASE`] for alpha only) |

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use strata_core::math::sin_cos;

use crate::Color;
use crate::error::QueueError;
use crate::strided::StridedView;

/// A camera-facing quad, ready for upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BillboardData {
    pub center: Vec3,
    pub size: Vec2,
    /// `(sin θ, cos θ)` of the rotation around the view axis.
    pub sin_cos: Vec2,
    pub color: Color,
}

static_assertions::assert_eq_size!(BillboardData, [f32; 11]);

/// `(sin, cos)` of a zero angle.
pub const IDENTITY_SIN_COS: Vec2 = Vec2::new(0.0, 1.0);

const DEFAULT_SIN_COS: Vec2 = IDENTITY_SIN_COS;
const DEFAULT_ANGLE: f32 = 0.0;
const DEFAULT_COLOR: Color = Color::WHITE;
const DEFAULT_ALPHA: f32 = 1.0;

/// Billboard sizes.
#[derive(Debug, Clone, Copy)]
pub enum BillboardSizes<'a> {
    /// Square billboards, one edge length each.
    Scalar(StridedView<'a, f32>),
    Extent(StridedView<'a, Vec2>),
}

/// Billboard rotations.
#[derive(Debug, Clone, Copy)]
pub enum BillboardRotations<'a> {
    /// Angles in radians.
    Angle(StridedView<'a, f32>),
    SinCos(StridedView<'a, Vec2>),
}

impl BillboardRotations<'static> {
    /// Every billboard upright.
    pub fn none() -> Self {
        Self::SinCos(StridedView::uniform(&DEFAULT_SIN_COS))
    }

    /// Every billboard upright, spelled as an angle.
    pub fn zero_angle() -> Self {
        Self::Angle(StridedView::uniform(&DEFAULT_ANGLE))
    }
}

/// Billboard colors.
#[derive(Debug, Clone, Copy)]
pub enum BillboardColors<'a> {
    Rgba(StridedView<'a, Color>),
    /// Alpha applied to [`Color::ALPHA_BASE`].
    Alpha(StridedView<'a, f32>),
}

impl BillboardColors<'static> {
    /// Every billboard opaque white.
    pub fn none() -> Self {
        Self::Rgba(StridedView::uniform(&DEFAULT_COLOR))
    }

    /// Every billboard fully opaque, spelled as an alpha.
    pub fn opaque_alpha() -> Self {
        Self::Alpha(StridedView::uniform(&DEFAULT_ALPHA))
    }
}

/// Per-attribute views describing a run of billboards.
#[derive(Debug, Clone, Copy)]
pub struct BillboardAttributes<'a> {
    pub positions: StridedView<'a, Vec3>,
    pub sizes: BillboardSizes<'a>,
    pub rotations: BillboardRotations<'a>,
    pub colors: BillboardColors<'a>,
}

impl<'a> BillboardAttributes<'a> {
    /// Upright white billboards.
    pub fn new(positions: StridedView<'a, Vec3>, sizes: BillboardSizes<'a>) -> Self {
        Self {
            positions,
            sizes,
            rotations: BillboardRotations::none(),
            colors: BillboardColors::none(),
        }
    }

    pub fn with_rotations(mut self, rotations: BillboardRotations<'a>) -> Self {
        self.rotations = rotations;
        self
    }

    pub fn with_colors(mut self, colors: BillboardColors<'a>) -> Self {
        self.colors = colors;
        self
    }

    /// Checks that every attribute can supply `count` elements.
    pub(crate) fn validate(&self, count: usize) -> Result<(), QueueError> {
        let available = [
            ("positions", self.positions.available()),
            (
                "sizes",
                match self.sizes {
                    BillboardSizes::Scalar(v) => v.available(),
                    BillboardSizes::Extent(v) => v.available(),
                },
            ),
            (
                "rotations",
                match self.rotations {
                    BillboardRotations::Angle(v) => v.available(),
                    BillboardRotations::SinCos(v) => v.available(),
                },
            ),
            (
                "colors",
                match self.colors {
                    BillboardColors::Rgba(v) => v.available(),
                    BillboardColors::Alpha(v) => v.available(),
                },
            ),
        ];

        match available.into_iter().find(|(_, n)| *n < count) {
            Some((attribute, available)) => Err(QueueError::AttributeTooShort {
                attribute,
                available,
                count,
            }),
            None => Ok(()),
        }
    }

    /// Normalized record of billboard `index`. The batch must be validated
    /// for at least `index + 1` elements.
    pub(crate) fn record(&self, index: usize) -> BillboardData {
        let size = match self.sizes {
            BillboardSizes::Scalar(v) => Vec2::splat(read(v, index)),
            BillboardSizes::Extent(v) => read(v, index),
        };
        let sin_cos = match self.rotations {
            BillboardRotations::Angle(v) => sin_cos(read(v, index)),
            BillboardRotations::SinCos(v) => read(v, index),
        };
        let color = match self.colors {
            BillboardColors::Rgba(v) => read(v, index),
            BillboardColors::Alpha(v) => Color::from_alpha(read(v, index)),
        };

        BillboardData {
            center: read(self.positions, index),
            size,
            sin_cos,
            color,
        }
    }

    /// Normalized records of the first `count` billboards.
    pub(crate) fn records(&self, count: usize) -> impl Iterator<Item = BillboardData> + '_ {
        (0..count).map(|i| self.record(i))
    }
}

fn read<T: Pod>(view: StridedView<'_, T>, index: usize) -> T {
    view.get(index).unwrap_or_else(T::zeroed)
}
