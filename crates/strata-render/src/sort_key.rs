//! 64-bit packed ordering keys.
//!
//! Opaque layout, most significant bits first:
//!
//! ```text
//! | layer:4 | pipeline:8 | material:8 | shader:8 | texture:8 | buffer:8 | scissor:4 | depth:16 |
//! ```
//!
//! Depth-sorted layout:
//!
//! ```text
//! | layer:4 | depth:32 | 0:28 |
//! ```
//!
//! In both layouts ascending key order is the draw order. For depth-sorted
//! keys the distance is mapped to an order-preserving integer and inverted,
//! so larger distances (farther) produce smaller keys.

use std::fmt;

/// Width in bits of each key field.
pub mod bits {
    pub const LAYER: u32 = 4;
    pub const PIPELINE: u32 = 8;
    pub const MATERIAL: u32 = 8;
    pub const SHADER: u32 = 8;
    pub const TEXTURE: u32 = 8;
    pub const BUFFER: u32 = 8;
    pub const SCISSOR: u32 = 4;
    pub const DEPTH: u32 = 16;
    pub const SORTED_DEPTH: u32 = 32;
}

const DEPTH_SHIFT: u32 = 0;
const SCISSOR_SHIFT: u32 = DEPTH_SHIFT + bits::DEPTH;
const BUFFER_SHIFT: u32 = SCISSOR_SHIFT + bits::SCISSOR;
const TEXTURE_SHIFT: u32 = BUFFER_SHIFT + bits::BUFFER;
const SHADER_SHIFT: u32 = TEXTURE_SHIFT + bits::TEXTURE;
const MATERIAL_SHIFT: u32 = SHADER_SHIFT + bits::SHADER;
const PIPELINE_SHIFT: u32 = MATERIAL_SHIFT + bits::MATERIAL;
const LAYER_SHIFT: u32 = PIPELINE_SHIFT + bits::PIPELINE;
const SORTED_DEPTH_SHIFT: u32 = LAYER_SHIFT - bits::SORTED_DEPTH;

static_assertions::const_assert_eq!(LAYER_SHIFT + bits::LAYER, 64);
static_assertions::const_assert_eq!(SORTED_DEPTH_SHIFT, 28);

/// Largest value a field of `width` bits can hold.
pub const fn field_max(width: u32) -> u32 {
    u32::MAX >> (32 - width)
}

/// Classification slots of an opaque entry.
///
/// Values wider than their field are masked; callers clamp beforehand (see
/// [`ClassificationIndex`](crate::ClassificationIndex)).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OpaqueSlots {
    pub layer: u32,
    pub pipeline: u32,
    pub material: u32,
    pub shader: u32,
    pub texture: u32,
    /// Buffer storage for meshes, overlay texture for sprites.
    pub buffer: u32,
    pub scissor: u32,
    pub depth: u16,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(pub u64);

impl SortKey {
    pub fn opaque(slots: OpaqueSlots) -> Self {
        Self(
            pack(slots.layer, bits::LAYER, LAYER_SHIFT)
                | pack(slots.pipeline, bits::PIPELINE, PIPELINE_SHIFT)
                | pack(slots.material, bits::MATERIAL, MATERIAL_SHIFT)
                | pack(slots.shader, bits::SHADER, SHADER_SHIFT)
                | pack(slots.texture, bits::TEXTURE, TEXTURE_SHIFT)
                | pack(slots.buffer, bits::BUFFER, BUFFER_SHIFT)
                | pack(slots.scissor, bits::SCISSOR, SCISSOR_SHIFT)
                | pack(slots.depth as u32, bits::DEPTH, DEPTH_SHIFT),
        )
    }

    /// Back-to-front key for an entry at `distance` (larger is farther).
    pub fn depth_sorted(layer: u32, distance: f32) -> Self {
        Self(
            pack(layer, bits::LAYER, LAYER_SHIFT)
                | pack(!depth_bits(distance), bits::SORTED_DEPTH, SORTED_DEPTH_SHIFT),
        )
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn layer(self) -> u32 {
        (self.0 >> LAYER_SHIFT) as u32
    }

    pub const fn pipeline(self) -> u32 {
        unpack(self.0, bits::PIPELINE, PIPELINE_SHIFT)
    }

    pub const fn material(self) -> u32 {
        unpack(self.0, bits::MATERIAL, MATERIAL_SHIFT)
    }

    pub const fn shader(self) -> u32 {
        unpack(self.0, bits::SHADER, SHADER_SHIFT)
    }

    pub const fn texture(self) -> u32 {
        unpack(self.0, bits::TEXTURE, TEXTURE_SHIFT)
    }

    pub const fn buffer(self) -> u32 {
        unpack(self.0, bits::BUFFER, BUFFER_SHIFT)
    }

    pub const fn scissor(self) -> u32 {
        unpack(self.0, bits::SCISSOR, SCISSOR_SHIFT)
    }

    /// Whether two opaque keys can be drawn without a state change.
    ///
    /// Scissor and depth are ignored.
    pub const fn same_batch(self, other: SortKey) -> bool {
        (self.0 >> BUFFER_SHIFT) == (other.0 >> BUFFER_SHIFT)
    }
}

impl fmt::Debug for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SortKey({:#018x})", self.0)
    }
}

/// Maps a float to a `u32` whose unsigned order matches the float order,
/// including across the sign boundary.
pub fn depth_bits(distance: f32) -> u32 {
    let bits = distance.to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}

#[inline]
const fn pack(value: u32, width: u32, shift: u32) -> u64 {
    ((value & field_max(width)) as u64) << shift
}

#[inline]
const fn unpack(key: u64, width: u32, shift: u32) -> u32 {
    ((key >> shift) as u32) & field_max(width)
}
