use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Number of fractional bits in [`Vertex::uv`] (texel units, 10.5 fixed point).
pub const UV_FRAC_BITS: u32 = 5;

/// 8-bit RGBA color.
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Self = Self([0xFF, 0xFF, 0xFF, 0xFF]);
    pub const BLACK: Self = Self([0x00, 0x00, 0x00, 0xFF]);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Unpack a `0xRRGGBBAA` value.
    pub const fn from_packed(packed: u32) -> Self {
        let b = packed.to_be_bytes();
        Self([b[0], b[1], b[2], b[3]])
    }

    /// Opaque gray with all three color channels set to `level`.
    pub const fn gray(level: u8) -> Self {
        Self([level, level, level, 0xFF])
    }

    pub const fn r(self) -> u8 {
        self.0[0]
    }

    pub const fn g(self) -> u8 {
        self.0[1]
    }

    pub const fn b(self) -> u8 {
        self.0[2]
    }

    pub const fn a(self) -> u8 {
        self.0[3]
    }

    /// Channels normalized to `0.0..=1.0`.
    pub fn to_f32(self) -> [f32; 4] {
        self.0.map(|c| c as f32 / 255.0)
    }
}

/// Interleaved mesh vertex.
///
/// `position[3]` is a padding lane so the position fetches as `Sint16x4`.
/// Texture coordinates are in texels with [`UV_FRAC_BITS`] fractional bits.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [i16; 4],
    pub normal: [i8; 4],
    pub color: Rgba,
    pub uv: [i16; 2],
}

impl Vertex {
    pub fn new(position: [i16; 3], normal: [i8; 3], color: Rgba, uv: [i16; 2]) -> Self {
        Self {
            position: [position[0], position[1], position[2], 0],
            normal: [normal[0], normal[1], normal[2], 0],
            color,
            uv,
        }
    }

    pub fn x(&self) -> i16 {
        self.position[0]
    }

    pub fn y(&self) -> i16 {
        self.position[1]
    }

    pub fn z(&self) -> i16 {
        self.position[2]
    }
}

/// Backend-assigned identity of an uploaded mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

/// Backend-assigned identity of an uploaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
        assert_eq!(std::mem::align_of::<Vertex>(), 2);
    }

    #[test]
    fn vertex_accessors() {
        let v = Vertex::new([1, -2, 3], [0, 127, 0], Rgba::WHITE, [32, 64]);
        assert_eq!((v.x(), v.y(), v.z()), (1, -2, 3));
        assert_eq!(v.position[3], 0);
        assert_eq!(v.normal, [0, 127, 0, 0]);
    }

    #[test]
    fn rgba_from_packed() {
        let c = Rgba::from_packed(0x2255_66FF);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0x22, 0x55, 0x66, 0xFF));
    }

    #[test]
    fn rgba_gray_is_opaque() {
        assert_eq!(Rgba::gray(191), Rgba::new(191, 191, 191, 255));
        assert_eq!(Rgba::WHITE.to_f32(), [1.0; 4]);
    }
}
