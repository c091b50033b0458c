use tidewater_common::{Rgba, UV_FRAC_BITS, Vertex};

use crate::mesh::{MaterialDef, MeshDef, TextureDef};

/// Name of the built-in water mesh.
pub const WATER_MESH: &str = "water";
/// Name of the built-in tile texture.
pub const WATER_TEXTURE: &str = "water_tile";

/// Flat grid of fixed-point vertices in the xz plane, centered on the origin.
#[derive(Debug, Clone, Copy)]
pub struct WaterGrid {
    pub cells_x: u16,
    pub cells_z: u16,
    /// Distance between neighbouring vertices in model units.
    pub spacing: i16,
    pub texels_per_cell: i16,
    /// Number of tiles in the generated material.
    pub tiles: usize,
}

impl Default for WaterGrid {
    fn default() -> Self {
        Self {
            cells_x: 24,
            cells_z: 24,
            spacing: 32,
            texels_per_cell: 16,
            tiles: 2,
        }
    }
}

impl WaterGrid {
    pub fn vertex_count(&self) -> usize {
        (self.cells_x as usize + 1) * (self.cells_z as usize + 1)
    }

    pub fn build(&self, name: &str, texture: &str) -> MeshDef {
        let row = self.cells_x as usize + 1;
        let half_x = self.cells_x as i32 / 2;
        let half_z = self.cells_z as i32 / 2;
        let color = Rgba::gray(191);

        let mut vertices = Vec::with_capacity(self.vertex_count());
        for j in 0..=self.cells_z as i32 {
            for i in 0..=self.cells_x as i32 {
                let x = clamp_i16((i - half_x) * self.spacing as i32);
                let z = clamp_i16((j - half_z) * self.spacing as i32);
                let u = clamp_i16((i * self.texels_per_cell as i32) << UV_FRAC_BITS);
                let v = clamp_i16((j * self.texels_per_cell as i32) << UV_FRAC_BITS);
                vertices.push(Vertex::new([x, 0, z], [0, 127, 0], color, [u, v]));
            }
        }

        let mut indices = Vec::with_capacity(self.cells_x as usize * self.cells_z as usize * 6);
        for j in 0..self.cells_z as usize {
            for i in 0..self.cells_x as usize {
                let a = (j * row + i) as u16;
                let b = a + 1;
                let c = a + row as u16;
                let d = c + 1;
                // Counter-clockwise seen from +Y.
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        MeshDef {
            name: name.to_string(),
            vertices,
            indices,
            material: MaterialDef {
                tiles: vec![texture.to_string(); self.tiles],
            },
        }
    }
}

fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Seamlessly tiling blue caustic pattern, `size` x `size` texels.
pub fn water_tile_texture(name: &str, size: u32) -> TextureDef {
    let tau = std::f32::consts::TAU;
    let mut rgba = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            let u = x as f32 / size as f32;
            let v = y as f32 / size as f32;
            // Integer frequencies keep the pattern periodic at the tile edge.
            let ripple = (tau * 2.0 * u).sin() * (tau * 3.0 * v).cos() * 0.5
                + (tau * (u + v)).sin() * 0.5;
            let level = (ripple * 0.5 + 0.5).clamp(0.0, 1.0);
            rgba.extend_from_slice(&[
                (40.0 + 80.0 * level) as u8,
                (110.0 + 90.0 * level) as u8,
                (170.0 + 85.0 * level) as u8,
                0xFF,
            ]);
        }
    }
    TextureDef {
        name: name.to_string(),
        width: size,
        height: size,
        rgba,
    }
}
