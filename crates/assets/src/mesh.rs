use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tidewater_common::Vertex;

use crate::{AssetError, AssetId};

/// Most texture tiles a material may reference.
pub const MAX_MATERIAL_TILES: usize = 8;

/// Texture names sampled by a mesh, one per tile index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    pub tiles: Vec<String>,
}

/// Immutable mesh definition as supplied by the asset store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDef {
    pub name: String,
    pub vertices: Vec<Vertex>,
    /// Triangle list.
    pub indices: Vec<u16>,
    pub material: MaterialDef,
}

impl MeshDef {
    pub fn validate(&self) -> Result<(), AssetError> {
        let invalid = |reason: String| AssetError::InvalidMesh {
            name: self.name.clone(),
            reason,
        };
        if self.vertices.len() > u16::MAX as usize + 1 {
            return Err(invalid(format!(
                "{} vertices exceed 16-bit indexing",
                self.vertices.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(invalid(format!(
                "index count {} is not a triangle list",
                self.indices.len()
            )));
        }
        if let Some(&bad) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(invalid(format!("index {bad} out of range")));
        }
        if self.material.tiles.len() > MAX_MATERIAL_TILES {
            return Err(invalid(format!(
                "{} tiles, at most {MAX_MATERIAL_TILES} supported",
                self.material.tiles.len()
            )));
        }
        Ok(())
    }

    /// Content-addressed id over name, vertex bytes, indices and tile names.
    pub fn content_id(&self) -> AssetId {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        for v in &self.vertices {
            for p in v.position {
                hasher.update(p.to_le_bytes());
            }
            hasher.update(v.normal.map(|n| n as u8));
            hasher.update(v.color.0);
            for t in v.uv {
                hasher.update(t.to_le_bytes());
            }
        }
        for i in &self.indices {
            hasher.update(i.to_le_bytes());
        }
        for tile in &self.material.tiles {
            hasher.update(tile.as_bytes());
        }
        AssetId::from_digest(&hasher.finalize())
    }
}

/// RGBA8 texture, row major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureDef {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureDef {
    pub fn validate(&self) -> Result<(), AssetError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.width == 0 || self.height == 0 || self.rgba.len() != expected {
            return Err(AssetError::InvalidTexture {
                name: self.name.clone(),
                reason: format!(
                    "{}x{} needs {expected} bytes, got {}",
                    self.width,
                    self.height,
                    self.rgba.len()
                ),
            });
        }
        Ok(())
    }

    pub fn content_id(&self) -> AssetId {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update(&self.rgba);
        AssetId::from_digest(&hasher.finalize())
    }
}

/// Mutable runtime copy of a mesh definition.
///
/// Vertex count and order never change; callers rewrite vertex attributes in
/// place through [`vertices_mut`](Self::vertices_mut).
#[derive(Debug, Clone)]
pub struct MeshInstance {
    def: Arc<MeshDef>,
    vertices: Vec<Vertex>,
}

impl MeshInstance {
    pub fn new(def: Arc<MeshDef>) -> Self {
        let vertices = def.vertices.clone();
        Self { def, vertices }
    }

    pub fn def(&self) -> &Arc<MeshDef> {
        &self.def
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}
