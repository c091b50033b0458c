//! Asset store: named, content-addressed mesh and texture definitions.
//!
//! The orchestrator asks for assets by name at startup. A missing or invalid
//! asset is reported as an [`AssetError`]; callers treat it as fatal.
//!
//! # Layout
//! The registry can be saved to and loaded from a JSON document. Single
//! meshes can be imported from and exported to JSON as well.

mod mesh;
mod procedural;

pub use mesh::{MAX_MATERIAL_TILES, MaterialDef, MeshDef, MeshInstance, TextureDef};
pub use procedural::{WATER_MESH, WATER_TEXTURE, WaterGrid, water_tile_texture};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Content-addressed asset ID computed from the asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl AssetId {
    fn from_digest(digest: &[u8]) -> Self {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_le_bytes(bytes))
    }
}

/// Kind of asset, used in lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Mesh,
    Texture,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mesh => f.write_str("mesh"),
            Self::Texture => f.write_str("texture"),
        }
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{kind} not found: {name}")]
    NotFound { kind: AssetKind, name: String },
    #[error("invalid mesh {name}: {reason}")]
    InvalidMesh { name: String, reason: String },
    #[error("invalid texture {name}: {reason}")]
    InvalidTexture { name: String, reason: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
enum Asset {
    Mesh(Arc<MeshDef>),
    Texture(Arc<TextureDef>),
}

#[derive(Serialize)]
struct RegistryOut<'a> {
    meshes: Vec<&'a MeshDef>,
    textures: Vec<&'a TextureDef>,
}

#[derive(Deserialize)]
struct RegistryIn {
    #[serde(default)]
    meshes: Vec<MeshDef>,
    #[serde(default)]
    textures: Vec<TextureDef>,
}

/// Name-indexed asset registry. Definitions are immutable once registered.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    assets: BTreeMap<String, (AssetId, Asset)>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the procedural water grid and its tile texture.
    pub fn with_water() -> Self {
        let mut store = Self::new();
        store.register_builtin_water();
        store
    }

    /// Register the procedural water mesh and tile texture under their
    /// built-in names. Both are generated valid.
    pub fn register_builtin_water(&mut self) {
        let mesh = WaterGrid::default().build(WATER_MESH, WATER_TEXTURE);
        let texture = water_tile_texture(WATER_TEXTURE, 32);
        self.insert(
            mesh.name.clone(),
            mesh.content_id(),
            Asset::Mesh(Arc::new(mesh)),
        );
        self.insert(
            texture.name.clone(),
            texture.content_id(),
            Asset::Texture(Arc::new(texture)),
        );
    }

    /// Validate and register a mesh under its own name, replacing any previous entry.
    pub fn register_mesh(&mut self, mesh: MeshDef) -> Result<AssetId, AssetError> {
        mesh.validate()?;
        let id = mesh.content_id();
        self.insert(mesh.name.clone(), id, Asset::Mesh(Arc::new(mesh)));
        Ok(id)
    }

    /// Validate and register a texture under its own name.
    pub fn register_texture(&mut self, texture: TextureDef) -> Result<AssetId, AssetError> {
        texture.validate()?;
        let id = texture.content_id();
        self.insert(texture.name.clone(), id, Asset::Texture(Arc::new(texture)));
        Ok(id)
    }

    fn insert(&mut self, name: String, id: AssetId, asset: Asset) {
        tracing::debug!(%name, id = id.0, "asset registered");
        self.assets.insert(name, (id, asset));
    }

    pub fn mesh(&self, name: &str) -> Result<Arc<MeshDef>, AssetError> {
        match self.assets.get(name) {
            Some((_, Asset::Mesh(m))) => Ok(m.clone()),
            _ => Err(AssetError::NotFound {
                kind: AssetKind::Mesh,
                name: name.to_string(),
            }),
        }
    }

    pub fn texture(&self, name: &str) -> Result<Arc<TextureDef>, AssetError> {
        match self.assets.get(name) {
            Some((_, Asset::Texture(t))) => Ok(t.clone()),
            _ => Err(AssetError::NotFound {
                kind: AssetKind::Texture,
                name: name.to_string(),
            }),
        }
    }

    /// Content id of the asset registered under `name`.
    pub fn id(&self, name: &str) -> Option<AssetId> {
        self.assets.get(name).map(|(id, _)| *id)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Import a single mesh definition from a JSON file.
    pub fn import_mesh(&mut self, path: impl AsRef<Path>) -> Result<AssetId, AssetError> {
        let file = std::fs::File::open(path.as_ref())?;
        let mesh: MeshDef = serde_json::from_reader(std::io::BufReader::new(file))?;
        self.register_mesh(mesh)
    }

    /// Write one registered mesh to a JSON file.
    pub fn export_mesh(&self, name: &str, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let mesh = self.mesh(name)?;
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, mesh.as_ref())?;
        Ok(())
    }

    /// Save the asset registry to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let mut out = RegistryOut {
            meshes: Vec::new(),
            textures: Vec::new(),
        };
        for (_, asset) in self.assets.values() {
            match asset {
                Asset::Mesh(m) => out.meshes.push(m.as_ref()),
                Asset::Texture(t) => out.textures.push(t.as_ref()),
            }
        }
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(file, &out)?;
        Ok(())
    }

    /// Load an asset registry from a JSON file, validating every entry.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let registry: RegistryIn = serde_json::from_reader(std::io::BufReader::new(file))?;
        let mut store = Self::new();
        for mesh in registry.meshes {
            store.register_mesh(mesh)?;
        }
        for texture in registry.textures {
            store.register_texture(texture)?;
        }
        Ok(store)
    }
}

pub fn crate_info() -> &'static str {
    "tidewater-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_water_is_registered() {
        let store = AssetStore::with_water();
        assert_eq!(store.len(), 2);
        let mesh = store.mesh(WATER_MESH).unwrap();
        assert_eq!(mesh.material.tiles, vec![WATER_TEXTURE, WATER_TEXTURE]);
        assert!(store.texture(WATER_TEXTURE).is_ok());
        assert_eq!(store.names().collect::<Vec<_>>(), vec![WATER_MESH, WATER_TEXTURE]);
    }

    #[test]
    fn missing_mesh_is_not_found() {
        let store = AssetStore::new();
        let err = store.mesh("water").unwrap_err();
        assert!(matches!(
            err,
            AssetError::NotFound {
                kind: AssetKind::Mesh,
                ..
            }
        ));
        assert_eq!(err.to_string(), "mesh not found: water");
    }

    #[test]
    fn wrong_kind_is_not_found() {
        let store = AssetStore::with_water();
        assert!(store.texture(WATER_MESH).is_err());
        assert!(store.mesh(WATER_TEXTURE).is_err());
    }

    #[test]
    fn content_addressed_ids_are_stable() {
        let a = AssetStore::with_water();
        let b = AssetStore::with_water();
        assert_eq!(a.id(WATER_MESH), b.id(WATER_MESH));
        assert_ne!(a.id(WATER_MESH), a.id(WATER_TEXTURE));
    }

    #[test]
    fn invalid_mesh_is_rejected() {
        let mut store = AssetStore::new();
        let mut mesh = WaterGrid::default().build("broken", WATER_TEXTURE);
        mesh.indices.push(9999);
        mesh.indices.extend_from_slice(&[0, 0]);
        assert!(store.register_mesh(mesh).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = AssetStore::with_water();
        store.save(tmp.path()).unwrap();

        let loaded = AssetStore::load(tmp.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.id(WATER_MESH), store.id(WATER_MESH));
        assert_eq!(loaded.id(WATER_TEXTURE), store.id(WATER_TEXTURE));
    }

    #[test]
    fn export_and_import_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("water.json");
        let store = AssetStore::with_water();
        store.export_mesh(WATER_MESH, &path).unwrap();

        let mut other = AssetStore::new();
        let id = other.import_mesh(&path).unwrap();
        assert_eq!(Some(id), store.id(WATER_MESH));
    }
}
