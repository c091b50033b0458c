use glam::Mat4;
use std::sync::Arc;
use tidewater_assets::{MeshDef, TextureDef};
use tidewater_common::{MeshHandle, Rgba, TextureHandle};
use tidewater_kernel::VertexUpload;

use crate::RenderError;
use crate::state::{Fog, Lighting, ViewMatrices};
use crate::sync::SyncPoint;
use crate::tiles::{TileSet, TileState};

/// Command-queue style graphics backend.
///
/// Resource creation happens once at startup and may fail. Everything else
/// is per-frame and infallible: a backend that hits trouble mid-frame (for
/// example a lost surface) logs it and drops the frame internally.
///
/// Per frame the orchestrator calls, in order: vertex uploads,
/// `begin_frame`, state setters, display list replay (matrix and draw
/// calls), `sync_point`, `present`.
pub trait GraphicsBackend: VertexUpload {
    fn create_texture(&mut self, texture: &TextureDef) -> Result<TextureHandle, RenderError>;
    fn create_mesh(&mut self, mesh: &MeshDef) -> Result<MeshHandle, RenderError>;
    fn release_texture(&mut self, texture: TextureHandle);
    fn release_mesh(&mut self, mesh: MeshHandle);

    /// Pixel size of the color target.
    fn surface_size(&self) -> (u32, u32);

    /// Attach the next color target and the depth buffer.
    fn begin_frame(&mut self);
    /// Clear color and depth.
    fn clear(&mut self, color: Rgba);
    fn set_view(&mut self, view: &ViewMatrices);
    fn set_fog(&mut self, fog: &Fog);
    fn set_lighting(&mut self, lighting: &Lighting);

    fn push_matrix(&mut self, matrix: &Mat4);
    fn pop_matrix(&mut self, count: usize);
    fn draw_mesh(&mut self, mesh: MeshHandle, tiles: &[TileState]);

    /// Mark the end of this frame's submitted work. Never blocks.
    fn sync_point(&mut self) -> SyncPoint;
    fn sync_point_reached(&self, point: SyncPoint) -> bool;

    fn present(&mut self);
}

/// A mesh uploaded to a backend together with its recorded tile state.
#[derive(Debug, Clone)]
pub struct MeshBinding {
    pub mesh: MeshHandle,
    pub tiles: TileSet,
    textures: Vec<TextureHandle>,
}

impl MeshBinding {
    /// Release the mesh and its textures.
    pub fn release<B: GraphicsBackend + ?Sized>(self, backend: &mut B) {
        backend.release_mesh(self.mesh);
        for texture in self.textures {
            backend.release_texture(texture);
        }
    }
}

/// Upload `mesh` and the texture of each of its tiles.
///
/// `textures[i]` must be the texture named by `mesh.material.tiles[i]`;
/// tiles sharing a texture name share one backend texture.
pub fn upload_mesh<B: GraphicsBackend + ?Sized>(
    backend: &mut B,
    mesh: &MeshDef,
    textures: &[Arc<TextureDef>],
) -> Result<MeshBinding, RenderError> {
    if textures.len() != mesh.material.tiles.len() {
        return Err(RenderError::TextureCountMismatch {
            mesh: mesh.name.clone(),
            tiles: mesh.material.tiles.len(),
            textures: textures.len(),
        });
    }

    let mut created: Vec<(&str, TextureHandle)> = Vec::new();
    let mut tiles = TileSet::new();
    for (index, texture) in textures.iter().enumerate() {
        let handle = match created.iter().find(|(name, _)| *name == texture.name) {
            Some((_, handle)) => *handle,
            None => {
                let handle = backend.create_texture(texture)?;
                created.push((texture.name.as_str(), handle));
                handle
            }
        };
        tiles.push(TileState::new(
            index as u8,
            handle,
            texture.width,
            texture.height,
        ))?;
    }

    let handle = backend.create_mesh(mesh)?;
    tracing::debug!(
        mesh = %mesh.name,
        handle = handle.0,
        tiles = tiles.len(),
        "mesh uploaded"
    );
    Ok(MeshBinding {
        mesh: handle,
        tiles,
        textures: created.into_iter().map(|(_, h)| h).collect(),
    })
}
