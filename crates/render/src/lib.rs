//! Rendering Adapter: renderer-agnostic backend interface.
//!
//! # Invariants
//! - A display list is validated once at record time and replayed by
//!   reference; replay never allocates.
//! - Draws read only vertex data that was uploaded before them.
//! - Sync points are issued in increasing order and never block the caller.
//!
//! The [`GraphicsBackend`] trait is the seam between the frame pipeline and a
//! concrete GPU. [`RecordingBackend`] implements it in memory for headless
//! runs and tests; swap in a wgpu implementation without changing consumers.

mod backend;
mod camera;
mod display_list;
mod matrix;
mod recording;
mod state;
mod sync;
mod tiles;

pub use backend::{GraphicsBackend, MeshBinding, upload_mesh};
pub use camera::Camera;
pub use display_list::{DisplayList, Recorder};
pub use matrix::{MAX_MATRIX_DEPTH, MatrixStack};
pub use recording::{DrawRecord, FrameRecord, Op, RecordingBackend, vertex_digest};
pub use state::{DirectionalLight, Fog, Lighting, MAX_LIGHTS, ViewMatrices};
pub use sync::{SyncCompleter, SyncPoint, SyncTimeline};
pub use tiles::{MAX_TILES, TileCallback, TileSet, TileState};

/// Errors from resource creation and display list recording.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("matrix stack overflow at depth {depth}")]
    MatrixStackOverflow { depth: usize },
    #[error("popped {popped} matrices with only {depth} pushed")]
    MatrixStackUnderflow { popped: usize, depth: usize },
    #[error("display list leaves {open} matrices pushed")]
    UnbalancedMatrixStack { open: usize },
    #[error("display list has no commands")]
    EmptyDisplayList,
    #[error("too many tiles: {0}")]
    TooManyTiles(usize),
    #[error("mesh {mesh} has {tiles} tiles but {textures} textures were given")]
    TextureCountMismatch {
        mesh: String,
        tiles: usize,
        textures: usize,
    },
    #[error("backend error: {0}")]
    Backend(String),
}

pub fn crate_info() -> &'static str {
    "tidewater-render v0.1.0"
}
