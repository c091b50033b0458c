//! Pre-recorded, replayable command blocks.
//!
//! A [`DisplayList`] is validated once when recorded and replayed by
//! reference every frame. Replay walks a boxed slice of commands and copies
//! tile state onto the stack, so it performs no allocation and no checks.

use glam::Mat4;
use std::sync::Arc;
use tidewater_common::MeshHandle;

use crate::RenderError;
use crate::backend::{GraphicsBackend, MeshBinding};
use crate::matrix::MAX_MATRIX_DEPTH;
use crate::tiles::{TileCallback, TileSet};

#[derive(Debug)]
enum Command {
    PushMatrix(Mat4),
    PopMatrix(usize),
    Draw {
        mesh: MeshHandle,
        tiles: TileSet,
        callback: Option<Arc<dyn TileCallback>>,
    },
}

/// Collects commands for [`DisplayList::record`].
#[derive(Debug, Default)]
pub struct Recorder {
    commands: Vec<Command>,
    depth: usize,
    error: Option<RenderError>,
}

impl Recorder {
    /// Push `top * matrix` onto the backend's model matrix stack.
    pub fn push_matrix(&mut self, matrix: Mat4) -> &mut Self {
        if self.depth == MAX_MATRIX_DEPTH {
            self.fail(RenderError::MatrixStackOverflow {
                depth: self.depth + 1,
            });
        } else {
            self.depth += 1;
        }
        self.commands.push(Command::PushMatrix(matrix));
        self
    }

    pub fn pop_matrix(&mut self, count: usize) -> &mut Self {
        if count > self.depth {
            self.fail(RenderError::MatrixStackUnderflow {
                popped: count,
                depth: self.depth,
            });
            self.depth = 0;
        } else {
            self.depth -= count;
        }
        self.commands.push(Command::PopMatrix(count));
        self
    }

    /// Draw a mesh with the tile state captured at upload time.
    pub fn draw(&mut self, binding: &MeshBinding) -> &mut Self {
        self.commands.push(Command::Draw {
            mesh: binding.mesh,
            tiles: binding.tiles,
            callback: None,
        });
        self
    }

    /// Draw a mesh, letting `callback` adjust each tile at replay time.
    pub fn draw_with_tile_callback(
        &mut self,
        binding: &MeshBinding,
        callback: Arc<dyn TileCallback>,
    ) -> &mut Self {
        self.commands.push(Command::Draw {
            mesh: binding.mesh,
            tiles: binding.tiles,
            callback: Some(callback),
        });
        self
    }

    fn fail(&mut self, error: RenderError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

/// Immutable compiled command list.
#[derive(Debug)]
pub struct DisplayList {
    commands: Box<[Command]>,
}

impl DisplayList {
    /// Record and validate a command block.
    ///
    /// Fails if the block is empty, pops more than it pushed, nests deeper
    /// than [`MAX_MATRIX_DEPTH`], or leaves pushes open.
    pub fn record<F>(build: F) -> Result<Self, RenderError>
    where
        F: FnOnce(&mut Recorder),
    {
        let mut recorder = Recorder::default();
        build(&mut recorder);

        if let Some(error) = recorder.error {
            return Err(error);
        }
        if recorder.commands.is_empty() {
            return Err(RenderError::EmptyDisplayList);
        }
        if recorder.depth != 0 {
            return Err(RenderError::UnbalancedMatrixStack {
                open: recorder.depth,
            });
        }

        let list = Self {
            commands: recorder.commands.into_boxed_slice(),
        };
        tracing::debug!(
            commands = list.len(),
            draws = list.draw_count(),
            "display list recorded"
        );
        Ok(list)
    }

    /// Execute the recorded commands against `backend`.
    ///
    /// Tile callbacks run here, once per tile per draw, with `scroll_offset`.
    /// Referenced meshes must still be alive on `backend`.
    pub fn replay<B: GraphicsBackend + ?Sized>(&self, backend: &mut B, scroll_offset: f32) {
        for command in self.commands.iter() {
            match command {
                Command::PushMatrix(m) => backend.push_matrix(m),
                Command::PopMatrix(n) => backend.pop_matrix(*n),
                Command::Draw {
                    mesh,
                    tiles,
                    callback,
                } => {
                    let mut tiles = *tiles;
                    if let Some(callback) = callback {
                        for tile in tiles.as_mut_slice() {
                            callback.apply(scroll_offset, tile);
                        }
                    }
                    backend.draw_mesh(*mesh, tiles.as_slice());
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Always `false`: empty lists are rejected at record time.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Draw { .. }))
            .count()
    }
}
