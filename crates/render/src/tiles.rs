use std::fmt;
use tidewater_common::TextureHandle;
use tidewater_kernel::TileScroll;

use crate::RenderError;

/// Most tiles a single draw can carry.
pub const MAX_TILES: usize = tidewater_assets::MAX_MATERIAL_TILES;

/// Sampling state of one texture tile for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileState {
    pub index: u8,
    pub texture: TextureHandle,
    pub width: u32,
    pub height: u32,
    /// Texel translation along s.
    pub s_translate: f32,
    /// Texel translation along t.
    pub t_translate: f32,
}

impl TileState {
    const EMPTY: Self = Self {
        index: 0,
        texture: TextureHandle(0),
        width: 0,
        height: 0,
        s_translate: 0.0,
        t_translate: 0.0,
    };

    pub fn new(index: u8, texture: TextureHandle, width: u32, height: u32) -> Self {
        Self {
            index,
            texture,
            width,
            height,
            s_translate: 0.0,
            t_translate: 0.0,
        }
    }
}

/// Fixed-capacity tile list, copied by value so replay never allocates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSet {
    tiles: [TileState; MAX_TILES],
    len: usize,
}

impl Default for TileSet {
    fn default() -> Self {
        Self {
            tiles: [TileState::EMPTY; MAX_TILES],
            len: 0,
        }
    }
}

impl TileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tile: TileState) -> Result<(), RenderError> {
        if self.len == MAX_TILES {
            return Err(RenderError::TooManyTiles(self.len + 1));
        }
        self.tiles[self.len] = tile;
        self.len += 1;
        Ok(())
    }

    pub fn as_slice(&self) -> &[TileState] {
        &self.tiles[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [TileState] {
        &mut self.tiles[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Per-tile hook run while a display list is replayed.
///
/// Implementations must be pure in `scroll_offset`: the same offset always
/// leaves `tile` in the same state, however often it is called in a frame.
pub trait TileCallback: fmt::Debug + Send + Sync {
    fn apply(&self, scroll_offset: f32, tile: &mut TileState);
}

impl TileCallback for TileScroll {
    fn apply(&self, scroll_offset: f32, tile: &mut TileState) {
        if !self.tiles.contains(tile.index) {
            return;
        }
        let uv = self.translate(scroll_offset);
        tile.s_translate = uv.s;
        tile.t_translate = uv.t;
    }
}
