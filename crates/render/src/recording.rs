use glam::Mat4;
use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write as _;
use tidewater_assets::{MeshDef, TextureDef};
use tidewater_common::{MeshHandle, Rgba, TextureHandle, Vertex};
use tidewater_kernel::VertexUpload;

use crate::RenderError;
use crate::backend::GraphicsBackend;
use crate::matrix::MatrixStack;
use crate::state::{Fog, Lighting, ViewMatrices};
use crate::sync::{SyncPoint, SyncTimeline};
use crate::tiles::{TileSet, TileState};

/// One backend call, in the order it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Upload(MeshHandle),
    BeginFrame,
    Clear,
    SetView,
    SetFog,
    SetLighting,
    PushMatrix,
    PopMatrix(usize),
    Draw(MeshHandle),
    SyncPoint(SyncPoint),
    Present,
}

/// A draw as the simulated GPU saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub mesh: MeshHandle,
    pub model: Mat4,
    pub tiles: TileSet,
    pub vertex_count: usize,
    /// Digest of the GPU-visible vertex data at the time of the draw.
    pub vertex_digest: u64,
}

/// Everything recorded between two presents.
#[derive(Debug, Clone, Default)]
pub struct FrameRecord {
    pub index: u64,
    pub ops: Vec<Op>,
    pub clear: Option<Rgba>,
    pub view: Option<ViewMatrices>,
    pub fog: Option<Fog>,
    pub lighting: Option<Lighting>,
    pub draws: Vec<DrawRecord>,
    pub sync_point: Option<SyncPoint>,
}

impl FrameRecord {
    fn reset(&mut self, index: u64) {
        self.index = index;
        self.ops.clear();
        self.clear = None;
        self.view = None;
        self.fog = None;
        self.lighting = None;
        self.draws.clear();
        self.sync_point = None;
    }

    /// Digest over the draws only: geometry, model matrices and tile translations.
    pub fn draw_digest(&self) -> u64 {
        let mut h = FNV_OFFSET;
        for d in &self.draws {
            mix(&mut h, &d.mesh.0.to_le_bytes());
            for f in d.model.to_cols_array() {
                mix(&mut h, &f.to_le_bytes());
            }
            for t in d.tiles.as_slice() {
                mix(&mut h, &[t.index]);
                mix(&mut h, &t.texture.0.to_le_bytes());
                mix(&mut h, &t.s_translate.to_le_bytes());
                mix(&mut h, &t.t_translate.to_le_bytes());
            }
            mix(&mut h, &(d.vertex_count as u64).to_le_bytes());
            mix(&mut h, &d.vertex_digest.to_le_bytes());
        }
        h
    }
}

/// FNV-1a over the raw bytes of `vertices`.
pub fn vertex_digest(vertices: &[Vertex]) -> u64 {
    let mut h = FNV_OFFSET;
    mix(&mut h, bytemuck::cast_slice(vertices));
    h
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;

fn mix(h: &mut u64, bytes: &[u8]) {
    for &b in bytes {
        *h ^= b as u64;
        *h = h.wrapping_mul(0x0100_0000_01b3);
    }
}

#[derive(Debug)]
struct RecordedMesh {
    name: String,
    vertices: Vec<Vertex>,
}

#[derive(Debug)]
struct RecordedTexture {
    name: String,
    width: u32,
    height: u32,
}

/// Headless backend that simulates the GPU side in memory.
///
/// Uploaded vertices are copied into a separate GPU-visible buffer; draws
/// read only that copy. Sync points are reached `latency` presents after the
/// frame that issued them (0 = at its own present).
///
/// Useful for CLI output, logging, and testing the frame pipeline.
#[derive(Debug)]
pub struct RecordingBackend {
    size: (u32, u32),
    next_handle: u32,
    meshes: BTreeMap<MeshHandle, RecordedMesh>,
    textures: BTreeMap<TextureHandle, RecordedTexture>,
    matrices: MatrixStack,
    current: FrameRecord,
    last: FrameRecord,
    presented: u64,
    timeline: SyncTimeline,
    latency: u64,
    in_flight: VecDeque<(u64, SyncPoint)>,
}

impl RecordingBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            next_handle: 1,
            meshes: BTreeMap::new(),
            textures: BTreeMap::new(),
            matrices: MatrixStack::new(),
            current: FrameRecord::default(),
            last: FrameRecord::default(),
            presented: 0,
            timeline: SyncTimeline::new(),
            latency: 0,
            in_flight: VecDeque::new(),
        }
    }

    /// Delay sync point completion by `frames` presents.
    pub fn with_latency(mut self, frames: u64) -> Self {
        self.latency = frames;
        self
    }

    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    /// Frame being recorded (since the last present).
    pub fn current_frame(&self) -> &FrameRecord {
        &self.current
    }

    /// Most recently presented frame.
    pub fn last_frame(&self) -> &FrameRecord {
        &self.last
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// GPU-visible copy of a mesh's vertices.
    pub fn gpu_vertices(&self, mesh: MeshHandle) -> Option<&[Vertex]> {
        self.meshes.get(&mesh).map(|m| m.vertices.as_slice())
    }

    /// Human-readable summary of the last presented frame.
    pub fn describe_last_frame(&self) -> String {
        let f = &self.last;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} (surface {}x{}) ===",
            f.index, self.size.0, self.size.1
        );
        if let Some(c) = f.clear {
            let _ = writeln!(
                out,
                "Clear: #{:02x}{:02x}{:02x}{:02x}",
                c.r(),
                c.g(),
                c.b(),
                c.a()
            );
        }
        if let Some(fog) = f.fog {
            let _ = writeln!(
                out,
                "Fog: {} color=({}, {}, {}) range={:.1}..{:.1}",
                if fog.enabled { "on" } else { "off" },
                fog.color.r(),
                fog.color.g(),
                fog.color.b(),
                fog.near,
                fog.far
            );
        }
        if let Some(l) = f.lighting {
            let _ = writeln!(
                out,
                "Lights: ambient=({}, {}, {}) directional={}",
                l.ambient.r(),
                l.ambient.g(),
                l.ambient.b(),
                l.lights().len()
            );
        }
        for d in &f.draws {
            let name = self
                .meshes
                .get(&d.mesh)
                .map(|m| m.name.as_str())
                .unwrap_or("?");
            let _ = write!(
                out,
                "  draw {name} (#{}) vertices={} digest={:#018x}",
                d.mesh.0, d.vertex_count, d.vertex_digest
            );
            for t in d.tiles.as_slice() {
                let tex = self
                    .textures
                    .get(&t.texture)
                    .map(|t| format!("{} {}x{}", t.name, t.width, t.height))
                    .unwrap_or_else(|| "?".into());
                let _ = write!(
                    out,
                    " [tile{} {tex} s={:.2} t={:.2}]",
                    t.index, t.s_translate, t.t_translate
                );
            }
            out.push('\n');
        }
        if let Some(sp) = f.sync_point {
            let _ = writeln!(out, "Sync point: {}", sp.id());
        }
        out
    }

    fn alloc_handle(&mut self) -> u32 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }
}

impl VertexUpload for RecordingBackend {
    fn upload_vertices(&mut self, mesh: MeshHandle, vertices: &[Vertex]) {
        self.current.ops.push(Op::Upload(mesh));
        match self.meshes.get_mut(&mesh) {
            Some(m) if m.vertices.len() == vertices.len() => {
                m.vertices.copy_from_slice(vertices);
            }
            Some(m) => {
                tracing::warn!(
                    mesh = mesh.0,
                    expected = m.vertices.len(),
                    got = vertices.len(),
                    "vertex upload size mismatch; ignored"
                );
            }
            None => tracing::warn!(mesh = mesh.0, "upload to unknown mesh"),
        }
    }
}

impl GraphicsBackend for RecordingBackend {
    fn create_texture(&mut self, texture: &TextureDef) -> Result<TextureHandle, RenderError> {
        let handle = TextureHandle(self.alloc_handle());
        self.textures.insert(
            handle,
            RecordedTexture {
                name: texture.name.clone(),
                width: texture.width,
                height: texture.height,
            },
        );
        Ok(handle)
    }

    fn create_mesh(&mut self, mesh: &MeshDef) -> Result<MeshHandle, RenderError> {
        let handle = MeshHandle(self.alloc_handle());
        self.meshes.insert(
            handle,
            RecordedMesh {
                name: mesh.name.clone(),
                vertices: mesh.vertices.clone(),
            },
        );
        Ok(handle)
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
    }

    fn release_mesh(&mut self, mesh: MeshHandle) {
        self.meshes.remove(&mesh);
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size
    }

    fn begin_frame(&mut self) {
        self.matrices.reset();
        self.current.ops.push(Op::BeginFrame);
    }

    fn clear(&mut self, color: Rgba) {
        self.current.ops.push(Op::Clear);
        self.current.clear = Some(color);
    }

    fn set_view(&mut self, view: &ViewMatrices) {
        self.current.ops.push(Op::SetView);
        self.current.view = Some(*view);
    }

    fn set_fog(&mut self, fog: &Fog) {
        self.current.ops.push(Op::SetFog);
        self.current.fog = Some(*fog);
    }

    fn set_lighting(&mut self, lighting: &Lighting) {
        self.current.ops.push(Op::SetLighting);
        self.current.lighting = Some(*lighting);
    }

    fn push_matrix(&mut self, matrix: &Mat4) {
        self.current.ops.push(Op::PushMatrix);
        if !self.matrices.push(matrix) {
            tracing::warn!("matrix stack overflow");
        }
    }

    fn pop_matrix(&mut self, count: usize) {
        self.current.ops.push(Op::PopMatrix(count));
        if !self.matrices.pop(count) {
            tracing::warn!(count, "matrix stack underflow");
        }
    }

    fn draw_mesh(&mut self, mesh: MeshHandle, tiles: &[TileState]) {
        self.current.ops.push(Op::Draw(mesh));
        let Some(gpu) = self.meshes.get(&mesh) else {
            tracing::warn!(mesh = mesh.0, "draw of unknown mesh skipped");
            return;
        };
        let mut set = TileSet::new();
        for tile in tiles {
            if set.push(*tile).is_err() {
                break;
            }
        }
        self.current.draws.push(DrawRecord {
            mesh,
            model: self.matrices.top(),
            tiles: set,
            vertex_count: gpu.vertices.len(),
            vertex_digest: vertex_digest(&gpu.vertices),
        });
    }

    fn sync_point(&mut self) -> SyncPoint {
        let point = self.timeline.issue();
        self.current.ops.push(Op::SyncPoint(point));
        self.current.sync_point = Some(point);
        self.in_flight.push_back((self.presented, point));
        point
    }

    fn sync_point_reached(&self, point: SyncPoint) -> bool {
        self.timeline.reached(point)
    }

    fn present(&mut self) {
        self.current.ops.push(Op::Present);
        self.presented += 1;

        let done = self.timeline.completer();
        while let Some(&(issued_at, point)) = self.in_flight.front() {
            if issued_at + 1 + self.latency > self.presented {
                break;
            }
            done.complete(point);
            self.in_flight.pop_front();
        }

        std::mem::swap(&mut self.current, &mut self.last);
        self.current.reset(self.presented);
        tracing::trace!(frame = self.last.index, draws = self.last.draws.len(), "presented");
    }
}
