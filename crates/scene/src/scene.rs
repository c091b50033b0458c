use glam::{Mat4, Vec3};
use std::sync::Arc;
use tidewater_assets::{AssetStore, MeshInstance};
use tidewater_kernel::{MeshMutator, WaveField};
use tidewater_render::{DisplayList, GraphicsBackend, MeshBinding, upload_mesh};

use crate::SceneError;
use crate::config::SceneConfig;
use crate::context::{FrameContext, FrameStats};
use crate::host::Minigame;

/// GPU-side resources owned by a live scene.
#[derive(Debug)]
struct Resources {
    binding: MeshBinding,
    list: DisplayList,
}

/// Animated water surface driven through a [`GraphicsBackend`].
///
/// Owns the mesh instance, the display list, the clock and the light/fog
/// state. Each [`frame`](Self::frame) deforms and uploads the mesh, then
/// replays the display list and ends with a sync point and a present.
#[derive(Debug)]
pub struct WaterScene<B: GraphicsBackend> {
    backend: B,
    ctx: FrameContext,
    mutator: MeshMutator,
    resources: Option<Resources>,
}

impl<B: GraphicsBackend> WaterScene<B> {
    /// Look up the water assets, upload them and record the display list.
    ///
    /// Any failure here is fatal for the scene; nothing is left uploaded.
    pub fn init(
        config: &SceneConfig,
        assets: &AssetStore,
        mut backend: B,
    ) -> Result<Self, SceneError> {
        config.validate()?;
        let mesh = assets.mesh(&config.water.mesh)?;
        let textures = mesh
            .material
            .tiles
            .iter()
            .map(|name| assets.texture(name))
            .collect::<Result<Vec<_>, _>>()?;

        let binding = upload_mesh(&mut backend, &mesh, &textures)?;
        let model = Mat4::from_scale(Vec3::splat(config.water.scale));
        let scroll = Arc::new(config.scroll);
        let list = match DisplayList::record(|rec| {
            rec.push_matrix(model)
                .draw_with_tile_callback(&binding, scroll)
                .pop_matrix(1);
        }) {
            Ok(list) => list,
            Err(e) => {
                binding.release(&mut backend);
                return Err(e.into());
            }
        };

        tracing::info!(
            mesh = %mesh.name,
            vertices = mesh.vertices.len(),
            tiles = binding.tiles.len(),
            "water scene initialized"
        );
        Ok(Self {
            backend,
            ctx: FrameContext::new(config, mesh),
            mutator: MeshMutator::new(WaveField::new(config.wave)),
            resources: Some(Resources { binding, list }),
        })
    }

    /// Run one frame. `dt` is in seconds and trusted as given.
    ///
    /// Does nothing after [`cleanup`](Self::cleanup).
    pub fn frame(&mut self, dt: f32) {
        let Some(res) = &self.resources else {
            return;
        };
        let ctx = &mut self.ctx;
        let backend = &mut self.backend;
        let _span = tracing::trace_span!("frame", n = ctx.stats.frames).entered();

        if let Some(prev) = ctx.last_sync {
            if !backend.sync_point_reached(prev) {
                ctx.stats.gpu_behind_frames += 1;
                tracing::trace!(sync = prev.id(), "gpu still behind previous frame");
            }
        }

        ctx.clock.advance(dt);

        // Deform and upload before anything can draw the mesh.
        ctx.stats.last_deform = self.mutator.deform(
            res.binding.mesh,
            ctx.mesh.vertices_mut(),
            ctx.clock.wave_phase(),
            &mut *backend,
        );

        backend.begin_frame();
        let (width, height) = backend.surface_size();
        backend.set_view(&ctx.camera.matrices(width, height));
        backend.clear(ctx.clear_color);
        backend.set_fog(&ctx.fog);
        backend.set_lighting(&ctx.lighting);

        res.list.replay(&mut *backend, ctx.clock.scroll_offset());

        ctx.last_sync = Some(backend.sync_point());
        backend.present();
        ctx.stats.frames += 1;
    }

    /// Release the mesh and textures. Later calls and frames are no-ops.
    pub fn cleanup(&mut self) {
        if let Some(Resources { binding, list }) = self.resources.take() {
            drop(list);
            binding.release(&mut self.backend);
            tracing::info!(frames = self.ctx.stats.frames, "water scene cleaned up");
        }
    }

    pub fn is_live(&self) -> bool {
        self.resources.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn context(&self) -> &FrameContext {
        &self.ctx
    }

    pub fn stats(&self) -> FrameStats {
        self.ctx.stats
    }

    pub fn mesh(&self) -> &MeshInstance {
        &self.ctx.mesh
    }

    pub fn mutator(&self) -> &MeshMutator {
        &self.mutator
    }
}

impl<B: GraphicsBackend> Minigame for WaterScene<B> {
    fn frame(&mut self, dt: f32) {
        WaterScene::frame(self, dt);
    }

    fn cleanup(&mut self) {
        WaterScene::cleanup(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tidewater_assets::{AssetError, MaterialDef, MeshDef, TextureDef, WATER_TEXTURE};
    use tidewater_common::{MeshHandle, Rgba, TextureHandle, Vertex};
    use tidewater_kernel::{ClockRates, VertexUpload};
    use tidewater_render::{
        Camera, Fog, Lighting, Op, RecordingBackend, RenderError, SyncPoint, TileState,
        ViewMatrices, vertex_digest,
    };

    /// Recording backend that also counts resource creation.
    #[derive(Debug)]
    struct Counting {
        inner: RecordingBackend,
        created: Rc<Cell<u32>>,
    }

    impl VertexUpload for Counting {
        fn upload_vertices(&mut self, mesh: MeshHandle, vertices: &[Vertex]) {
            self.inner.upload_vertices(mesh, vertices);
        }
    }

    impl GraphicsBackend for Counting {
        fn create_texture(&mut self, texture: &TextureDef) -> Result<TextureHandle, RenderError> {
            self.created.set(self.created.get() + 1);
            self.inner.create_texture(texture)
        }
        fn create_mesh(&mut self, mesh: &MeshDef) -> Result<MeshHandle, RenderError> {
            self.created.set(self.created.get() + 1);
            self.inner.create_mesh(mesh)
        }
        fn release_texture(&mut self, texture: TextureHandle) {
            self.inner.release_texture(texture);
        }
        fn release_mesh(&mut self, mesh: MeshHandle) {
            self.inner.release_mesh(mesh);
        }
        fn surface_size(&self) -> (u32, u32) {
            self.inner.surface_size()
        }
        fn begin_frame(&mut self) {
            self.inner.begin_frame();
        }
        fn clear(&mut self, color: Rgba) {
            self.inner.clear(color);
        }
        fn set_view(&mut self, view: &ViewMatrices) {
            self.inner.set_view(view);
        }
        fn set_fog(&mut self, fog: &Fog) {
            self.inner.set_fog(fog);
        }
        fn set_lighting(&mut self, lighting: &Lighting) {
            self.inner.set_lighting(lighting);
        }
        fn push_matrix(&mut self, matrix: &Mat4) {
            self.inner.push_matrix(matrix);
        }
        fn pop_matrix(&mut self, count: usize) {
            self.inner.pop_matrix(count);
        }
        fn draw_mesh(&mut self, mesh: MeshHandle, tiles: &[TileState]) {
            self.inner.draw_mesh(mesh, tiles);
        }
        fn sync_point(&mut self) -> SyncPoint {
            self.inner.sync_point()
        }
        fn sync_point_reached(&self, point: SyncPoint) -> bool {
            self.inner.sync_point_reached(point)
        }
        fn present(&mut self) {
            self.inner.present();
        }
    }

    fn counting() -> (Counting, Rc<Cell<u32>>) {
        let created = Rc::new(Cell::new(0));
        let backend = Counting {
            inner: RecordingBackend::new(320, 240),
            created: created.clone(),
        };
        (backend, created)
    }

    fn scene_with(config: &SceneConfig, backend: RecordingBackend) -> WaterScene<RecordingBackend> {
        WaterScene::init(config, &AssetStore::with_water(), backend).unwrap()
    }

    fn scene() -> WaterScene<RecordingBackend> {
        scene_with(&SceneConfig::default(), RecordingBackend::new(320, 240))
    }

    #[test]
    fn frame_follows_pipeline_order() {
        let mut scene = scene();
        scene.frame(1.0 / 60.0);

        let mesh = scene.resources.as_ref().unwrap().binding.mesh;
        let sync = scene.context().last_sync.unwrap();
        assert_eq!(
            scene.backend().last_frame().ops,
            vec![
                Op::Upload(mesh),
                Op::BeginFrame,
                Op::SetView,
                Op::Clear,
                Op::SetFog,
                Op::SetLighting,
                Op::PushMatrix,
                Op::Draw(mesh),
                Op::PopMatrix(1),
                Op::SyncPoint(sync),
                Op::Present,
            ]
        );
    }

    #[test]
    fn frame_state_matches_config() {
        let mut scene = scene();
        scene.frame(0.1);
        let frame = scene.backend().last_frame();
        assert_eq!(frame.clear, Some(Rgba::new(0x22, 0x55, 0x66, 0xFF)));
        assert_eq!(frame.fog, Some(Fog::default()));
        let lighting = frame.lighting.unwrap();
        assert_eq!(lighting.ambient, Rgba::new(0x22, 0x11, 0x22, 0xFF));
        assert_eq!(lighting.lights().len(), 1);

        let draw = &frame.draws[0];
        assert_eq!(draw.model, Mat4::from_scale(Vec3::splat(0.12)));
        // offset 5 * 0.1 = 0.5 -> s = 0.25, t = 0.4
        for tile in draw.tiles.as_slice() {
            assert!((tile.s_translate - 0.25).abs() < 1e-5);
            assert!((tile.t_translate - 0.4).abs() < 1e-5);
        }
    }

    #[test]
    fn draw_reads_this_frames_upload() {
        let mut scene = scene();
        for _ in 0..3 {
            scene.frame(0.25);
            let drawn = scene.backend().last_frame().draws[0].vertex_digest;
            assert_eq!(drawn, vertex_digest(scene.mesh().vertices()));
        }
        // the mesh actually moved away from its rest pose
        assert_ne!(scene.mesh().vertices(), &scene.mesh().def().vertices[..]);
    }

    #[test]
    fn frozen_clock_replays_identically() {
        let mut scene = scene();
        scene.frame(0.5);
        let mut digests = Vec::new();
        for _ in 0..4 {
            scene.frame(0.0);
            digests.push(scene.backend().last_frame().draw_digest());
        }
        assert!(digests.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(scene.context().clock.ticks(), 5);
    }

    #[test]
    fn zero_rates_keep_the_surface_still() {
        let config = SceneConfig {
            clock: ClockRates {
                scroll: 0.0,
                wave: 0.0,
            },
            ..SceneConfig::default()
        };
        let mut scene = scene_with(&config, RecordingBackend::new(320, 240));
        assert_eq!(scene.context().clock.rates(), config.clock);
        assert_eq!(scene.mutator().field().params(), &config.wave);
        scene.frame(1.0);
        let first = scene.backend().last_frame().draw_digest();
        scene.frame(3.0);
        assert_eq!(scene.backend().last_frame().draw_digest(), first);
    }

    #[test]
    fn counts_frames_behind_the_gpu() {
        let mut fast = scene();
        for _ in 0..5 {
            fast.frame(0.016);
        }
        assert_eq!(fast.stats().frames, 5);
        assert_eq!(fast.stats().gpu_behind_frames, 0);

        let mut slow = scene_with(
            &SceneConfig::default(),
            RecordingBackend::new(320, 240).with_latency(2),
        );
        for _ in 0..5 {
            slow.frame(0.016);
        }
        assert_eq!(slow.stats().gpu_behind_frames, 4);
    }

    #[test]
    fn empty_mesh_is_drawn_without_upload() {
        let mut store = AssetStore::with_water();
        store
            .register_mesh(MeshDef {
                name: "empty".into(),
                vertices: Vec::new(),
                indices: Vec::new(),
                material: MaterialDef {
                    tiles: vec![WATER_TEXTURE.into()],
                },
            })
            .unwrap();
        let mut config = SceneConfig::default();
        config.water.mesh = "empty".into();

        let mut scene = WaterScene::init(&config, &store, RecordingBackend::new(320, 240)).unwrap();
        scene.frame(0.1);
        let ops = &scene.backend().last_frame().ops;
        assert!(!ops.iter().any(|op| matches!(op, Op::Upload(_))));
        assert_eq!(ops[0], Op::BeginFrame);
        assert_eq!(scene.stats().last_deform.vertices, 0);
    }

    #[test]
    fn missing_mesh_is_fatal() {
        let mut config = SceneConfig::default();
        config.water.mesh = "nope".into();
        let backend = RecordingBackend::new(320, 240);
        let err = WaterScene::init(&config, &AssetStore::with_water(), backend).unwrap_err();
        assert!(matches!(err, SceneError::Asset(AssetError::NotFound { .. })));
    }

    #[test]
    fn missing_texture_is_fatal_and_uploads_nothing() {
        let mut store = AssetStore::with_water();
        let mut mesh = (*store.mesh("water").unwrap()).clone();
        mesh.name = "murky".into();
        mesh.material.tiles = vec!["missing".into()];
        store.register_mesh(mesh).unwrap();
        let mut config = SceneConfig::default();
        config.water.mesh = "murky".into();

        let (backend, created) = counting();
        let err = WaterScene::init(&config, &store, backend).unwrap_err();
        assert!(matches!(err, SceneError::Asset(AssetError::NotFound { .. })));
        assert_eq!(created.get(), 0);
    }

    #[test]
    fn successful_init_creates_mesh_and_shared_texture() {
        let (backend, created) = counting();
        let assets = AssetStore::with_water();
        let scene = WaterScene::init(&SceneConfig::default(), &assets, backend).unwrap();
        // two tiles name the same texture
        assert_eq!(created.get(), 2);
        assert_eq!(scene.backend().inner.live_textures(), 1);
    }

    #[test]
    fn projection_follows_surface_resize() {
        let mut scene = scene();
        scene.frame(0.1);
        let narrow = scene.backend().last_frame().view.unwrap();
        assert_eq!(narrow, Camera::default().matrices(320, 240));

        scene.backend_mut().set_surface_size(640, 240);
        scene.frame(0.1);
        let wide = scene.backend().last_frame().view.unwrap();
        assert_eq!(wide, Camera::default().matrices(640, 240));
        assert_ne!(wide.projection, narrow.projection);
        assert_eq!(wide.view, narrow.view);
    }

    #[test]
    fn cleanup_releases_everything_once() {
        let mut scene = scene();
        assert_eq!(scene.backend().live_meshes(), 1);
        assert_eq!(scene.backend().live_textures(), 1);
        scene.frame(0.1);

        scene.cleanup();
        assert!(!scene.is_live());
        assert_eq!(scene.backend().live_meshes(), 0);
        assert_eq!(scene.backend().live_textures(), 0);

        scene.cleanup();
        scene.frame(0.1);
        assert_eq!(scene.stats().frames, 1);
        assert_eq!(scene.backend().frames_presented(), 1);
    }
}
