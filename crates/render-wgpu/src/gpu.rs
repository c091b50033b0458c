use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::collections::BTreeMap;
use tidewater_assets::{MeshDef, TextureDef};
use tidewater_common::{MeshHandle, Rgba, TextureHandle, Vertex};
use tidewater_kernel::VertexUpload;
use tidewater_render::{
    Fog, GraphicsBackend, Lighting, MAX_LIGHTS, MatrixStack, RenderError, SyncPoint,
    SyncTimeline, TileState, ViewMatrices,
};
use wgpu::util::DeviceExt;

/// Most draws one frame can carry.
pub const MAX_DRAWS: usize = 64;

/// Stride between per-draw uniform blocks; the WebGPU minimum offset alignment.
const DRAW_STRIDE: u64 = 256;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Texture bound when a draw names no texture for a tile.
const WHITE: TextureHandle = TextureHandle(0);

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    fog_color: [f32; 4],
    fog_params: [f32; 4],
    ambient: [f32; 4],
    light_dir: [[f32; 4]; MAX_LIGHTS],
    light_color: [[f32; 4]; MAX_LIGHTS],
    light_params: [f32; 4],
}

impl Globals {
    fn new(view: &ViewMatrices, fog: &Fog, lighting: &Lighting) -> Self {
        let mut light_dir = [[0.0; 4]; MAX_LIGHTS];
        let mut light_color = [[0.0; 4]; MAX_LIGHTS];
        for (i, light) in lighting.lights().iter().enumerate() {
            light_dir[i] = light.direction.extend(0.0).to_array();
            light_color[i] = light.color.to_f32();
        }
        Self {
            view: view.view.to_cols_array_2d(),
            projection: view.projection.to_cols_array_2d(),
            fog_color: fog.color.to_f32(),
            fog_params: [fog.near, fog.far, if fog.enabled { 1.0 } else { 0.0 }, 0.0],
            ambient: lighting.ambient.to_f32(),
            light_dir,
            light_color,
            light_params: [lighting.lights().len() as f32, 0.0, 0.0, 0.0],
        }
    }
}

/// Per-draw block, padded to [`DRAW_STRIDE`] for dynamic offsets.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct DrawUniforms {
    model: [[f32; 4]; 4],
    tile_offset: [f32; 4],
    tile_size: [f32; 4],
    _pad: [[f32; 4]; 10],
}

impl DrawUniforms {
    fn new(model: &Mat4, tiles: &[TileState; 2]) -> Self {
        let size = |t: &TileState| [t.width.max(1) as f32, t.height.max(1) as f32];
        let [w0, h0] = size(&tiles[0]);
        let [w1, h1] = size(&tiles[1]);
        Self {
            model: model.to_cols_array_2d(),
            tile_offset: [
                tiles[0].s_translate,
                tiles[0].t_translate,
                tiles[1].s_translate,
                tiles[1].t_translate,
            ],
            tile_size: [w0, h0, w1, h1],
            _pad: [[0.0; 4]; 10],
        }
    }
}

/// The two tiles the shader samples. A single tile is sampled twice; a draw
/// without tiles samples the white texture.
fn shader_tiles(tiles: &[TileState]) -> [TileState; 2] {
    match tiles {
        [] => [TileState::new(0, WHITE, 1, 1); 2],
        [only] => [*only; 2],
        [a, b, ..] => [*a, *b],
    }
}

fn clear_color(color: Rgba) -> wgpu::Color {
    let [r, g, b, a] = color.to_f32();
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_count: usize,
    index_count: u32,
}

struct DrawCall {
    mesh: MeshHandle,
    textures: (TextureHandle, TextureHandle),
}

struct ActiveFrame {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// wgpu implementation of [`GraphicsBackend`] rendering to a window surface.
///
/// Draws are collected during replay and encoded into a single render pass
/// when the frame's sync point is issued. Vertex uploads go through
/// `Queue::write_buffer`, which lands before the next submission.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    depth_texture: wgpu::TextureView,
    textures: BTreeMap<TextureHandle, wgpu::TextureView>,
    texture_bind_groups: BTreeMap<(TextureHandle, TextureHandle), wgpu::BindGroup>,
    meshes: BTreeMap<MeshHandle, GpuMesh>,
    next_handle: u32,
    frame: Option<ActiveFrame>,
    clear: Rgba,
    view: ViewMatrices,
    fog: Fog,
    lighting: Lighting,
    matrices: MatrixStack,
    draws: Vec<DrawCall>,
    draw_uniforms: Vec<DrawUniforms>,
    timeline: SyncTimeline,
}

impl WgpuBackend {
    /// Pick an adapter and device for `surface` and configure it at `width` x `height`.
    pub async fn request(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::Backend("no compatible GPU adapter".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("tidewater_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Backend(format!("device request failed: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Backend("surface reports no formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            "GPU initialized"
        );
        Ok(Self::new(device, queue, surface, config))
    }

    /// Build pipelines and buffers for an already configured surface.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    ) -> Self {
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw_buffer"),
            size: DRAW_STRIDE * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<DrawUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bind_group"),
            layout: &draw_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &draw_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("water_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &draw_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("water_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::WATER_SHADER.into()),
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("water_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Sint16x4,
                        1 => Snorm8x4,
                        2 => Unorm8x4,
                        3 => Sint16x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tile_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let depth_texture = Self::create_depth_texture(&device, config.width, config.height);

        let mut backend = Self {
            device,
            queue,
            surface,
            config,
            pipeline,
            globals_buffer,
            globals_bind_group,
            draw_buffer,
            draw_bind_group,
            texture_layout,
            sampler,
            depth_texture,
            textures: BTreeMap::new(),
            texture_bind_groups: BTreeMap::new(),
            meshes: BTreeMap::new(),
            next_handle: 1,
            frame: None,
            clear: Rgba::BLACK,
            view: ViewMatrices::default(),
            fog: Fog::default(),
            lighting: Lighting::default(),
            matrices: MatrixStack::new(),
            draws: Vec::with_capacity(MAX_DRAWS),
            draw_uniforms: Vec::with_capacity(MAX_DRAWS),
            timeline: SyncTimeline::new(),
        };
        let white = backend.upload_texture("white", 1, 1, &[0xFF; 4]);
        backend.textures.insert(WHITE, white);
        backend
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Self::create_depth_texture(&self.device, self.config.width, self.config.height);
        tracing::debug!(
            width = self.config.width,
            height = self.config.height,
            "surface resized"
        );
    }

    fn upload_texture(
        &self,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> wgpu::TextureView {
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba,
        );
        texture.create_view(&Default::default())
    }

    fn texture_bind_group(&mut self, pair: (TextureHandle, TextureHandle)) {
        if self.texture_bind_groups.contains_key(&pair) {
            return;
        }
        let (Some(a), Some(b)) = (self.textures.get(&pair.0), self.textures.get(&pair.1)) else {
            return;
        };
        let group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tile_bind_group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(a),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(b),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.texture_bind_groups.insert(pair, group);
    }

    /// Encode and submit the collected draws into the active frame, if any.
    fn submit_frame(&mut self) {
        let Some(frame) = &self.frame else {
            self.queue.submit(std::iter::empty());
            return;
        };

        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals::new(&self.view, &self.fog, &self.lighting)),
        );
        if !self.draw_uniforms.is_empty() {
            self.queue
                .write_buffer(&self.draw_buffer, 0, bytemuck::cast_slice(&self.draw_uniforms));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("water_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(self.clear)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (i, draw) in self.draws.iter().enumerate() {
                let (Some(mesh), Some(textures)) = (
                    self.meshes.get(&draw.mesh),
                    self.texture_bind_groups.get(&draw.textures),
                ) else {
                    continue;
                };
                if mesh.index_count == 0 {
                    continue;
                }
                let offset = (i as u64 * DRAW_STRIDE) as u32;
                pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                pass.set_bind_group(2, textures, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    fn alloc_handle(&mut self) -> u32 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }
}

impl VertexUpload for WgpuBackend {
    fn upload_vertices(&mut self, mesh: MeshHandle, vertices: &[Vertex]) {
        match self.meshes.get(&mesh) {
            Some(gpu) if gpu.vertex_count == vertices.len() => {
                self.queue
                    .write_buffer(&gpu.vertex_buffer, 0, bytemuck::cast_slice(vertices));
            }
            Some(gpu) => tracing::warn!(
                mesh = mesh.0,
                expected = gpu.vertex_count,
                got = vertices.len(),
                "vertex upload size mismatch; ignored"
            ),
            None => tracing::warn!(mesh = mesh.0, "upload to unknown mesh"),
        }
    }
}

impl GraphicsBackend for WgpuBackend {
    fn create_texture(&mut self, texture: &TextureDef) -> Result<TextureHandle, RenderError> {
        let limit = self.device.limits().max_texture_dimension_2d;
        if texture.width > limit || texture.height > limit {
            return Err(RenderError::Backend(format!(
                "texture {} is {}x{}, device limit is {limit}",
                texture.name, texture.width, texture.height
            )));
        }
        let view = self.upload_texture(&texture.name, texture.width, texture.height, &texture.rgba);
        let handle = TextureHandle(self.alloc_handle());
        self.textures.insert(handle, view);
        tracing::debug!(name = %texture.name, handle = handle.0, "texture created");
        Ok(handle)
    }

    fn create_mesh(&mut self, mesh: &MeshDef) -> Result<MeshHandle, RenderError> {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&mesh.name),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&mesh.name),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let handle = MeshHandle(self.alloc_handle());
        self.meshes.insert(
            handle,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                vertex_count: mesh.vertices.len(),
                index_count: mesh.indices.len() as u32,
            },
        );
        Ok(handle)
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if texture == WHITE {
            return;
        }
        self.textures.remove(&texture);
        self.texture_bind_groups
            .retain(|(a, b), _| *a != texture && *b != texture);
    }

    fn release_mesh(&mut self, mesh: MeshHandle) {
        if let Some(gpu) = self.meshes.remove(&mesh) {
            gpu.vertex_buffer.destroy();
            gpu.index_buffer.destroy();
        }
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn begin_frame(&mut self) {
        self.matrices.reset();
        self.draws.clear();
        self.draw_uniforms.clear();
        self.frame = match self.surface.get_current_texture() {
            Ok(output) => {
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Some(ActiveFrame { output, view })
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                tracing::debug!("surface reconfigured; frame skipped");
                None
            }
            Err(e) => {
                tracing::warn!("surface error: {e}; frame skipped");
                None
            }
        };
    }

    fn clear(&mut self, color: Rgba) {
        self.clear = color;
    }

    fn set_view(&mut self, view: &ViewMatrices) {
        self.view = *view;
    }

    fn set_fog(&mut self, fog: &Fog) {
        self.fog = *fog;
    }

    fn set_lighting(&mut self, lighting: &Lighting) {
        self.lighting = *lighting;
    }

    fn push_matrix(&mut self, matrix: &Mat4) {
        if !self.matrices.push(matrix) {
            tracing::warn!("matrix stack overflow");
        }
    }

    fn pop_matrix(&mut self, count: usize) {
        if !self.matrices.pop(count) {
            tracing::warn!(count, "matrix stack underflow");
        }
    }

    fn draw_mesh(&mut self, mesh: MeshHandle, tiles: &[TileState]) {
        if self.draws.len() == MAX_DRAWS {
            tracing::warn!(mesh = mesh.0, "draw limit reached; draw dropped");
            return;
        }
        let tiles = shader_tiles(tiles);
        let pair = (tiles[0].texture, tiles[1].texture);
        self.texture_bind_group(pair);
        self.draw_uniforms
            .push(DrawUniforms::new(&self.matrices.top(), &tiles));
        self.draws.push(DrawCall {
            mesh,
            textures: pair,
        });
    }

    fn sync_point(&mut self) -> SyncPoint {
        self.submit_frame();
        let point = self.timeline.issue();
        let done = self.timeline.completer();
        self.queue
            .on_submitted_work_done(move || done.complete(point));
        point
    }

    fn sync_point_reached(&self, point: SyncPoint) -> bool {
        if !self.timeline.reached(point) {
            let _ = self.device.poll(wgpu::Maintain::Poll);
        }
        self.timeline.reached(point)
    }

    fn present(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.output.present();
        }
    }
}
