use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tidewater_assets::AssetStore;
use tidewater_render_wgpu::WgpuBackend;
use tidewater_scene::{Host, SceneConfig, WaterScene};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Native resolution of the scene.
const BASE_SIZE: (u32, u32) = (320, 240);

#[derive(Parser)]
#[command(name = "tidewater-desktop", about = "Tidewater water scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Asset registry (JSON); the built-in water assets are used when omitted
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Window size as a multiple of 320x240
    #[arg(long, default_value = "3")]
    scale: u32,
}

type Game = Host<WaterScene<WgpuBackend>>;

struct App {
    config: SceneConfig,
    assets: AssetStore,
    scale: u32,
    window: Option<Arc<Window>>,
    game: Option<Game>,
    last_frame: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: SceneConfig, assets: AssetStore, scale: u32) -> Self {
        Self {
            config,
            assets,
            scale: scale.max(1),
            window: None,
            game: None,
            last_frame: Instant::now(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Tidewater")
            .with_inner_size(PhysicalSize::new(
                BASE_SIZE.0 * self.scale,
                BASE_SIZE.1 * self.scale,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let size = window.inner_size();
        let backend = pollster::block_on(WgpuBackend::request(
            &instance,
            surface,
            size.width,
            size.height,
        ))?;
        let scene = WaterScene::init(&self.config, &self.assets, backend)?;

        self.game = Some(Host::new(scene, self.config.host));
        self.window = Some(window);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut game) = self.game.take() {
            game.shutdown();
            let stats = game.game().stats();
            tracing::info!(
                frames = stats.frames,
                gpu_behind = stats.gpu_behind_frames,
                "scene finished"
            );
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                if let Some(game) = &mut self.game {
                    game.game_mut()
                        .backend_mut()
                        .resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame).as_secs_f32().min(0.1);
                self.last_frame = now;

                if let Some(game) = &mut self.game {
                    game.tick(dt);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("tidewater-desktop starting");

    let config = SceneConfig::load_or_default(cli.config.as_deref())?;
    let assets = match &cli.assets {
        Some(path) => AssetStore::load(path)
            .with_context(|| format!("loading asset registry {}", path.display()))?,
        None => AssetStore::with_water(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, assets, cli.scale);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
