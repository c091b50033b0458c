use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tidewater_assets::{AssetStore, WATER_MESH};
use tidewater_kernel::WaveField;
use tidewater_render::RecordingBackend;
use tidewater_scene::{Host, SceneConfig, WaterScene};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tidewater-cli", about = "CLI tool for tidewater water scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (YAML); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Asset registry (JSON); the built-in water assets are used when omitted
    #[arg(short, long, global = true)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and the effective config
    Info,
    /// Run the scene headless and report frame statistics
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
        /// Presents before a sync point is reached
        #[arg(long, default_value = "0")]
        latency: u64,
        /// Surface size as WIDTHxHEIGHT
        #[arg(long, default_value = "320x240", value_parser = parse_size)]
        size: (u32, u32),
        /// Print the last frame's command summary
        #[arg(long)]
        describe: bool,
    },
    /// Evaluate the wave field at one point
    Probe {
        #[arg(short, default_value = "0", allow_negative_numbers = true)]
        x: f32,
        #[arg(short, default_value = "0", allow_negative_numbers = true)]
        z: f32,
        /// Wave phase
        #[arg(short, default_value = "0", allow_negative_numbers = true)]
        t: f32,
    },
    /// Print tile translations for a scroll offset
    Scroll {
        #[arg(allow_negative_numbers = true)]
        offset: f32,
    },
    /// Write a mesh from the asset store to a JSON file
    ExportMesh {
        /// Output path
        out: PathBuf,
        /// Mesh name
        #[arg(long, default_value = WATER_MESH)]
        name: String,
    },
    /// Check that the config and assets start a scene
    Validate,
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s}"))?;
    let w = w.parse().map_err(|e| format!("bad width: {e}"))?;
    let h = h.parse().map_err(|e| format!("bad height: {e}"))?;
    Ok((w, h))
}

fn load_assets(path: Option<&Path>) -> anyhow::Result<AssetStore> {
    match path {
        Some(path) => AssetStore::load(path)
            .with_context(|| format!("loading asset registry {}", path.display())),
        None => Ok(AssetStore::with_water()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = SceneConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("tidewater-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: {}", tidewater_kernel::crate_info());
            println!("assets: {}", tidewater_assets::crate_info());
            println!("render: {}", tidewater_render::crate_info());
            println!("scene: {}", tidewater_scene::crate_info());
            println!("---");
            print!("{}", config.to_yaml_string()?);
        }
        Commands::Simulate {
            frames,
            dt,
            latency,
            size: (width, height),
            describe,
        } => {
            let assets = load_assets(cli.assets.as_deref())?;
            let backend = RecordingBackend::new(width, height).with_latency(latency);
            let scene = WaterScene::init(&config, &assets, backend)?;
            let mut host = Host::new(scene, config.host);
            for _ in 0..frames {
                host.tick(dt);
            }

            let scene = host.game();
            let stats = scene.stats();
            let frame = scene.backend().last_frame();
            let rates = scene.context().clock.rates();
            let wave = scene.mutator().field().params();
            tracing::info!(
                frames = stats.frames,
                scroll_rate = rates.scroll,
                wave_rate = rates.wave,
                amplitude = wave.amplitude,
                "simulation finished"
            );
            println!(
                "frames={} fixed_steps={} gpu_behind={}",
                stats.frames,
                host.fixed_steps(),
                stats.gpu_behind_frames
            );
            println!(
                "clock: scroll={:.3} phase={:.4}",
                scene.context().clock.scroll_offset(),
                scene.context().clock.wave_phase()
            );
            println!(
                "deform: vertices={} y=[{}, {}]",
                stats.last_deform.vertices, stats.last_deform.min_y, stats.last_deform.max_y
            );
            println!("draw digest: {:#018x}", frame.draw_digest());
            if describe {
                print!("{}", scene.backend().describe_last_frame());
            }
            host.shutdown();
        }
        Commands::Probe { x, z, t } => {
            let field = WaveField::new(config.wave);
            let sample = field.sample(x, z, t);
            let color = sample.color();
            let params = field.params();
            println!(
                "params: k_x={} k_z={} amplitude={} global_amplitude={}",
                params.k_x, params.k_z, params.amplitude, params.global_amplitude
            );
            println!("global={:.4}", field.global_height(t));
            println!("local={:.4}", sample.local_height);
            println!(
                "displacement={:.4} (fixed {})",
                sample.displacement,
                sample.height_fixed()
            );
            println!("shade={:.4} rgb=({}, {}, {})", sample.shade, color.r(), color.g(), color.b());
        }
        Commands::Scroll { offset } => {
            let uv = config.scroll.translate(offset);
            println!(
                "offset={offset} s={:.4} t={:.4} (periods s={:.1} t={:.1}, tiles={:?})",
                uv.s,
                uv.t,
                config.scroll.s_period(),
                config.scroll.t_period(),
                config.scroll.tiles
            );
        }
        Commands::ExportMesh { out, name } => {
            let assets = load_assets(cli.assets.as_deref())?;
            assets
                .export_mesh(&name, &out)
                .with_context(|| format!("exporting {name}"))?;
            println!("wrote {name} to {}", out.display());
        }
        Commands::Validate => {
            let assets = load_assets(cli.assets.as_deref())?;
            let mut scene = WaterScene::init(&config, &assets, RecordingBackend::new(320, 240))?;
            scene.frame(0.0);
            let frame = scene.backend().last_frame();
            println!(
                "OK: mesh '{}' with {} vertices, {} draw(s) per frame",
                config.water.mesh,
                scene.mesh().vertex_count(),
                frame.draws.len()
            );
            scene.cleanup();
        }
    }

    Ok(())
}
