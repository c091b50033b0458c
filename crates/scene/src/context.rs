use std::sync::Arc;
use tidewater_assets::{MeshDef, MeshInstance};
use tidewater_common::Rgba;
use tidewater_kernel::{DeformStats, SimClock};
use tidewater_render::{Camera, Fog, Lighting, SyncPoint};

use crate::config::SceneConfig;

/// Counters kept across frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames presented.
    pub frames: u64,
    /// Frames that started before the previous frame's sync point was reached.
    pub gpu_behind_frames: u64,
    pub last_deform: DeformStats,
}

/// Mutable state of one running scene, written by the frame pipeline only.
#[derive(Debug)]
pub struct FrameContext {
    pub clock: SimClock,
    pub mesh: MeshInstance,
    pub camera: Camera,
    pub clear_color: Rgba,
    pub fog: Fog,
    pub lighting: Lighting,
    /// Sync point issued by the previous frame.
    pub last_sync: Option<SyncPoint>,
    pub stats: FrameStats,
}

impl FrameContext {
    pub fn new(config: &SceneConfig, mesh: Arc<MeshDef>) -> Self {
        Self {
            clock: SimClock::new(config.clock),
            mesh: MeshInstance::new(mesh),
            camera: config.camera,
            clear_color: config.clear_color,
            fog: config.fog,
            lighting: config.lighting.to_lighting(),
            last_sync: None,
            stats: FrameStats::default(),
        }
    }
}
