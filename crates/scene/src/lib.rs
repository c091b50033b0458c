//! Scene: configuration, the per-frame water pipeline and the minigame host.
//!
//! # Invariants
//! - The display list is recorded once in [`WaterScene::init`] and only
//!   replayed afterwards.
//! - Within a frame the mesh is deformed and uploaded before the display
//!   list is replayed; the sync point follows the last draw and precedes
//!   the present.
//! - A frame never blocks on the GPU and never fails; startup failures are
//!   returned from `init`.

pub mod config;
pub mod context;
pub mod host;
pub mod scene;

pub use config::{ConfigError, HostConfig, LightConfig, LightingConfig, SceneConfig, WaterConfig};
pub use context::{FrameContext, FrameStats};
pub use host::{Host, Minigame};
pub use scene::WaterScene;

use tidewater_assets::AssetError;
use tidewater_render::RenderError;

/// Errors that stop a scene from starting.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

pub fn crate_info() -> &'static str {
    "tidewater-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
