use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tidewater_assets::WATER_MESH;
use tidewater_common::Rgba;
use tidewater_kernel::{ClockRates, TileScroll, WaveParams};
use tidewater_render::{Camera, Fog, Lighting, MAX_LIGHTS};

/// Errors from loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One directional light as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    pub color: Rgba,
    /// Direction toward the light; normalized when applied.
    pub direction: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient: Rgba,
    pub directional: Vec<LightConfig>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: Rgba::from_packed(0x2211_22FF),
            directional: vec![LightConfig {
                color: Rgba::from_packed(0x8888_88FF),
                direction: Vec3::new(-1.0, 1.0, 1.0),
            }],
        }
    }
}

impl LightingConfig {
    pub fn to_lighting(&self) -> Lighting {
        let mut lighting = Lighting::default();
        lighting.set_ambient(self.ambient);
        for (i, light) in self.directional.iter().enumerate() {
            lighting.set_directional(i, light.color, light.direction);
        }
        lighting.set_count(self.directional.len());
        lighting
    }
}

/// Which mesh to animate and how it is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    /// Asset store name of the mesh. Its material names the tile textures.
    pub mesh: String,
    /// Uniform model scale pushed by the display list.
    pub scale: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            mesh: WATER_MESH.to_string(),
            scale: 0.12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Seconds per `fixed_loop` step.
    pub fixed_step: f32,
    /// Cap on fixed steps per frame; the backlog beyond it is dropped.
    pub max_steps_per_frame: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            fixed_step: 1.0 / 30.0,
            max_steps_per_frame: 8,
        }
    }
}

/// Everything tunable about the water scene.
///
/// Every section is optional in YAML; missing sections and fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub clock: ClockRates,
    pub wave: WaveParams,
    pub scroll: TileScroll,
    pub camera: Camera,
    pub lighting: LightingConfig,
    pub fog: Fog,
    pub clear_color: Rgba,
    pub water: WaterConfig,
    pub host: HostConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clock: ClockRates::default(),
            wave: WaveParams::default(),
            scroll: TileScroll::default(),
            camera: Camera::default(),
            lighting: LightingConfig::default(),
            fog: Fog::default(),
            clear_color: Rgba::from_packed(0x2255_66FF),
            water: WaterConfig::default(),
            host: HostConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), "scene config loaded");
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if !(self.water.scale.is_finite() && self.water.scale > 0.0) {
            return invalid(format!("water.scale must be positive, got {}", self.water.scale));
        }
        if !(self.scroll.period >= 0.0) {
            return invalid(format!(
                "scroll.period must be non-negative, got {}",
                self.scroll.period
            ));
        }
        if self.lighting.directional.len() > MAX_LIGHTS {
            return invalid(format!(
                "{} directional lights, at most {MAX_LIGHTS} supported",
                self.lighting.directional.len()
            ));
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return invalid(format!(
                "camera range {}..{} is empty",
                self.camera.near, self.camera.far
            ));
        }
        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return invalid(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                self.camera.fov_degrees
            ));
        }
        if !(self.host.fixed_step > 0.0) {
            return invalid(format!(
                "host.fixed_step must be positive, got {}",
                self.host.fixed_step
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewater_kernel::TileSelection;

    #[test]
    fn empty_document_gives_defaults() {
        let config = SceneConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.clear_color, Rgba::new(0x22, 0x55, 0x66, 0xFF));
        assert_eq!(config.water.scale, 0.12);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let yaml = "
clock:
  scroll: 10.0
scroll:
  tiles: !only 1
water:
  mesh: lake
";
        let config = SceneConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.clock.scroll, 10.0);
        assert_eq!(config.clock.wave, 0.2);
        assert_eq!(config.scroll.tiles, TileSelection::Only(1));
        assert_eq!(config.scroll.period, 32.0);
        assert_eq!(config.water.mesh, "lake");
        assert_eq!(config.water.scale, 0.12);
    }

    #[test]
    fn default_lighting_matches_scene() {
        let lighting = SceneConfig::default().lighting.to_lighting();
        assert_eq!(lighting.ambient, Rgba::new(0x22, 0x11, 0x22, 0xFF));
        assert_eq!(lighting.lights().len(), 1);
        let light = lighting.lights()[0];
        assert_eq!(light.color, Rgba::gray(0x88));
        assert!((light.direction - Vec3::new(-1.0, 1.0, 1.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            SceneConfig::from_yaml_str("water: { scale: 0 }"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SceneConfig::from_yaml_str("host: { fixed_step: -1 }"),
            Err(ConfigError::Invalid(_))
        ));
        for fov in ["0", "180", "270", "-45"] {
            let yaml = format!("camera: {{ fov_degrees: {fov} }}");
            assert!(
                matches!(SceneConfig::from_yaml_str(&yaml), Err(ConfigError::Invalid(_))),
                "fov {fov} accepted"
            );
        }
        assert!(SceneConfig::from_yaml_str("camera: { fov_degrees: 179.5 }").is_ok());
        assert!(matches!(
            SceneConfig::from_yaml_str("clock: [1, 2"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn yaml_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        let mut config = SceneConfig::default();
        config.fog.enabled = false;
        std::fs::write(&path, config.to_yaml_string().unwrap()).unwrap();

        let loaded = SceneConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(
            SceneConfig::load_or_default(None).unwrap(),
            SceneConfig::default()
        );
    }
}
