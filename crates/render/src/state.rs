use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use tidewater_common::Rgba;

/// Most directional lights a frame can enable.
pub const MAX_LIGHTS: usize = 4;

/// One directional light. `direction` points toward the light and is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Rgba,
    pub direction: Vec3,
}

impl DirectionalLight {
    const OFF: Self = Self {
        color: Rgba::BLACK,
        direction: Vec3::Y,
    };
}

/// Ambient color plus up to [`MAX_LIGHTS`] directional lights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: Rgba,
    lights: [DirectionalLight; MAX_LIGHTS],
    count: usize,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: Rgba::BLACK,
            lights: [DirectionalLight::OFF; MAX_LIGHTS],
            count: 0,
        }
    }
}

impl Lighting {
    pub fn set_ambient(&mut self, color: Rgba) {
        self.ambient = color;
    }

    /// Set light `index`, normalizing `direction`. Out-of-range indices are ignored.
    pub fn set_directional(&mut self, index: usize, color: Rgba, direction: Vec3) {
        if let Some(slot) = self.lights.get_mut(index) {
            *slot = DirectionalLight {
                color,
                direction: direction.normalize_or(Vec3::Y),
            };
        }
    }

    /// Number of enabled lights, clamped to [`MAX_LIGHTS`].
    pub fn set_count(&mut self, count: usize) {
        self.count = count.min(MAX_LIGHTS);
    }

    pub fn lights(&self) -> &[DirectionalLight] {
        &self.lights[..self.count]
    }
}

/// Linear depth fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fog {
    pub enabled: bool,
    pub color: Rgba,
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Rgba::new(20, 80, 140, 0xFF),
            near: 0.4,
            far: 120.0,
        }
    }
}

/// Camera matrices for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewMatrices {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for ViewMatrices {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

impl ViewMatrices {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_light_is_normalized() {
        let mut l = Lighting::default();
        l.set_directional(0, Rgba::gray(0x88), Vec3::new(-1.0, 1.0, 1.0));
        l.set_count(1);
        let d = l.lights()[0].direction;
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!(d.x < 0.0 && d.y > 0.0 && d.z > 0.0);
    }

    #[test]
    fn light_count_is_clamped() {
        let mut l = Lighting::default();
        l.set_count(99);
        assert_eq!(l.lights().len(), MAX_LIGHTS);
        l.set_directional(MAX_LIGHTS, Rgba::WHITE, Vec3::X);
        assert!(l.lights().iter().all(|light| light.color == Rgba::BLACK));
    }
}
