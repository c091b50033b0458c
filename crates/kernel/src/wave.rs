use serde::{Deserialize, Serialize};
use tidewater_common::Rgba;

/// Constants of the analytic wave field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    /// Phase multiplier of the local term.
    pub local_rate: f32,
    /// Spatial frequency along x, per fixed-point model unit.
    pub k_x: f32,
    /// Spatial frequency along z, per fixed-point model unit.
    pub k_z: f32,
    /// Scale of the local term.
    pub amplitude: f32,
    /// Phase multiplier of the uniform breathing term.
    pub global_rate: f32,
    /// Peak of the uniform breathing term.
    pub global_amplitude: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            local_rate: 4.5,
            k_x: 300.1,
            k_z: 200.1,
            amplitude: 50.0,
            global_rate: 2.5,
            global_amplitude: 30.0,
        }
    }
}

/// Result of evaluating the field at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSample {
    /// `sin` of the local term, in `-1..=1`.
    pub local_height: f32,
    /// Vertical offset in model units.
    pub displacement: f32,
    /// Brightness in `0..=1`.
    pub shade: f32,
}

impl WaveSample {
    /// Displacement truncated toward zero, saturating at the `i16` range.
    pub fn height_fixed(&self) -> i16 {
        self.displacement as i16
    }

    /// Shade quantized to an opaque gray.
    pub fn color(&self) -> Rgba {
        Rgba::gray((self.shade * 255.0) as u8)
    }
}

/// Pure function from (reference x, reference z, phase) to height and shade.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveField {
    params: WaveParams,
}

impl WaveField {
    pub fn new(params: WaveParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    /// The breathing term shared by every vertex at phase `t`.
    pub fn global_height(&self, t: f32) -> f32 {
        (t * self.params.global_rate).sin() * self.params.global_amplitude
    }

    pub fn sample(&self, x: f32, z: f32, t: f32) -> WaveSample {
        self.sample_with_global(x, z, t, self.global_height(t))
    }

    /// Same as [`sample`](Self::sample) with the global term precomputed once per pass.
    pub fn sample_with_global(&self, x: f32, z: f32, t: f32, global: f32) -> WaveSample {
        let p = &self.params;
        let local_height = (t * p.local_rate + x * p.k_x + z * p.k_z).sin();
        WaveSample {
            local_height,
            displacement: p.amplitude * local_height + global,
            shade: (local_height * 0.25 + 0.75).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn origin_at_phase_zero_is_flat_mid_gray() {
        let field = WaveField::default();
        let s = field.sample(0.0, 0.0, 0.0);
        assert_eq!(s.displacement, 0.0);
        assert_eq!(s.shade, 0.75);
        assert_eq!(s.height_fixed(), 0);
        assert_eq!(s.color(), Rgba::gray(191));
    }

    #[test]
    fn global_term_peaks_for_every_vertex() {
        let field = WaveField::default();
        // sin(2.5 * t) == 1
        let t = PI / 5.0;
        assert!((field.global_height(t) - 30.0).abs() < 1e-4);
        for &(x, z) in &[(0.0, 0.0), (12.0, -7.0), (-300.0, 250.0), (1.0, 1.0)] {
            let s = field.sample(x, z, t);
            let global = s.displacement - 50.0 * s.local_height;
            assert!((global - 30.0).abs() < 1e-3, "x={x} z={z} global={global}");
        }
    }

    #[test]
    fn sample_is_bit_identical_for_identical_inputs() {
        let field = WaveField::default();
        for i in 0..64 {
            let (x, z, t) = (i as f32 * 3.0 - 90.0, i as f32 * -5.0, i as f32 * 0.137);
            let a = field.sample(x, z, t);
            let b = field.sample(x, z, t);
            assert_eq!(a.displacement.to_bits(), b.displacement.to_bits());
            assert_eq!(a.shade.to_bits(), b.shade.to_bits());
        }
    }

    #[test]
    fn shade_stays_quantizable() {
        let field = WaveField::default();
        for i in 0..2000 {
            let t = i as f32 * 0.731 - 300.0;
            let s = field.sample((i % 40) as f32, (i % 17) as f32, t);
            assert!((0.0..=1.0).contains(&s.shade));
            let scaled = s.shade * 255.0;
            assert!((0.0..=255.0).contains(&scaled));
        }
    }

    #[test]
    fn shade_tracks_crest_and_trough() {
        let field = WaveField::default();
        // local term = sin(4.5 t) at the origin
        let crest = field.sample(0.0, 0.0, PI / 9.0);
        let trough = field.sample(0.0, 0.0, PI / 3.0);
        assert!((crest.local_height - 1.0).abs() < 1e-5);
        assert!((trough.local_height + 1.0).abs() < 1e-5);
        assert_eq!(crest.color(), Rgba::gray(255));
        assert_eq!(trough.color(), Rgba::gray(127));
    }

    #[test]
    fn height_fixed_truncates_toward_zero() {
        let s = WaveSample {
            local_height: 0.0,
            displacement: -12.9,
            shade: 0.5,
        };
        assert_eq!(s.height_fixed(), -12);
    }
}
