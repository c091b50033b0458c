use serde::{Deserialize, Serialize};

/// Which texture tiles of a draw the scroll policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSelection {
    /// Every tile of the draw.
    #[default]
    All,
    /// A single tile index. Others keep their recorded translation.
    Only(u8),
}

impl TileSelection {
    pub fn contains(self, tile: u8) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == tile,
        }
    }
}

/// UV translation in texels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UvTranslate {
    pub s: f32,
    pub t: f32,
}

/// Maps the scroll offset to a per-tile UV translation, wrapped to the tile period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileScroll {
    pub s_ratio: f32,
    pub t_ratio: f32,
    /// Texture tile size in texels; translations wrap at this value.
    pub period: f32,
    pub tiles: TileSelection,
}

impl Default for TileScroll {
    fn default() -> Self {
        Self {
            s_ratio: 0.5,
            t_ratio: 0.8,
            period: 32.0,
            tiles: TileSelection::All,
        }
    }
}

impl TileScroll {
    pub fn translate(&self, offset: f32) -> UvTranslate {
        UvTranslate {
            s: wrap(offset * self.s_ratio, self.period),
            t: wrap(offset * self.t_ratio, self.period),
        }
    }

    /// Offset distance after which the s translation repeats.
    pub fn s_period(&self) -> f32 {
        self.period / self.s_ratio
    }

    /// Offset distance after which the t translation repeats.
    pub fn t_period(&self) -> f32 {
        self.period / self.t_ratio
    }
}

// Euclidean remainder; equals fmod for the non-negative offsets the clock produces.
fn wrap(value: f32, period: f32) -> f32 {
    if period > 0.0 {
        value.rem_euclid(period)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_offset_is_untranslated() {
        let p = TileScroll::default();
        assert_eq!(p.translate(0.0), UvTranslate { s: 0.0, t: 0.0 });
    }

    #[test]
    fn offset_64_wraps_s_exactly() {
        let p = TileScroll::default();
        assert_eq!(p.translate(64.0).s, p.translate(0.0).s);
        // t has its own period (40 here), so 64 lands mid-tile.
        assert!((p.translate(64.0).t - 19.2).abs() < 1e-4);
    }

    #[test]
    fn s_channel_is_periodic() {
        let p = TileScroll::default();
        assert_eq!(p.s_period(), 64.0);
        for i in 0..200 {
            let offset = i as f32 * 0.25;
            assert_eq!(p.translate(offset + p.s_period()).s, p.translate(offset).s);
        }
    }

    #[test]
    fn t_channel_is_periodic() {
        let p = TileScroll::default();
        for i in 0..200 {
            let offset = i as f32 * 0.25;
            let a = p.translate(offset).t;
            let b = p.translate(offset + p.t_period()).t;
            // Either equal, or straddling the wrap seam.
            let d = (a - b).abs();
            assert!(d < 1e-3 || (p.period - d) < 1e-3, "offset={offset} a={a} b={b}");
        }
    }

    #[test]
    fn translations_stay_inside_period() {
        let p = TileScroll::default();
        for i in 0..5000 {
            let uv = p.translate(i as f32 * 1.37);
            assert!((0.0..32.0).contains(&uv.s));
            assert!((0.0..32.0).contains(&uv.t));
        }
    }

    #[test]
    fn translate_is_repeatable() {
        let p = TileScroll::default();
        let a = p.translate(123.456);
        let b = p.translate(123.456);
        assert_eq!(a.s.to_bits(), b.s.to_bits());
        assert_eq!(a.t.to_bits(), b.t.to_bits());
    }

    #[test]
    fn tile_selection() {
        assert!(TileSelection::All.contains(0));
        assert!(TileSelection::All.contains(7));
        assert!(TileSelection::Only(1).contains(1));
        assert!(!TileSelection::Only(1).contains(0));
    }
}
