//! Colors and palettes for chart layouts
//!
//! Provides:
//! - [`Color`]: RGBA with hex conversion, interpolation and mixing
//! - [`Colormap`]: a continuous map from [0, 1] to colors (cividis built in)
//! - [`Palette`]: a fixed-size ordered lookup table indexed linearly
//! - [`distinct_colors`]: evenly spaced hues for categorical series

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::placement::SeededRng;

/// A color in RGBA format (0.0 to 1.0)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#RRGGBB` or `RRGGBB`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(|v| v as f32 / 255.0);
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `#RRGGBB`, alpha dropped
    pub fn to_hex(&self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", byte(self.r), byte(self.g), byte(self.b))
    }

    /// Linear interpolation between two colors
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }

    /// Channel-wise average of two colors
    pub fn mix(a: &Color, b: &Color) -> Color {
        Color::lerp(a, b, 0.5)
    }

    /// Multiply the RGB channels by `factor`, keeping alpha
    pub fn scaled(&self, factor: f32) -> Color {
        Color {
            r: (self.r * factor).clamp(0.0, 1.0),
            g: (self.g * factor).clamp(0.0, 1.0),
            b: (self.b * factor).clamp(0.0, 1.0),
            a: self.a,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0.5, 0.5, 0.5)
    }
}

/// A continuous colormap over [0, 1]
#[derive(Clone, Debug)]
pub struct Colormap {
    pub name: String,
    /// Color stops (positions from 0.0 to 1.0)
    stops: Vec<(f32, Color)>,
}

impl Colormap {
    /// Colormap from evenly spaced colors
    pub fn from_colors(name: impl Into<String>, colors: Vec<Color>) -> Self {
        let n = colors.len();
        let stops = colors
            .into_iter()
            .enumerate()
            .map(|(i, c)| (i as f32 / n.saturating_sub(1).max(1) as f32, c))
            .collect();
        Self {
            name: name.into(),
            stops,
        }
    }

    /// Sample the colormap at `t` (clamped to [0, 1])
    pub fn sample(&self, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        match self.stops.as_slice() {
            [] => Color::default(),
            [(_, only)] => *only,
            stops => stops
                .windows(2)
                .find(|w| t >= w[0].0 && t <= w[1].0)
                .map(|w| {
                    let (t0, c0) = w[0];
                    let (t1, c1) = w[1];
                    Color::lerp(&c0, &c1, (t - t0) / (t1 - t0))
                })
                .unwrap_or(stops[stops.len() - 1].1),
        }
    }

    /// `size` evenly spaced samples, first and last at the ends of the map
    pub fn lut(&self, size: usize) -> Vec<Color> {
        (0..size)
            .map(|i| self.sample(i as f32 / size.saturating_sub(1).max(1) as f32))
            .collect()
    }
}

/// Cividis: perceptually uniform and readable with color vision deficiency
pub fn cividis() -> Colormap {
    const STOPS: [&str; 11] = [
        "#00204D", "#00306F", "#2A406C", "#48526B", "#5E626E", "#727374", "#878479", "#9E9677",
        "#B6A971", "#D0BE67", "#FFEA46",
    ];
    Colormap::from_colors(
        "cividis",
        STOPS.iter().filter_map(|h| Color::from_hex(h)).collect(),
    )
}

/// Fixed-size ordered list of colors
///
/// Serializes as a bare array of colors. Deserializing goes through
/// [`Palette::new`], so fewer than two colors is an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Color>", into = "Vec<Color>")]
pub struct Palette {
    colors: Vec<Color>,
}

impl TryFrom<Vec<Color>> for Palette {
    type Error = LayoutError;

    fn try_from(colors: Vec<Color>) -> Result<Self, Self::Error> {
        Palette::new(colors)
    }
}

impl From<Palette> for Vec<Color> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}

impl Palette {
    /// Palette from explicit colors; needs at least two
    pub fn new(colors: Vec<Color>) -> LayoutResult<Self> {
        if colors.len() < 2 {
            return Err(LayoutError::PaletteTooSmall { size: colors.len() });
        }
        Ok(Self { colors })
    }

    /// Quantize a colormap into `size` entries
    pub fn from_colormap(colormap: &Colormap, size: usize) -> LayoutResult<Self> {
        Self::new(colormap.lut(size))
    }

    /// The 256-entry cividis palette
    pub fn cividis256() -> Self {
        Self {
            colors: cividis().lut(256),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Color> {
        self.colors.get(index)
    }

    /// Linear index for a relative value: `floor(t * (len - 1))`, t clamped to [0, 1]
    pub fn index_for(&self, t: f64) -> usize {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let last = self.colors.len().saturating_sub(1);
        ((t * last as f64).floor() as usize).min(last)
    }

    pub fn color_for(&self, t: f64) -> Color {
        self.colors.get(self.index_for(t)).copied().unwrap_or_default()
    }
}

/// Convert hue, lightness, saturation (all in [0, 1]) to RGB
pub fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    (
        hue_channel(m1, m2, h + 1.0 / 3.0),
        hue_channel(m1, m2, h),
        hue_channel(m1, m2, h - 1.0 / 3.0),
    )
}

fn hue_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

/// `n` colors with evenly spaced hues
///
/// Lightness is drawn from 50-60% and saturation from 90-100% so
/// neighbouring series stay distinguishable.
pub fn distinct_colors(n: usize, seed: u64) -> Vec<Color> {
    let mut rng = SeededRng::new(seed);
    (0..n)
        .map(|i| {
            let hue = i as f64 / n as f64;
            let lightness = 0.5 + 0.1 * rng.next_f64();
            let saturation = 0.9 + 0.1 * rng.next_f64();
            let (r, g, b) = hls_to_rgb(hue, lightness, saturation);
            Color::rgb(r as f32, g as f32, b as f32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let c = Color::from_hex("#FF8000").unwrap();
        assert_eq!(c.to_hex(), "#FF8000");
        assert!(Color::from_hex("12345").is_none());
        assert!(Color::from_hex("GG0000").is_none());
    }

    #[test]
    fn test_mix_and_scale() {
        let red = Color::rgb(1.0, 0.0, 0.0);
        let blue = Color::rgb(0.0, 0.0, 1.0);
        let purple = Color::mix(&red, &blue);
        assert_eq!(purple, Color::rgb(0.5, 0.0, 0.5));
        assert_eq!(Color::rgb(1.0, 1.0, 1.0).scaled(0.5), Color::rgb(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_cividis_endpoints() {
        let cmap = cividis();
        assert_eq!(cmap.sample(0.0).to_hex(), "#00204D");
        assert_eq!(cmap.sample(1.0).to_hex(), "#FFEA46");
    }

    #[test]
    fn test_palette_indexing() {
        let palette = Palette::cividis256();
        assert_eq!(palette.len(), 256);
        assert_eq!(palette.index_for(0.0), 0);
        assert_eq!(palette.index_for(1.0), 255);
        assert_eq!(palette.index_for(0.5), 127);
        assert_eq!(palette.index_for(7.0), 255);
        assert_eq!(palette.index_for(f64::NAN), 0);
    }

    #[test]
    fn test_palette_too_small() {
        assert_eq!(
            Palette::new(vec![Color::default()]),
            Err(LayoutError::PaletteTooSmall { size: 1 })
        );
    }

    #[test]
    fn test_palette_serde_checks_size() {
        let two = Palette::new(vec![Color::rgb(0.0, 0.0, 0.0), Color::rgb(1.0, 1.0, 1.0)]).unwrap();
        let json = serde_json::to_string(&two).unwrap();
        assert!(json.starts_with('['));
        assert_eq!(serde_json::from_str::<Palette>(&json).unwrap(), two);

        assert!(serde_json::from_str::<Palette>("[]").is_err());
        let one = r#"[{"r":1.0,"g":0.0,"b":0.0,"a":1.0}]"#;
        let err = serde_json::from_str::<Palette>(one).unwrap_err();
        assert!(err.to_string().contains("at least 2"), "{err}");
        assert!(serde_json::from_str::<Palette>(r#"{"colors":[]}"#).is_err());
    }

    #[test]
    fn test_hls_primaries() {
        let (r, g, b) = hls_to_rgb(0.0, 0.5, 1.0);
        assert!((r - 1.0).abs() < 1e-12 && g.abs() < 1e-12 && b.abs() < 1e-12);
        let (r, g, b) = hls_to_rgb(1.0 / 3.0, 0.5, 1.0);
        assert!(r.abs() < 1e-12 && (g - 1.0).abs() < 1e-12 && b.abs() < 1e-12);
        assert_eq!(hls_to_rgb(0.3, 0.4, 0.0), (0.4, 0.4, 0.4));
    }

    #[test]
    fn test_distinct_colors_are_distinct_and_seeded() {
        let a = distinct_colors(5, 3);
        assert_eq!(a, distinct_colors(5, 3));
        for i in 0..a.len() {
            for j in i + 1..a.len() {
                assert_ne!(a[i].to_hex(), a[j].to_hex());
            }
        }
    }
}
