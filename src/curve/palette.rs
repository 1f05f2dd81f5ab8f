//! Three-color palettes from evenly spaced hues

use rand::Rng;
use serde::{Deserialize, Serialize};

/// RGB color, channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub fn to_u8(self) -> [u8; 3] {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [c(self.0), c(self.1), c(self.2)]
    }
}

/// Ordered palette; batch colors advance through it in thirds of the curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub colors: [Rgb; 3],
    /// Hue of each color, in turns
    pub hues: [f64; 3],
}

impl Palette {
    pub fn color(&self, index: usize) -> Rgb {
        self.colors[index.min(2)]
    }
}

/// Knobs for palette generation
#[derive(Debug, Clone, Copy)]
pub struct PaletteSpec {
    pub hue_step: f64,
    pub lightness: (f64, f64),
    pub saturation: f64,
}

impl Default for PaletteSpec {
    fn default() -> Self {
        Self {
            hue_step: 1.0 / 2.5,
            lightness: (0.5, 0.75),
            saturation: 0.95,
        }
    }
}

/// Draw a fresh palette: random base hue, then `hue_step` turns apart
pub fn random_palette<R: Rng + ?Sized>(rng: &mut R, spec: &PaletteSpec) -> Palette {
    let base: f64 = rng.gen();
    let mut colors = [Rgb(0.0, 0.0, 0.0); 3];
    let mut hues = [0.0; 3];

    for i in 0..3 {
        let hue = (base + i as f64 * spec.hue_step).rem_euclid(1.0);
        let (lo, hi) = spec.lightness;
        let lightness = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        colors[i] = hls_to_rgb(hue, lightness, spec.saturation);
        hues[i] = hue;
    }

    Palette { colors, hues }
}

/// HLS -> RGB, all components in [0, 1]
pub fn hls_to_rgb(h: f64, l: f64, s: f64) -> Rgb {
    if s == 0.0 {
        return Rgb(l as f32, l as f32, l as f32);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    Rgb(
        hue_channel(m1, m2, h + 1.0 / 3.0) as f32,
        hue_channel(m1, m2, h) as f32,
        hue_channel(m1, m2, h - 1.0 / 3.0) as f32,
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

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_hls_primaries() {
        let red = hls_to_rgb(0.0, 0.5, 1.0);
        assert!(close(red.0, 1.0) && close(red.1, 0.0) && close(red.2, 0.0));

        let green = hls_to_rgb(1.0 / 3.0, 0.5, 1.0);
        assert!(close(green.0, 0.0) && close(green.1, 1.0) && close(green.2, 0.0));

        let gray = hls_to_rgb(0.7, 0.25, 0.0);
        assert!(close(gray.0, 0.25) && close(gray.1, 0.25) && close(gray.2, 0.25));
    }

    #[test]
    fn test_palette_hues_are_spaced() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let palette = random_palette(&mut rng, &PaletteSpec::default());
            for i in 0..3 {
                let next = palette.hues[(i + 1) % 3];
                let gap = (next - palette.hues[i]).rem_euclid(1.0);
                let expected = if i == 2 { 0.2 } else { 0.4 };
                assert!((gap - expected).abs() < 1e-9, "gap {} at {}", gap, i);
            }
        }
    }

    #[test]
    fn test_palette_channels_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let palette = random_palette(&mut rng, &PaletteSpec::default());
        for c in palette.colors {
            for v in [c.0, c.1, c.2] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_two_palettes_differ() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = random_palette(&mut rng, &PaletteSpec::default());
        let b = random_palette(&mut rng, &PaletteSpec::default());
        assert_ne!(a, b);
    }

    #[test]
    fn test_to_u8() {
        assert_eq!(Rgb(1.0, 0.0, 0.5).to_u8(), [255, 0, 128]);
    }
}
