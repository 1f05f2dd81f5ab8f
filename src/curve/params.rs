//! Parameter Generator - random multipliers + palette reuse under lock

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::palette::{random_palette, Palette, PaletteSpec};
use super::{AxisInfluence, ShapeInfluence};
use crate::config::Config;

/// Everything needed to evaluate one curve. Fixed for a playback cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParameters {
    /// k in `sin(k * phi)`
    pub frequency_multiplier: u32,
    /// k' in `phi = sin(k' * theta)`; only read when axis is Random
    pub axis_multiplier: u32,
    pub shape: ShapeInfluence,
    pub axis: AxisInfluence,
    pub palette: Palette,
}

/// Draws curve parameters from a configured range
#[derive(Debug, Clone, Copy)]
pub struct ParameterGenerator {
    pub max_frequency: u32,
    pub palette: PaletteSpec,
}

impl Default for ParameterGenerator {
    fn default() -> Self {
        Self {
            max_frequency: 100,
            palette: PaletteSpec::default(),
        }
    }
}

impl From<&Config> for ParameterGenerator {
    fn from(config: &Config) -> Self {
        Self {
            max_frequency: config.max_frequency.max(1),
            palette: PaletteSpec {
                hue_step: config.hue_step,
                lightness: config.lightness,
                saturation: config.saturation,
            },
        }
    }
}

impl ParameterGenerator {
    /// Generate parameters for the next curve.
    ///
    /// With `lock` set the previous palette is kept; without one to keep,
    /// a fresh palette is drawn instead.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        lock: bool,
        previous_palette: Option<&Palette>,
        shape: ShapeInfluence,
        axis: AxisInfluence,
    ) -> CurveParameters {
        let palette = match previous_palette {
            Some(palette) if lock => *palette,
            _ => self.palette(rng),
        };

        CurveParameters {
            frequency_multiplier: rng.gen_range(1..=self.max_frequency),
            axis_multiplier: rng.gen_range(1..=self.max_frequency),
            shape,
            axis,
            palette,
        }
    }

    pub fn palette<R: Rng + ?Sized>(&self, rng: &mut R) -> Palette {
        random_palette(rng, &self.palette)
    }
}
