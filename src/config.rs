//! Configuration loader - optional YAML file with per-field defaults

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::curve::Dimension;

/// Tunables for curve generation, playback pacing and logging.
///
/// Every field falls back to its default, so a partial `shapes.yaml` is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Samples per curve
    pub sample_count: usize,
    /// Domain end is `turns * PI`
    pub turns: f64,
    /// Curve is emitted in `sample_count / batch_divisor`-sized batches
    pub batch_divisor: usize,
    /// Height of the 3D curve (z runs from 0 to depth)
    pub depth: f64,
    /// Spiral decay constant in `exp(-theta / decay)`
    pub decay: f64,
    /// Upper bound of the random frequency multipliers
    pub max_frequency: u32,
    pub lightness: (f64, f64),
    pub saturation: f64,
    /// Hue offset between palette colors, in turns
    pub hue_step: f64,
    pub dimension: Dimension,
    /// Delay between batches in the viewer
    pub frame_delay_ms: u64,
    pub log_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_count: 20_000,
            turns: 8.0,
            batch_divisor: 100,
            depth: 10.0,
            decay: 10.0,
            max_frequency: 100,
            lightness: (0.5, 0.75),
            saturation: 0.95,
            hue_step: 1.0 / 2.5,
            dimension: Dimension::Two,
            frame_delay_ms: 20,
            log_dir: "logs".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config.sanitized())
    }

    /// Load from `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading config from {:?}", path);
            Self::load(path)
        } else {
            tracing::warn!("Config file not found: {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// End of the angle domain
    pub fn domain_end(&self) -> f64 {
        self.turns * std::f64::consts::PI
    }

    /// Points per emitted batch
    pub fn batch_size(&self) -> usize {
        (self.sample_count / self.batch_divisor.max(1)).max(1)
    }

    fn sanitized(mut self) -> Self {
        self.max_frequency = self.max_frequency.max(1);
        let (lo, hi) = self.lightness;
        self.lightness = (lo.min(hi).clamp(0.0, 1.0), lo.max(hi).clamp(0.0, 1.0));
        self.saturation = self.saturation.clamp(0.0, 1.0);
        if self.decay == 0.0 {
            self.decay = Self::default().decay;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_curve() {
        let config = Config::default();
        assert_eq!(config.sample_count, 20_000);
        assert_eq!(config.batch_size(), 200);
        assert!((config.domain_end() - 8.0 * std::f64::consts::PI).abs() < 1e-12);
        assert!((config.hue_step - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("sample_count: 500\ndimension: three\n").unwrap();
        assert_eq!(config.sample_count, 500);
        assert_eq!(config.dimension, Dimension::Three);
        assert_eq!(config.batch_divisor, 100);
        assert_eq!(config.batch_size(), 5);
    }

    #[test]
    fn test_sanitize_swaps_lightness_and_clamps_frequency() {
        let config: Config = serde_yaml::from_str("lightness: [0.9, 0.2]\nmax_frequency: 0\n").unwrap();
        let config = config.sanitized();
        assert_eq!(config.lightness, (0.2, 0.9));
        assert_eq!(config.max_frequency, 1);
    }

    #[test]
    fn test_tiny_curve_still_has_batches() {
        let config = Config {
            sample_count: 10,
            ..Config::default()
        };
        assert_eq!(config.batch_size(), 1);
    }
}
