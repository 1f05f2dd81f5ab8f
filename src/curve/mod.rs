//! Curve Model - randomized polar curves `r = f(theta)`
//!
//! - palette: three-color HLS palettes spaced around the color wheel
//! - params: random frequency multipliers + shape/axis selection
//! - evaluate: angle domain -> Cartesian points, plus view bounds

pub mod evaluate;
pub mod palette;
pub mod params;

pub use evaluate::*;
pub use palette::*;
pub use params::*;

use serde::{Deserialize, Serialize};

/// Waveform applied to the radius function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeInfluence {
    /// Exponentially decaying spiral
    #[default]
    None,
    Circle,
    Square,
    Triangle,
}

impl ShapeInfluence {
    pub const ALL: [ShapeInfluence; 4] = [
        ShapeInfluence::None,
        ShapeInfluence::Circle,
        ShapeInfluence::Square,
        ShapeInfluence::Triangle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeInfluence::None => "none",
            ShapeInfluence::Circle => "circle",
            ShapeInfluence::Square => "square",
            ShapeInfluence::Triangle => "triangle",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|shape| shape.name() == s.to_lowercase())
    }
}

/// Angle fed into the radius function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisInfluence {
    /// Raw angle
    #[default]
    Spiral,
    /// `sin(k' * theta)` with an independent random k'
    Random,
}

impl AxisInfluence {
    pub const ALL: [AxisInfluence; 2] = [AxisInfluence::Spiral, AxisInfluence::Random];

    pub fn name(&self) -> &'static str {
        match self {
            AxisInfluence::Spiral => "spiral",
            AxisInfluence::Random => "random",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|axis| axis.name() == s.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    #[default]
    Two,
    Three,
}

impl Dimension {
    pub fn toggled(self) -> Self {
        match self {
            Dimension::Two => Dimension::Three,
            Dimension::Three => Dimension::Two,
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "2d" | "two" | "2" => Some(Dimension::Two),
            "3d" | "three" | "3" => Some(Dimension::Three),
            _ => None,
        }
    }
}

/// One sample of an evaluated curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub theta: f64,
    pub r: f64,
    pub x: f64,
    pub y: f64,
    /// Present iff evaluated in 3D
    pub z: Option<f64>,
}

#[cfg(test)]
impl CurvePoint {
    pub fn is_finite(&self) -> bool {
        self.theta.is_finite()
            && self.r.is_finite()
            && self.x.is_finite()
            && self.y.is_finite()
            && self.z.map_or(true, f64::is_finite)
    }
}
