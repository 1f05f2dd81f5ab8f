//! Curve Evaluator - polar radius functions sampled over an angle domain

use serde::{Deserialize, Serialize};

use super::{AxisInfluence, CurveParameters, CurvePoint, Dimension, ShapeInfluence};
use crate::config::Config;

/// Zoom slider range
pub const ZOOM_RANGE: (f64, f64) = (0.1, 2.0);

/// Evaluates curves with a given depth (3D height) and spiral decay
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    pub depth: f64,
    pub decay: f64,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            depth: 10.0,
            decay: 10.0,
        }
    }
}

impl From<&Config> for Evaluator {
    fn from(config: &Config) -> Self {
        Self {
            depth: config.depth,
            decay: config.decay,
        }
    }
}

/// Evaluate with the default depth and decay
#[cfg(test)]
pub fn evaluate(
    domain_start: f64,
    domain_end: f64,
    sample_count: usize,
    params: &CurveParameters,
    dimension: Dimension,
) -> Vec<CurvePoint> {
    Evaluator::default().evaluate(domain_start, domain_end, sample_count, params, dimension)
}

impl Evaluator {
    /// Sample `sample_count` evenly spaced angles in `[domain_start, domain_end]`
    /// and convert each radius to Cartesian coordinates.
    pub fn evaluate(
        &self,
        domain_start: f64,
        domain_end: f64,
        sample_count: usize,
        params: &CurveParameters,
        dimension: Dimension,
    ) -> Vec<CurvePoint> {
        let thetas = linspace(domain_start, domain_end, sample_count);
        let depths = match dimension {
            Dimension::Three => Some(linspace(0.0, self.depth, sample_count)),
            Dimension::Two => None,
        };

        thetas
            .iter()
            .enumerate()
            .map(|(i, &theta)| {
                let r = self.radius(theta, params);
                CurvePoint {
                    theta,
                    r,
                    x: r * theta.cos(),
                    y: r * theta.sin(),
                    z: depths.as_ref().map(|d| d[i]),
                }
            })
            .collect()
    }

    /// Radius at `theta` for the parameter's shape/axis influence
    pub fn radius(&self, theta: f64, params: &CurveParameters) -> f64 {
        let k = params.frequency_multiplier as f64;
        let phi = match params.axis {
            AxisInfluence::Spiral => theta,
            AxisInfluence::Random => (params.axis_multiplier as f64 * theta).sin(),
        };
        let wave = (k * phi).sin();

        match params.shape {
            ShapeInfluence::Circle => wave,
            ShapeInfluence::Square => sign(wave),
            ShapeInfluence::Triangle => wave.abs(),
            ShapeInfluence::None => wave * (-theta / self.decay).exp(),
        }
    }
}

/// Sign with `sign(0) == 0`, unlike `f64::signum`
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// `count` evenly spaced values from `start` to `end`, both inclusive
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
            values[count - 1] = end;
            values
        }
    }
}

/// Linearly remap the depth of a resumed tail so it continues from `from`
/// instead of starting over at zero.
pub fn rebase_depth(points: &mut [CurvePoint], from: f64, depth: f64) {
    if depth == 0.0 {
        return;
    }
    for p in points.iter_mut() {
        if let Some(z) = p.z.as_mut() {
            *z = from + (*z / depth) * (depth - from);
        }
    }
}

/// Orbit camera used to flatten 3D curves onto the view plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Rotation around the height axis
    pub yaw: f64,
    /// Tilt towards the viewer; 0 is a side view, PI/2 looks straight down
    pub pitch: f64,
    /// Height scale so depth is comparable with the unit radius
    pub depth_scale: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            yaw: 0.5,
            pitch: 0.6,
            depth_scale: 0.2,
        }
    }
}

impl Projection {
    /// View-plane coordinates. 2D points pass through unchanged.
    pub fn apply(&self, p: &CurvePoint) -> [f64; 2] {
        let Some(z) = p.z else {
            return [p.x, p.y];
        };
        let (sin_y, cos_y) = self.yaw.sin_cos();
        let (sin_p, cos_p) = self.pitch.sin_cos();

        let x1 = p.x * cos_y - p.y * sin_y;
        let y1 = p.x * sin_y + p.y * cos_y;
        let h = z * self.depth_scale;

        [x1, h * cos_p + y1 * sin_p]
    }
}

/// Axis-aligned view window on the view plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }
}

/// Bounds of `points` with every limit multiplied by `1 / zoom`, the way
/// the zoom slider rescales the axes. `None` for an empty curve.
pub fn view_bounds(points: &[[f64; 2]], zoom: f64) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }
    let factor = 1.0 / zoom.clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);

    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for p in points {
        for axis in 0..2 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }

    Some(Bounds {
        min: min.map(|v| v * factor),
        max: max.map(|v| v * factor),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Palette, Rgb};
    use std::f64::consts::PI;

    fn params(k: u32, shape: ShapeInfluence, axis: AxisInfluence) -> CurveParameters {
        CurveParameters {
            frequency_multiplier: k,
            axis_multiplier: 17,
            shape,
            axis,
            palette: Palette {
                colors: [Rgb(1.0, 0.0, 0.0), Rgb(0.0, 1.0, 0.0), Rgb(0.0, 0.0, 1.0)],
                hues: [0.0, 0.4, 0.8],
            },
        }
    }

    #[test]
    fn test_sample_count_and_finite() {
        for k in [1, 2, 37, 100] {
            for shape in ShapeInfluence::ALL {
                for axis in AxisInfluence::ALL {
                    let points = evaluate(0.0, 8.0 * PI, 1000, &params(k, shape, axis), Dimension::Three);
                    assert_eq!(points.len(), 1000);
                    assert!(points.iter().all(CurvePoint::is_finite));
                }
            }
        }
    }

    #[test]
    fn test_square_radius_is_ternary() {
        let points = evaluate(0.0, 8.0 * PI, 20_000, &params(42, ShapeInfluence::Square, AxisInfluence::Spiral), Dimension::Two);
        assert_eq!(points.len(), 20_000);
        assert!(points.iter().all(|p| p.r == -1.0 || p.r == 0.0 || p.r == 1.0));
        // theta == 0 gives sin(0) == 0
        assert_eq!(points[0].r, 0.0);
    }

    #[test]
    fn test_triangle_radius_non_negative() {
        let points = evaluate(0.0, 4.0 * PI, 500, &params(9, ShapeInfluence::Triangle, AxisInfluence::Random), Dimension::Two);
        assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.r)));
    }

    #[test]
    fn test_spiral_decays() {
        let p = params(5, ShapeInfluence::None, AxisInfluence::Spiral);
        let points = evaluate(0.0, 8.0 * PI, 2000, &p, Dimension::Two);
        let bound = (-points[1999].theta / 10.0).exp();
        assert!(points[1999].r.abs() <= bound + 1e-12);
    }

    #[test]
    fn test_depth_only_in_3d() {
        let p = params(3, ShapeInfluence::Circle, AxisInfluence::Spiral);
        let flat = evaluate(0.0, PI, 11, &p, Dimension::Two);
        assert!(flat.iter().all(|pt| pt.z.is_none()));

        let deep = evaluate(0.0, PI, 11, &p, Dimension::Three);
        assert_eq!(deep[0].z, Some(0.0));
        assert_eq!(deep[10].z, Some(10.0));
        assert!((deep[5].z.unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_angle_is_domain_start() {
        let p = params(3, ShapeInfluence::None, AxisInfluence::Spiral);
        let points = evaluate(1.25, 8.0 * PI, 100, &p, Dimension::Two);
        assert_eq!(points[0].theta, 1.25);
        assert_eq!(points[99].theta, 8.0 * PI);
    }

    #[test]
    fn test_degenerate_domain() {
        let p = params(3, ShapeInfluence::Circle, AxisInfluence::Spiral);
        let points = evaluate(2.0, 2.0, 5, &p, Dimension::Two);
        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|pt| pt.theta == 2.0 && pt.x == points[0].x));

        assert!(evaluate(0.0, 1.0, 0, &p, Dimension::Two).is_empty());
        assert_eq!(evaluate(0.5, 1.0, 1, &p, Dimension::Two)[0].theta, 0.5);
    }

    #[test]
    fn test_rebase_depth_continues() {
        let p = params(3, ShapeInfluence::Circle, AxisInfluence::Spiral);
        let mut tail = evaluate(0.0, PI, 3, &p, Dimension::Three);
        rebase_depth(&mut tail, 4.0, 10.0);
        assert_eq!(tail[0].z, Some(4.0));
        assert_eq!(tail[1].z, Some(7.0));
        assert_eq!(tail[2].z, Some(10.0));
    }

    #[test]
    fn test_view_bounds_zoom() {
        let p = params(1, ShapeInfluence::Circle, AxisInfluence::Spiral);
        let projection = Projection::default();
        let points: Vec<[f64; 2]> = evaluate(0.0, 2.0 * PI, 400, &p, Dimension::Two)
            .iter()
            .map(|pt| projection.apply(pt))
            .collect();
        let base = view_bounds(&points, 1.0).unwrap();
        let zoomed = view_bounds(&points, 2.0).unwrap();
        assert!((zoomed.width() - base.width() / 2.0).abs() < 1e-9);
        // Clamped to the slider range
        assert_eq!(view_bounds(&points, 50.0), view_bounds(&points, 2.0));
        assert!(view_bounds(&[], 1.0).is_none());
    }

    #[test]
    fn test_projection() {
        let flat = CurvePoint { theta: 0.0, r: 1.0, x: 0.3, y: -0.7, z: None };
        assert_eq!(Projection::default().apply(&flat), [0.3, -0.7]);

        let side = Projection { yaw: 0.0, pitch: 0.0, depth_scale: 0.5 };
        let raised = CurvePoint { z: Some(4.0), ..flat };
        let [sx, sy] = side.apply(&raised);
        assert!((sx - 0.3).abs() < 1e-12);
        assert!((sy - 2.0).abs() < 1e-12);

        let top = Projection { yaw: 0.0, pitch: std::f64::consts::FRAC_PI_2, depth_scale: 0.5 };
        let [_, ty] = top.apply(&raised);
        assert!((ty + 0.7).abs() < 1e-9);
    }
}
