//! PNG export of the current canvas

use image::RgbImage;
use std::path::Path;
use tracing::info;

use super::{RenderView, SinkError};
use crate::curve::{view_bounds, Bounds, CurvePoint, Projection};
use crate::playback::PointBatch;

#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub width: u32,
    pub height: u32,
    pub zoom: f64,
    pub projection: Projection,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            zoom: 1.0,
            projection: Projection::default(),
        }
    }
}

/// Rasterize the render log. The window is framed on `curve` (the last
/// evaluated curve), falling back to the logged points.
pub fn render_image(
    log: &[PointBatch],
    curve: &[CurvePoint],
    view: &RenderView<'_>,
    options: &ExportOptions,
) -> Result<RgbImage, SinkError> {
    if log.is_empty() {
        return Err(SinkError::EmptyLog);
    }

    let framing: Vec<[f64; 2]> = if curve.is_empty() {
        log.iter()
            .flat_map(|b| b.points.iter())
            .map(|p| options.projection.apply(p))
            .collect()
    } else {
        curve.iter().map(|p| options.projection.apply(p)).collect()
    };
    let bounds = view_bounds(&framing, options.zoom).ok_or(SinkError::EmptyLog)?;
    let canvas = Canvas::new(bounds, options.width.max(1), options.height.max(1));

    let background = if view.state.dark_mode { [0, 0, 0] } else { [255, 255, 255] };
    let mut img = RgbImage::from_pixel(canvas.width, canvas.height, image::Rgb(background));

    for batch in log {
        let color = image::Rgb(batch.color.to_u8());
        let pixels: Vec<(i64, i64)> = batch
            .points
            .iter()
            .map(|p| canvas.to_pixel(options.projection.apply(p)))
            .collect();

        if view.state.data_points {
            for &(x, y) in &pixels {
                plot(&mut img, x, y, color);
            }
        } else {
            for pair in pixels.windows(2) {
                draw_line(&mut img, pair[0], pair[1], color);
            }
            if let [only] = pixels.as_slice() {
                plot(&mut img, only.0, only.1, color);
            }
        }
    }

    Ok(img)
}

pub fn export_png<P: AsRef<Path>>(
    path: P,
    log: &[PointBatch],
    curve: &[CurvePoint],
    view: &RenderView<'_>,
    options: &ExportOptions,
) -> Result<(), SinkError> {
    let path = path.as_ref();
    let img = render_image(log, curve, view, options)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    img.save(path)?;
    info!("Exported {}x{} PNG to {:?}", img.width(), img.height(), path);
    Ok(())
}

/// Maps view-plane coordinates to pixels, keeping the aspect ratio
struct Canvas {
    bounds: Bounds,
    scale: f64,
    offset: [f64; 2],
    width: u32,
    height: u32,
}

impl Canvas {
    const MARGIN: f64 = 0.05;

    fn new(bounds: Bounds, width: u32, height: u32) -> Self {
        let usable_w = width as f64 * (1.0 - 2.0 * Self::MARGIN);
        let usable_h = height as f64 * (1.0 - 2.0 * Self::MARGIN);
        let span_w = bounds.width().max(f64::EPSILON);
        let span_h = bounds.height().max(f64::EPSILON);
        let scale = (usable_w / span_w).min(usable_h / span_h);

        // Center the drawing
        let offset = [
            (width as f64 - span_w * scale) / 2.0,
            (height as f64 - span_h * scale) / 2.0,
        ];
        Self {
            bounds,
            scale,
            offset,
            width,
            height,
        }
    }

    fn to_pixel(&self, p: [f64; 2]) -> (i64, i64) {
        let x = self.offset[0] + (p[0] - self.bounds.min[0]) * self.scale;
        // Image rows grow downwards
        let y = self.height as f64 - (self.offset[1] + (p[1] - self.bounds.min[1]) * self.scale);
        (x.round() as i64, y.round() as i64)
    }
}

fn plot(img: &mut RgbImage, x: i64, y: i64, color: image::Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: image::Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        plot(img, x, y, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
