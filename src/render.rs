//! Raster previews of sketches.
//!
//! Converts paths to tiny-skia geometry, strokes them onto a white canvas
//! scaled to fit, and optionally overlays editing handles: control points
//! as hollow circles tied to their anchors, anchors as filled squares.

use std::path::Path as FsPath;

use kurbo::{Rect, Shape};

use crate::edit::{rebuild_handles, HandleRole};
use crate::error::BrushError;
use crate::path::{Path, Segment};

/// Canvas size and drawing options of a preview.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Blank border around the fitted content, in pixels.
    pub padding: f32,
    pub stroke_width: f32,
    pub show_handles: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            padding: 20.0,
            stroke_width: 2.0,
            show_handles: false,
        }
    }
}

/// Convert a path to a `tiny_skia::Path`, mapping points through `transform`.
fn to_tinyskia(path: &Path, transform: tiny_skia::Transform) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for seg in path.segments() {
        match *seg {
            Segment::MoveTo(p) => {
                let (x, y) = transform_point(p, transform);
                pb.move_to(x, y);
            }
            Segment::LineTo(p) => {
                let (x, y) = transform_point(p, transform);
                pb.line_to(x, y);
            }
            Segment::CubicTo(c1, c2, p) => {
                let (c1x, c1y) = transform_point(c1, transform);
                let (c2x, c2y) = transform_point(c2, transform);
                let (px, py) = transform_point(p, transform);
                pb.cubic_to(c1x, c1y, c2x, c2y, px, py);
            }
        }
    }
    pb.finish()
}

/// Apply transform manually to a point (f64 → f32).
fn transform_point(p: kurbo::Point, t: tiny_skia::Transform) -> (f32, f32) {
    let x = p.x as f32;
    let y = p.y as f32;
    (t.sx * x + t.kx * y + t.tx, t.ky * x + t.sy * y + t.ty)
}

/// Encode a pixmap to PNG bytes.
fn encode_png(pixmap: &tiny_skia::Pixmap) -> Result<Vec<u8>, BrushError> {
    let mut buf = Vec::new();
    let mut encoder = png::Encoder::new(&mut buf, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixmap.data())?;
    drop(writer);
    Ok(buf)
}

/// Scale and offset that fit `bounds` centred into the padded canvas.
fn fit_transform(bounds: Rect, options: &RenderOptions) -> tiny_skia::Transform {
    let content_w = (options.width as f32 - 2.0 * options.padding).max(1.0);
    let content_h = (options.height as f32 - 2.0 * options.padding).max(1.0);
    let bw = (bounds.width() as f32).max(1.0);
    let bh = (bounds.height() as f32).max(1.0);
    let s = (content_w / bw).min(content_h / bh);
    let tx = options.padding + (content_w - bw * s) / 2.0 - bounds.x0 as f32 * s;
    let ty = options.padding + (content_h - bh * s) / 2.0 - bounds.y0 as f32 * s;
    tiny_skia::Transform {
        sx: s,
        kx: 0.0,
        ky: 0.0,
        sy: s,
        tx,
        ty,
    }
}

fn bounds_of(paths: &[Path]) -> Option<Rect> {
    paths
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.to_bezpath().bounding_box())
        .reduce(|a, b| a.union(b))
}

/// Rasterize `paths` into a pixmap.
pub fn render(paths: &[Path], options: &RenderOptions) -> Result<tiny_skia::Pixmap, BrushError> {
    let mut pixmap = tiny_skia::Pixmap::new(options.width, options.height).ok_or_else(|| {
        BrushError::Render(format!(
            "invalid canvas size {}x{}",
            options.width, options.height
        ))
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let Some(bounds) = bounds_of(paths) else {
        return Ok(pixmap);
    };
    let transform = fit_transform(bounds, options);

    let mut paint = tiny_skia::Paint::default();
    paint.set_color(tiny_skia::Color::BLACK);
    paint.anti_alias = true;
    let stroke = tiny_skia::Stroke {
        width: options.stroke_width,
        ..tiny_skia::Stroke::default()
    };

    for path in paths {
        if let Some(sk_path) = to_tinyskia(path, transform) {
            pixmap.stroke_path(&sk_path, &paint, &stroke, tiny_skia::Transform::identity(), None);
        }
        if options.show_handles {
            draw_handles(&mut pixmap, path, transform);
        }
    }
    Ok(pixmap)
}

// ── Handles ──

fn draw_handles(pixmap: &mut tiny_skia::Pixmap, path: &Path, transform: tiny_skia::Transform) {
    let mut paint = tiny_skia::Paint::default();
    paint.set_color(tiny_skia::Color::from_rgba8(30, 110, 230, 255));
    paint.anti_alias = true;
    let thin = tiny_skia::Stroke {
        width: 1.0,
        ..tiny_skia::Stroke::default()
    };

    for handle in rebuild_handles(path) {
        let (x, y) = transform_point(handle.position, transform);
        match handle.role {
            HandleRole::Anchor => {
                if let Some(rect) = tiny_skia::Rect::from_xywh(x - 3.0, y - 3.0, 6.0, 6.0) {
                    pixmap.fill_rect(rect, &paint, tiny_skia::Transform::identity(), None);
                }
            }
            HandleRole::Control { anchor, .. } => {
                if let Some(a) = path.point_at(anchor) {
                    let (ax, ay) = transform_point(a, transform);
                    let mut pb = tiny_skia::PathBuilder::new();
                    pb.move_to(ax, ay);
                    pb.line_to(x, y);
                    if let Some(arm) = pb.finish() {
                        pixmap.stroke_path(&arm, &paint, &thin, tiny_skia::Transform::identity(), None);
                    }
                }
                if let Some(circle) = tiny_skia::PathBuilder::from_circle(x, y, 3.0) {
                    pixmap.stroke_path(&circle, &paint, &thin, tiny_skia::Transform::identity(), None);
                }
            }
        }
    }
}

/// Render `paths` and write the result as a PNG file.
pub fn save_png(paths: &[Path], options: &RenderOptions, output: &FsPath) -> Result<(), BrushError> {
    let pixmap = render(paths, options)?;
    std::fs::write(output, encode_png(&pixmap)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;

    #[test]
    fn empty_sketch_is_blank() {
        let pixmap = render(&[], &RenderOptions::default()).unwrap();
        assert!(pixmap.pixels().iter().all(|px| px.red() == 255));
    }

    #[test]
    fn strokes_are_drawn() {
        let path = Path::from_points(&[Point::new(0.0, 0.0), Point::new(100.0, 100.0)]);
        let pixmap = render(&[path], &RenderOptions::default()).unwrap();
        assert!(pixmap.pixels().iter().any(|px| px.red() < 128));
    }

    #[test]
    fn zero_sized_canvas_is_an_error() {
        let options = RenderOptions {
            width: 0,
            ..RenderOptions::default()
        };
        assert!(matches!(render(&[], &options), Err(BrushError::Render(_))));
    }

    #[test]
    fn writes_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("preview.png");
        let path = Path::from_points(&[Point::ZERO, Point::new(10.0, 5.0)]);
        let options = RenderOptions {
            show_handles: true,
            ..RenderOptions::default()
        };
        save_png(&[path], &options, &out).unwrap();
        let bytes = std::fs::read(&out).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
