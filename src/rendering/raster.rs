//! Rasterizer seam and the built-in software backend.
//!
//! The pipeline only depends on the [`Rasterizer`] trait; the software
//! backend here paints the display list into an RGBA buffer and encodes it
//! as PNG. Text is painted as placeholder glyph blocks, which is enough for
//! a legible snapshot and keeps the backend dependency-free.

use futures::future::{self, BoxFuture, FutureExt};

use crate::error::{Error, Result};
use crate::rendering::layout::Scene;
use crate::rendering::paint::{parse_css_color, PaintCommand};
use crate::rendering::Screenshot;

/// Capture options handed to the rasterizer
#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Device-pixel multiplier for sharpness
    pub pixel_ratio: f32,
    /// Opaque background behind the scene
    pub background: String,
}

impl Default for RasterOptions {
    fn default() -> Self {
        RasterOptions {
            pixel_ratio: 2.0,
            background: "#ffffff".to_string(),
        }
    }
}

/// The external capture capability. Takes an owned scene so nothing borrows
/// the live tree across the await point.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, scene: Scene, opts: RasterOptions) -> BoxFuture<'static, Result<Screenshot>>;
}

/// Pure-Rust rasterizer backend
pub struct SoftwareRasterizer;

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(&self, scene: Scene, opts: RasterOptions) -> BoxFuture<'static, Result<Screenshot>> {
        future::ready(render_scene(&scene, &opts)).boxed()
    }
}

/// Render a scene synchronously. Exposed for golden tests.
pub fn render_scene(scene: &Scene, opts: &RasterOptions) -> Result<Screenshot> {
    let ratio = if opts.pixel_ratio.is_finite() && opts.pixel_ratio > 0.0 {
        opts.pixel_ratio
    } else {
        1.0
    };
    let width = ((scene.width.max(1) as f32) * ratio).round().max(1.0) as u32;
    let height = ((scene.height.max(1) as f32) * ratio).round().max(1.0) as u32;

    let bg = parse_css_color(&opts.background).unwrap_or((255, 255, 255, 255));
    let mut buf = vec![0u8; width as usize * height as usize * 4];
    for px in buf.chunks_exact_mut(4) {
        // Background is always opaque in an export
        px.copy_from_slice(&[bg.0, bg.1, bg.2, 255]);
    }

    let scale = |v: i32| -> i32 { (v as f32 * ratio).round() as i32 };
    let scale_u = |v: u32| -> u32 { ((v as f32) * ratio).round().max(1.0) as u32 };

    for cmd in &scene.commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width: w, height: h, rgba } => {
                fill_rect(&mut buf, width, height, scale(*x), scale(*y), scale_u(*w), scale_u(*h), *rgba);
            }
            PaintCommand::Text { x, y, text, size, rgba } => {
                // Placeholder glyph strip per line, roughly 0.6em advance
                for (i, line) in text.lines().enumerate() {
                    let chars = line.chars().count() as u32;
                    if chars == 0 {
                        continue;
                    }
                    let line_y = *y + (i as i32) * ((*size as i32 * 14) / 10);
                    fill_rect(
                        &mut buf,
                        width,
                        height,
                        scale(*x),
                        scale(line_y),
                        scale_u(chars * size * 6 / 10),
                        scale_u(*size),
                        *rgba,
                    );
                }
            }
        }
    }

    let png_data = encode_png(width, height, &buf)?;
    Ok(Screenshot { width, height, png_data })
}

fn fill_rect(buf: &mut [u8], img_w: u32, img_h: u32, x: i32, y: i32, w: u32, h: u32, rgba: (u8, u8, u8, u8)) {
    if rgba.3 == 0 {
        return;
    }
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = ((x + w as i32).max(0) as u32).min(img_w);
    let y1 = ((y + h as i32).max(0) as u32).min(img_h);
    let alpha = rgba.3 as u32;

    for py in y0..y1 {
        for px in x0..x1 {
            let idx = ((py * img_w + px) * 4) as usize;
            for (c, src) in [rgba.0, rgba.1, rgba.2].iter().enumerate() {
                let dst = buf[idx + c] as u32;
                buf[idx + c] = ((*src as u32 * alpha + dst * (255 - alpha)) / 255) as u8;
            }
            buf[idx + 3] = 255;
        }
    }
}

fn encode_png(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| Error::Rasterization(e.to_string()))?;
        writer
            .write_image_data(data)
            .map_err(|e| Error::Rasterization(e.to_string()))?;
    }
    Ok(out)
}
