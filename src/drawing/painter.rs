//! Painter seam between resolved text geometry and an output surface
//!
//! The render cache hands painters a position, a quad buffer and a
//! texture; what "drawing" means is the backend's business. `CpuPainter`
//! composites into an `RgbaImage` (demo binary, golden tests);
//! `RecordingPainter` captures calls for assertions.

use crate::drawing::coords::CoordsBuffer;
use crate::drawing::geometry::Point;
use crate::drawing::texture::Texture;
use crate::utils::color::Color;
use image::RgbaImage;

/// One uniform-color span of a colored-text draw: applies from glyph
/// index `start` until the next run's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRun {
    pub start: usize,
    pub color: Color,
}

pub trait Painter {
    /// Draw all quads tinted with one color.
    fn draw_text(&mut self, pos: Point, coords: &CoordsBuffer, color: Color, texture: &Texture);

    /// Draw quads with per-glyph-run colors. `runs` is ordered by
    /// `start`; quads before the first run fall back to white.
    fn draw_text_colored(
        &mut self,
        pos: Point,
        coords: &CoordsBuffer,
        runs: &[ColorRun],
        texture: &Texture,
    );
}

/// Resolve the color applying to glyph `index` from ordered runs.
fn run_color(runs: &[ColorRun], index: usize) -> Color {
    let mut color = Color::WHITE;
    for run in runs {
        if run.start > index {
            break;
        }
        color = run.color;
    }
    color
}

// ============================================================================
// CPU compositor
// ============================================================================

/// Software painter compositing quads into an owned RGBA canvas.
pub struct CpuPainter {
    canvas: RgbaImage,
}

impl CpuPainter {
    pub fn new(width: u32, height: u32) -> Self {
        CpuPainter {
            canvas: RgbaImage::new(width, height),
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }

    /// Fill the whole canvas with one color.
    pub fn clear(&mut self, color: Color) {
        for px in self.canvas.pixels_mut() {
            *px = image::Rgba([color.r, color.g, color.b, color.a]);
        }
    }

    fn blit_quad(
        &mut self,
        pos: Point,
        quad: &crate::drawing::coords::Quad,
        color: Color,
        texture: &Texture,
    ) {
        let src_img = texture.image();
        for dy in 0..quad.dest.height {
            for dx in 0..quad.dest.width {
                let sx = quad.src.x + dx;
                let sy = quad.src.y + dy;
                if sx < 0 || sy < 0 || sx as u32 >= src_img.width() || sy as u32 >= src_img.height()
                {
                    continue;
                }
                let texel = src_img.get_pixel(sx as u32, sy as u32);
                let coverage = texel[3];
                if coverage == 0 {
                    continue;
                }

                let cx = pos.x + quad.dest.x + dx;
                let cy = pos.y + quad.dest.y + dy;
                if cx < 0 || cy < 0 || cx as u32 >= self.canvas.width() || cy as u32 >= self.canvas.height()
                {
                    continue;
                }

                // Tint the premultiplied-white texel, then source-over.
                let tinted = color.tint(coverage);
                let dst = self.canvas.get_pixel_mut(cx as u32, cy as u32);
                let inv = 255 - tinted.a as u16;
                dst[0] = (tinted.r as u16 + dst[0] as u16 * inv / 255) as u8;
                dst[1] = (tinted.g as u16 + dst[1] as u16 * inv / 255) as u8;
                dst[2] = (tinted.b as u16 + dst[2] as u16 * inv / 255) as u8;
                dst[3] = (tinted.a as u16 + dst[3] as u16 * inv / 255) as u8;
            }
        }
    }
}

impl Painter for CpuPainter {
    fn draw_text(&mut self, pos: Point, coords: &CoordsBuffer, color: Color, texture: &Texture) {
        for quad in coords.quads() {
            self.blit_quad(pos, quad, color, texture);
        }
    }

    fn draw_text_colored(
        &mut self,
        pos: Point,
        coords: &CoordsBuffer,
        runs: &[ColorRun],
        texture: &Texture,
    ) {
        for (i, quad) in coords.quads().iter().enumerate() {
            self.blit_quad(pos, quad, run_color(runs, i), texture);
        }
    }
}

// ============================================================================
// Recording painter (test/debug aid)
// ============================================================================

#[derive(Debug, Clone)]
pub enum DrawCall {
    Uniform {
        pos: Point,
        color: Color,
        quad_count: usize,
    },
    Colored {
        pos: Point,
        runs: Vec<ColorRun>,
        quad_count: usize,
    },
}

/// Painter that records draw calls instead of producing pixels.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    pub calls: Vec<DrawCall>,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Painter for RecordingPainter {
    fn draw_text(&mut self, pos: Point, coords: &CoordsBuffer, color: Color, _texture: &Texture) {
        self.calls.push(DrawCall::Uniform {
            pos,
            color,
            quad_count: coords.quads().len(),
        });
    }

    fn draw_text_colored(
        &mut self,
        pos: Point,
        coords: &CoordsBuffer,
        runs: &[ColorRun],
        _texture: &Texture,
    ) {
        self.calls.push(DrawCall::Colored {
            pos,
            runs: runs.to_vec(),
            quad_count: coords.quads().len(),
        });
    }
}
