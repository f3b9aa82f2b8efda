//! Whole-string fallback rasterization
//!
//! When bitmap-atlas coverage cannot represent a string (non-Latin
//! codepoints), the entire multi-line string is rasterized to one image
//! and drawn as a single quad.

use crate::font::raster::{
    blit_coverage_white, FamilyMetrics, FontdueRasterizer, GlyphRasterizer,
};
use image::RgbaImage;
use log::warn;

/// Rasterize a multi-line string into one premultiplied-white image.
/// Returns None when the pixel height is non-positive or the text is
/// empty.
pub fn rasterize_string(
    raster: &dyn GlyphRasterizer,
    pixel_height: i32,
    text: &str,
    y_offset: i32,
) -> Option<RgbaImage> {
    if pixel_height <= 0 || text.is_empty() {
        return None;
    }
    let px = pixel_height as f32;
    let fm = raster
        .family_metrics(px)
        .unwrap_or_else(|| FamilyMetrics::approximate(px));

    let lines: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let line_height = (fm.line_spacing.ceil() as u32).max(1);

    let width = lines
        .iter()
        .map(|line| raster.measure_run(line, px))
        .max()
        .unwrap_or(0)
        .max(1);
    let height = line_height * lines.len().max(1) as u32;

    let mut image = RgbaImage::new(width, height);
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let cov = raster.rasterize_run(line, px);
        let y = i as i32 * line_height as i32 + y_offset;
        blit_coverage_white(&mut image, &cov, 0, y);
    }
    Some(image)
}

/// Parse font bytes and rasterize; logs and returns None when the
/// vector engine rejects the data.
pub fn rasterize_string_from_bytes(
    bytes: &[u8],
    name: &str,
    pixel_height: i32,
    text: &str,
    y_offset: i32,
) -> Option<RgbaImage> {
    if bytes.is_empty() {
        return None;
    }
    let raster = match FontdueRasterizer::from_bytes(bytes, name) {
        Ok(r) => r,
        Err(e) => {
            warn!("fallback rasterization unavailable: {}", e);
            return None;
        }
    };
    rasterize_string(&raster, pixel_height, text, y_offset)
}
