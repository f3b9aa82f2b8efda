//! Tiled glyph atlas packing
//!
//! Turns a vector font plus layout parameters into a fixed-column bitmap
//! atlas and derived metrics. Tiles are laid out row-major over a
//! 16-column grid starting at the first codepoint of the range; coverage
//! is composed as premultiplied white.

use crate::constants::{ATLAS_COLUMNS, MIN_SPACE_WIDTH};
use crate::error::{Error, Result};
use crate::font::raster::{blit_coverage_white, FamilyMetrics, FontdueRasterizer, GlyphRasterizer};
use image::RgbaImage;
use log::{debug, info};

/// Layout parameters for one atlas build
#[derive(Debug, Clone, Copy)]
pub struct PackParams {
    pub pixel_height: i32,
    /// First codepoint of the packed range (inclusive)
    pub first_glyph: u32,
    /// Last codepoint of the packed range (inclusive)
    pub last_glyph: u32,
    pub spacing_x: i32,
    pub spacing_y: i32,
    pub y_offset: i32,
    /// Space advance in pixels; 0 = auto-measure from the font
    pub space_width: i32,
}

/// Transient atlas build output; ownership moves into the persisted
/// descriptor + texture.
pub struct AtlasBuildResult {
    pub image: RgbaImage,
    pub tile_width: u32,
    pub tile_height: u32,
    pub glyph_height: u32,
    pub y_offset: i32,
    pub space_width: u32,
    pub underline_offset: u32,
}

/// Pack a glyph range into a tiled atlas. Fails cleanly on non-positive
/// pixel height or an empty codepoint range; nothing is persisted here.
pub fn pack_atlas(
    raster: &dyn GlyphRasterizer,
    name: &str,
    params: &PackParams,
) -> Result<AtlasBuildResult> {
    if params.pixel_height <= 0 {
        return Err(Error::Rasterization(format!(
            "'{}': pixel height {} must be positive",
            name, params.pixel_height
        )));
    }
    if params.last_glyph < params.first_glyph {
        return Err(Error::Rasterization(format!(
            "'{}': empty codepoint range {}..{}",
            name, params.first_glyph, params.last_glyph
        )));
    }
    let glyph_count = params.last_glyph - params.first_glyph + 1;
    let px = params.pixel_height as f32;

    let fm = raster
        .family_metrics(px)
        .unwrap_or_else(|| FamilyMetrics::approximate(px));

    // Widest bounding box across the range sizes the tiles.
    let mut max_glyph_w = 0u32;
    for cp in params.first_glyph..=params.last_glyph {
        if let Some(ch) = char::from_u32(cp) {
            max_glyph_w = max_glyph_w.max(raster.measure(ch, px).width);
        }
    }
    let measured_space = raster.measure(' ', px).advance;

    let pad_x = params.spacing_x.max(1) as u32;
    let pad_y = params.spacing_y.max(0) as u32;
    let columns = ATLAS_COLUMNS;
    let rows = (glyph_count + columns - 1) / columns;
    let tile_width = (params.pixel_height as u32).max(max_glyph_w) + pad_x * 2;
    let tile_height = fm.line_spacing.ceil() as u32 + pad_y * 2;
    let atlas_width = columns * tile_width;
    let atlas_height = rows * tile_height;

    debug!(
        "packing '{}': {} glyphs, {}x{} tiles, atlas {}x{}",
        name, glyph_count, tile_width, tile_height, atlas_width, atlas_height
    );

    let mut image = RgbaImage::new(atlas_width, atlas_height);
    for i in 0..glyph_count {
        let cp = params.first_glyph + i;
        let ch = match char::from_u32(cp) {
            Some(ch) => ch,
            None => continue,
        };
        let (m, cov) = raster.rasterize_glyph(ch, px);
        if cov.is_empty() {
            continue;
        }
        let tile_x = ((i % columns) * tile_width) as i32;
        let tile_y = ((i / columns) * tile_height) as i32;
        // Layout origin of the tile is its top-left padding corner; the
        // baseline sits ascent below it.
        let baseline = tile_y + pad_y as i32 + params.y_offset + fm.ascent.ceil() as i32;
        let gx = tile_x + pad_x as i32 + m.xmin;
        let gy = baseline - m.ymin - m.height as i32;
        blit_coverage_white(&mut image, &cov, gx, gy);
    }

    let space_width = if params.space_width > 0 {
        params.space_width as u32
    } else {
        MIN_SPACE_WIDTH.max(measured_space.ceil() as u32)
    };

    info!(
        "atlas '{}' packed: {}x{}, {} glyphs, space width {}",
        name, atlas_width, atlas_height, glyph_count, space_width
    );

    Ok(AtlasBuildResult {
        image,
        tile_width,
        tile_height,
        glyph_height: fm.glyph_height(),
        y_offset: params.y_offset,
        space_width,
        underline_offset: (params.pixel_height / 6).max(1) as u32,
    })
}

/// Parse vector font bytes and pack. The usual entry point for imports.
pub fn pack_atlas_from_bytes(
    bytes: &[u8],
    name: &str,
    params: &PackParams,
) -> Result<AtlasBuildResult> {
    let raster = FontdueRasterizer::from_bytes(bytes, name)?;
    pack_atlas(&raster, name, params)
}
