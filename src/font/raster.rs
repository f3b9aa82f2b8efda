//! Vector glyph rasterization service
//!
//! Thin seam over the vector engine (fontdue): measure a glyph, rasterize
//! a glyph or a run of text to a coverage bitmap, query family line
//! metrics. The atlas packer and fallback rasterizer consume this trait,
//! which keeps them testable against a deterministic stub.

use crate::error::{Error, Result};
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use log::debug;

/// Pixel-scaled line metrics for a font family
#[derive(Debug, Clone, Copy)]
pub struct FamilyMetrics {
    /// Distance from baseline to the top of the tallest glyph (positive)
    pub ascent: f32,
    /// Distance from baseline to the bottom of the lowest glyph (positive)
    pub descent: f32,
    /// Baseline-to-baseline distance for consecutive lines
    pub line_spacing: f32,
}

impl FamilyMetrics {
    /// Fallback when the font exposes no usable em square:
    /// ascent 0.8·height, descent 0.2·height, line spacing = height.
    pub fn approximate(pixel_height: f32) -> Self {
        FamilyMetrics {
            ascent: pixel_height * 0.8,
            descent: pixel_height * 0.2,
            line_spacing: pixel_height,
        }
    }

    /// Rounded-up glyph cell height: ascent + descent
    pub fn glyph_height(&self) -> u32 {
        (self.ascent + self.descent).ceil() as u32
    }
}

/// Placement metrics for one rasterized glyph
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphMetrics {
    /// Tight bounding-box width in pixels
    pub width: u32,
    /// Tight bounding-box height in pixels
    pub height: u32,
    /// Horizontal offset of the bitmap's left edge from the pen position
    pub xmin: i32,
    /// Vertical offset of the bitmap's bottom edge from the baseline
    /// (positive = above baseline)
    pub ymin: i32,
    /// Horizontal advance to the next pen position
    pub advance: f32,
}

/// Alpha-only rendering of glyph shapes, row-major, one byte per pixel
#[derive(Debug, Clone, Default)]
pub struct Coverage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Coverage {
    pub fn new(width: u32, height: u32) -> Self {
        Coverage {
            width,
            height,
            data: vec![0; (width * height) as usize],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Max-combine `other` into self at (x, y), clipped to bounds.
    pub fn blit(&mut self, other: &Coverage, x: i32, y: i32) {
        for sy in 0..other.height as i32 {
            let dy = y + sy;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..other.width as i32 {
                let dx = x + sx;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let src = other.data[(sy as u32 * other.width + sx as u32) as usize];
                let dst = &mut self.data[(dy as u32 * self.width + dx as u32) as usize];
                *dst = (*dst).max(src);
            }
        }
    }
}

/// Composite a coverage bitmap into an RGBA image at (x, y) as
/// premultiplied white: RGB 255 with alpha = coverage, fully
/// transparent where coverage is zero.
pub fn blit_coverage_white(img: &mut RgbaImage, cov: &Coverage, x: i32, y: i32) {
    for sy in 0..cov.height as i32 {
        let dy = y + sy;
        if dy < 0 || dy >= img.height() as i32 {
            continue;
        }
        for sx in 0..cov.width as i32 {
            let dx = x + sx;
            if dx < 0 || dx >= img.width() as i32 {
                continue;
            }
            let a = cov.data[(sy as u32 * cov.width + sx as u32) as usize];
            if a > 0 {
                img.put_pixel(dx as u32, dy as u32, Rgba([255, 255, 255, a]));
            }
        }
    }
}

/// The external vector-glyph engine: font bytes + codepoint + pixel
/// height in, coverage bitmaps and metrics out.
pub trait GlyphRasterizer: Send + Sync {
    /// Family line metrics at the given pixel height; None when the
    /// font exposes no usable em square (caller approximates).
    fn family_metrics(&self, pixel_height: f32) -> Option<FamilyMetrics>;

    /// Bounding-box and advance for one codepoint, without rasterizing.
    fn measure(&self, codepoint: char, pixel_height: f32) -> GlyphMetrics;

    /// Coverage bitmap plus metrics for one codepoint.
    fn rasterize_glyph(&self, codepoint: char, pixel_height: f32) -> (GlyphMetrics, Coverage);

    /// Rasterize one line of text to a single coverage image, glyphs
    /// placed along the baseline by their advances.
    fn rasterize_run(&self, text: &str, pixel_height: f32) -> Coverage {
        let fm = self
            .family_metrics(pixel_height)
            .unwrap_or_else(|| FamilyMetrics::approximate(pixel_height));

        let width = self.measure_run(text, pixel_height).max(1);
        let height = fm.glyph_height().max(1);
        let baseline = fm.ascent.ceil() as i32;

        let mut out = Coverage::new(width, height);
        let mut pen = 0.0f32;
        for ch in text.chars() {
            let (m, cov) = self.rasterize_glyph(ch, pixel_height);
            if !cov.is_empty() {
                let gx = pen.round() as i32 + m.xmin;
                let gy = baseline - m.ymin - m.height as i32;
                out.blit(&cov, gx, gy);
            }
            pen += m.advance;
        }
        out
    }

    /// Pixel width of a run: advances summed, rounded up.
    fn measure_run(&self, text: &str, pixel_height: f32) -> u32 {
        let w: f32 = text
            .chars()
            .map(|ch| self.measure(ch, pixel_height).advance)
            .sum();
        w.ceil() as u32
    }
}

// ============================================================================
// fontdue implementation
// ============================================================================

/// Production rasterizer wrapping a parsed `fontdue::Font`.
pub struct FontdueRasterizer {
    font: Font,
}

impl FontdueRasterizer {
    /// Parse vector font bytes. Fails cleanly on empty or unparsable
    /// data, or when the buffer holds zero usable glyphs.
    pub fn from_bytes(bytes: &[u8], name: &str) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::Rasterization(format!("'{}': empty font data", name)));
        }
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| Error::Rasterization(format!("'{}': {}", name, e)))?;
        if font.glyph_count() == 0 {
            return Err(Error::Rasterization(format!(
                "'{}': no usable glyphs in font data",
                name
            )));
        }
        debug!("vector font '{}' parsed, {} glyphs", name, font.glyph_count());
        Ok(FontdueRasterizer { font })
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn family_metrics(&self, pixel_height: f32) -> Option<FamilyMetrics> {
        self.font
            .horizontal_line_metrics(pixel_height)
            .map(|m| FamilyMetrics {
                ascent: m.ascent,
                // fontdue reports descent as a negative offset
                descent: -m.descent,
                line_spacing: m.new_line_size,
            })
    }

    fn measure(&self, codepoint: char, pixel_height: f32) -> GlyphMetrics {
        let m = self.font.metrics(codepoint, pixel_height);
        GlyphMetrics {
            width: m.width as u32,
            height: m.height as u32,
            xmin: m.xmin,
            ymin: m.ymin,
            advance: m.advance_width,
        }
    }

    fn rasterize_glyph(&self, codepoint: char, pixel_height: f32) -> (GlyphMetrics, Coverage) {
        let (m, data) = self.font.rasterize(codepoint, pixel_height);
        let metrics = GlyphMetrics {
            width: m.width as u32,
            height: m.height as u32,
            xmin: m.xmin,
            ymin: m.ymin,
            advance: m.advance_width,
        };
        let cov = Coverage {
            width: m.width as u32,
            height: m.height as u32,
            data,
        };
        (metrics, cov)
    }
}

// ============================================================================
// Deterministic stub for crate-internal tests
// ============================================================================

#[cfg(test)]
pub(crate) mod stub {
    use super::*;

    /// Fake engine: every glyph is a filled box whose width depends on
    /// the codepoint, so layout results are predictable.
    pub struct StubRasterizer {
        pub ascent: f32,
        pub descent: f32,
        pub line_spacing: f32,
        /// When false, family_metrics returns None (em square missing)
        pub have_family_metrics: bool,
        pub space_advance: f32,
    }

    impl Default for StubRasterizer {
        fn default() -> Self {
            StubRasterizer {
                ascent: 8.0,
                descent: 2.0,
                line_spacing: 12.0,
                have_family_metrics: true,
                space_advance: 4.5,
            }
        }
    }

    impl StubRasterizer {
        pub fn glyph_width(codepoint: char) -> u32 {
            4 + (codepoint as u32 % 5)
        }
    }

    impl GlyphRasterizer for StubRasterizer {
        fn family_metrics(&self, _pixel_height: f32) -> Option<FamilyMetrics> {
            self.have_family_metrics.then_some(FamilyMetrics {
                ascent: self.ascent,
                descent: self.descent,
                line_spacing: self.line_spacing,
            })
        }

        fn measure(&self, codepoint: char, _pixel_height: f32) -> GlyphMetrics {
            if codepoint == ' ' {
                return GlyphMetrics {
                    advance: self.space_advance,
                    ..Default::default()
                };
            }
            let w = Self::glyph_width(codepoint);
            GlyphMetrics {
                width: w,
                height: 6,
                xmin: 0,
                ymin: 0,
                advance: (w + 1) as f32,
            }
        }

        fn rasterize_glyph(&self, codepoint: char, pixel_height: f32) -> (GlyphMetrics, Coverage) {
            let m = self.measure(codepoint, pixel_height);
            let mut cov = Coverage::new(m.width, m.height);
            cov.data.fill(255);
            (m, cov)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stub::StubRasterizer;
    use super::*;

    #[test]
    fn test_approximate_metrics() {
        let fm = FamilyMetrics::approximate(20.0);
        assert_eq!(fm.ascent, 16.0);
        assert_eq!(fm.descent, 4.0);
        assert_eq!(fm.line_spacing, 20.0);
        assert_eq!(fm.glyph_height(), 20);
    }

    #[test]
    fn test_coverage_blit_clips_and_maxes() {
        let mut base = Coverage::new(4, 4);
        let mut patch = Coverage::new(2, 2);
        patch.data.fill(100);

        base.blit(&patch, 3, 3); // only (3,3) lands inside
        assert_eq!(base.data[15], 100);

        let mut brighter = Coverage::new(2, 2);
        brighter.data.fill(200);
        base.blit(&brighter, 3, 3);
        assert_eq!(base.data[15], 200);

        base.blit(&patch, 3, 3); // dimmer patch must not lower it
        assert_eq!(base.data[15], 200);
    }

    #[test]
    fn test_blit_coverage_white_skips_zero() {
        let mut img = RgbaImage::new(2, 1);
        let cov = Coverage {
            width: 2,
            height: 1,
            data: vec![0, 128],
        };
        blit_coverage_white(&mut img, &cov, 0, 0);
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(img.get_pixel(1, 0), &Rgba([255, 255, 255, 128]));
    }

    #[test]
    fn test_run_dimensions_follow_metrics() {
        let stub = StubRasterizer::default();
        let cov = stub.rasterize_run("ab", 10.0);
        assert_eq!(cov.height, 10); // ceil(8 + 2)
        let expected_w = StubRasterizer::glyph_width('a')
            + 1
            + StubRasterizer::glyph_width('b')
            + 1;
        assert_eq!(cov.width, expected_w);
        assert!(cov.data.iter().any(|&a| a > 0));
    }

    #[test]
    fn test_fontdue_rejects_garbage() {
        assert!(FontdueRasterizer::from_bytes(&[], "empty").is_err());
        assert!(FontdueRasterizer::from_bytes(b"not a font", "garbage").is_err());
    }
}
