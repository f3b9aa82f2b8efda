//! Bitmap-atlas-backed font resource
//!
//! A `BitmapFont` pairs an atlas texture with its tile grid and derived
//! metrics, and lays out text into textured quads. Glyph advance widths
//! are not stored in the descriptor; they are measured once at load time
//! by scanning each tile's non-transparent columns.

use crate::drawing::align::Align;
use crate::drawing::coords::CoordsBuffer;
use crate::drawing::geometry::{clip_quad, Rect, Size};
use crate::drawing::texture::Texture;
use crate::error::{Error, Result};
use crate::font::descriptor::FontDescriptor;
use log::debug;
use std::sync::Arc;

pub struct BitmapFont {
    /// Stable numeric identity used in render fingerprints
    id: u32,
    name: String,
    texture: Arc<Texture>,
    tile_width: i32,
    tile_height: i32,
    columns: i32,
    first_glyph: u32,
    last_glyph: u32,
    glyph_height: i32,
    space_width: i32,
    y_offset: i32,
    underline_offset: i32,
    spacing_x: i32,
    spacing_y: i32,
    /// Ink width per glyph in range, scanned from the atlas
    glyph_widths: Vec<i32>,
    /// Vector source path when packed from a TTF; enables the
    /// whole-string fallback path
    vector_source: Option<String>,
}

impl BitmapFont {
    /// Empty placeholder font: draws nothing, but keeps every lookup
    /// usable before any real font is imported.
    pub fn placeholder(name: &str) -> Self {
        BitmapFont {
            id: 0,
            name: name.to_string(),
            texture: Arc::new(Texture::new(image::RgbaImage::new(1, 1))),
            tile_width: 0,
            tile_height: 0,
            columns: 0,
            first_glyph: 1,
            last_glyph: 0,
            glyph_height: 0,
            space_width: 0,
            y_offset: 0,
            underline_offset: 0,
            spacing_x: 0,
            spacing_y: 0,
            glyph_widths: Vec::new(),
            vector_source: None,
        }
    }

    /// Build from a parsed descriptor and its loaded atlas texture.
    /// The glyph range is derived from the texture and tile dimensions.
    pub fn from_descriptor(
        id: u32,
        desc: &FontDescriptor,
        texture: Arc<Texture>,
    ) -> Result<Self> {
        let [tile_w, tile_h] = desc.glyph_size;
        if tile_w == 0 || tile_h == 0 {
            return Err(Error::Parse(format!(
                "font '{}' has a degenerate glyph size",
                desc.name
            )));
        }
        let tex = texture.size();
        let columns = (tex.width / tile_w as i32).max(1);
        let rows = (tex.height / tile_h as i32).max(1);
        let glyph_count = (columns * rows) as u32;
        let last_glyph = desc.first_glyph + glyph_count - 1;

        let mut font = BitmapFont {
            id,
            name: desc.name.clone(),
            texture,
            tile_width: tile_w as i32,
            tile_height: tile_h as i32,
            columns,
            first_glyph: desc.first_glyph,
            last_glyph,
            glyph_height: desc.height as i32,
            space_width: desc.space_width as i32,
            y_offset: desc.y_offset,
            underline_offset: desc.underline_offset as i32,
            spacing_x: desc.spacing[0],
            spacing_y: desc.spacing[1],
            glyph_widths: Vec::new(),
            vector_source: desc.source.clone(),
        };
        font.measure_glyph_widths();
        debug!(
            "font '{}' loaded: {} glyphs, tile {}x{}, glyph height {}",
            font.name, glyph_count, tile_w, tile_h, font.glyph_height
        );
        Ok(font)
    }

    /// Scan each tile for its rightmost non-transparent column. The ink
    /// width becomes the glyph's advance base.
    fn measure_glyph_widths(&mut self) {
        let img = self.texture.image();
        let count = (self.last_glyph - self.first_glyph + 1) as usize;
        self.glyph_widths = vec![0; count];

        for i in 0..count {
            let tile_x = (i as i32 % self.columns) * self.tile_width;
            let tile_y = (i as i32 / self.columns) * self.tile_height;
            let mut width = 0i32;
            for x in 0..self.tile_width {
                let px = tile_x + x;
                if px < 0 || px as u32 >= img.width() {
                    break;
                }
                for y in 0..self.tile_height {
                    let py = tile_y + y;
                    if py < 0 || py as u32 >= img.height() {
                        break;
                    }
                    if img.get_pixel(px as u32, py as u32)[3] > 0 {
                        width = x + 1;
                        break;
                    }
                }
            }
            self.glyph_widths[i] = width;
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    pub fn glyph_height(&self) -> i32 {
        self.glyph_height
    }

    pub fn space_width(&self) -> i32 {
        self.space_width
    }

    pub fn y_offset(&self) -> i32 {
        self.y_offset
    }

    pub fn underline_offset(&self) -> i32 {
        self.underline_offset
    }

    pub fn vector_source(&self) -> Option<&str> {
        self.vector_source.as_deref()
    }

    fn in_range(&self, cp: u32) -> bool {
        cp >= self.first_glyph && cp <= self.last_glyph
    }

    /// Map a codepoint to a drawable glyph: out-of-range codepoints
    /// degrade to '?' when that is in range, otherwise None.
    fn drawable_glyph(&self, cp: u32) -> Option<u32> {
        if self.in_range(cp) {
            Some(cp)
        } else if self.in_range('?' as u32) {
            Some('?' as u32)
        } else {
            None
        }
    }

    fn glyph_width(&self, cp: u32) -> i32 {
        self.glyph_widths[(cp - self.first_glyph) as usize]
    }

    /// Texture-space rect of a glyph: its tile position, sized to the
    /// glyph's ink width and the font's glyph height.
    fn glyph_src_rect(&self, cp: u32) -> Rect {
        let i = (cp - self.first_glyph) as i32;
        Rect::new(
            (i % self.columns) * self.tile_width,
            (i / self.columns) * self.tile_height,
            self.glyph_width(cp),
            self.glyph_height,
        )
    }

    /// Advance widths of each `\n`-separated line, and the full block
    /// height including inter-line spacing.
    fn measure_lines(&self, text: &str) -> (Vec<i32>, i32) {
        let mut widths = vec![0i32];
        for ch in text.chars() {
            match ch {
                '\n' => widths.push(0),
                ' ' => *widths.last_mut().unwrap() += self.space_width + self.spacing_x,
                _ => {
                    if let Some(cp) = self.drawable_glyph(ch as u32) {
                        *widths.last_mut().unwrap() += self.glyph_width(cp) + self.spacing_x;
                    }
                }
            }
        }
        let lines = widths.len() as i32;
        let height = lines * self.glyph_height + (lines - 1) * self.spacing_y;
        (widths, height)
    }

    /// Size of the text block this font would lay out.
    pub fn measure_text(&self, text: &str) -> Size {
        let (widths, height) = self.measure_lines(text);
        Size::new(widths.into_iter().max().unwrap_or(0), height)
    }

    /// Lay out `text` inside `rect` with the given alignment, emitting
    /// one clipped quad per visible glyph.
    pub fn compute_draw_coords(&self, text: &str, rect: Rect, align: Align) -> CoordsBuffer {
        let mut coords = CoordsBuffer::new();
        if self.glyph_height <= 0 || self.last_glyph < self.first_glyph {
            return coords;
        }

        let (line_widths, block_height) = self.measure_lines(text);
        let block_y = align.offset_y(rect.height, block_height);

        let mut line = 0usize;
        let mut pen_x = align.offset_x(rect.width, line_widths[0]);
        let mut pen_y = block_y;

        for ch in text.chars() {
            match ch {
                '\n' => {
                    line += 1;
                    pen_x = align.offset_x(rect.width, line_widths[line]);
                    pen_y += self.glyph_height + self.spacing_y;
                }
                ' ' => pen_x += self.space_width + self.spacing_x,
                _ => {
                    let cp = match self.drawable_glyph(ch as u32) {
                        Some(cp) => cp,
                        None => continue,
                    };
                    let w = self.glyph_width(cp);
                    if w > 0 {
                        let dest = Rect::new(
                            rect.x + pen_x,
                            rect.y + pen_y,
                            w,
                            self.glyph_height,
                        );
                        if let Some((d, s)) = clip_quad(dest, self.glyph_src_rect(cp), rect) {
                            coords.add_rect(d, s);
                        }
                    }
                    pen_x += w + self.spacing_x;
                }
            }
        }
        coords
    }
}

impl std::fmt::Debug for BitmapFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitmapFont")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("range", &(self.first_glyph..=self.last_glyph))
            .finish()
    }
}
