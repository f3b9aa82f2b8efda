//! Fingerprint-keyed text render cache
//!
//! Maps (font, text, box, alignment) to resolved draw geometry. Entries
//! start Unresolved (per-glyph layout deferred to first draw) unless the
//! whole-string fallback applies, in which case they resolve at creation.
//! The map is split into independently locked shards; a periodic `poll`
//! sweeps one shard per call with a staleness window that tightens as
//! occupancy grows.

use crate::constants::{
    EVICTION_HIGH_OCCUPANCY, EVICTION_MID_OCCUPANCY, EVICTION_MIN_OCCUPANCY,
    EVICTION_WINDOW_HIGH_MS, EVICTION_WINDOW_LOW_MS, EVICTION_WINDOW_MID_MS, FINGERPRINT_MUL,
    FINGERPRINT_SEED, SHARD_COUNT,
};
use crate::drawing::align::Align;
use crate::drawing::coords::CoordsBuffer;
use crate::drawing::geometry::{clip_quad, Point, Rect, Size};
use crate::drawing::painter::{ColorRun, Painter};
use crate::drawing::texture::Texture;
use crate::font::bitmap::BitmapFont;
use crate::font::fallback::rasterize_string_from_bytes;
use crate::font::registry::FontRegistry;
use crate::resources::ResourceStore;
use crate::utils::clock::millis;
use crate::utils::color::Color;
use crate::utils::dispatcher::Dispatcher;
use image::RgbaImage;
use log::warn;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Sentinel fingerprint: "no geometry", produced for invalid requests
/// and ignored by every draw.
pub const NO_TEXT: u64 = 0;

/// Entry payload. The Unresolved fields exist only before resolution;
/// the transition to Resolved is one-way.
enum EntryState {
    Unresolved { font_id: u32, text: String },
    Resolved {
        coords: Arc<CoordsBuffer>,
        texture: Arc<Texture>,
    },
}

struct CacheEntry {
    size: Size,
    align: Align,
    last_use: AtomicU64,
    state: Mutex<EntryState>,
}

impl CacheEntry {
    fn unresolved(font_id: u32, text: &str, size: Size, align: Align) -> Self {
        CacheEntry {
            size,
            align,
            last_use: AtomicU64::new(millis()),
            state: Mutex::new(EntryState::Unresolved {
                font_id,
                text: text.to_string(),
            }),
        }
    }

    fn resolved(size: Size, align: Align, coords: CoordsBuffer, texture: Arc<Texture>) -> Self {
        CacheEntry {
            size,
            align,
            last_use: AtomicU64::new(millis()),
            state: Mutex::new(EntryState::Resolved {
                coords: Arc::new(coords),
                texture,
            }),
        }
    }
}

struct Shard {
    entries: Mutex<HashMap<u64, Arc<CacheEntry>>>,
}

/// Deterministic 64-bit request fingerprint: text bytes folded first,
/// then width, height, alignment bits and font identity, in that order.
/// Identical requests always collide; this is memoization, not
/// cryptography.
fn fingerprint(text: &str, size: Size, align: Align, font_id: u32) -> u64 {
    let mut h = FINGERPRINT_SEED;
    for &b in text.as_bytes() {
        h = h.wrapping_mul(FINGERPRINT_MUL).wrapping_add(b as u64);
    }
    h = h.wrapping_mul(FINGERPRINT_MUL).wrapping_add(size.width as u64);
    h = h.wrapping_mul(FINGERPRINT_MUL).wrapping_add(size.height as u64);
    h = h.wrapping_mul(FINGERPRINT_MUL).wrapping_add(align.bits() as u64);
    h = h.wrapping_mul(FINGERPRINT_MUL).wrapping_add(font_id as u64);
    h
}

/// Place an image of `image_size` inside `box_size` per alignment and
/// clip the resulting quad to the box. None when they don't intersect.
fn aligned_clipped_quad(
    image_size: Size,
    box_size: Size,
    align: Align,
) -> Option<(Rect, Rect)> {
    let dest = Rect::new(
        align.offset_x(box_size.width, image_size.width),
        align.offset_y(box_size.height, image_size.height),
        image_size.width,
        image_size.height,
    );
    let src = Rect::from_size(image_size);
    clip_quad(dest, src, Rect::from_size(box_size))
}

pub struct TextRenderCache {
    registry: Arc<FontRegistry>,
    store: Arc<dyn ResourceStore>,
    dispatcher: Arc<Dispatcher>,
    shards: Vec<Shard>,
    poll_cursor: AtomicUsize,
}

impl TextRenderCache {
    pub fn new(
        registry: Arc<FontRegistry>,
        store: Arc<dyn ResourceStore>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        TextRenderCache {
            registry,
            store,
            dispatcher,
            shards: (0..SHARD_COUNT)
                .map(|_| Shard {
                    entries: Mutex::new(HashMap::new()),
                })
                .collect(),
            poll_cursor: AtomicUsize::new(0),
        }
    }

    fn shard(&self, hash: u64) -> &Shard {
        &self.shards[(hash % SHARD_COUNT as u64) as usize]
    }

    /// Memoize a render request, returning its fingerprint. Invalid
    /// requests (empty text, non-positive box) produce [`NO_TEXT`]. A
    /// hit returns the existing fingerprint without touching the entry;
    /// a miss creates it, resolving immediately when the whole-string
    /// fallback applies.
    pub fn resolve(&self, font: &Arc<BitmapFont>, text: &str, size: Size, align: Align) -> u64 {
        if text.is_empty() || !size.is_valid() {
            return NO_TEXT;
        }
        let hash = fingerprint(text, size, align, font.id());
        let shard = self.shard(hash);
        if shard.entries.lock().unwrap().contains_key(&hash) {
            return hash;
        }

        // Miss: build the entry outside the shard lock; rasterization
        // may be slow and must not block unrelated requests.
        let entry = Arc::new(self.create_entry(font, text, size, align));
        shard.entries.lock().unwrap().entry(hash).or_insert(entry);
        hash
    }

    fn create_entry(
        &self,
        font: &Arc<BitmapFont>,
        text: &str,
        size: Size,
        align: Align,
    ) -> CacheEntry {
        // Fallback eligibility: non-ASCII content and a known vector
        // source. (&str is guaranteed well-formed UTF-8 already.)
        if text.bytes().any(|b| b >= 0x80) {
            if let Some(source) = font.vector_source() {
                match self.store.read(source) {
                    Ok(bytes) => {
                        if let Some(image) = rasterize_string_from_bytes(
                            &bytes,
                            font.name(),
                            font.glyph_height(),
                            text,
                            font.y_offset(),
                        ) {
                            return Self::fallback_entry(image, size, align);
                        }
                    }
                    Err(e) => warn!("vector source unavailable, using glyph path: {}", e),
                }
            }
        }
        CacheEntry::unresolved(font.id(), text, size, align)
    }

    /// Entry for a fallback-rasterized image: one clipped quad, or no
    /// quads at all when the aligned image misses the box entirely.
    fn fallback_entry(image: RgbaImage, size: Size, align: Align) -> CacheEntry {
        let mut texture = Texture::new(image);
        texture.set_smooth(true);
        let texture = Arc::new(texture);

        let mut coords = CoordsBuffer::new();
        if let Some((dest, src)) = aligned_clipped_quad(texture.size(), size, align) {
            coords.add_rect(dest, src);
        }
        CacheEntry::resolved(size, align, coords, texture)
    }

    /// Look up an entry, refresh its `last_use`, and resolve it if this
    /// is its first draw. The shard lock is held only long enough to
    /// copy out the handle; layout runs on the caller's thread against
    /// the entry's own lock. Returns the frozen geometry.
    fn resolve_entry(&self, hash: u64) -> Option<(Arc<CoordsBuffer>, Arc<Texture>)> {
        if hash == NO_TEXT {
            return None;
        }
        let shard = self.shard(hash);
        let entry = shard.entries.lock().unwrap().get(&hash).cloned()?;

        // Refresh before any slow work so a concurrent poll treats the
        // entry as live while we resolve it.
        entry.last_use.store(millis(), Ordering::Relaxed);

        let mut state = entry.state.lock().unwrap();
        match &*state {
            EntryState::Resolved { coords, texture } => Some((coords.clone(), texture.clone())),
            EntryState::Unresolved { font_id, text } => {
                let font = match self.registry.font_by_id(*font_id) {
                    Some(font) => font,
                    None => {
                        // The font was removed from the registry; the
                        // entry can never resolve.
                        drop(state);
                        shard.entries.lock().unwrap().remove(&hash);
                        return None;
                    }
                };
                let coords = Arc::new(font.compute_draw_coords(
                    text,
                    Rect::from_size(entry.size),
                    entry.align,
                ));
                let texture = font.texture().clone();
                *state = EntryState::Resolved {
                    coords: coords.clone(),
                    texture: texture.clone(),
                };
                Some((coords, texture))
            }
        }
    }

    /// Draw a cached entry at `pos`, resolving it on first use. Absent
    /// fingerprints are a no-op. The optional shadow is the same
    /// geometry in solid black, offset +1,+1, beneath the primary pass.
    pub fn draw(
        &self,
        painter: &mut dyn Painter,
        pos: Point,
        hash: u64,
        color: Color,
        shadow: bool,
    ) {
        if !self.dispatcher.is_owner() {
            warn!("draw called off the rendering thread, ignored");
            return;
        }
        let Some((coords, texture)) = self.resolve_entry(hash) else {
            return;
        };
        if shadow {
            painter.draw_text(pos.translated(1, 1), &coords, Color::BLACK, &texture);
        }
        painter.draw_text(pos, &coords, color, &texture);
    }

    /// Resolve-and-draw convenience for one-shot callers.
    pub fn draw_text(
        &self,
        painter: &mut dyn Painter,
        rect: Rect,
        text: &str,
        font: &Arc<BitmapFont>,
        color: Color,
        align: Align,
        shadow: bool,
    ) {
        let hash = self.resolve(font, text, rect.size(), align);
        self.draw(painter, Point::new(rect.x, rect.y), hash, color, shadow);
    }

    /// Draw with per-glyph-run colors. An empty run list degenerates to
    /// a plain white draw. Entries resolved through the whole-string
    /// fallback are a single quad, so per-run tinting is impossible
    /// there; the first run's color applies uniformly.
    pub fn draw_colored(
        &self,
        painter: &mut dyn Painter,
        pos: Point,
        hash: u64,
        runs: &[ColorRun],
        shadow: bool,
    ) {
        if runs.is_empty() {
            return self.draw(painter, pos, hash, Color::WHITE, shadow);
        }
        if !self.dispatcher.is_owner() {
            warn!("draw_colored called off the rendering thread, ignored");
            return;
        }
        let Some((coords, texture)) = self.resolve_entry(hash) else {
            return;
        };
        if shadow {
            painter.draw_text(pos.translated(1, 1), &coords, Color::BLACK, &texture);
        }
        if coords.vertex_count() == 6 {
            painter.draw_text(pos, &coords, runs[0].color, &texture);
        } else {
            painter.draw_text_colored(pos, &coords, runs, &texture);
        }
    }

    /// Advance the eviction sweep by one shard. Shards under 100 live
    /// entries are skipped; otherwise the staleness window shrinks with
    /// occupancy so eviction aggressiveness scales with pressure.
    pub fn poll(&self) {
        let idx = self.poll_cursor.fetch_add(1, Ordering::Relaxed) % SHARD_COUNT;
        let mut entries = self.shards[idx].entries.lock().unwrap();
        if entries.len() < EVICTION_MIN_OCCUPANCY {
            return;
        }
        let window = if entries.len() > EVICTION_HIGH_OCCUPANCY {
            EVICTION_WINDOW_HIGH_MS
        } else if entries.len() > EVICTION_MID_OCCUPANCY {
            EVICTION_WINDOW_MID_MS
        } else {
            EVICTION_WINDOW_LOW_MS
        };
        let cutoff = millis().saturating_sub(window);
        entries.retain(|_, e| e.last_use.load(Ordering::Relaxed) >= cutoff);
    }

    /// Total live entries across all shards.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.entries.lock().unwrap().len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.entries.lock().unwrap().clear();
        }
    }
}
