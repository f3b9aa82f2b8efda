//! End-to-end pipeline test: descriptor import -> registry lookup ->
//! render cache -> CPU painter, over an in-memory resource store.

use std::io::Cursor;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use textforge::{
    Align, Color, CpuPainter, Dispatcher, FontRegistry, MemStore, Point, Rect, ResourceStore,
    Size, TextRenderCache, NO_TEXT,
};

/// 16x2 grid of 8x8 tiles covering codepoints 32..=63; every printable
/// tile gets a solid 4x6 ink box.
fn seed_bitmap_font(store: &MemStore, name: &str) {
    let mut img = RgbaImage::new(128, 16);
    for i in 1..32u32 {
        let tx = (i % 16) * 8;
        let ty = (i / 16) * 8;
        for y in 0..6 {
            for x in 0..4 {
                img.put_pixel(tx + x, ty + y, Rgba([255, 255, 255, 255]));
            }
        }
    }
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .unwrap();
    store.write(&format!("fonts/{}.png", name), &png).unwrap();

    let descriptor = format!(
        "name = \"{name}\"\n\
         texture = \"fonts/{name}.png\"\n\
         height = 6\n\
         glyph-size = [8, 8]\n\
         space-width = 3\n\
         spacing = [1, 0]\n"
    );
    store
        .write(&format!("fonts/{}.otfont", name), descriptor.as_bytes())
        .unwrap();
}

fn setup() -> (Arc<FontRegistry>, TextRenderCache, Arc<MemStore>) {
    let store = Arc::new(MemStore::new());
    let dispatcher = Arc::new(Dispatcher::new());
    let registry = FontRegistry::new(store.clone(), dispatcher.clone());
    seed_bitmap_font(&store, "ui");
    registry.import("fonts/ui.otfont");
    let cache = TextRenderCache::new(registry.clone(), store.clone(), dispatcher);
    (registry, cache, store)
}

#[test]
fn test_import_resolve_draw_pipeline() {
    let (registry, cache, _store) = setup();
    assert!(registry.exists("ui"));
    let font = registry.get("ui");

    let hash = cache.resolve(&font, "!!", Size::new(40, 10), Align::TOP_LEFT);
    assert_ne!(hash, NO_TEXT);

    let mut painter = CpuPainter::new(40, 10);
    cache.draw(&mut painter, Point::new(0, 0), hash, Color::rgb(255, 0, 0), false);

    let canvas = painter.canvas();
    // First glyph covers x 0..4; second starts at x 5 (width 4 + 1 spacing).
    assert_eq!(canvas.get_pixel(0, 0)[0], 255);
    assert_eq!(canvas.get_pixel(4, 0)[3], 0); // gap between glyphs
    assert_eq!(canvas.get_pixel(5, 0)[0], 255);
    assert_eq!(canvas.get_pixel(0, 0)[1], 0); // red tint, not white
}

#[test]
fn test_shadow_pass_offsets_black_ink() {
    let (registry, cache, _store) = setup();
    let font = registry.get("ui");
    let hash = cache.resolve(&font, "!", Size::new(20, 10), Align::TOP_LEFT);

    let mut painter = CpuPainter::new(20, 10);
    cache.draw(&mut painter, Point::new(0, 0), hash, Color::WHITE, true);

    let canvas = painter.canvas();
    // (4, 6) is outside the white glyph box but inside its +1,+1 shadow.
    assert_eq!(canvas.get_pixel(4, 6)[3], 255);
    assert_eq!(canvas.get_pixel(4, 6)[0], 0);
    // (0, 0) is glyph ink painted white over the shadow.
    assert_eq!(canvas.get_pixel(0, 0)[0], 255);
}

#[test]
fn test_missing_font_name_falls_back_to_default() {
    let (registry, cache, _store) = setup();
    let fallback = registry.get("no-such-font");
    assert_eq!(fallback.name(), "ui");

    // The fingerprint still keys off the resolved (default) font, so
    // drawing works transparently.
    let hash = cache.resolve(&fallback, "!", Size::new(20, 10), Align::TOP_LEFT);
    assert_ne!(hash, NO_TEXT);
}

#[test]
fn test_reimport_replaces_font_for_new_requests() {
    let (registry, cache, store) = setup();
    let old = registry.get("ui");
    let h1 = cache.resolve(&old, "!", Size::new(20, 10), Align::TOP_LEFT);

    seed_bitmap_font(&store, "ui");
    registry.import("fonts/ui.otfont");
    let new = registry.get("ui");

    // Same request against the replaced font gets a fresh fingerprint:
    // font identity participates in the hash.
    let h2 = cache.resolve(&new, "!", Size::new(20, 10), Align::TOP_LEFT);
    assert_ne!(h1, h2);
}

#[test]
fn test_stale_entry_for_removed_font_draws_nothing() {
    let (registry, cache, _store) = setup();
    let font = registry.get("ui");
    let hash = cache.resolve(&font, "!", Size::new(20, 10), Align::TOP_LEFT);

    registry.clear();

    let mut painter = CpuPainter::new(20, 10);
    cache.draw(&mut painter, Point::new(0, 0), hash, Color::WHITE, false);
    assert!(painter.canvas().pixels().all(|p| p[3] == 0));
    assert!(cache.is_empty());
}

#[test]
fn test_alignment_places_text_in_box() {
    let (registry, cache, _store) = setup();
    let font = registry.get("ui");
    // '!' advance is 5; bottom-right corner of a 20x10 box.
    let hash = cache.resolve(
        &font,
        "!",
        Size::new(20, 10),
        Align::RIGHT | Align::BOTTOM,
    );

    let mut painter = CpuPainter::new(20, 10);
    cache.draw(&mut painter, Point::new(0, 0), hash, Color::WHITE, false);

    let canvas = painter.canvas();
    assert_eq!(canvas.get_pixel(15, 4)[3], 255); // x = 20-5, y = 10-6
    assert_eq!(canvas.get_pixel(0, 0)[3], 0);
}
