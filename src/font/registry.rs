//! Named font registry
//!
//! Owns every `BitmapFont` in the process, keeps one default, and
//! converges both import entry points (descriptor document, vector
//! source) on a single registration path. Lookups never fail: a missing
//! name logs and falls back to the default font.
//!
//! Registry mutation touches GPU-facing textures and is confined to the
//! dispatcher's owning thread; off-thread imports enqueue themselves.

use crate::constants::{
    ATLAS_TEXTURE_SUFFIX, DEFAULT_FIRST_GLYPH, DEFAULT_LAST_GLYPH, GENERATED_FONTS_DIR,
};
use crate::error::{Error, Result};
use crate::font::bitmap::BitmapFont;
use crate::font::descriptor::FontDescriptor;
use crate::font::packer::{pack_atlas_from_bytes, AtlasBuildResult, PackParams};
use crate::drawing::texture::Texture;
use crate::resources::ResourceStore;
use crate::utils::dispatcher::Dispatcher;
use log::{error, info};
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// Import parameters for a vector font source. Zero/negative fields are
/// treated as "not provided" and normalized to their defaults.
#[derive(Debug, Clone, Copy)]
pub struct VectorFontParams {
    pub pixel_height: i32,
    pub y_offset: i32,
    pub spacing: [i32; 2],
    /// 0 = auto-measure from the space glyph
    pub space_width: i32,
    pub first_glyph: i32,
    pub last_glyph: i32,
}

impl VectorFontParams {
    pub fn new(pixel_height: i32) -> Self {
        VectorFontParams {
            pixel_height,
            y_offset: 0,
            spacing: [0, 0],
            space_width: 0,
            first_glyph: 0,
            last_glyph: 0,
        }
    }

    /// Fill unset fields: spacing (1,0), glyph range 32..=255. The
    /// space width stays as-is; the packer floors auto-measured values.
    fn normalized(mut self) -> Self {
        if self.spacing == [0, 0] {
            self.spacing = [1, 0];
        }
        if self.first_glyph <= 0 {
            self.first_glyph = DEFAULT_FIRST_GLYPH as i32;
        }
        if self.last_glyph <= 0 || self.last_glyph < self.first_glyph {
            self.last_glyph = DEFAULT_LAST_GLYPH as i32;
        }
        self
    }
}

struct State {
    fonts: Vec<Arc<BitmapFont>>,
    /// Explicitly chosen default; the placeholder fills in when unset
    default_font: Option<Arc<BitmapFont>>,
    placeholder: Arc<BitmapFont>,
}

pub struct FontRegistry {
    me: Weak<FontRegistry>,
    store: Arc<dyn ResourceStore>,
    dispatcher: Arc<Dispatcher>,
    state: RwLock<State>,
    next_id: AtomicU32,
}

impl FontRegistry {
    pub fn new(store: Arc<dyn ResourceStore>, dispatcher: Arc<Dispatcher>) -> Arc<Self> {
        Arc::new_cyclic(|me| FontRegistry {
            me: me.clone(),
            store,
            dispatcher,
            state: RwLock::new(State {
                fonts: Vec::new(),
                default_font: None,
                placeholder: Arc::new(BitmapFont::placeholder("emptyfont")),
            }),
            next_id: AtomicU32::new(1),
        })
    }

    /// Import a font from a descriptor document. Parse and resource
    /// errors are logged and leave the registry unchanged.
    pub fn import(&self, path: &str) {
        if !self.dispatcher.is_owner() {
            let me = self.me.clone();
            let path = path.to_string();
            self.dispatcher.defer(move || {
                if let Some(r) = me.upgrade() {
                    r.import(&path);
                }
            });
            return;
        }
        if let Err(e) = self.try_import(path) {
            error!("unable to load font from '{}': {}", path, e);
        }
    }

    fn try_import(&self, path: &str) -> Result<()> {
        let text = self.store.read(path)?;
        let text = String::from_utf8(text).map_err(|e| Error::Parse(e.to_string()))?;
        let desc = FontDescriptor::parse(&text)?;

        let png = self.store.read(&desc.texture)?;
        let image = image::load_from_memory(&png)
            .map_err(|e| Error::Parse(format!("texture '{}': {}", desc.texture, e)))?
            .to_rgba8();

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let font = Arc::new(BitmapFont::from_descriptor(
            id,
            &desc,
            Arc::new(Texture::new(image)),
        )?);

        let mut state = self.state.write().unwrap();
        // Re-import replaces, never merges.
        state.fonts.retain(|f| f.name() != desc.name);
        state.fonts.push(font.clone());
        if state.default_font.is_none() || desc.set_default {
            state.default_font = Some(font.clone());
        }
        info!("font '{}' registered (id {})", desc.name, id);
        Ok(())
    }

    /// Pack a vector source into an atlas, persist the texture and a
    /// synthesized descriptor, then register through the descriptor
    /// path. Packer failures are logged; nothing partial is persisted.
    pub fn import_from_vector_source(
        &self,
        name: &str,
        source_path: &str,
        params: VectorFontParams,
        set_default: bool,
    ) {
        if !self.dispatcher.is_owner() {
            let me = self.me.clone();
            let name = name.to_string();
            let source_path = source_path.to_string();
            self.dispatcher.defer(move || {
                if let Some(r) = me.upgrade() {
                    r.import_from_vector_source(&name, &source_path, params, set_default);
                }
            });
            return;
        }
        if let Err(e) = self.try_import_from_vector(name, source_path, params, set_default) {
            error!("unable to import vector font '{}': {}", name, e);
        }
    }

    fn try_import_from_vector(
        &self,
        name: &str,
        source_path: &str,
        params: VectorFontParams,
        set_default: bool,
    ) -> Result<()> {
        let params = params.normalized();
        let bytes = self.store.read(source_path)?;
        let build = pack_atlas_from_bytes(
            &bytes,
            name,
            &PackParams {
                pixel_height: params.pixel_height,
                first_glyph: params.first_glyph as u32,
                last_glyph: params.last_glyph as u32,
                spacing_x: params.spacing[0],
                spacing_y: params.spacing[1],
                y_offset: params.y_offset,
                space_width: params.space_width,
            },
        )?;
        self.register_atlas(name, Some(source_path), &build, params.spacing, set_default)
    }

    /// Persist an atlas build and register it. Shared tail of the
    /// vector import path, separated so the persistence contract is
    /// testable without a vector engine.
    pub(crate) fn register_atlas(
        &self,
        name: &str,
        source_path: Option<&str>,
        build: &AtlasBuildResult,
        spacing: [i32; 2],
        set_default: bool,
    ) -> Result<()> {
        self.store.ensure_dir(GENERATED_FONTS_DIR)?;

        let texture_path = format!(
            "{}/{}{}.png",
            GENERATED_FONTS_DIR, name, ATLAS_TEXTURE_SUFFIX
        );
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(build.image.clone())
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .map_err(|e| Error::Rasterization(format!("atlas encode: {}", e)))?;
        self.store.write(&texture_path, &png)?;

        let desc = FontDescriptor {
            name: name.to_string(),
            texture: texture_path,
            height: build.glyph_height,
            glyph_size: [build.tile_width, build.tile_height],
            first_glyph: DEFAULT_FIRST_GLYPH,
            space_width: build.space_width,
            y_offset: build.y_offset,
            spacing,
            underline_offset: build.underline_offset,
            set_default,
            source: source_path.map(str::to_string),
        };
        let desc_path = format!("{}/{}.otfont", GENERATED_FONTS_DIR, name);
        self.store.write(&desc_path, desc.to_toml()?.as_bytes())?;

        // In-memory registration goes through the same path as
        // descriptor imports.
        self.import(&desc_path);
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .fonts
            .iter()
            .any(|f| f.name() == name)
    }

    /// Lookup by exact name; a miss logs and returns the default font.
    pub fn get(&self, name: &str) -> Arc<BitmapFont> {
        let state = self.state.read().unwrap();
        if let Some(font) = state.fonts.iter().find(|f| f.name() == name) {
            return font.clone();
        }
        error!("font '{}' not found", name);
        state
            .default_font
            .clone()
            .unwrap_or_else(|| state.placeholder.clone())
    }

    pub fn default_font(&self) -> Arc<BitmapFont> {
        let state = self.state.read().unwrap();
        state
            .default_font
            .clone()
            .unwrap_or_else(|| state.placeholder.clone())
    }

    /// Re-resolve a font by its stable numeric identity. Cache entries
    /// hold ids, not live handles; a vanished id invalidates the entry.
    pub fn font_by_id(&self, id: u32) -> Option<Arc<BitmapFont>> {
        let state = self.state.read().unwrap();
        if id == 0 {
            return Some(state.placeholder.clone());
        }
        state.fonts.iter().find(|f| f.id() == id).cloned()
    }

    /// Drop all fonts and reinstate the empty placeholder default.
    pub fn clear(&self) {
        if !self.dispatcher.is_owner() {
            let me = self.me.clone();
            self.dispatcher.defer(move || {
                if let Some(r) = me.upgrade() {
                    r.clear();
                }
            });
            return;
        }
        let mut state = self.state.write().unwrap();
        state.fonts.clear();
        state.default_font = None;
        state.placeholder = Arc::new(BitmapFont::placeholder("emptyfont"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MemStore;
    use image::RgbaImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut img = RgbaImage::new(width, height);
        // a little ink so glyph width scanning has something to find
        for x in 0..width.min(4) {
            img.put_pixel(x, 0, image::Rgba([255, 255, 255, 255]));
        }
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageOutputFormat::Png)
            .unwrap();
        out
    }

    fn descriptor_toml(name: &str, height: u32) -> String {
        format!(
            "name = \"{}\"\ntexture = \"fonts/{}.png\"\nheight = {}\nglyph-size = [8, 8]\nspace-width = 3\n",
            name, name, height
        )
    }

    fn registry_with_store() -> (Arc<FontRegistry>, Arc<MemStore>) {
        let store = Arc::new(MemStore::new());
        let dispatcher = Arc::new(Dispatcher::new());
        let registry = FontRegistry::new(store.clone(), dispatcher);
        (registry, store)
    }

    fn seed_font(store: &MemStore, name: &str, height: u32) {
        store
            .write(
                &format!("fonts/{}.otfont", name),
                descriptor_toml(name, height).as_bytes(),
            )
            .unwrap();
        store
            .write(&format!("fonts/{}.png", name), &png_bytes(64, 32))
            .unwrap();
    }

    #[test]
    fn test_import_and_lookup() {
        let (registry, store) = registry_with_store();
        seed_font(&store, "sans", 10);

        registry.import("fonts/sans.otfont");
        assert!(registry.exists("sans"));
        let font = registry.get("sans");
        assert_eq!(font.name(), "sans");
        assert_eq!(font.glyph_height(), 10);
    }

    #[test]
    fn test_first_import_becomes_default() {
        let (registry, store) = registry_with_store();
        seed_font(&store, "sans", 10);
        registry.import("fonts/sans.otfont");

        // Missing name falls back to the default, never "not found".
        let fallback = registry.get("missing");
        assert_eq!(fallback.name(), "sans");
    }

    #[test]
    fn test_reimport_replaces_in_place() {
        let (registry, store) = registry_with_store();
        seed_font(&store, "sans", 10);
        registry.import("fonts/sans.otfont");
        let old_id = registry.get("sans").id();

        seed_font(&store, "sans", 12);
        registry.import("fonts/sans.otfont");

        let font = registry.get("sans");
        assert_eq!(font.glyph_height(), 12);
        assert_ne!(font.id(), old_id);
        assert!(registry.font_by_id(old_id).is_none());
    }

    #[test]
    fn test_bad_descriptor_is_noop() {
        let (registry, store) = registry_with_store();
        store.write("fonts/bad.otfont", b"not [ toml").unwrap();
        registry.import("fonts/bad.otfont");
        assert!(!registry.exists("bad"));
    }

    #[test]
    fn test_missing_texture_is_noop() {
        let (registry, store) = registry_with_store();
        store
            .write("fonts/sans.otfont", descriptor_toml("sans", 10).as_bytes())
            .unwrap();
        registry.import("fonts/sans.otfont");
        assert!(!registry.exists("sans"));
    }

    #[test]
    fn test_register_atlas_persists_and_registers() {
        let (registry, store) = registry_with_store();
        let build = AtlasBuildResult {
            image: RgbaImage::new(160, 140),
            tile_width: 10,
            tile_height: 10,
            glyph_height: 9,
            y_offset: 0,
            space_width: 4,
            underline_offset: 2,
        };
        registry
            .register_atlas("packed", Some("fonts/packed.ttf"), &build, [1, 0], true)
            .unwrap();

        assert!(store.contains("generated/fonts/packed_cp1252.png"));
        assert!(store.contains("generated/fonts/packed.otfont"));
        assert!(registry.exists("packed"));

        let font = registry.get("packed");
        assert_eq!(font.vector_source(), Some("fonts/packed.ttf"));
        assert_eq!(font.space_width(), 4);
        assert_eq!(registry.default_font().name(), "packed");
    }

    #[test]
    fn test_vector_import_with_garbage_bytes_is_noop() {
        let (registry, store) = registry_with_store();
        store.write("fonts/fake.ttf", b"definitely not a font").unwrap();
        registry.import_from_vector_source(
            "fake",
            "fonts/fake.ttf",
            VectorFontParams::new(16),
            false,
        );
        assert!(!registry.exists("fake"));
        assert!(!store.contains("generated/fonts/fake_cp1252.png"));
    }

    #[test]
    fn test_off_thread_import_is_deferred() {
        let (registry, store) = registry_with_store();
        seed_font(&store, "sans", 10);

        let r2 = registry.clone();
        std::thread::spawn(move || r2.import("fonts/sans.otfont"))
            .join()
            .unwrap();
        assert!(!registry.exists("sans"));

        registry.dispatcher.run_pending();
        assert!(registry.exists("sans"));
    }

    #[test]
    fn test_clear_reinstates_placeholder() {
        let (registry, store) = registry_with_store();
        seed_font(&store, "sans", 10);
        registry.import("fonts/sans.otfont");
        registry.clear();

        assert!(!registry.exists("sans"));
        assert_eq!(registry.get("sans").name(), "emptyfont");
    }
}
