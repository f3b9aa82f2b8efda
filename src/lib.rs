//! textforge - fingerprint-cached text rendering with TTF atlas packing
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  Caller                         │
//! ├─────────────────────────────────────────────────┤
//! │  FontRegistry (import / lookup-with-default)    │
//! │        │ packs via                              │
//! │  Atlas Packer ── fontdue ── Fallback Rasterizer │
//! │        │                          │             │
//! │  TextRenderCache (fingerprint → quads)          │
//! │        │                                        │
//! │  Painter (GPU backend / CPU compositor)         │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The registry owns named bitmap fonts, packed from vector sources or
//! loaded from descriptor documents. The render cache memoizes layout
//! work per (font, text, box, alignment) fingerprint, choosing between
//! per-glyph quads and a whole-string rasterized image for text the
//! atlas cannot represent.

pub mod constants;
pub mod drawing;
pub mod error;
pub mod font;
pub mod render;
pub mod resources;
pub mod utils;

pub use drawing::{Align, CoordsBuffer, CpuPainter, Painter, Point, Rect, Size, Texture};
pub use error::Error;
pub use font::{BitmapFont, FontRegistry};
pub use font::registry::VectorFontParams;
pub use render::{TextRenderCache, NO_TEXT};
pub use resources::{DirStore, MemStore, ResourceStore};
pub use utils::{Color, Dispatcher};
