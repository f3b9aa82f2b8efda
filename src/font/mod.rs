//! Font resources and glyph atlas management
//!
//! Handles:
//! - TTF/OTF glyph rasterization (fontdue)
//! - Tiled glyph atlas packing and derived metrics
//! - Whole-string fallback rasterization for non-Latin text
//! - Font descriptor documents (TOML)
//! - The named font registry with default-font fallback

pub mod bitmap;
pub mod descriptor;
pub mod fallback;
pub mod packer;
pub mod raster;
pub mod registry;

pub use bitmap::BitmapFont;
pub use descriptor::FontDescriptor;
pub use packer::{AtlasBuildResult, PackParams};
pub use raster::{FamilyMetrics, FontdueRasterizer, GlyphRasterizer};
pub use registry::FontRegistry;
