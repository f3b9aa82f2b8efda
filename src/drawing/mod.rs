//! Drawing primitives for text geometry
//!
//! This module provides:
//! - Integer points, sizes and rectangles with quad clipping
//! - Alignment flags for placing text inside a box
//! - The quad/vertex buffer produced by text layout
//! - The painter seam that turns quads into actual draws

pub mod align;
pub mod coords;
pub mod geometry;
pub mod painter;
pub mod texture;

// Re-export commonly used types
pub use align::Align;
pub use coords::CoordsBuffer;
pub use geometry::{Point, Rect, Size};
pub use painter::{CpuPainter, Painter, RecordingPainter};
pub use texture::Texture;
